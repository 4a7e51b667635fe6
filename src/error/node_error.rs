use thiserror::Error;

/// Node-level errors
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Execution error: {0}")]
    ExecutionError(String),
    #[error("Input validation error: {0}")]
    InputValidationError(String),
    #[error("Input mapping error: {0}")]
    MappingError(String),
    #[error("Sub-workflow error: {0}")]
    SubWorkflowError(String),
    #[error("Collaborator error: {0}")]
    CollaboratorError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        NodeError::SerializationError(e.to_string())
    }
}
