//! Workflow-level error types.

use super::NodeError;
use crate::repository::RepositoryError;
use crate::state::WorkflowStatus;
use thiserror::Error;

/// Workflow-level errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Run '{run_id}' cannot resume from status '{status}'")]
    InvalidState {
        run_id: String,
        status: WorkflowStatus,
    },
    #[error("Maximum steps exceeded: {0}")]
    MaxStepsExceeded(usize),
    #[error("Node execution error: node={node_id}, error={error}")]
    NodeExecutionError { node_id: String, error: String },
    #[error("Workflow run not found: {0}")]
    WorkflowNotFound(String),
    #[error("Workflow run '{run_id}' is not paused (status: {status})")]
    WorkflowNotPaused {
        run_id: String,
        status: WorkflowStatus,
    },
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Node error: {0}")]
    NodeError(#[from] NodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_display() {
        assert_eq!(
            WorkflowError::NodeNotFound("n".into()).to_string(),
            "Node not found: n"
        );
        assert_eq!(
            WorkflowError::MaxStepsExceeded(100).to_string(),
            "Maximum steps exceeded: 100"
        );
        assert_eq!(
            WorkflowError::WorkflowNotFound("run-1".into()).to_string(),
            "Workflow run not found: run-1"
        );
    }

    #[test]
    fn test_invalid_state_names_run_and_status() {
        let err = WorkflowError::InvalidState {
            run_id: "run-9".into(),
            status: WorkflowStatus::Completed,
        };
        let msg = err.to_string();
        assert!(msg.contains("run-9"));
        assert!(msg.contains("completed"));
    }

    #[test]
    fn test_workflow_error_from_node_error() {
        let wf_err: WorkflowError = NodeError::ExecutionError("boom".into()).into();
        assert!(matches!(wf_err, WorkflowError::NodeError(_)));
        assert!(wf_err.to_string().contains("boom"));
    }
}
