//! Narrow interfaces to external collaborators. The Agent reasoning loop and
//! Tool execution live outside the engine; the adapters in `nodes` consume
//! only these seams.

use async_trait::async_trait;
use serde_json::Value;

use crate::state::DataMap;

/// Boxed error for collaborator implementations.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct AgentContext {
    pub run_id: String,
    pub node_id: String,
}

#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub content: Value,
    pub iteration_count: u32,
    pub stop_reason: Option<String>,
}

/// An LLM-backed reasoning loop.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(
        &self,
        input: DataMap,
        context: AgentContext,
    ) -> Result<AgentResponse, CollaboratorError>;
}

#[derive(Debug, Clone)]
pub struct ToolContext {
    pub run_id: String,
    pub node_id: String,
}

#[derive(Debug, Clone)]
pub struct ToolResult {
    pub success: bool,
    pub output: Value,
    pub error: Option<String>,
}

/// A callable tool with externally validated input.
#[async_trait]
pub trait Tool: Send + Sync {
    async fn execute(
        &self,
        input: DataMap,
        context: ToolContext,
    ) -> Result<ToolResult, CollaboratorError>;
}
