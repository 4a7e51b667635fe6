//! # Agentflow — a graph-based execution engine for agent workflows
//!
//! `agentflow` executes directed graphs of typed nodes over a mutable,
//! run-scoped state, with first-class support for suspending a run
//! mid-flight and resuming it later — possibly in a different process —
//! from persisted state.
//!
//! - **Node variants**: Callback, Condition, Loop, Parallel (all/any/custom
//!   merge), HumanInput, SubWorkflow, and thin Agent/Tool adapters.
//! - **Step loop**: a synchronous, single-threaded loop that resolves the
//!   current node, executes it, folds the result into an immutable
//!   [`WorkflowState`] snapshot chain, and routes via explicit overrides or
//!   prioritized conditional edges, bounded by a configurable step count.
//! - **Pause/resume**: suspension only happens at node boundaries; a resumed
//!   run re-enters the node that paused with the new input merged in.
//! - **Durability**: [`PersistentWorkflowExecutor`] persists state around
//!   each run through the narrow [`StateRepository`] contract; in-memory and
//!   file-backed drivers ship with the crate.
//!
//! # Quick Start
//!
//! ```rust
//! use agentflow::{
//!     CallbackNode, CallbackOutput, DataMap, ExecutionContext, WorkflowDefinition,
//!     WorkflowExecutor,
//! };
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let definition = WorkflowDefinition::builder("greet")
//!         .add_node(CallbackNode::new("hello", |input, _| {
//!             let name = input.get("name").and_then(|v| v.as_str()).unwrap_or("world");
//!             let mut out = DataMap::new();
//!             out.insert("greeting".into(), json!(format!("hello, {}", name)));
//!             Ok(CallbackOutput::Map(out))
//!         }))
//!         .entry_node("hello")
//!         .build();
//!
//!     let mut input = DataMap::new();
//!     input.insert("name".into(), json!("agent"));
//!     let result = WorkflowExecutor::default()
//!         .execute(&definition, input, &ExecutionContext::default())
//!         .await;
//!     assert!(result.is_completed());
//! }
//! ```

pub mod collaborator;
pub mod error;
pub mod executor;
pub mod graph;
pub mod nodes;
pub mod registry;
pub mod repository;
pub mod state;

pub use crate::collaborator::{
    Agent, AgentContext, AgentResponse, CollaboratorError, Tool, ToolContext, ToolResult,
};
pub use crate::error::{NodeError, WorkflowError};
pub use crate::executor::{
    event_channel, EventReceiver, EventSender, ExecutionContext, ExecutorConfig,
    PersistentWorkflowExecutor, WorkflowEvent, WorkflowExecutor, WorkflowResult,
};
pub use crate::graph::{Edge, EdgePredicate, WorkflowDefinition, WorkflowDefinitionBuilder};
pub use crate::nodes::{
    AgentNode, CallbackFn, CallbackNode, CallbackOutput, ChildOutcome, ConditionBranches,
    ConditionNode, HumanInputNode, HumanInputValidator, InputMapping, LoopNode, LoopPredicate,
    MergeFn, MergeStrategy, Node, NodeResult, ParallelNode, SubWorkflowNode, ToolNode, WorkflowRef,
    HUMAN_INPUT_KEY, NEXT_NODE_KEY,
};
pub use crate::registry::WorkflowRegistry;
pub use crate::repository::{
    FileStateRepository, MemoryStateRepository, RepositoryError, StateRepository,
};
pub use crate::state::{DataMap, NodeExecutionRecord, WorkflowState, WorkflowStatus};
