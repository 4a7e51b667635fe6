//! Node polymorphism: the [`Node`] trait, the [`NodeResult`] contract, and
//! the built-in variants (callback, condition, loop, parallel, human input,
//! sub-workflow, and the Agent/Tool adapters).

mod agent;
mod callback;
mod condition;
mod human_input;
mod loop_node;
mod mapping;
mod parallel;
mod result;
mod subworkflow;
mod tool;

pub use agent::AgentNode;
pub use callback::{CallbackFn, CallbackNode, CallbackOutput};
pub use condition::{ConditionBranches, ConditionNode};
pub use human_input::{HumanInputNode, HumanInputValidator, HUMAN_INPUT_KEY};
pub use loop_node::{LoopNode, LoopPredicate};
pub use mapping::InputMapping;
pub use parallel::{ChildOutcome, MergeFn, MergeStrategy, ParallelNode};
pub use result::{NodeResult, NEXT_NODE_KEY};
pub use subworkflow::{SubWorkflowNode, WorkflowRef};
pub use tool::ToolNode;

use async_trait::async_trait;

use crate::error::NodeError;
use crate::state::{DataMap, WorkflowState};

/// A unit of work in the graph. Nodes are stateless between invocations:
/// anything they need travels through `input` or `state.data`.
///
/// Returning `Err` is the "node threw" case: the step loop records a failed
/// history entry and terminates the run as `Failed`.
#[async_trait]
pub trait Node: Send + Sync {
    fn id(&self) -> &str;

    async fn execute(
        &self,
        input: &DataMap,
        state: &WorkflowState,
    ) -> Result<NodeResult, NodeError>;
}
