//! The step-loop executor, its terminal result wrapper, the lifecycle event
//! channel, and the durability decorator.

mod events;
mod persistent;
mod result;
mod workflow_executor;

pub use events::{event_channel, EventReceiver, EventSender, WorkflowEvent};
pub use persistent::PersistentWorkflowExecutor;
pub use result::WorkflowResult;
pub use workflow_executor::{ExecutionContext, ExecutorConfig, WorkflowExecutor};
