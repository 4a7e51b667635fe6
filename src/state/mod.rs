//! Run-scoped execution state: the status machine, the immutable-transition
//! [`WorkflowState`] snapshot, and the per-node history records.

mod status;
mod workflow_state;

pub use status::WorkflowStatus;
pub use workflow_state::{NodeExecutionRecord, WorkflowState};

/// The working data bag carried through a run: arbitrary JSON values by key.
pub type DataMap = std::collections::HashMap<String, serde_json::Value>;
