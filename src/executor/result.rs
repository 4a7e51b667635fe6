use crate::state::{DataMap, WorkflowState};

/// Terminal outcome of one `execute`/`resume` call: the final state plus
/// how the run ended. A paused run is neither completed nor failed.
#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub state: WorkflowState,
    pub completed: bool,
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub error: Option<String>,
}

impl WorkflowResult {
    pub fn completed(state: WorkflowState) -> Self {
        WorkflowResult {
            state,
            completed: true,
            paused: false,
            pause_reason: None,
            error: None,
        }
    }

    pub fn paused(state: WorkflowState) -> Self {
        WorkflowResult {
            pause_reason: state.pause_reason.clone(),
            state,
            completed: false,
            paused: true,
            error: None,
        }
    }

    pub fn failed(state: WorkflowState, error: impl Into<String>) -> Self {
        WorkflowResult {
            state,
            completed: false,
            paused: false,
            pause_reason: None,
            error: Some(error.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// The run's output is its accumulated data.
    pub fn output(&self) -> &DataMap {
        &self.state.data
    }
}
