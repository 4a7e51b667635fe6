//! Workflow status — the canonical definition of run lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a workflow run.
///
/// Transitions: `Pending → Running → {Paused, Completed, Failed, Cancelled}`,
/// plus `Paused → Running` on resume. `Completed`, `Failed` and `Cancelled`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    /// A run can (re)enter the step loop from these states.
    pub fn can_resume(&self) -> bool {
        matches!(self, WorkflowStatus::Pending | WorkflowStatus::Paused)
    }

    /// The run has not yet reached a pause or a terminal state.
    pub fn is_active(&self) -> bool {
        matches!(self, WorkflowStatus::Pending | WorkflowStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Cancelled
        )
    }

    /// Whether the status machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: WorkflowStatus) -> bool {
        use WorkflowStatus::*;
        match self {
            Pending => matches!(next, Running),
            Running => matches!(next, Paused | Completed | Failed | Cancelled),
            Paused => matches!(next, Running),
            Completed | Failed | Cancelled => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Running => "running",
            WorkflowStatus::Paused => "paused",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_resume() {
        assert!(WorkflowStatus::Pending.can_resume());
        assert!(WorkflowStatus::Paused.can_resume());
        assert!(!WorkflowStatus::Running.can_resume());
        assert!(!WorkflowStatus::Completed.can_resume());
        assert!(!WorkflowStatus::Failed.can_resume());
        assert!(!WorkflowStatus::Cancelled.can_resume());
    }

    #[test]
    fn test_is_active() {
        assert!(WorkflowStatus::Pending.is_active());
        assert!(WorkflowStatus::Running.is_active());
        assert!(!WorkflowStatus::Paused.is_active());
        assert!(!WorkflowStatus::Completed.is_active());
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_transitions() {
        use WorkflowStatus::*;
        for terminal in [Completed, Failed, Cancelled] {
            for next in [Pending, Running, Paused, Completed, Failed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_paused_can_only_return_to_running() {
        use WorkflowStatus::*;
        assert!(Paused.can_transition_to(Running));
        assert!(!Paused.can_transition_to(Completed));
        assert!(!Paused.can_transition_to(Failed));
    }

    #[test]
    fn test_status_serializes_as_snake_case_tag() {
        let json = serde_json::to_string(&WorkflowStatus::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        let back: WorkflowStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, WorkflowStatus::Cancelled);
    }
}
