//! Immutable-transition state snapshot for a single workflow run.
//!
//! A [`WorkflowState`] is never mutated in place: every transformation
//! consumes the snapshot and returns a new one. This keeps persistence
//! snapshots and replay trivially safe, and lets independent runs share
//! nothing but code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DataMap, WorkflowStatus};

/// One entry in the append-only execution history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExecutionRecord {
    pub node_id: String,
    pub input: DataMap,
    pub output: DataMap,
    pub duration_ms: u64,
    pub executed_at: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
}

/// Snapshot of a workflow run.
///
/// `current_node` is only meaningful while the status is `Running` or
/// `Paused`; `None` signals that the step loop has no more work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub workflow_id: String,
    pub run_id: String,
    pub current_node: Option<String>,
    pub status: WorkflowStatus,
    pub data: DataMap,
    pub history: Vec<NodeExecutionRecord>,
    pub pause_reason: Option<String>,
    pub started_at: DateTime<Utc>,
    pub paused_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowState {
    /// Create the initial `Running` snapshot positioned at the entry node.
    pub fn start(
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
        entry_node: Option<String>,
    ) -> Self {
        WorkflowState {
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
            current_node: entry_node,
            status: WorkflowStatus::Running,
            data: DataMap::new(),
            history: Vec::new(),
            pause_reason: None,
            started_at: Utc::now(),
            paused_at: None,
            completed_at: None,
        }
    }

    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn merge(mut self, data: &DataMap) -> Self {
        for (key, value) in data {
            self.data.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn move_to(mut self, node: Option<String>) -> Self {
        self.current_node = node;
        self
    }

    /// Suspend the run. `current_node` is left untouched so a later resume
    /// re-enters the node that paused.
    pub fn pause(mut self, reason: impl Into<String>) -> Self {
        self.status = WorkflowStatus::Paused;
        self.pause_reason = Some(reason.into());
        self.paused_at = Some(Utc::now());
        self
    }

    pub fn resume(mut self) -> Self {
        self.status = WorkflowStatus::Running;
        self.pause_reason = None;
        self.paused_at = None;
        self
    }

    pub fn complete(mut self) -> Self {
        self.status = WorkflowStatus::Completed;
        self.current_node = None;
        self.completed_at = Some(Utc::now());
        self
    }

    pub fn fail(mut self) -> Self {
        self.status = WorkflowStatus::Failed;
        self.completed_at = Some(Utc::now());
        self
    }

    /// Terminal cancellation, set by an external actor; the engine itself
    /// never initiates it.
    pub fn cancel(mut self) -> Self {
        self.status = WorkflowStatus::Cancelled;
        self.completed_at = Some(Utc::now());
        self
    }

    pub fn record_node_execution(mut self, record: NodeExecutionRecord) -> Self {
        self.history.push(record);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(node_id: &str, success: bool) -> NodeExecutionRecord {
        NodeExecutionRecord {
            node_id: node_id.to_string(),
            input: DataMap::new(),
            output: DataMap::new(),
            duration_ms: 1,
            executed_at: Utc::now(),
            success,
            error: None,
        }
    }

    #[test]
    fn test_start_is_running_at_entry() {
        let state = WorkflowState::start("wf", "run-1", Some("entry".into()));
        assert_eq!(state.status, WorkflowStatus::Running);
        assert_eq!(state.current_node.as_deref(), Some("entry"));
        assert!(state.data.is_empty());
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_transitions_leave_original_untouched() {
        let state = WorkflowState::start("wf", "run-1", Some("a".into()));
        let moved = state.clone().move_to(Some("b".into()));
        assert_eq!(state.current_node.as_deref(), Some("a"));
        assert_eq!(moved.current_node.as_deref(), Some("b"));
    }

    #[test]
    fn test_set_and_merge() {
        let mut extra = DataMap::new();
        extra.insert("b".into(), json!(2));
        let state = WorkflowState::start("wf", "run-1", None)
            .set("a", json!(1))
            .merge(&extra);
        assert_eq!(state.data.get("a"), Some(&json!(1)));
        assert_eq!(state.data.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_pause_keeps_current_node() {
        let state = WorkflowState::start("wf", "run-1", Some("ask".into())).pause("waiting");
        assert_eq!(state.status, WorkflowStatus::Paused);
        assert_eq!(state.pause_reason.as_deref(), Some("waiting"));
        assert_eq!(state.current_node.as_deref(), Some("ask"));
        assert!(state.paused_at.is_some());
    }

    #[test]
    fn test_resume_clears_pause_metadata() {
        let state = WorkflowState::start("wf", "run-1", Some("ask".into()))
            .pause("waiting")
            .resume();
        assert_eq!(state.status, WorkflowStatus::Running);
        assert!(state.pause_reason.is_none());
        assert!(state.paused_at.is_none());
    }

    #[test]
    fn test_complete_clears_current_node() {
        let state = WorkflowState::start("wf", "run-1", Some("a".into())).complete();
        assert_eq!(state.status, WorkflowStatus::Completed);
        assert!(state.current_node.is_none());
        assert!(state.completed_at.is_some());
    }

    #[test]
    fn test_history_only_grows() {
        let state = WorkflowState::start("wf", "run-1", None)
            .record_node_execution(record("a", true))
            .record_node_execution(record("b", false));
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history[0].node_id, "a");
        assert_eq!(state.history[1].node_id, "b");
        assert!(!state.history[1].success);
    }

    #[test]
    fn test_storage_neutral_serde_roundtrip() {
        let state = WorkflowState::start("wf", "run-1", Some("ask".into()))
            .set("answer", json!({"nested": [1, 2, 3]}))
            .record_node_execution(record("ask", true))
            .pause("Waiting for input");

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"paused\""));

        let back: WorkflowState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, state.run_id);
        assert_eq!(back.status, WorkflowStatus::Paused);
        assert_eq!(back.current_node.as_deref(), Some("ask"));
        assert_eq!(back.data.get("answer"), state.data.get("answer"));
        assert_eq!(back.history.len(), 1);
    }
}
