use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

/// Lifecycle notifications emitted by the executor. The engine only emits;
/// consumers decide what to do with them.
#[derive(Clone, Debug, Serialize)]
pub enum WorkflowEvent {
    Started {
        run_id: String,
        workflow_id: String,
        timestamp: DateTime<Utc>,
    },
    Resumed {
        run_id: String,
        node_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
    NodeEntered {
        run_id: String,
        node_id: String,
        timestamp: DateTime<Utc>,
    },
    NodeExited {
        run_id: String,
        node_id: String,
        success: bool,
        timestamp: DateTime<Utc>,
    },
    Paused {
        run_id: String,
        node_id: Option<String>,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    Completed {
        run_id: String,
        timestamp: DateTime<Utc>,
    },
    Failed {
        run_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

pub type EventSender = mpsc::UnboundedSender<WorkflowEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<WorkflowEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_channel() {
        let (sender, mut receiver) = event_channel();

        sender
            .send(WorkflowEvent::Started {
                run_id: "run-1".to_string(),
                workflow_id: "wf".to_string(),
                timestamp: Utc::now(),
            })
            .unwrap();

        match receiver.recv().await.unwrap() {
            WorkflowEvent::Started { run_id, .. } => assert_eq!(run_id, "run-1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
