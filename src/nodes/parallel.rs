use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use super::{Node, NodeResult};
use crate::error::NodeError;
use crate::state::{DataMap, WorkflowState};

/// One child's result, as seen by a custom merger.
#[derive(Debug, Clone)]
pub struct ChildOutcome {
    pub node_id: String,
    pub result: NodeResult,
}

pub type MergeFn = Arc<dyn Fn(&[ChildOutcome]) -> Result<DataMap, NodeError> + Send + Sync>;

/// Policy for combining parallel children's results.
#[derive(Clone)]
pub enum MergeStrategy {
    /// Every child must succeed; output maps child id to child output.
    All,
    /// At least one child must succeed; output contains only the
    /// successful children.
    Any,
    /// The merger receives every child outcome and produces the output map.
    /// A merger error fails the node.
    Custom(MergeFn),
}

/// Fan-out over a set of child nodes against the same input/state snapshot.
/// Children are logically concurrent and do not observe each other's
/// results before the merge. A pausing child wins over merge logic.
pub struct ParallelNode {
    id: String,
    children: Vec<Arc<dyn Node>>,
    merge: MergeStrategy,
}

impl ParallelNode {
    pub fn new(id: impl Into<String>, children: Vec<Arc<dyn Node>>, merge: MergeStrategy) -> Self {
        ParallelNode {
            id: id.into(),
            children,
            merge,
        }
    }

    fn child_output_value(output: &DataMap) -> Value {
        Value::Object(output.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[async_trait]
impl Node for ParallelNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(
        &self,
        input: &DataMap,
        state: &WorkflowState,
    ) -> Result<NodeResult, NodeError> {
        let results = join_all(
            self.children
                .iter()
                .map(|child| child.execute(input, state)),
        )
        .await;

        // A child error is normalized into a failed outcome so the merge
        // strategy sees a uniform shape.
        let outcomes: Vec<ChildOutcome> = self
            .children
            .iter()
            .zip(results)
            .map(|(child, result)| ChildOutcome {
                node_id: child.id().to_string(),
                result: result.unwrap_or_else(|e| NodeResult::failure(e.to_string())),
            })
            .collect();

        if let Some(paused) = outcomes.iter().find(|o| o.result.should_pause) {
            let reason = paused
                .result
                .pause_reason
                .clone()
                .unwrap_or_else(|| "Paused".to_string());
            return Ok(NodeResult::pause(reason, paused.result.output.clone()));
        }

        let result = match &self.merge {
            MergeStrategy::All => {
                if let Some(failed) = outcomes.iter().find(|o| !o.result.success) {
                    NodeResult::failure(format!(
                        "Child '{}' failed: {}",
                        failed.node_id,
                        failed.result.error.as_deref().unwrap_or("unknown error")
                    ))
                } else {
                    let mut output = DataMap::new();
                    for outcome in &outcomes {
                        output.insert(
                            outcome.node_id.clone(),
                            Self::child_output_value(&outcome.result.output),
                        );
                    }
                    NodeResult::success(output)
                }
            }
            MergeStrategy::Any => {
                let mut output = DataMap::new();
                for outcome in outcomes.iter().filter(|o| o.result.success) {
                    output.insert(
                        outcome.node_id.clone(),
                        Self::child_output_value(&outcome.result.output),
                    );
                }
                if output.is_empty() {
                    NodeResult::failure("All parallel children failed")
                } else {
                    NodeResult::success(output)
                }
            }
            MergeStrategy::Custom(merger) => match merger(&outcomes) {
                Ok(output) => NodeResult::success(output),
                Err(e) => NodeResult::failure(format!("Merge failed: {}", e)),
            },
        };
        Ok(result)
    }
}
