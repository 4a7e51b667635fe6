use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{Node, NodeResult};
use crate::error::NodeError;
use crate::state::{DataMap, WorkflowState};

/// Continue predicate: `(input, state, iteration_index) -> bool`.
pub type LoopPredicate = Arc<dyn Fn(&DataMap, &WorkflowState, usize) -> bool + Send + Sync>;

/// Repeats a nested body node while the predicate holds, bounded by
/// `max_iterations`. Each iteration's output becomes the next iteration's
/// input. Body failure aborts the loop with that error; body pause is
/// propagated without running further iterations.
pub struct LoopNode {
    id: String,
    body: Arc<dyn Node>,
    predicate: LoopPredicate,
    max_iterations: usize,
}

impl LoopNode {
    pub fn new<F>(
        id: impl Into<String>,
        body: Arc<dyn Node>,
        predicate: F,
        max_iterations: usize,
    ) -> Self
    where
        F: Fn(&DataMap, &WorkflowState, usize) -> bool + Send + Sync + 'static,
    {
        LoopNode {
            id: id.into(),
            body,
            predicate: Arc::new(predicate),
            max_iterations,
        }
    }
}

#[async_trait]
impl Node for LoopNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(
        &self,
        input: &DataMap,
        state: &WorkflowState,
    ) -> Result<NodeResult, NodeError> {
        let mut working = input.clone();
        let mut last_output = DataMap::new();
        let mut iterations = 0usize;

        while iterations < self.max_iterations && (self.predicate)(&working, state, iterations) {
            let result = self.body.execute(&working, state).await?;
            if !result.success || result.should_pause {
                return Ok(result);
            }
            tracing::debug!(loop_id = %self.id, iteration = iterations, "loop body completed");
            last_output = result.output;
            working = last_output.clone();
            iterations += 1;
        }

        let mut output = DataMap::new();
        output.insert("iterations".to_string(), json!(iterations));
        output.insert(
            "final_output".to_string(),
            json!(last_output),
        );
        Ok(NodeResult::success(output))
    }
}
