use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Node, NodeResult, NEXT_NODE_KEY};
use crate::error::NodeError;
use crate::state::{DataMap, WorkflowState};

/// Branch targets for the two outcomes of a condition.
#[derive(Debug, Clone, Default)]
pub struct ConditionBranches {
    pub when_true: Option<String>,
    pub when_false: Option<String>,
}

impl ConditionBranches {
    pub fn new(
        when_true: impl Into<Option<String>>,
        when_false: impl Into<Option<String>>,
    ) -> Self {
        ConditionBranches {
            when_true: when_true.into(),
            when_false: when_false.into(),
        }
    }
}

/// Evaluates a predicate over the step input and routes through the
/// reserved `_next_node` output key. An undefined branch routes to null,
/// which terminates the run at the next step.
pub struct ConditionNode {
    id: String,
    predicate: Arc<dyn Fn(&DataMap) -> bool + Send + Sync>,
    branches: ConditionBranches,
}

impl ConditionNode {
    pub fn new<F>(id: impl Into<String>, predicate: F, branches: ConditionBranches) -> Self
    where
        F: Fn(&DataMap) -> bool + Send + Sync + 'static,
    {
        ConditionNode {
            id: id.into(),
            predicate: Arc::new(predicate),
            branches,
        }
    }
}

#[async_trait]
impl Node for ConditionNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(
        &self,
        input: &DataMap,
        _state: &WorkflowState,
    ) -> Result<NodeResult, NodeError> {
        let outcome = (self.predicate)(input);
        let branch = if outcome {
            self.branches.when_true.as_ref()
        } else {
            self.branches.when_false.as_ref()
        };

        let mut output = DataMap::new();
        output.insert("condition_result".to_string(), json!(outcome));
        output.insert(
            NEXT_NODE_KEY.to_string(),
            branch.map_or(Value::Null, |id| Value::String(id.clone())),
        );
        Ok(NodeResult::success(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches() -> ConditionBranches {
        ConditionBranches::new(Some("yes".to_string()), Some("no".to_string()))
    }

    #[tokio::test]
    async fn test_true_branch_selected() {
        let node = ConditionNode::new(
            "check",
            |input| input.get("value").and_then(|v| v.as_i64()).unwrap_or(0) > 10,
            branches(),
        );
        let mut input = DataMap::new();
        input.insert("value".into(), json!(15));
        let state = WorkflowState::start("wf", "run", None);

        let result = node.execute(&input, &state).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output.get("condition_result"), Some(&json!(true)));
        assert_eq!(result.output.get(NEXT_NODE_KEY), Some(&json!("yes")));
    }

    #[tokio::test]
    async fn test_false_branch_selected() {
        let node = ConditionNode::new(
            "check",
            |input| input.get("value").and_then(|v| v.as_i64()).unwrap_or(0) > 10,
            branches(),
        );
        let mut input = DataMap::new();
        input.insert("value".into(), json!(5));
        let state = WorkflowState::start("wf", "run", None);

        let result = node.execute(&input, &state).await.unwrap();
        assert_eq!(result.output.get("condition_result"), Some(&json!(false)));
        assert_eq!(result.output.get(NEXT_NODE_KEY), Some(&json!("no")));
    }

    #[tokio::test]
    async fn test_undefined_branch_routes_to_null() {
        let node = ConditionNode::new(
            "check",
            |_| true,
            ConditionBranches::new(None, Some("no".to_string())),
        );
        let state = WorkflowState::start("wf", "run", None);

        let result = node.execute(&DataMap::new(), &state).await.unwrap();
        assert_eq!(result.output.get(NEXT_NODE_KEY), Some(&Value::Null));
    }
}
