use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{InputMapping, Node, NodeResult};
use crate::collaborator::{Tool, ToolContext};
use crate::error::NodeError;
use crate::state::{DataMap, WorkflowState};

/// Thin adapter delegating a step to an external [`Tool`] collaborator.
pub struct ToolNode {
    id: String,
    tool: Arc<dyn Tool>,
    input_mapping: Option<InputMapping>,
    output_key: Option<String>,
}

impl ToolNode {
    pub fn new(id: impl Into<String>, tool: Arc<dyn Tool>) -> Self {
        ToolNode {
            id: id.into(),
            tool,
            input_mapping: None,
            output_key: None,
        }
    }

    pub fn with_input_mapping(mut self, mapping: InputMapping) -> Self {
        self.input_mapping = Some(mapping);
        self
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// A tool returning a JSON object merges it flat; anything else lands
    /// under `result`.
    fn shape_output(&self, value: Value) -> DataMap {
        let output = match value {
            Value::Object(map) => map.into_iter().collect(),
            other => {
                let mut map = DataMap::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        match &self.output_key {
            Some(key) => {
                let mut wrapped = DataMap::new();
                wrapped.insert(key.clone(), Value::Object(output.into_iter().collect()));
                wrapped
            }
            None => output,
        }
    }
}

#[async_trait]
impl Node for ToolNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(
        &self,
        input: &DataMap,
        state: &WorkflowState,
    ) -> Result<NodeResult, NodeError> {
        let tool_input = match &self.input_mapping {
            Some(mapping) => mapping.resolve(input, state),
            None => input.clone(),
        };
        let context = ToolContext {
            run_id: state.run_id.clone(),
            node_id: self.id.clone(),
        };

        let result = match self.tool.execute(tool_input, context).await {
            Ok(result) => result,
            Err(e) => {
                return Ok(NodeResult::failure(format!(
                    "Tool execution failed: {}",
                    e
                )))
            }
        };

        if !result.success {
            return Ok(NodeResult::failure(format!(
                "Tool execution failed: {}",
                result.error.as_deref().unwrap_or("unknown error")
            )));
        }
        Ok(NodeResult::success(self.shape_output(result.output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{CollaboratorError, ToolResult};
    use serde_json::json;
    use std::collections::HashMap;

    struct Adder;

    #[async_trait]
    impl Tool for Adder {
        async fn execute(
            &self,
            input: DataMap,
            _context: ToolContext,
        ) -> Result<ToolResult, CollaboratorError> {
            let a = input.get("a").and_then(|v| v.as_i64()).unwrap_or(0);
            let b = input.get("b").and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(ToolResult {
                success: true,
                output: json!({"sum": a + b}),
                error: None,
            })
        }
    }

    struct FlakyTool;

    #[async_trait]
    impl Tool for FlakyTool {
        async fn execute(
            &self,
            _input: DataMap,
            _context: ToolContext,
        ) -> Result<ToolResult, CollaboratorError> {
            Err("connection reset".into())
        }
    }

    struct RefusingTool;

    #[async_trait]
    impl Tool for RefusingTool {
        async fn execute(
            &self,
            _input: DataMap,
            _context: ToolContext,
        ) -> Result<ToolResult, CollaboratorError> {
            Ok(ToolResult {
                success: false,
                output: Value::Null,
                error: Some("rate limited".into()),
            })
        }
    }

    fn state() -> WorkflowState {
        WorkflowState::start("wf", "run", None)
    }

    #[tokio::test]
    async fn test_tool_object_output_merges_flat() {
        let node = ToolNode::new("add", Arc::new(Adder));
        let mut input = DataMap::new();
        input.insert("a".into(), json!(2));
        input.insert("b".into(), json!(3));

        let result = node.execute(&input, &state()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output.get("sum"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn test_tool_error_becomes_failure() {
        let node = ToolNode::new("flaky", Arc::new(FlakyTool));
        let result = node.execute(&DataMap::new(), &state()).await.unwrap();
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Tool execution failed: connection reset")
        );
    }

    #[tokio::test]
    async fn test_unsuccessful_tool_result_becomes_failure() {
        let node = ToolNode::new("refuse", Arc::new(RefusingTool));
        let result = node.execute(&DataMap::new(), &state()).await.unwrap();
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Tool execution failed: rate limited")
        );
    }

    #[tokio::test]
    async fn test_mapping_and_output_key() {
        let node = ToolNode::new("add", Arc::new(Adder))
            .with_input_mapping(InputMapping::Static(HashMap::from([
                ("a".to_string(), json!("$input.x")),
                ("b".to_string(), json!("$state.y")),
            ])))
            .with_output_key("calc");

        let mut input = DataMap::new();
        input.insert("x".into(), json!(10));
        let state = WorkflowState::start("wf", "run", None).set("y", json!(20));

        let result = node.execute(&input, &state).await.unwrap();
        assert_eq!(
            result.output.get("calc").unwrap().get("sum"),
            Some(&json!(30))
        );
    }
}
