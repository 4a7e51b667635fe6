use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{InputMapping, Node, NodeResult};
use crate::collaborator::{Agent, AgentContext};
use crate::error::NodeError;
use crate::state::{DataMap, WorkflowState};

/// Thin adapter delegating a step to an external [`Agent`] collaborator.
pub struct AgentNode {
    id: String,
    agent: Arc<dyn Agent>,
    input_mapping: Option<InputMapping>,
    output_key: Option<String>,
}

impl AgentNode {
    pub fn new(id: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        AgentNode {
            id: id.into(),
            agent,
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
}

#[async_trait]
impl Node for AgentNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(
        &self,
        input: &DataMap,
        state: &WorkflowState,
    ) -> Result<NodeResult, NodeError> {
        let agent_input = match &self.input_mapping {
            Some(mapping) => mapping.resolve(input, state),
            None => input.clone(),
        };
        let context = AgentContext {
            run_id: state.run_id.clone(),
            node_id: self.id.clone(),
        };

        let response = match self.agent.run(agent_input, context).await {
            Ok(response) => response,
            Err(e) => {
                return Ok(NodeResult::failure(format!(
                    "Agent execution failed: {}",
                    e
                )))
            }
        };

        let mut output = DataMap::new();
        output.insert("content".to_string(), response.content);
        output.insert(
            "iteration_count".to_string(),
            json!(response.iteration_count),
        );
        if let Some(stop_reason) = response.stop_reason {
            output.insert("stop_reason".to_string(), json!(stop_reason));
        }

        let output = match &self.output_key {
            Some(key) => {
                let mut wrapped = DataMap::new();
                wrapped.insert(key.clone(), Value::Object(output.into_iter().collect()));
                wrapped
            }
            None => output,
        };
        Ok(NodeResult::success(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{AgentResponse, CollaboratorError};
    use std::collections::HashMap;

    struct EchoAgent;

    #[async_trait]
    impl Agent for EchoAgent {
        async fn run(
            &self,
            input: DataMap,
            context: AgentContext,
        ) -> Result<AgentResponse, CollaboratorError> {
            let prompt = input.get("prompt").cloned().unwrap_or(Value::Null);
            Ok(AgentResponse {
                content: json!({"echo": prompt, "node": context.node_id}),
                iteration_count: 2,
                stop_reason: Some("end_turn".into()),
            })
        }
    }

    struct BrokenAgent;

    #[async_trait]
    impl Agent for BrokenAgent {
        async fn run(
            &self,
            _input: DataMap,
            _context: AgentContext,
        ) -> Result<AgentResponse, CollaboratorError> {
            Err("model overloaded".into())
        }
    }

    fn state() -> WorkflowState {
        WorkflowState::start("wf", "run-7", None)
    }

    #[tokio::test]
    async fn test_agent_response_shapes_output() {
        let node = AgentNode::new("reason", Arc::new(EchoAgent));
        let mut input = DataMap::new();
        input.insert("prompt".into(), json!("hi"));

        let result = node.execute(&input, &state()).await.unwrap();
        assert!(result.success);
        assert_eq!(
            result.output.get("content"),
            Some(&json!({"echo": "hi", "node": "reason"}))
        );
        assert_eq!(result.output.get("iteration_count"), Some(&json!(2)));
        assert_eq!(result.output.get("stop_reason"), Some(&json!("end_turn")));
    }

    #[tokio::test]
    async fn test_agent_error_becomes_failure() {
        let node = AgentNode::new("reason", Arc::new(BrokenAgent));
        let result = node.execute(&DataMap::new(), &state()).await.unwrap();
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Agent execution failed: model overloaded")
        );
    }

    #[tokio::test]
    async fn test_input_mapping_and_output_key() {
        let node = AgentNode::new("reason", Arc::new(EchoAgent))
            .with_input_mapping(InputMapping::Static(HashMap::from([(
                "prompt".to_string(),
                json!("$state.question"),
            )])))
            .with_output_key("agent");

        let state = WorkflowState::start("wf", "run", None).set("question", json!("why?"));
        let result = node.execute(&DataMap::new(), &state).await.unwrap();
        let wrapped = result.output.get("agent").unwrap();
        assert_eq!(wrapped.get("content").unwrap().get("echo"), Some(&json!("why?")));
    }
}
