use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Node, NodeResult};
use crate::error::NodeError;
use crate::state::{DataMap, WorkflowState};

/// Input key a resumed run must carry for the node to proceed.
pub const HUMAN_INPUT_KEY: &str = "human_input";

/// Narrow validation seam; the schema engine itself lives outside the core.
pub type HumanInputValidator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Suspends the run until a `human_input` value arrives.
///
/// Absent input pauses with the configured prompt; present input passes
/// through the optional validator. `timeout_secs` is advisory metadata for
/// external schedulers — the engine does not enforce it.
pub struct HumanInputNode {
    id: String,
    prompt: String,
    validator: Option<HumanInputValidator>,
    timeout_secs: Option<u64>,
}

impl HumanInputNode {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        HumanInputNode {
            id: id.into(),
            prompt: prompt.into(),
            validator: None,
            timeout_secs: None,
        }
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[async_trait]
impl Node for HumanInputNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(
        &self,
        input: &DataMap,
        _state: &WorkflowState,
    ) -> Result<NodeResult, NodeError> {
        let Some(value) = input.get(HUMAN_INPUT_KEY) else {
            let mut output = DataMap::new();
            output.insert("awaiting_input".to_string(), json!(true));
            output.insert("prompt".to_string(), json!(self.prompt));
            if let Some(secs) = self.timeout_secs {
                output.insert("timeout_secs".to_string(), json!(secs));
            }
            return Ok(NodeResult::pause(self.prompt.clone(), output));
        };

        if let Some(validator) = &self.validator {
            if let Err(reason) = validator(value) {
                return Ok(NodeResult::failure(format!(
                    "Invalid human input: {}",
                    reason
                )));
            }
        }

        let mut output = DataMap::new();
        output.insert(HUMAN_INPUT_KEY.to_string(), value.clone());
        output.insert("awaiting_input".to_string(), json!(false));
        Ok(NodeResult::success(output))
    }
}
