use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{Node, NodeResult};
use crate::error::NodeError;
use crate::state::{DataMap, WorkflowState};

/// What a callback may return; non-[`NodeResult`] shapes are normalized by
/// the node.
pub enum CallbackOutput {
    Result(NodeResult),
    Map(DataMap),
    Scalar(Value),
}

impl From<NodeResult> for CallbackOutput {
    fn from(result: NodeResult) -> Self {
        CallbackOutput::Result(result)
    }
}

impl From<DataMap> for CallbackOutput {
    fn from(map: DataMap) -> Self {
        CallbackOutput::Map(map)
    }
}

impl From<Value> for CallbackOutput {
    fn from(value: Value) -> Self {
        CallbackOutput::Scalar(value)
    }
}

pub type CallbackFn =
    Arc<dyn Fn(&DataMap, &WorkflowState) -> Result<CallbackOutput, NodeError> + Send + Sync>;

/// Wraps an arbitrary function as a sequential workflow step.
///
/// A map return becomes `success(map)`; a scalar becomes
/// `success({result: scalar})`. An error raised inside the callback is
/// absorbed here and converted to a `failure` result, which reads cleaner
/// than the step loop's generic boundary for this common case.
pub struct CallbackNode {
    id: String,
    callback: CallbackFn,
}

impl CallbackNode {
    pub fn new<F>(id: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&DataMap, &WorkflowState) -> Result<CallbackOutput, NodeError>
            + Send
            + Sync
            + 'static,
    {
        CallbackNode {
            id: id.into(),
            callback: Arc::new(callback),
        }
    }
}

#[async_trait]
impl Node for CallbackNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(
        &self,
        input: &DataMap,
        state: &WorkflowState,
    ) -> Result<NodeResult, NodeError> {
        let result = match (self.callback)(input, state) {
            Ok(CallbackOutput::Result(result)) => result,
            Ok(CallbackOutput::Map(map)) => NodeResult::success(map),
            Ok(CallbackOutput::Scalar(value)) => {
                let mut output = DataMap::new();
                output.insert("result".to_string(), value);
                NodeResult::success(output)
            }
            Err(e) => NodeResult::failure(format!("Callback failed: {}", e)),
        };
        Ok(result)
    }
}
