use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{InputMapping, Node, NodeResult};
use crate::error::NodeError;
use crate::executor::{ExecutionContext, WorkflowExecutor};
use crate::graph::WorkflowDefinition;
use crate::registry::WorkflowRegistry;
use crate::state::{DataMap, WorkflowState};

/// How a sub-workflow node names its nested workflow.
#[derive(Clone)]
pub enum WorkflowRef {
    /// Direct reference to a definition.
    Inline(Arc<WorkflowDefinition>),
    /// Opaque id resolved through a [`WorkflowRegistry`] at execution time.
    Registered(String),
}

/// Delegates a step to a nested workflow, run synchronously to completion,
/// pause, or failure. The nested result folds back into this node's
/// [`NodeResult`]: a nested pause propagates so the whole run suspends.
pub struct SubWorkflowNode {
    id: String,
    workflow: WorkflowRef,
    registry: Option<WorkflowRegistry>,
    input_mapping: Option<InputMapping>,
    output_key: Option<String>,
    executor: WorkflowExecutor,
}

impl SubWorkflowNode {
    pub fn new(id: impl Into<String>, workflow: WorkflowRef) -> Self {
        SubWorkflowNode {
            id: id.into(),
            workflow,
            registry: None,
            input_mapping: None,
            output_key: None,
            executor: WorkflowExecutor::default(),
        }
    }

    /// Required when the workflow is a [`WorkflowRef::Registered`] id.
    pub fn with_registry(mut self, registry: WorkflowRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_input_mapping(mut self, mapping: InputMapping) -> Self {
        self.input_mapping = Some(mapping);
        self
    }

    /// Namespace the nested output under one key instead of merging it flat.
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    pub fn with_executor(mut self, executor: WorkflowExecutor) -> Self {
        self.executor = executor;
        self
    }

    fn resolve_definition(&self) -> Result<Arc<WorkflowDefinition>, String> {
        match &self.workflow {
            WorkflowRef::Inline(definition) => Ok(Arc::clone(definition)),
            WorkflowRef::Registered(id) => match &self.registry {
                Some(registry) => registry
                    .get(id)
                    .ok_or_else(|| format!("workflow '{}' not registered", id)),
                None => Err(format!(
                    "workflow '{}' referenced by id but no registry configured",
                    id
                )),
            },
        }
    }

    fn namespaced(&self, output: DataMap) -> DataMap {
        match &self.output_key {
            Some(key) => {
                let mut wrapped = DataMap::new();
                wrapped.insert(
                    key.clone(),
                    Value::Object(output.into_iter().collect()),
                );
                wrapped
            }
            None => output,
        }
    }
}

#[async_trait]
impl Node for SubWorkflowNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(
        &self,
        input: &DataMap,
        state: &WorkflowState,
    ) -> Result<NodeResult, NodeError> {
        let definition = match self.resolve_definition() {
            Ok(definition) => definition,
            Err(detail) => {
                return Ok(NodeResult::failure(format!(
                    "Sub-workflow failed: {}",
                    detail
                )))
            }
        };

        let nested_input = match &self.input_mapping {
            Some(mapping) => mapping.resolve(input, state),
            None => input.clone(),
        };

        let context = ExecutionContext::default();
        let result = self
            .executor
            .execute(&definition, nested_input, &context)
            .await;

        if result.is_failed() {
            let message = match &result.error {
                Some(detail) => format!("Sub-workflow failed: {}", detail),
                None => "Sub-workflow failed".to_string(),
            };
            return Ok(NodeResult::failure(message));
        }
        if result.is_paused() {
            let reason = result
                .pause_reason
                .clone()
                .unwrap_or_else(|| "Sub-workflow paused".to_string());
            return Ok(NodeResult::pause(reason, DataMap::new()));
        }

        let output = self.namespaced(result.output().clone());
        Ok(NodeResult::success(output))
    }
}
