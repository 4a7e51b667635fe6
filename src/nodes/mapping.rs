use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::state::{DataMap, WorkflowState};

const STATE_PREFIX: &str = "$state.";
const INPUT_PREFIX: &str = "$input.";

/// Input construction for delegating nodes (sub-workflow, agent, tool).
///
/// A static mapping resolves entry by entry: string values `"$state.<key>"`
/// read from the run's data, `"$input.<key>"` read from the current step
/// input, anything else is a literal. A missing key resolves to null.
/// A dynamic mapping builds the whole map in one function.
#[derive(Clone)]
pub enum InputMapping {
    Static(HashMap<String, Value>),
    Dynamic(Arc<dyn Fn(&DataMap, &WorkflowState) -> DataMap + Send + Sync>),
}

impl InputMapping {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&DataMap, &WorkflowState) -> DataMap + Send + Sync + 'static,
    {
        InputMapping::Dynamic(Arc::new(f))
    }

    pub fn resolve(&self, input: &DataMap, state: &WorkflowState) -> DataMap {
        match self {
            InputMapping::Static(entries) => entries
                .iter()
                .map(|(key, value)| (key.clone(), resolve_value(value, input, state)))
                .collect(),
            InputMapping::Dynamic(f) => f(input, state),
        }
    }
}

fn resolve_value(value: &Value, input: &DataMap, state: &WorkflowState) -> Value {
    let Some(reference) = value.as_str() else {
        return value.clone();
    };
    if let Some(key) = reference.strip_prefix(STATE_PREFIX) {
        state.data.get(key).cloned().unwrap_or(Value::Null)
    } else if let Some(key) = reference.strip_prefix(INPUT_PREFIX) {
        input.get(key).cloned().unwrap_or(Value::Null)
    } else {
        value.clone()
    }
}
