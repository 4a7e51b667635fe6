//! Workflow definition bookkeeping: resolves string references used by
//! sub-workflow nodes to registered definitions.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::graph::WorkflowDefinition;

/// Shared registry of workflow definitions, cheap to clone.
#[derive(Clone, Default)]
pub struct WorkflowRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<WorkflowDefinition>>>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert keyed by the definition's id.
    pub fn register(&self, definition: Arc<WorkflowDefinition>) {
        self.inner
            .write()
            .insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> Option<Arc<WorkflowDefinition>> {
        self.inner.read().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }
}
