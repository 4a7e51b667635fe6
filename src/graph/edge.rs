use std::fmt;
use std::sync::Arc;

use crate::state::DataMap;

/// Boolean predicate evaluated against the current step input.
pub type EdgePredicate = Arc<dyn Fn(&DataMap) -> bool + Send + Sync>;

/// Directed edge between two nodes.
///
/// Edges with higher `priority` are evaluated first; ties preserve
/// declaration order. An edge without a predicate always matches.
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub predicate: Option<EdgePredicate>,
    pub priority: i32,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Edge {
            from: from.into(),
            to: to.into(),
            predicate: None,
            priority: 0,
        }
    }

    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&DataMap) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// True when the predicate is absent or holds for `input`.
    pub fn matches(&self, input: &DataMap) -> bool {
        match &self.predicate {
            Some(predicate) => predicate(input),
            None => true,
        }
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("priority", &self.priority)
            .field("conditional", &self.predicate.is_some())
            .finish()
    }
}
