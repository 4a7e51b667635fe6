use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::edge::Edge;
use crate::nodes::Node;
use crate::state::DataMap;

/// Immutable workflow graph: an ordered set of nodes, conditional edges,
/// an optional entry node, and optional explicit exit points.
///
/// Built once through [`WorkflowDefinitionBuilder`]; edge endpoints are not
/// validated at build time — a dangling node id surfaces at execution time
/// as a fatal "node not found" condition.
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    nodes: Vec<Arc<dyn Node>>,
    node_map: HashMap<String, Arc<dyn Node>>,
    edges: Vec<Edge>,
    pub entry_node: Option<String>,
    pub exit_points: Vec<String>,
    pub metadata: DataMap,
}

impl WorkflowDefinition {
    pub fn builder(id: impl Into<String>) -> WorkflowDefinitionBuilder {
        WorkflowDefinitionBuilder::new(id)
    }

    pub fn node(&self, node_id: &str) -> Option<&Arc<dyn Node>> {
        self.node_map.get(node_id)
    }

    /// Node ids in declaration order.
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id()).collect()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edges of `node_id`, sorted by priority descending. The sort
    /// is stable so ties keep declaration order.
    pub fn edges_from(&self, node_id: &str) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges.iter().filter(|e| e.from == node_id).collect();
        edges.sort_by_key(|e| std::cmp::Reverse(e.priority));
        edges
    }

    /// A node is an exit point when listed explicitly, or, absent an
    /// explicit list, when it has no outgoing edges.
    pub fn is_exit_point(&self, node_id: &str) -> bool {
        if self.exit_points.is_empty() {
            self.edges.iter().all(|e| e.from != node_id)
        } else {
            self.exit_points.iter().any(|id| id == node_id)
        }
    }
}

impl std::fmt::Debug for WorkflowDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("nodes", &self.node_ids())
            .field("edges", &self.edges)
            .field("entry_node", &self.entry_node)
            .finish()
    }
}

/// Fluent builder for [`WorkflowDefinition`].
pub struct WorkflowDefinitionBuilder {
    id: String,
    name: String,
    description: String,
    nodes: Vec<Arc<dyn Node>>,
    edges: Vec<Edge>,
    entry_node: Option<String>,
    exit_points: Vec<String>,
    metadata: DataMap,
}

impl WorkflowDefinitionBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        WorkflowDefinitionBuilder {
            name: id.clone(),
            id,
            description: String::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            entry_node: None,
            exit_points: Vec::new(),
            metadata: DataMap::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_node<N: Node + 'static>(self, node: N) -> Self {
        self.add_node_arc(Arc::new(node))
    }

    pub fn add_node_arc(mut self, node: Arc<dyn Node>) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn add_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Unconditional edge from `from` to `to`.
    pub fn then(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.add_edge(Edge::new(from, to))
    }

    /// Conditional edge with an explicit priority.
    pub fn branch<F>(
        self,
        from: impl Into<String>,
        to: impl Into<String>,
        predicate: F,
        priority: i32,
    ) -> Self
    where
        F: Fn(&DataMap) -> bool + Send + Sync + 'static,
    {
        self.add_edge(Edge::new(from, to).when(predicate).with_priority(priority))
    }

    pub fn entry_node(mut self, node_id: impl Into<String>) -> Self {
        self.entry_node = Some(node_id.into());
        self
    }

    pub fn exit_point(mut self, node_id: impl Into<String>) -> Self {
        self.exit_points.push(node_id.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn build(self) -> WorkflowDefinition {
        let mut node_map = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            node_map.insert(node.id().to_string(), Arc::clone(node));
        }
        WorkflowDefinition {
            id: self.id,
            name: self.name,
            description: self.description,
            nodes: self.nodes,
            node_map,
            edges: self.edges,
            entry_node: self.entry_node,
            exit_points: self.exit_points,
            metadata: self.metadata,
        }
    }
}
