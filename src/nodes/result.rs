use crate::state::DataMap;

/// Reserved output key a node can set to route the next step, used by
/// condition nodes to signal the selected branch.
pub const NEXT_NODE_KEY: &str = "_next_node";

/// What a node hands back to the step loop.
#[derive(Debug, Clone, Default)]
pub struct NodeResult {
    /// Merged into `WorkflowState.data` and into the next step's input.
    pub output: DataMap,
    /// Explicit next-node override; takes precedence over edge evaluation.
    pub next_node: Option<String>,
    pub should_pause: bool,
    pub pause_reason: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl NodeResult {
    pub fn success(output: DataMap) -> Self {
        NodeResult {
            output,
            success: true,
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        NodeResult {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// A pause is a successful result; the run suspends at the current node.
    pub fn pause(reason: impl Into<String>, output: DataMap) -> Self {
        NodeResult {
            output,
            should_pause: true,
            pause_reason: Some(reason.into()),
            success: true,
            ..Default::default()
        }
    }

    pub fn with_next_node(mut self, node_id: impl Into<String>) -> Self {
        self.next_node = Some(node_id.into());
        self
    }
}
