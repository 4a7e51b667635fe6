//! The immutable workflow graph: nodes, conditional edges, and the fluent
//! definition builder.

mod definition;
mod edge;

pub use definition::{WorkflowDefinition, WorkflowDefinitionBuilder};
pub use edge::{Edge, EdgePredicate};
