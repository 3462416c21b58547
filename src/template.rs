use serde::{Deserialize, Serialize};

use crate::node::{serialize_nodes, Node};

/// The result of parsing a markup string: an ordered sequence of top-level
/// nodes, immutable once parsed.
///
/// Templates are owned by whoever parsed them and are typically cached
/// upstream; parsing and rendering are both pure functions over their
/// inputs, so a template may be shared freely between threads (given `A`
/// allows it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template<A> {
    nodes: Vec<Node<A>>,
}

impl<A> Template<A> {
    pub(crate) fn new(nodes: Vec<Node<A>>) -> Self {
        Template { nodes }
    }

    /// The top-level nodes in document order.
    pub fn nodes(&self) -> &[Node<A>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Canonical re-serialization of the whole template.
    pub fn serialize(&self) -> String {
        serialize_nodes(&self.nodes)
    }
}
