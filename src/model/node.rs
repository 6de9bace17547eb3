//! The computed shape of a report tree: every node has an id and every section carries the
//! aggregate of its subtree.
//!
//! Computed nodes can only be built by the engine and the mutation helpers, which keep
//! `computed_sum` in step with `children`. They serialize to the same JSON shape as raw nodes plus
//! `computedSum`, so the output of one run can be fed back in as a raw tree.

use crate::model::{Amount, NodeId};
use serde::Serialize;

/// A node of a computed tree.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Section(Section),
    Entry(Entry),
}

/// A leaf carrying its own value.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Entry {
    pub(crate) name: String,
    pub(crate) note: String,
    pub(crate) sum: Amount,
    pub(crate) id: NodeId,
}

/// An interior node carrying the aggregate of its children.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Section {
    pub(crate) name: String,
    pub(crate) children: Vec<Node>,
    #[serde(rename = "computedSum")]
    pub(crate) computed_sum: Amount,
    pub(crate) id: NodeId,
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Entry(entry) => &entry.id,
            Node::Section(section) => &section.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Entry(entry) => &entry.name,
            Node::Section(section) => &section.name,
        }
    }

    /// What this node adds to its parent's aggregate: an entry's own `sum` or a section's
    /// `computed_sum`.
    pub fn contribution(&self) -> Amount {
        match self {
            Node::Entry(entry) => entry.sum,
            Node::Section(section) => section.computed_sum,
        }
    }

    /// The direct children of a section. Entries have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Entry(_) => &[],
            Node::Section(section) => &section.children,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Node::Section(_))
    }

    pub fn as_entry(&self) -> Option<&Entry> {
        match self {
            Node::Entry(entry) => Some(entry),
            Node::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Node::Entry(_) => None,
            Node::Section(section) => Some(section),
        }
    }

    /// Finds the node with `id` in this subtree, including this node itself.
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// The number of nodes in this subtree, including this node.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }
}

impl Entry {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn sum(&self) -> Amount {
        self.sum
    }
}

impl Section {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn computed_sum(&self) -> Amount {
        self.computed_sum
    }
}

impl From<Entry> for Node {
    fn from(value: Entry) -> Self {
        Node::Entry(value)
    }
}

impl From<Section> for Node {
    fn from(value: Section) -> Self {
        Node::Section(value)
    }
}
