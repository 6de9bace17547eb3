//! The transport shape of a report tree: what a source supplies, without any derived data.

use crate::model::{Amount, NodeId};
use serde::{Deserialize, Serialize};

/// A node as received from a source. An object with `children` is a section, an object with a
/// `sum` is an entry. Ids are optional and aggregates are never present; a `computedSum` found in
/// the input is ignored.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Section(RawSection),
    Entry(RawEntry),
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub sum: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawSection {
    pub name: String,
    pub children: Vec<RawNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
}

impl RawNode {
    /// Creates an entry without an id and with an empty note.
    pub fn entry(name: impl Into<String>, sum: impl Into<Amount>) -> Self {
        RawNode::Entry(RawEntry {
            name: name.into(),
            note: String::new(),
            sum: sum.into(),
            id: None,
        })
    }

    /// Creates a section without an id.
    pub fn section(name: impl Into<String>, children: Vec<RawNode>) -> Self {
        RawNode::Section(RawSection {
            name: name.into(),
            children,
            id: None,
        })
    }

    /// Returns the node with its note replaced. Sections have no note and are returned unchanged.
    pub fn with_note(self, note: impl Into<String>) -> Self {
        match self {
            RawNode::Entry(entry) => RawNode::Entry(RawEntry {
                note: note.into(),
                ..entry
            }),
            section => section,
        }
    }

    pub fn with_id(self, id: impl Into<NodeId>) -> Self {
        let id = Some(id.into());
        match self {
            RawNode::Entry(entry) => RawNode::Entry(RawEntry { id, ..entry }),
            RawNode::Section(section) => RawNode::Section(RawSection { id, ..section }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RawNode::Entry(entry) => &entry.name,
            RawNode::Section(section) => &section.name,
        }
    }

    pub fn id(&self) -> Option<&NodeId> {
        match self {
            RawNode::Entry(entry) => entry.id.as_ref(),
            RawNode::Section(section) => section.id.as_ref(),
        }
    }

    /// True when this node and every node beneath it carry an id. Only such a tree keeps the
    /// same ids each time it is loaded.
    pub fn has_all_ids(&self) -> bool {
        match self {
            RawNode::Entry(entry) => entry.id.is_some(),
            RawNode::Section(section) => {
                section.id.is_some() && section.children.iter().all(RawNode::has_all_ids)
            }
        }
    }

    /// Parses a raw tree from a JSON document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
