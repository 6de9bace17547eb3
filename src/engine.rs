//! Derives computed trees from raw trees and keeps section aggregates up to date.
//!
//! There are two ways to produce a `computed_sum`:
//! - `aggregate` walks a whole raw tree once, children before parents, assigning ids where they
//!   are missing. It is used when a tree arrives from a source.
//! - `recompute` fixes a single section after its children were replaced. It only reads the
//!   already-known contributions of the direct children, so it costs O(children) and never
//!   touches ids. Ancestors are not updated; see `crate::tree` for the driver that walks an edit
//!   up to the root.

use crate::model::{Amount, Entry, Node, NodeId, RawEntry, RawNode, RawSection, Section};
use std::collections::HashSet;
use tracing::{trace, warn};

/// Converts a raw tree into a computed tree.
///
/// Ids present in `raw` are reused verbatim and missing ids are generated. An id that already
/// appeared earlier in pre-order is replaced by a generated one, so ids are unique within the
/// result. Entry sums are passed through unchanged, including invalid ones.
pub fn aggregate(raw: &RawNode) -> Node {
    let mut seen = HashSet::new();
    aggregate_node(raw, &mut seen)
}

fn aggregate_node(raw: &RawNode, seen: &mut HashSet<NodeId>) -> Node {
    match raw {
        RawNode::Entry(entry) => Node::Entry(Entry {
            name: entry.name.clone(),
            note: entry.note.clone(),
            sum: entry.sum,
            id: resolve_id(entry.id.as_ref(), seen),
        }),
        RawNode::Section(section) => {
            let id = resolve_id(section.id.as_ref(), seen);
            let children: Vec<Node> = section
                .children
                .iter()
                .map(|child| aggregate_node(child, seen))
                .collect();
            let computed_sum = sum_children(&children);
            trace!(
                "Aggregated section '{}' over {} children: {computed_sum}",
                section.name,
                children.len()
            );
            Node::Section(Section {
                name: section.name.clone(),
                children,
                computed_sum,
                id,
            })
        }
    }
}

/// Recomputes the aggregate of `node` from its direct children. Entries are returned unchanged.
pub fn recompute(node: Node) -> Node {
    match node {
        Node::Section(section) => Node::Section(recompute_section(section)),
        entry @ Node::Entry(_) => entry,
    }
}

/// Recomputes `section.computed_sum` from the contributions of its direct children.
pub fn recompute_section(section: Section) -> Section {
    let computed_sum = sum_children(&section.children);
    trace!(
        "Recomputed section '{}' ({}): {} -> {computed_sum}",
        section.name,
        section.id,
        section.computed_sum
    );
    Section {
        computed_sum,
        ..section
    }
}

/// Converts a computed tree back into its raw form, keeping ids and dropping aggregates.
pub fn to_raw(node: &Node) -> RawNode {
    match node {
        Node::Entry(entry) => RawNode::Entry(RawEntry {
            name: entry.name.clone(),
            note: entry.note.clone(),
            sum: entry.sum,
            id: Some(entry.id.clone()),
        }),
        Node::Section(section) => RawNode::Section(RawSection {
            name: section.name.clone(),
            children: section.children.iter().map(to_raw).collect(),
            id: Some(section.id.clone()),
        }),
    }
}

/// Returns true if every section in the subtree carries the sum of its children's contributions.
pub fn is_consistent(node: &Node) -> bool {
    match node {
        Node::Entry(_) => true,
        Node::Section(section) => {
            section.computed_sum == sum_children(&section.children)
                && section.children.iter().all(is_consistent)
        }
    }
}

pub(crate) fn sum_children(children: &[Node]) -> Amount {
    children.iter().map(Node::contribution).sum()
}

fn resolve_id(id: Option<&NodeId>, seen: &mut HashSet<NodeId>) -> NodeId {
    let id = match id {
        Some(id) if !seen.contains(id) => id.clone(),
        Some(id) => {
            warn!("The id {id} appears more than once, the repeat gets a new id");
            NodeId::generate()
        }
        None => NodeId::generate(),
    };
    seen.insert(id.clone());
    id
}
