//! Helpers that build the next version of a node after an edit.
//!
//! Every helper returns a new value and leaves its input untouched. The child-list helpers work
//! on slices and return the new sequence; it must be installed with `Section::with_children`,
//! which recomputes the aggregate of that one section. Ancestors of the section are not updated
//! here.

use crate::engine;
use crate::model::{Amount, Entry, Node, NodeId, Section};
use crate::model::{DEFAULT_ENTRY_NAME, DEFAULT_SECTION_NAME};
use tracing::debug;

/// Creates a new entry with an empty note and a fresh id.
pub fn create_entry(name: impl Into<String>, sum: Amount) -> Entry {
    Entry {
        name: name.into(),
        note: String::new(),
        sum,
        id: NodeId::generate(),
    }
}

/// Creates a new, empty section with a fresh id and an aggregate of zero.
pub fn create_section(name: impl Into<String>) -> Section {
    Section {
        name: name.into(),
        children: Vec::new(),
        computed_sum: Amount::ZERO,
        id: NodeId::generate(),
    }
}

/// Returns a copy of `children` where position `index` holds `child`. An out-of-range index
/// returns the sequence unchanged.
pub fn replace_child(children: &[Node], index: usize, child: Node) -> Vec<Node> {
    let mut updated = children.to_vec();
    match updated.get_mut(index) {
        Some(slot) => *slot = child,
        None => debug!(
            "No child at position {index} (of {}), nothing replaced",
            children.len()
        ),
    }
    updated
}

/// Returns a copy of `children` with `child` added at the end.
pub fn append_child(children: &[Node], child: Node) -> Vec<Node> {
    let mut updated = children.to_vec();
    updated.push(child);
    updated
}

/// Returns a copy of `children` without the first child whose id is `id`. The order of the
/// remaining children is kept. An unknown id returns the sequence unchanged.
pub fn remove_child(children: &[Node], id: &NodeId) -> Vec<Node> {
    match children.iter().position(|child| child.id() == id) {
        Some(index) => remove_child_at(children, index),
        None => {
            debug!("No child with id {id}, nothing removed");
            children.to_vec()
        }
    }
}

/// Returns a copy of `children` without the child at `index`. An index out of range returns the
/// sequence unchanged.
pub fn remove_child_at(children: &[Node], index: usize) -> Vec<Node> {
    if index >= children.len() {
        debug!(
            "No child at index {index} of {}, nothing removed",
            children.len()
        );
        return children.to_vec();
    }
    let mut updated = children.to_vec();
    updated.remove(index);
    updated
}

impl Entry {
    /// A new entry named "New Entry" with a sum of zero.
    pub fn default_new() -> Self {
        create_entry(DEFAULT_ENTRY_NAME, Amount::ZERO)
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn with_note(self, note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            ..self
        }
    }

    /// Replaces the entry's own value. Any amount is accepted, including `Amount::INVALID`.
    pub fn with_sum(self, sum: Amount) -> Self {
        Self { sum, ..self }
    }
}

impl Section {
    /// A new, empty section named "New Section".
    pub fn default_new() -> Self {
        create_section(DEFAULT_SECTION_NAME)
    }

    /// Renaming never changes the aggregate.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Installs `children` and recomputes this section's aggregate from them.
    pub fn with_children(self, children: Vec<Node>) -> Self {
        engine::recompute_section(Self { children, ..self })
    }

    /// Recomputes this section's aggregate from its direct children.
    pub fn recompute(self) -> Self {
        engine::recompute_section(self)
    }
}

impl Node {
    pub fn renamed(self, name: impl Into<String>) -> Self {
        match self {
            Node::Entry(entry) => Node::Entry(entry.with_name(name)),
            Node::Section(section) => Node::Section(section.with_name(name)),
        }
    }

    /// Appends `child` to a section and recomputes it. Entries are returned unchanged.
    pub fn append_child(self, child: Node) -> Self {
        self.map_children(|children| append_child(children, child))
    }

    /// Removes the child with `id` from a section and recomputes it. Entries are returned
    /// unchanged.
    pub fn remove_child(self, id: &NodeId) -> Self {
        self.map_children(|children| remove_child(children, id))
    }

    /// Removes the child at `index` from a section and recomputes it. Entries are returned
    /// unchanged.
    pub fn remove_child_at(self, index: usize) -> Self {
        self.map_children(|children| remove_child_at(children, index))
    }

    /// Replaces the child at `index` of a section and recomputes it. Entries are returned
    /// unchanged.
    pub fn replace_child(self, index: usize, child: Node) -> Self {
        self.map_children(|children| replace_child(children, index, child))
    }

    fn map_children<F>(self, f: F) -> Self
    where
        F: FnOnce(&[Node]) -> Vec<Node>,
    {
        match self {
            Node::Section(section) => {
                let children = f(&section.children);
                Node::Section(section.with_children(children))
            }
            Node::Entry(entry) => {
                debug!("'{}' is an entry and has no children to change", entry.name);
                Node::Entry(entry)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{aggregate, is_consistent};
    use crate::model::RawNode;
    use crate::test::root_a_b;

    fn names(children: &[Node]) -> Vec<&str> {
        children.iter().map(Node::name).collect()
    }

    #[test]
    fn test_create_entry_defaults() {
        let entry = Entry::default_new();
        assert_eq!(entry.name(), "New Entry");
        assert_eq!(entry.note(), "");
        assert_eq!(entry.sum(), Amount::ZERO);
    }

    #[test]
    fn test_create_section_defaults() {
        let section = Section::default_new();
        assert_eq!(section.name(), "New Section");
        assert!(section.children().is_empty());
        assert_eq!(section.computed_sum(), Amount::ZERO);
    }

    #[test]
    fn test_created_nodes_get_distinct_ids() {
        let a = Entry::default_new();
        let b = Entry::default_new();
        let c = Section::default_new();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_remove_child_by_id() {
        let root = aggregate(&root_a_b());
        let b_id = root.children()[1].id().clone();
        let root = root.remove_child(&b_id);
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.contribution(), Amount::from(5));
    }

    #[test]
    fn test_remove_child_removes_exactly_one() {
        let a: Node = create_entry("A", Amount::from(1)).into();
        let c: Node = create_entry("C", Amount::from(3)).into();
        let children = vec![a.clone(), a.clone(), c];
        let updated = remove_child(&children, a.id());
        assert_eq!(updated.len(), 2);
        assert_eq!(names(&updated), vec!["A", "C"]);
    }

    #[test]
    fn test_remove_child_at() {
        let root = aggregate(&root_a_b());
        let removed = root.clone().remove_child_at(0);
        assert_eq!(names(removed.children()), vec!["B"]);
        assert_eq!(removed.contribution(), Amount::from(10));
        assert_eq!(root.clone().remove_child_at(2), root);
    }

    #[test]
    fn test_remove_unknown_child_is_a_no_op() {
        let root = aggregate(&root_a_b());
        let removed = root.clone().remove_child(&NodeId::from("missing"));
        assert_eq!(removed, root);
    }

    #[test]
    fn test_append_then_remove_earlier_keeps_order() {
        let root = aggregate(&RawNode::section(
            "Root",
            vec![
                RawNode::entry("A", 1),
                RawNode::entry("B", 2),
                RawNode::entry("C", 3),
            ],
        ));
        let root = root.append_child(create_entry("D", Amount::from(4)).into());
        let b_id = root.children()[1].id().clone();
        let root = root.remove_child(&b_id);
        assert_eq!(names(root.children()), vec!["A", "C", "D"]);
        assert_eq!(root.contribution(), Amount::from(8));
    }

    #[test]
    fn test_replace_child_out_of_range() {
        let root = aggregate(&root_a_b());
        let children = replace_child(root.children(), 9, Entry::default_new().into());
        assert_eq!(children, root.children().to_vec());
    }

    #[test]
    fn test_child_ops_on_entry_are_no_ops() {
        let entry = Node::Entry(create_entry("Leaf", Amount::from(3)));
        let appended = entry.clone().append_child(Entry::default_new().into());
        assert_eq!(appended, entry);
        let replaced = entry.clone().replace_child(0, Entry::default_new().into());
        assert_eq!(replaced, entry);
        let removed = entry.clone().remove_child(entry.id());
        assert_eq!(removed, entry);
    }

    #[test]
    fn test_rename_section_keeps_aggregate() {
        let root = aggregate(&root_a_b());
        let renamed = root.clone().renamed("Totals");
        assert_eq!(renamed.name(), "Totals");
        assert_eq!(renamed.contribution(), root.contribution());
        assert_eq!(renamed.id(), root.id());
    }

    #[test]
    fn test_with_sum_accepts_invalid() {
        let root = aggregate(&root_a_b());
        let bad = root.children()[0]
            .as_entry()
            .unwrap()
            .clone()
            .with_sum(Amount::parse_lenient("1.2.3"));
        let root = root.replace_child(0, bad.into());
        assert!(!root.contribution().is_valid());
        assert!(is_consistent(&root));

        // The next valid edit fixes the total.
        let good = root.children()[0]
            .as_entry()
            .unwrap()
            .clone()
            .with_sum(Amount::from(1));
        let root = root.replace_child(0, good.into());
        assert_eq!(root.contribution(), Amount::from(11));
    }

    #[test]
    fn test_with_note_keeps_sum_and_id() {
        let entry = create_entry("A", Amount::from(2));
        let noted = entry.clone().with_note("checked");
        assert_eq!(noted.note(), "checked");
        assert_eq!(noted.sum(), entry.sum());
        assert_eq!(noted.id(), entry.id());
    }
}
