//! The tree driver: holds the current computed tree and applies edits addressed by node id.
//!
//! An edit is carried out by the section that owns the target as a direct child, using the
//! helpers in `crate::mutation`. The driver then rebuilds every ancestor on the path back to the
//! root and recomputes each one, so the tree it returns is consistent at every level.

use crate::engine;
use crate::model::{Amount, Entry, Node, NodeId, RawNode, Section};
use crate::mutation::{create_entry, create_section, replace_child};
use crate::Result;
use anyhow::bail;
use tracing::{debug, trace};

/// An edit requested by the presentation layer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Edit {
    /// Appends a new entry to the section `parent`.
    AddEntry {
        parent: NodeId,
        name: String,
        sum: Amount,
    },
    /// Appends a new, empty section to the section `parent`.
    AddSection { parent: NodeId, name: String },
    /// Removes the node `id` and its subtree.
    Delete { id: NodeId },
    /// Renames an entry or a section.
    Rename { id: NodeId, name: String },
    /// Replaces the note of an entry.
    SetNote { id: NodeId, note: String },
    /// Replaces the value of an entry.
    SetSum { id: NodeId, sum: Amount },
}

/// The outcome of `Tree::apply`.
#[derive(Debug, Clone)]
pub struct Applied {
    tree: Tree,
    changed: bool,
    created: Option<NodeId>,
}

impl Applied {
    fn unchanged(tree: &Tree) -> Self {
        Self {
            tree: tree.clone(),
            changed: false,
            created: None,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// False when the edit was a no-op, e.g. it named an id that is not in the tree.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// The id of the node created by `AddEntry` or `AddSection`.
    pub fn created(&self) -> Option<&NodeId> {
        self.created.as_ref()
    }
}

/// A computed tree whose aggregates are consistent at every level.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    /// Wraps an already computed tree.
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Aggregates a raw tree, assigning ids where they are missing.
    pub fn from_raw(raw: &RawNode) -> Self {
        Self::new(engine::aggregate(raw))
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// The root's aggregate, or its own value if the root is an entry.
    pub fn total(&self) -> Amount {
        self.root.contribution()
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    /// The child positions leading from the root to `id`. The root itself has an empty path.
    pub fn path_to(&self, id: &NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        if find_path(&self.root, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    pub fn to_raw(&self) -> RawNode {
        engine::to_raw(&self.root)
    }

    /// Applies `edit` and returns the next tree.
    ///
    /// Edits naming an unknown id, adding children to an entry, or setting the note or value of a
    /// section change nothing. Deleting the root is refused with an error.
    pub fn apply(&self, edit: Edit) -> Result<Applied> {
        trace!("Applying {edit:?}");
        let applied = match edit {
            Edit::AddEntry { parent, name, sum } => {
                let entry = create_entry(name, sum);
                self.add_child(&parent, entry.into())
            }
            Edit::AddSection { parent, name } => {
                let section = create_section(name);
                self.add_child(&parent, section.into())
            }
            Edit::Delete { id } => match self.path_to(&id) {
                Some(path) => match path.split_last() {
                    Some((index, parent)) => {
                        let root = update_at(&self.root, parent, |p| p.remove_child_at(*index));
                        self.changed(root, None)
                    }
                    None => bail!("Cannot delete the root node"),
                },
                None => self.not_found(&id),
            },
            Edit::Rename { id, name } => match self.path_to(&id) {
                Some(path) => {
                    let root = update_at(&self.root, &path, |n| n.renamed(name));
                    self.changed(root, None)
                }
                None => self.not_found(&id),
            },
            Edit::SetNote { id, note } => self.update_entry(&id, |entry| entry.with_note(note)),
            Edit::SetSum { id, sum } => self.update_entry(&id, |entry| entry.with_sum(sum)),
        };
        debug_assert!(engine::is_consistent(applied.tree.root()));
        if applied.changed {
            debug!("Edit applied, total is now {}", applied.tree.total());
        }
        Ok(applied)
    }

    fn add_child(&self, parent: &NodeId, child: Node) -> Applied {
        let path = match self.path_to(parent) {
            Some(path) => path,
            None => return self.not_found(parent),
        };
        if self.find(parent).map(Node::is_section) != Some(true) {
            debug!("{parent} is an entry, it cannot hold children");
            return Applied::unchanged(self);
        }
        let created = child.id().clone();
        let root = update_at(&self.root, &path, |p| p.append_child(child));
        self.changed(root, Some(created))
    }

    fn update_entry<F>(&self, id: &NodeId, f: F) -> Applied
    where
        F: FnOnce(Entry) -> Entry,
    {
        let path = match self.path_to(id) {
            Some(path) => path,
            None => return self.not_found(id),
        };
        if self.find(id).map(Node::is_section) == Some(true) {
            debug!("{id} is a section, only entries carry a note and a value");
            return Applied::unchanged(self);
        }
        let root = update_at(&self.root, &path, |node| match node {
            Node::Entry(entry) => Node::Entry(f(entry)),
            section => section,
        });
        self.changed(root, None)
    }

    fn changed(&self, root: Node, created: Option<NodeId>) -> Applied {
        Applied {
            tree: Tree::new(root),
            changed: true,
            created,
        }
    }

    fn not_found(&self, id: &NodeId) -> Applied {
        debug!("No node with id {id}, nothing to do");
        Applied::unchanged(self)
    }
}

/// Depth-first search that leaves the child positions leading to `id` in `path`.
fn find_path(node: &Node, id: &NodeId, path: &mut Vec<usize>) -> bool {
    if node.id() == id {
        return true;
    }
    for (index, child) in node.children().iter().enumerate() {
        path.push(index);
        if find_path(child, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Rebuilds `node` with `f` applied to the descendant at `path`, recomputing every section on the
/// way back up.
fn update_at<F>(node: &Node, path: &[usize], f: F) -> Node
where
    F: FnOnce(Node) -> Node,
{
    let (index, rest) = match path.split_first() {
        Some((index, rest)) => (*index, rest),
        None => return f(node.clone()),
    };
    match node {
        Node::Section(section) => match section.children.get(index) {
            Some(child) => {
                let updated = update_at(child, rest, f);
                let rebuilt = Section {
                    name: section.name.clone(),
                    children: replace_child(&section.children, index, updated),
                    computed_sum: section.computed_sum,
                    id: section.id.clone(),
                };
                Node::Section(rebuilt.recompute())
            }
            None => node.clone(),
        },
        Node::Entry(_) => node.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::demo::annual_report;
    use crate::engine::aggregate;
    use crate::test::{all_ids, assert_matches_brute_force, raw_section, root_a_b, root_mid};
    use proptest::prelude::*;
    use proptest::sample::Index;

    fn id_of(tree: &Tree, path: &[usize]) -> NodeId {
        let mut node = tree.root();
        for index in path {
            node = &node.children()[*index];
        }
        node.id().clone()
    }

    fn apply(tree: &Tree, edit: Edit) -> Tree {
        tree.apply(edit).unwrap().into_tree()
    }

    #[test]
    fn test_scenarios_through_the_driver() {
        let tree = Tree::from_raw(&root_a_b());
        assert_eq!(tree.total(), Amount::from(15));
        let root = tree.root().id().clone();

        let applied = tree
            .apply(Edit::AddEntry {
                parent: root.clone(),
                name: "New Entry".into(),
                sum: Amount::ZERO,
            })
            .unwrap();
        assert!(applied.changed());
        let new_id = applied.created().unwrap().clone();
        let tree = applied.into_tree();
        assert_eq!(tree.total(), Amount::from(15));
        assert_eq!(tree.root().children().len(), 3);

        let tree = apply(
            &tree,
            Edit::SetSum {
                id: new_id.clone(),
                sum: Amount::from(7),
            },
        );
        assert_eq!(tree.total(), Amount::from(22));

        let a = id_of(&tree, &[0]);
        let tree = apply(&tree, Edit::Delete { id: a });
        assert_eq!(tree.total(), Amount::from(17));
        let names: Vec<&str> = tree.root().children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["B", "New Entry"]);
    }

    #[test]
    fn test_nested_add_reaches_the_root() {
        let tree = Tree::from_raw(&root_mid());
        let mid = id_of(&tree, &[0]);
        let tree = apply(
            &tree,
            Edit::AddEntry {
                parent: mid.clone(),
                name: "Six".into(),
                sum: Amount::from(6),
            },
        );
        assert_eq!(tree.find(&mid).unwrap().contribution(), Amount::from(10));
        assert_eq!(tree.total(), Amount::from(10));
    }

    #[test]
    fn test_deep_edit_matches_full_aggregate() {
        let tree = Tree::from_raw(&annual_report());
        let hr_tool = id_of(&tree, &[3, 0, 0]);
        let tree = apply(
            &tree,
            Edit::SetSum {
                id: hr_tool,
                sum: Amount::from(55),
            },
        );
        assert_eq!(tree.total(), Amount::from(1255));
        assert_eq!(Tree::from_raw(&tree.to_raw()), tree);
        assert_matches_brute_force(tree.root());
    }

    #[test]
    fn test_delete_root_is_refused() {
        let tree = Tree::from_raw(&root_a_b());
        let root = tree.root().id().clone();
        let err = tree.apply(Edit::Delete { id: root }).unwrap_err();
        assert!(err.to_string().contains("Cannot delete the root node"));
    }

    #[test]
    fn test_delete_unknown_is_a_no_op() {
        let tree = Tree::from_raw(&root_a_b());
        let applied = tree
            .apply(Edit::Delete {
                id: NodeId::from("missing"),
            })
            .unwrap();
        assert!(!applied.changed());
        assert_eq!(applied.tree(), &tree);
    }

    #[test]
    fn test_delete_section_removes_its_subtree() {
        let tree = Tree::from_raw(&annual_report());
        let hr = id_of(&tree, &[3, 0]);
        let hr_tool = id_of(&tree, &[3, 0, 0]);
        let tree = apply(&tree, Edit::Delete { id: hr });
        assert_eq!(tree.total(), Amount::from(1200));
        assert!(tree.find(&hr_tool).is_none());
    }

    #[test]
    fn test_add_under_entry_is_a_no_op() {
        let tree = Tree::from_raw(&root_a_b());
        let a = id_of(&tree, &[0]);
        let applied = tree
            .apply(Edit::AddSection {
                parent: a,
                name: "Nope".into(),
            })
            .unwrap();
        assert!(!applied.changed());
        assert!(applied.created().is_none());
        assert_eq!(applied.tree(), &tree);
    }

    #[test]
    fn test_add_section_then_entry_inside_it() {
        let tree = Tree::from_raw(&root_a_b());
        let root = tree.root().id().clone();
        let applied = tree
            .apply(Edit::AddSection {
                parent: root,
                name: "New Section".into(),
            })
            .unwrap();
        let section = applied.created().unwrap().clone();
        let tree = applied.into_tree();
        assert_eq!(tree.find(&section).unwrap().contribution(), Amount::ZERO);

        let tree = apply(
            &tree,
            Edit::AddEntry {
                parent: section.clone(),
                name: "Inner".into(),
                sum: Amount::from(3),
            },
        );
        assert_eq!(tree.find(&section).unwrap().contribution(), Amount::from(3));
        assert_eq!(tree.total(), Amount::from(18));
    }

    #[test]
    fn test_set_note_on_section_is_a_no_op() {
        let tree = Tree::from_raw(&root_mid());
        let mid = id_of(&tree, &[0]);
        let applied = tree
            .apply(Edit::SetNote {
                id: mid,
                note: "x".into(),
            })
            .unwrap();
        assert!(!applied.changed());
    }

    #[test]
    fn test_set_note() {
        let tree = Tree::from_raw(&root_a_b());
        let b = id_of(&tree, &[1]);
        let tree = apply(
            &tree,
            Edit::SetNote {
                id: b.clone(),
                note: "audited".into(),
            },
        );
        let entry = tree.find(&b).unwrap().as_entry().unwrap();
        assert_eq!(entry.note(), "audited");
        assert_eq!(tree.total(), Amount::from(15));
    }

    #[test]
    fn test_rename_root_and_leaf() {
        let tree = Tree::from_raw(&root_a_b());
        let root = tree.root().id().clone();
        let a = id_of(&tree, &[0]);
        let tree = apply(
            &tree,
            Edit::Rename {
                id: root.clone(),
                name: "Budget".into(),
            },
        );
        let tree = apply(
            &tree,
            Edit::Rename {
                id: a.clone(),
                name: "Alpha".into(),
            },
        );
        assert_eq!(tree.root().name(), "Budget");
        assert_eq!(tree.find(&a).unwrap().name(), "Alpha");
        assert_eq!(tree.root().id(), &root);
        assert_eq!(tree.total(), Amount::from(15));
    }

    #[test]
    fn test_invalid_value_poisons_then_recovers() {
        let tree = Tree::from_raw(&annual_report());
        let q1 = id_of(&tree, &[0, 0]);
        let tree = apply(
            &tree,
            Edit::SetSum {
                id: q1.clone(),
                sum: Amount::parse_lenient("lots"),
            },
        );
        assert!(!tree.total().is_valid());
        assert!(!tree.root().children()[0].contribution().is_valid());
        assert_eq!(tree.root().children()[1].contribution(), Amount::from(300));

        let tree = apply(
            &tree,
            Edit::SetSum {
                id: q1,
                sum: Amount::from(120),
            },
        );
        assert_eq!(tree.total(), Amount::from(1220));
    }

    #[test]
    fn test_untouched_ids_are_stable() {
        let tree = Tree::from_raw(&annual_report());
        let root = tree.root().id().clone();
        let before = all_ids(tree.root());
        let tree = apply(
            &tree,
            Edit::AddEntry {
                parent: root,
                name: "x".into(),
                sum: Amount::from(1),
            },
        );
        let after = all_ids(tree.root());
        assert!(before.iter().all(|id| after.contains(id)));
        assert_eq!(after.len(), before.len() + 1);
    }

    #[test]
    fn test_delete_removes_one_of_siblings_sharing_an_id() {
        let a: Node = create_entry("A", Amount::from(1)).into();
        let b = a.clone().renamed("B");
        let c: Node = create_entry("C", Amount::from(3)).into();
        let root = Section::default_new().with_children(vec![a.clone(), b, c]);
        let tree = Tree::new(root.into());

        let tree = apply(&tree, Edit::Delete { id: a.id().clone() });
        let names: Vec<_> = tree.root().children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["B", "C"]);
        assert_eq!(tree.total(), Amount::from(4));
    }

    #[test]
    fn test_delete_with_repeated_ids_in_input() {
        let raw = RawNode::section(
            "Root",
            vec![
                RawNode::entry("A", 1).with_id("dup"),
                RawNode::entry("B", 2).with_id("dup"),
                RawNode::entry("C", 3),
            ],
        );
        let tree = Tree::from_raw(&raw);
        let tree = apply(&tree, Edit::Delete { id: NodeId::from("dup") });
        assert_eq!(tree.root().children().len(), 2);
        assert_eq!(tree.total(), Amount::from(5));
    }

    #[test]
    fn test_child_sharing_the_root_id_can_be_deleted() {
        let raw = RawNode::section(
            "Root",
            vec![
                RawNode::section("Inner", vec![RawNode::entry("A", 1)]).with_id("r"),
                RawNode::entry("B", 2),
            ],
        )
        .with_id("r");
        let tree = Tree::from_raw(&raw);
        let inner = id_of(&tree, &[0]);
        assert_ne!(inner, NodeId::from("r"));

        let tree = apply(&tree, Edit::Delete { id: inner });
        assert_eq!(tree.root().children().len(), 1);
        assert_eq!(tree.total(), Amount::from(2));
        assert!(tree.apply(Edit::Delete { id: NodeId::from("r") }).is_err());
    }

    fn node_at<'a>(tree: &'a Tree, path: &[usize]) -> &'a Node {
        let mut node = tree.root();
        for index in path {
            node = &node.children()[*index];
        }
        node
    }

    fn child_ids(node: &Node) -> Vec<NodeId> {
        node.children().iter().map(|c| c.id().clone()).collect()
    }

    fn edit_for(kind: u8, target: NodeId, value: i64) -> Edit {
        match kind {
            0 => Edit::AddEntry {
                parent: target,
                name: format!("e{value}"),
                sum: Amount::from(value),
            },
            1 => Edit::AddSection {
                parent: target,
                name: format!("s{value}"),
            },
            2 => Edit::SetSum {
                id: target,
                sum: Amount::from(value),
            },
            _ => Edit::Delete { id: target },
        }
    }

    proptest! {
        #[test]
        fn edits_keep_every_total_consistent(
            raw in raw_section(),
            edits in prop::collection::vec((any::<Index>(), 0u8..4, -100i64..100), 1..30)
        ) {
            let mut tree = Tree::from_raw(&raw);
            for (target, kind, value) in edits {
                let ids = all_ids(tree.root());
                let edit = edit_for(kind, target.get(&ids).clone(), value);
                tree = match tree.apply(edit) {
                    Ok(applied) => applied.into_tree(),
                    Err(_) => tree,
                };
                assert_matches_brute_force(tree.root());
                // Incremental propagation ends where a full aggregation would.
                prop_assert_eq!(tree.root(), &aggregate(&tree.to_raw()));
            }
        }

        #[test]
        fn delete_removes_exactly_one_child(raw in raw_section(), target in any::<Index>()) {
            let tree = Tree::from_raw(&raw);
            let ids = all_ids(tree.root());
            prop_assume!(ids.len() > 1);
            let id = target.get(&ids[1..]).clone();
            let path = tree.path_to(&id).unwrap();
            let parent = &path[..path.len() - 1];
            let before = child_ids(node_at(&tree, parent));

            let after_tree = apply(&tree, Edit::Delete { id: id.clone() });
            let after = child_ids(node_at(&after_tree, parent));
            let expected: Vec<NodeId> = before.iter().filter(|c| **c != id).cloned().collect();
            prop_assert_eq!(after.len(), before.len() - 1);
            prop_assert_eq!(after, expected);
            prop_assert!(after_tree.find(&id).is_none());
        }

        #[test]
        fn append_then_delete_earlier_keeps_order(raw in raw_section(), target in any::<Index>()) {
            let tree = Tree::from_raw(&raw);
            let applied = tree
                .apply(Edit::AddEntry {
                    parent: tree.root().id().clone(),
                    name: "Appended".into(),
                    sum: Amount::from(1),
                })
                .unwrap();
            let created = applied.created().unwrap().clone();
            let tree = applied.into_tree();
            let children = child_ids(tree.root());
            prop_assert_eq!(children.last(), Some(&created));

            let earlier = &children[..children.len() - 1];
            prop_assume!(!earlier.is_empty());
            let victim = target.get(earlier).clone();
            let tree = apply(&tree, Edit::Delete { id: victim.clone() });
            let expected: Vec<NodeId> = children.into_iter().filter(|id| *id != victim).collect();
            prop_assert_eq!(child_ids(tree.root()), expected);
        }
    }

    #[test]
    fn test_path_to() {
        let tree = Tree::from_raw(&annual_report());
        let hr_tool = id_of(&tree, &[3, 0, 0]);
        assert_eq!(tree.path_to(&hr_tool), Some(vec![3, 0, 0]));
        assert_eq!(tree.path_to(tree.root().id()), Some(vec![]));
        assert_eq!(tree.path_to(&NodeId::from("missing")), None);
    }
}
