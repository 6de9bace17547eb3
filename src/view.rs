//! Presentation of a computed tree: an indented outline with per-section collapse state, and a
//! flat CSV export.

use crate::model::{Amount, AmountFormat, Node, NodeId};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;

const INDENT: &str = "  ";
const EXPANDED: char = '▾';
const COLLAPSED: char = '▸';

/// Which sections are collapsed. Sections are expanded unless listed here. The state lives beside
/// the tree, so it survives edits as long as the section keeps its id.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ViewState {
    collapsed: HashSet<NodeId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        self.collapsed.contains(id)
    }

    pub fn collapse(&mut self, id: NodeId) {
        self.collapsed.insert(id);
    }

    pub fn expand(&mut self, id: &NodeId) {
        self.collapsed.remove(id);
    }

    /// Flips the state of `id` and returns `true` if it is now collapsed.
    pub fn toggle(&mut self, id: &NodeId) -> bool {
        if self.collapsed.remove(id) {
            false
        } else {
            self.collapsed.insert(id.clone());
            true
        }
    }
}

/// One visible line of the outline.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OutlineRow {
    depth: usize,
    id: NodeId,
    name: String,
    kind: RowKind,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RowKind {
    Entry {
        note: String,
        sum: Amount,
    },
    Section {
        sum: Amount,
        has_children: bool,
        collapsed: bool,
    },
}

impl OutlineRow {
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RowKind {
        &self.kind
    }

    /// Formats the row as a single line, indented by depth. Sections with children show a chevron
    /// reflecting their collapse state.
    pub fn render(&self, format: AmountFormat) -> String {
        let indent = INDENT.repeat(self.depth);
        match &self.kind {
            RowKind::Section {
                sum,
                has_children,
                collapsed,
            } => {
                let chevron = match (has_children, collapsed) {
                    (false, _) => ' ',
                    (true, true) => COLLAPSED,
                    (true, false) => EXPANDED,
                };
                format!(
                    "{indent}{chevron} {}  [Sum: {}]  ({})",
                    self.name,
                    sum.formatted(format),
                    self.id
                )
            }
            RowKind::Entry { note, sum } => {
                let mut line = format!(
                    "{indent}  {}: {}  ({})",
                    self.name,
                    sum.formatted(format),
                    self.id
                );
                if !note.is_empty() {
                    line.push_str(&format!("  # {note}"));
                }
                line
            }
        }
    }
}

/// Flattens the tree into visible rows, depth first. The children of collapsed sections are
/// skipped.
pub fn outline(root: &Node, view: &ViewState) -> Vec<OutlineRow> {
    let mut rows = Vec::new();
    push_rows(root, view, 0, &mut rows);
    rows
}

fn push_rows(node: &Node, view: &ViewState, depth: usize, rows: &mut Vec<OutlineRow>) {
    match node {
        Node::Entry(entry) => rows.push(OutlineRow {
            depth,
            id: entry.id().clone(),
            name: entry.name().to_string(),
            kind: RowKind::Entry {
                note: entry.note().to_string(),
                sum: entry.sum(),
            },
        }),
        Node::Section(section) => {
            let collapsed = view.is_collapsed(section.id());
            rows.push(OutlineRow {
                depth,
                id: section.id().clone(),
                name: section.name().to_string(),
                kind: RowKind::Section {
                    sum: section.computed_sum(),
                    has_children: !section.children().is_empty(),
                    collapsed,
                },
            });
            if !collapsed {
                for child in section.children() {
                    push_rows(child, view, depth + 1, rows);
                }
            }
        }
    }
}

/// Renders the whole outline, one line per visible row.
pub fn render(root: &Node, view: &ViewState, format: AmountFormat) -> String {
    outline(root, view)
        .iter()
        .map(|row| row.render(format))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The `kind` column of the CSV export.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Entry,
    Section,
}

serde_plain::derive_display_from_serialize!(NodeKind);
serde_plain::derive_fromstr_from_deserialize!(NodeKind);

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    path: String,
    kind: NodeKind,
    name: &'a str,
    note: &'a str,
    sum: String,
    id: &'a str,
}

/// Writes every node, collapsed or not, as one CSV record. `path` is the `/`-joined names from the
/// root down to the node; `sum` is an entry's value or a section's aggregate.
pub fn export_csv<W: Write>(root: &Node, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    write_csv_rows(root, "", &mut csv)?;
    csv.flush().context("Unable to flush the CSV output")?;
    Ok(())
}

fn write_csv_rows<W: Write>(node: &Node, parent: &str, csv: &mut csv::Writer<W>) -> Result<()> {
    let path = if parent.is_empty() {
        node.name().to_string()
    } else {
        format!("{parent}/{}", node.name())
    };
    let (kind, note) = match node {
        Node::Entry(entry) => (NodeKind::Entry, entry.note()),
        Node::Section(_) => (NodeKind::Section, ""),
    };
    csv.serialize(CsvRow {
        path: path.clone(),
        kind,
        name: node.name(),
        note,
        sum: node.contribution().to_string(),
        id: node.id().as_str(),
    })
    .with_context(|| format!("Unable to write the CSV record for '{path}'"))?;
    for child in node.children() {
        write_csv_rows(child, &path, csv)?;
    }
    Ok(())
}
