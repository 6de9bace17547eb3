use crate::args::{EditArgs, EditSubcommand};
use crate::commands::{confirmation, load_raw, Out};
use crate::model::{Amount, Node, NodeId};
use crate::{Config, Edit, Result, Tree};
use anyhow::{ensure, Context};

/// Applies one edit to the report and prints the resulting computed tree as JSON.
///
/// # Errors
/// - Returns an error if some node of the source has no id. Such nodes get new ids on every load,
///   so no id printed by an earlier run could address them.
pub async fn edit(config: Config, args: EditArgs) -> Result<Out<Node>> {
    let (source, raw) = load_raw(&config, args.source()).await?;
    ensure!(
        raw.has_all_ids(),
        "The report from {source} has nodes without ids, so their ids change on every load. \
        Save it with `report show --json > report.json` and edit with `--source report.json`"
    );
    let tree = Tree::from_raw(&raw);
    let edit = to_edit(args.edit(), &config);
    let message = confirmation(&edit);
    let applied = tree.apply(edit)?;
    let message = if applied.changed() {
        message.to_string()
    } else {
        "Nothing changed, check the id and the kind of node it names".to_string()
    };

    let root = applied.into_tree().into_root();
    let json = serde_json::to_string_pretty(&root).context("Unable to serialize the report")?;
    println!("{json}");
    Ok(Out::new(message, root))
}

/// Translates command line arguments into an `Edit`, filling in configured default names.
fn to_edit(edit: &EditSubcommand, config: &Config) -> Edit {
    match edit {
        EditSubcommand::AddEntry { parent, name, sum } => Edit::AddEntry {
            parent: NodeId::from(parent.as_str()),
            name: name
                .clone()
                .unwrap_or_else(|| config.new_entry_name().to_string()),
            sum: Amount::parse_lenient(sum),
        },
        EditSubcommand::AddSection { parent, name } => Edit::AddSection {
            parent: NodeId::from(parent.as_str()),
            name: name
                .clone()
                .unwrap_or_else(|| config.new_section_name().to_string()),
        },
        EditSubcommand::Delete { id } => Edit::Delete {
            id: NodeId::from(id.as_str()),
        },
        EditSubcommand::Rename { id, name } => Edit::Rename {
            id: NodeId::from(id.as_str()),
            name: name.clone(),
        },
        EditSubcommand::SetNote { id, note } => Edit::SetNote {
            id: NodeId::from(id.as_str()),
            note: note.clone(),
        },
        EditSubcommand::SetSum { id, sum } => Edit::SetSum {
            id: NodeId::from(id.as_str()),
            sum: Amount::parse_lenient(sum),
        },
    }
}
