use crate::args::ShowArgs;
use crate::commands::{load_tree, Out};
use crate::model::{AmountFormat, Node, NodeId};
use crate::view::{self, ViewState};
use crate::{Config, Result, Tree};
use anyhow::Context;
use std::io::Write;
use tracing::warn;

/// Prints the report as an outline, or as the computed JSON with `--json`.
pub async fn show(config: Config, args: ShowArgs) -> Result<Out<Node>> {
    let tree = load_tree(&config, args.source()).await?;
    let format = config.amount_format();
    let mut stdout = std::io::stdout().lock();
    write_report(&tree, &args, format, &mut stdout)?;
    Ok(Out::new(
        format!("Total: {}", tree.total().formatted(format)),
        tree.into_root(),
    ))
}

fn write_report<W: Write>(
    tree: &Tree,
    args: &ShowArgs,
    format: AmountFormat,
    out: &mut W,
) -> Result<()> {
    if args.json() {
        let json =
            serde_json::to_string_pretty(tree.root()).context("Unable to serialize the report")?;
        writeln!(out, "{json}")?;
        return Ok(());
    }

    let mut view = ViewState::new();
    for id in args.collapse() {
        let id = NodeId::from(id.as_str());
        if tree.find(&id).is_none() {
            warn!("There is no node with id {id} to collapse");
        }
        view.collapse(id);
    }
    writeln!(out, "{}", view::render(tree.root(), &view, format))?;
    Ok(())
}
