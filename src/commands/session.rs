//! An interactive editing session. The tree lives in memory for the length of the session and every
//! line read from the input is one command.

use crate::args::SessionArgs;
use crate::commands::{confirmation, load_tree, Out};
use crate::model::{Amount, AmountFormat, Node, NodeId};
use crate::view::{self, ViewState};
use crate::{Config, Edit, Result, Tree};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// Runs a session on stdin and stdout. Returns the tree as it stands when the session ends.
pub async fn session(config: Config, args: SessionArgs) -> Result<Out<Node>> {
    let tree = load_tree(&config, args.source()).await?;
    let format = config.amount_format();
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let tree = Session::new(tree, &config).run(input, &mut stdout).await?;
    Ok(Out::new(
        format!("Session ended, total: {}", tree.total().formatted(format)),
        tree.into_root(),
    ))
}

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Print the outline.
    Show,
    /// Print the grand total.
    Total,
    /// Print the computed tree as JSON.
    Json,
    /// Add an entry to a section: add-entry PARENT [NAME...] [--sum N]
    AddEntry {
        parent: String,
        name: Vec<String>,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        sum: String,
    },
    /// Add an empty section to a section: add-section PARENT [NAME...]
    AddSection { parent: String, name: Vec<String> },
    /// Delete a node and everything beneath it, after confirmation.
    Delete { id: String },
    /// Rename a node: rename ID NAME...
    Rename {
        id: String,
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Replace an entry's note: note ID [NOTE...]
    Note { id: String, note: Vec<String> },
    /// Replace an entry's amount: sum ID VALUE
    Sum {
        id: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Hide the children of a section.
    Collapse { id: String },
    /// Show the children of a section.
    Expand { id: String },
    /// End the session.
    #[command(alias = "exit")]
    Quit,
}

struct Session {
    tree: Tree,
    view: ViewState,
    format: AmountFormat,
    entry_name: String,
    section_name: String,
}

impl Session {
    fn new(tree: Tree, config: &Config) -> Self {
        Self {
            tree,
            view: ViewState::new(),
            format: config.amount_format(),
            entry_name: config.new_entry_name().to_string(),
            section_name: config.new_section_name().to_string(),
        }
    }

    async fn run<R, W>(mut self, input: R, out: &mut W) -> Result<Tree>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        self.show(out)?;
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let line = match lines
                .next_line()
                .await
                .context("Unable to read the next command")?
            {
                Some(line) => line,
                None => break,
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            let command = match SessionLine::try_parse_from(words) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
            };
            debug!("Session command {command:?}");

            match command {
                SessionCommand::Quit => break,
                SessionCommand::Show => self.show(out)?,
                SessionCommand::Total => writeln!(
                    out,
                    "Total: {}",
                    self.tree.total().formatted(self.format)
                )?,
                SessionCommand::Json => {
                    let json = serde_json::to_string_pretty(self.tree.root())
                        .context("Unable to serialize the report")?;
                    writeln!(out, "{json}")?;
                }
                SessionCommand::Collapse { id } => {
                    self.view.collapse(NodeId::from(id));
                    self.show(out)?;
                }
                SessionCommand::Expand { id } => {
                    self.view.expand(&NodeId::from(id));
                    self.show(out)?;
                }
                SessionCommand::Delete { id } => {
                    let id = NodeId::from(id);
                    let name = match self.tree.find(&id) {
                        Some(node) => node.name().to_string(),
                        None => {
                            writeln!(out, "There is no node with id {id}")?;
                            continue;
                        }
                    };
                    write!(out, "Delete '{name}' and everything beneath it? [y/N] ")?;
                    out.flush()?;
                    let answer = lines
                        .next_line()
                        .await
                        .context("Unable to read the confirmation")?
                        .unwrap_or_default();
                    if answer.trim().eq_ignore_ascii_case("y") {
                        self.apply(Edit::Delete { id }, out)?;
                    } else {
                        writeln!(out, "Nothing deleted")?;
                    }
                }
                SessionCommand::AddEntry { parent, name, sum } => {
                    let edit = Edit::AddEntry {
                        parent: NodeId::from(parent),
                        name: join_or(name, &self.entry_name),
                        sum: Amount::parse_lenient(&sum),
                    };
                    self.apply(edit, out)?;
                }
                SessionCommand::AddSection { parent, name } => {
                    let edit = Edit::AddSection {
                        parent: NodeId::from(parent),
                        name: join_or(name, &self.section_name),
                    };
                    self.apply(edit, out)?;
                }
                SessionCommand::Rename { id, name } => {
                    let edit = Edit::Rename {
                        id: NodeId::from(id),
                        name: name.join(" "),
                    };
                    self.apply(edit, out)?;
                }
                SessionCommand::Note { id, note } => {
                    let edit = Edit::SetNote {
                        id: NodeId::from(id),
                        note: note.join(" "),
                    };
                    self.apply(edit, out)?;
                }
                SessionCommand::Sum { id, value } => {
                    let edit = Edit::SetSum {
                        id: NodeId::from(id),
                        sum: Amount::parse_lenient(&value),
                    };
                    self.apply(edit, out)?;
                }
            }
        }
        Ok(self.tree)
    }

    fn apply<W: Write>(&mut self, edit: Edit, out: &mut W) -> Result<()> {
        let message = confirmation(&edit);
        match self.tree.apply(edit) {
            Ok(applied) if applied.changed() => {
                self.tree = applied.into_tree();
                writeln!(out, "{message}")?;
                self.show(out)?;
            }
            Ok(_) => writeln!(out, "Nothing changed, check the id and the kind of node it names")?,
            Err(e) => writeln!(out, "{e}")?,
        }
        Ok(())
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "{}",
            view::render(self.tree.root(), &self.view, self.format)
        )?;
        Ok(())
    }
}

fn join_or(words: Vec<String>, default: &str) -> String {
    if words.is_empty() {
        default.to_string()
    } else {
        words.join(" ")
    }
}
