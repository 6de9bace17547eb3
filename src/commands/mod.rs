//! Command handlers for the report CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod edit;
mod export;
mod init;
mod serve;
mod session;
mod show;

use crate::args::SourceArgs;
use crate::model::RawNode;
use crate::source::Source;
use crate::{Config, Edit, Result, Tree};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use edit::edit;
pub use export::export;
pub use init::init;
pub use serve::serve;
pub use session::session;
pub use show::show;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The source named on the command line, or else the one in config.json.
fn resolve_source(config: &Config, args: &SourceArgs) -> Result<Source> {
    match args.source() {
        Some(source) => source.parse().context("Invalid --source"),
        None => config.source(),
    }
}

/// Loads the raw tree from the resolved source.
async fn load_raw(config: &Config, args: &SourceArgs) -> Result<(Source, RawNode)> {
    let source = resolve_source(config, args)?;
    let raw = source
        .load()
        .await
        .with_context(|| format!("Unable to load the report from {source}"))?;
    Ok((source, raw))
}

/// Loads the raw tree from the resolved source and aggregates it.
async fn load_tree(config: &Config, args: &SourceArgs) -> Result<Tree> {
    let (source, raw) = load_raw(config, args).await?;
    let tree = Tree::from_raw(&raw);
    debug!(
        "Loaded {} nodes from {source}, total {}",
        tree.root().node_count(),
        tree.total()
    );
    Ok(tree)
}

/// The confirmation shown once `edit` has been applied.
fn confirmation(edit: &Edit) -> &'static str {
    match edit {
        Edit::AddEntry { .. } => "Entry added!",
        Edit::AddSection { .. } => "Section added!",
        Edit::Delete { .. } => "Item deleted!",
        Edit::Rename { .. } => "Renamed!",
        Edit::SetNote { .. } => "Note updated!",
        Edit::SetSum { .. } => "Sum updated!",
    }
}
