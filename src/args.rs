//! These structs provide the CLI interface for the report CLI.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// report: view and edit a hierarchical financial report.
///
/// A report is a tree of sections and entries. Every entry carries an amount and every section
/// shows the total of everything beneath it. Edits made through this program keep each of those
/// totals correct, all the way up to the report's grand total.
///
/// The report is read from a source: `demo` for a built-in example, a path to a JSON file, or an
/// http(s) URL such as the `/api/data` endpoint started by `report serve`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and write an initial config.json.
    ///
    /// Running this is optional: without a config file every setting takes its default and the
    /// built-in demo report is used.
    Init(InitArgs),
    /// Print the report as an indented outline with section totals.
    Show(ShowArgs),
    /// Apply one edit to the report and print the resulting tree as JSON.
    ///
    /// The source itself is never modified. Save the output to a file and use that file as the
    /// source to keep working on the edited report.
    Edit(EditArgs),
    /// Print every node of the report as CSV.
    Export(ExportArgs),
    /// Serve the report as JSON at /api/data.
    Serve(ServeArgs),
    /// Edit the report interactively, one command per line.
    Session(SessionArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration is held. Defaults to ~/report-tree
    #[arg(long, env = "REPORT_TREE_HOME", default_value_t = default_report_home())]
    report_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, report_home: PathBuf) -> Self {
        Self {
            log_level,
            report_home: report_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn report_home(&self) -> &DisplayPath {
        &self.report_home
    }
}

/// Selects the report to work on.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct SourceArgs {
    /// Where to read the report from: `demo`, a JSON file or an http(s) URL. Defaults to the
    /// source in config.json, or `demo`.
    #[arg(long)]
    source: Option<String>,
}

impl SourceArgs {
    pub fn new(source: Option<String>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// (Not shown): Args for the `report init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The default source to record in config.json.
    #[arg(long)]
    source: Option<String>,
}

impl InitArgs {
    pub fn new(source: Option<String>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// (Not shown): Args for the `report show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    #[clap(flatten)]
    source: SourceArgs,

    /// Hide the children of the section with this id. Can be given more than once.
    #[arg(long)]
    collapse: Vec<String>,

    /// Print the computed tree as JSON instead of an outline.
    #[arg(long)]
    json: bool,
}

impl ShowArgs {
    pub fn new(source: SourceArgs, collapse: Vec<String>, json: bool) -> Self {
        Self {
            source,
            collapse,
            json,
        }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }

    pub fn collapse(&self) -> &[String] {
        &self.collapse
    }

    pub fn json(&self) -> bool {
        self.json
    }
}

/// (Not shown): Args for the `report edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    #[clap(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    edit: EditSubcommand,
}

impl EditArgs {
    pub fn new(source: SourceArgs, edit: EditSubcommand) -> Self {
        Self { source, edit }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }

    pub fn edit(&self) -> &EditSubcommand {
        &self.edit
    }
}

/// The edits that `report edit` can apply. Ids are the ones printed by `report show`, so every
/// node of the source must carry an id, as the demo report and `show --json` output do.
#[derive(Subcommand, Debug, Clone)]
pub enum EditSubcommand {
    /// Add an entry as the last child of a section.
    AddEntry {
        /// The id of the section that receives the entry.
        #[arg(long)]
        parent: String,
        /// Defaults to the new_entry_name setting.
        #[arg(long)]
        name: Option<String>,
        /// The entry's amount. Text that is not a number gives an invalid (NaN) amount.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        sum: String,
    },
    /// Add an empty section as the last child of a section.
    AddSection {
        /// The id of the section that receives the new section.
        #[arg(long)]
        parent: String,
        /// Defaults to the new_section_name setting.
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a node and everything beneath it. The root cannot be deleted.
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Rename a section or an entry.
    Rename {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Replace the note of an entry.
    SetNote {
        #[arg(long)]
        id: String,
        #[arg(long)]
        note: String,
    },
    /// Replace the amount of an entry.
    SetSum {
        #[arg(long)]
        id: String,
        /// Text that is not a number gives an invalid (NaN) amount.
        #[arg(long, allow_hyphen_values = true)]
        sum: String,
    },
}

/// (Not shown): Args for the `report export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    source: SourceArgs,
}

impl ExportArgs {
    pub fn new(source: SourceArgs) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }
}

/// (Not shown): Args for the `report serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    #[clap(flatten)]
    source: SourceArgs,

    /// The address to listen on. Defaults to the bind setting, or 127.0.0.1:3000.
    #[arg(long)]
    bind: Option<SocketAddr>,
}

impl ServeArgs {
    pub fn new(source: SourceArgs, bind: Option<SocketAddr>) -> Self {
        Self { source, bind }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }

    pub fn bind(&self) -> Option<SocketAddr> {
        self.bind
    }
}

/// (Not shown): Args for the `report session` command.
#[derive(Debug, Parser, Clone)]
pub struct SessionArgs {
    #[clap(flatten)]
    source: SourceArgs,
}

impl SessionArgs {
    pub fn new(source: SourceArgs) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }
}

fn default_report_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("report-tree"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --report-home or REPORT_TREE_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("report-tree")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
