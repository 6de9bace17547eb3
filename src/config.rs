//! Configuration file handling for report-tree.
//!
//! The configuration file is stored at `$REPORT_TREE_HOME/config.json`. It names the default
//! source of the report, the address of the data endpoint, the names given to new nodes and the
//! way amounts are displayed. When the file does not exist every setting takes its default.

use crate::model::{AmountFormat, DEFAULT_ENTRY_NAME, DEFAULT_SECTION_NAME};
use crate::source::Source;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "report-tree";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFAULT_SOURCE: &str = "demo";
const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$REPORT_TREE_HOME` and from there it loads `$REPORT_TREE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and writes an initial `config.json` into it.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/report-tree`
    /// - `source` - The default report source to record, e.g. `demo`, a file path or a URL. When
    ///   `None`, the built-in demo report is used.
    ///
    /// # Errors
    /// - Returns an error if a config file already exists or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, source: Option<&str>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the report-tree home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!("A config file already exists at '{}'", config_path.display())
        }

        if let Some(source) = source {
            // Fail early rather than writing a config that cannot be used.
            let _: Source = source.parse()?;
        }

        let config_file = ConfigFile {
            source: source.map(str::to_string),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// Loads `$REPORT_TREE_HOME/config.json`. If the file does not exist, a default configuration
    /// is returned and nothing is written.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let root = home.into();
        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            debug!(
                "No config file at '{}', using defaults",
                config_path.display()
            );
            ConfigFile::default()
        };
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The configured default source of the report.
    pub fn source(&self) -> Result<Source> {
        self.config_file
            .source()
            .parse()
            .context("Invalid source in config file")
    }

    /// The address the data endpoint listens on.
    pub fn bind(&self) -> Result<SocketAddr> {
        let bind = self.config_file.bind();
        bind.parse()
            .with_context(|| format!("Invalid bind address '{bind}' in config file"))
    }

    pub fn new_entry_name(&self) -> &str {
        self.config_file.new_entry_name()
    }

    pub fn new_section_name(&self) -> &str {
        self.config_file.new_section_name()
    }

    pub fn amount_format(&self) -> AmountFormat {
        self.config_file.amount_format.unwrap_or_default()
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "report-tree",
///   "config_version": 1,
///   "source": "https://example.com/api/data",
///   "bind": "127.0.0.1:3000",
///   "new_entry_name": "New Entry",
///   "new_section_name": "New Section",
///   "amount_format": { "dollar": true, "commas": true }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "report-tree"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Where the report comes from: `demo`, a JSON file path or an http(s) URL.
    /// Defaults to `demo` if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,

    /// Address of the data endpoint. Defaults to 127.0.0.1:3000 if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_entry_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_section_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount_format: Option<AmountFormat>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            source: None,
            bind: None,
            new_entry_name: None,
            new_section_name: None,
            amount_format: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn new_entry_name(&self) -> &str {
        self.new_entry_name.as_deref().unwrap_or(DEFAULT_ENTRY_NAME)
    }

    pub fn new_section_name(&self) -> &str {
        self.new_section_name
            .as_deref()
            .unwrap_or(DEFAULT_SECTION_NAME)
    }
}
