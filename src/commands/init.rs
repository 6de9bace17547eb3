use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory and an initial `config.json`.
///
/// # Arguments
/// - `report_home` - The directory that will hold the configuration, e.g. `$HOME/report-tree`
/// - `source` - The default source to record: `demo`, a JSON file path or an http(s) URL. When
///   `None` the demo report is used.
///
/// # Errors
/// - Returns an error if a config file already exists, if `source` cannot be parsed or if any
///   file operation fails.
pub async fn init(report_home: &Path, source: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(report_home, source)
        .await
        .context("Unable to create the home directory and config")?;
    Ok(format!(
        "Successfully created the config at {}",
        config.config_path().display()
    )
    .into())
}
