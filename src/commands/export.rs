use crate::args::ExportArgs;
use crate::commands::{load_tree, Out};
use crate::view::export_csv;
use crate::{Config, Result};

/// Writes the computed report to stdout as CSV, one record per node.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<()>> {
    let tree = load_tree(&config, args.source()).await?;
    export_csv(tree.root(), std::io::stdout().lock())?;
    Ok(format!("Exported {} nodes", tree.root().node_count()).into())
}
