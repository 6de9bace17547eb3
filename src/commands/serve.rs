use crate::args::ServeArgs;
use crate::commands::{resolve_source, Out};
use crate::server::DataServer;
use crate::{Config, Result};
use anyhow::Context;
use tracing::info;

/// Serves the raw report from the resolved source until Ctrl-C is received.
pub async fn serve(config: Config, args: ServeArgs) -> Result<Out<()>> {
    let source = resolve_source(&config, args.source())?;
    let raw = source
        .load()
        .await
        .with_context(|| format!("Unable to load the report from {source}"))?;
    let bind = match args.bind() {
        Some(bind) => bind,
        None => config.bind()?,
    };

    let server = DataServer::bind(bind, &raw).await?;
    tokio::select! {
        result = server.run() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Unable to listen for Ctrl-C")?;
            info!("Received Ctrl-C, shutting down");
        }
    }
    Ok("Server stopped".into())
}
