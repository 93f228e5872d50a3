//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! Reads `CommandEnvelope` messages as newline-delimited JSON from stdin and
//! writes one `ResponseEnvelope` line per command to stdout. All tracing
//! output goes to stderr so stdout stays a clean protocol channel.

use std::sync::Arc;

use lookbook::host::handler::HostHandler;
use lookbook::host::stdio::run_stdio_bridge;
use lookbook::lookbook_search::LinkPipeline;
use lookbook::{LookbookConfig, PrefsStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("lookbook=info,lookbook_search=info")
            }),
        )
        .init();

    tracing::info!("lookbook-host starting");

    let config = LookbookConfig::load()
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
    let pipeline = LinkPipeline::from_config(config.links.clone())
        .map_err(|e| anyhow::anyhow!("failed to build link pipeline: {e}"))?;
    let prefs = PrefsStore::new(config.prefs_dir());
    tracing::info!(
        backend = %config.links.backend,
        prefs_dir = %prefs.dir().display(),
        "configuration loaded"
    );

    let handler = HostHandler::new(Arc::new(pipeline), prefs);
    run_stdio_bridge(&handler).await.map_err(|e| {
        tracing::error!(error = %e, "lookbook-host exited with error");
        anyhow::anyhow!("lookbook-host failed: {e}")
    })?;

    tracing::info!("lookbook-host shut down cleanly");
    Ok(())
}
