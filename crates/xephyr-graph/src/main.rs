//! xephyr-graph CLI binary.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use xephyr_graph::cli::Cli;

/// Main entry point for the xephyr-graph CLI.
///
/// Uses tokio's current_thread runtime: every command is one snapshot load
/// followed by a synchronous engine computation.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=xephyr_graph=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xephyr_graph=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting xephyr-graph CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("xephyr-graph CLI completed successfully");
    Ok(())
}
