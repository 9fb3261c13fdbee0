//! Model ingester
//!
//! Re-fetches and re-writes every model of a site on each run.

use clap::Parser;
use metart_mirror::cli::{run, CommonArgs};
use metart_mirror::ModelCatalog;

/// Mirror a site's models into the destination store
#[derive(Parser, Debug)]
#[command(name = "model-ingest")]
#[command(version)]
#[command(about = "Mirror a site's models", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(&ModelCatalog, &cli.common).await?;
    Ok(())
}
