//! Gallery/movie ingester
//!
//! Mirrors every movie and gallery of a site, plus the models credited on
//! each, skipping items already present in the store.

use clap::Parser;
use metart_mirror::cli::{run, CommonArgs};
use metart_mirror::GalleryCatalog;

/// Mirror a site's movies and galleries into the destination store
#[derive(Parser, Debug)]
#[command(name = "gallery-ingest")]
#[command(version)]
#[command(about = "Mirror a site's movies and galleries", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(&GalleryCatalog, &cli.common).await?;
    Ok(())
}
