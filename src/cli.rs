//! Command-line surface shared by both ingesters

use crate::config::{load_credentials, Credentials};
use crate::crawler::{ingest, Catalog, IngestStats};
use clap::Args;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Arguments common to the gallery and model ingesters
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Site name, e.g. "metart" or "metartx"
    #[arg(short = 's', long = "site-name", alias = "site_name", value_name = "SITE")]
    pub site_name: String,

    /// Path to the credentials file (TOML, or JSON with a .json extension)
    #[arg(short = 'i', long = "ini", value_name = "PATH")]
    pub ini: PathBuf,

    /// Skip TLS certificate verification for API requests
    #[arg(long)]
    pub accept_invalid_certs: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Sets up the logging/tracing subscriber based on verbosity level
pub fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("metart_mirror=info,warn"),
            1 => EnvFilter::new("metart_mirror=debug,info"),
            2 => EnvFilter::new("metart_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads credentials and runs `catalog` to completion
///
/// Used as the body of both binaries after argument parsing.
pub async fn run<C: Catalog>(catalog: &C, args: &CommonArgs) -> anyhow::Result<IngestStats> {
    setup_logging(args.verbose, args.quiet);

    tracing::info!("Loading credentials from: {}", args.ini.display());
    let credentials: Credentials = match load_credentials(&args.ini, &args.site_name) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!("Failed to load credentials: {}", e);
            return Err(e.into());
        }
    };

    if args.accept_invalid_certs || credentials.api.accept_invalid_certs {
        tracing::warn!("TLS certificate verification is disabled for API requests");
    }

    match ingest(catalog, &credentials, &args.site_name, args.accept_invalid_certs).await {
        Ok(stats) => {
            tracing::info!("Ingest of {} completed successfully", args.site_name);
            Ok(stats)
        }
        Err(e) => {
            tracing::error!("Ingest of {} failed: {}", args.site_name, e);
            Err(e.into())
        }
    }
}
