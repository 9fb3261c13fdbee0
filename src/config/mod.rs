//! Credentials-file handling
//!
//! This module loads, parses and validates the credentials file given on the
//! command line. The file carries the destination database section plus
//! optional store, API and retry settings.
//!
//! # Example
//!
//! ```no_run
//! use metart_mirror::config::load_credentials;
//! use std::path::Path;
//!
//! let credentials = load_credentials(Path::new("secret.toml"), "metart").unwrap();
//! println!("Store file: {}", credentials.store_path().display());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    ApiConfig, Credentials, DatabaseConfig, RetryConfig, StoreBackend, StoreConfig,
};

pub use parser::{load_credentials, parse_json, parse_toml};
pub use validation::validate_site_name;
