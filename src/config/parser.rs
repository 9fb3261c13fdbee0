use crate::config::types::Credentials;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads, parses and validates a credentials file for the given site
///
/// Files ending in `.json` are read as JSON; everything else is read as TOML.
///
/// # Arguments
///
/// * `path` - Path to the credentials file
/// * `site_name` - Site the credentials will be used against
///
/// # Returns
///
/// * `Ok(Credentials)` - Successfully loaded and validated credentials
/// * `Err(ConfigError)` - Failed to load, parse, or validate the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use metart_mirror::config::load_credentials;
///
/// let credentials = load_credentials(Path::new("secrets/secret.toml"), "metart").unwrap();
/// println!("Destination host: {}", credentials.mysql.host);
/// ```
pub fn load_credentials(path: &Path, site_name: &str) -> Result<Credentials, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let credentials = if is_json(path) {
        parse_json(&content)?
    } else {
        parse_toml(&content)?
    };

    validate(&credentials, site_name)?;

    Ok(credentials)
}

/// Parses credentials from TOML text
pub fn parse_toml(content: &str) -> Result<Credentials, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Parses credentials from JSON text
pub fn parse_json(content: &str) -> Result<Credentials, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
