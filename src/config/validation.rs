use crate::config::types::{
    ApiConfig, Credentials, DatabaseConfig, RetryConfig, StoreBackend, StoreConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the credentials file against the site it will be used for
pub fn validate(credentials: &Credentials, site_name: &str) -> Result<(), ConfigError> {
    validate_site_name(site_name)?;
    validate_database_config(&credentials.mysql)?;
    validate_store_config(&credentials.store)?;
    validate_api_config(&credentials.api, site_name)?;
    validate_retry_config(&credentials.retry)?;
    Ok(())
}

/// Site names end up inside table names, so only a narrow alphabet is allowed
pub fn validate_site_name(site_name: &str) -> Result<(), ConfigError> {
    if site_name.is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    if !site_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "site name must contain only ASCII alphanumerics, '-' or '_', got '{}'",
            site_name
        )));
    }

    Ok(())
}

fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation("mysql.host cannot be empty".to_string()));
    }

    if config.username.trim().is_empty() {
        return Err(ConfigError::Validation(
            "mysql.username cannot be empty".to_string(),
        ));
    }

    if config.database.trim().is_empty() {
        return Err(ConfigError::Validation(
            "mysql.database cannot be empty".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "mysql.connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.backend == StoreBackend::Mysql && config.path.is_some() {
        return Err(ConfigError::Validation(
            "store.path is only used with store.backend = \"sqlite\"".to_string(),
        ));
    }

    Ok(())
}

fn validate_api_config(config: &ApiConfig, site_name: &str) -> Result<(), ConfigError> {
    let base = config.site_base_url(site_name);
    let url = Url::parse(&base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", base, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use http or https",
            base
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "api.timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.multiplier < 1 {
        return Err(ConfigError::Validation(format!(
            "retry.multiplier must be >= 1, got {}",
            config.multiplier
        )));
    }

    if config.max_delay_secs < config.delay_secs {
        return Err(ConfigError::Validation(format!(
            "retry.max-delay-secs ({}) must be >= retry.delay-secs ({})",
            config.max_delay_secs, config.delay_secs
        )));
    }

    Ok(())
}
