use serde::Deserialize;
use std::path::PathBuf;

/// Contents of the credentials file passed with `--ini`
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub mysql: DatabaseConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Credentials {
    /// Location of the SQLite file when the store backend is `sqlite`
    pub fn store_path(&self) -> PathBuf {
        match &self.store.path {
            Some(path) => path.clone(),
            None => PathBuf::from(format!("{}.sqlite3", self.mysql.database)),
        }
    }
}

/// Destination database credentials (the `mysql` section)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub username: String,
    pub password: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Destination store selection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path to the SQLite database file; only used by the `sqlite` backend
    pub path: Option<PathBuf>,
}

/// Which database receives the mirrored rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The server named in the `mysql` section
    #[default]
    Mysql,
    /// A local SQLite file
    Sqlite,
}

/// Remote API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL; `{site}` is replaced with the site name
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Disables TLS certificate verification for the API client only
    #[serde(rename = "accept-invalid-certs", default)]
    pub accept_invalid_certs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

impl ApiConfig {
    /// Base URL for a site, without a trailing slash
    pub fn site_base_url(&self, site_name: &str) -> String {
        self.base_url
            .replace("{site}", site_name)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Retry behavior for transport failures
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// 0 means retry forever
    #[serde(rename = "max-attempts", default)]
    pub max_attempts: u32,

    #[serde(rename = "delay-secs", default = "default_delay_secs")]
    pub delay_secs: u64,

    /// 1 keeps the delay fixed
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,

    #[serde(rename = "max-delay-secs", default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            delay_secs: default_delay_secs(),
            multiplier: default_multiplier(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

fn default_port() -> u16 {
    3306
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_database() -> String {
    "metart".to_string()
}

fn default_base_url() -> String {
    "https://www.{site}.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_delay_secs() -> u64 {
    10
}

fn default_multiplier() -> u32 {
    1
}

fn default_max_delay_secs() -> u64 {
    300
}
