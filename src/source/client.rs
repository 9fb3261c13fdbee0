//! HTTP client for list and detail endpoints

use crate::config::ApiConfig;
use crate::source::records::{json_type, Record};
use crate::source::retry::{retry, RetryPolicy};
use crate::source::Kind;
use crate::{IngestError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Builds the HTTP client used for API requests
///
/// Certificate verification is only disabled when `accept_invalid_certs` is
/// set, and only for the returned client.
///
/// # Example
///
/// ```no_run
/// use metart_mirror::config::ApiConfig;
/// use metart_mirror::source::build_http_client;
///
/// let client = build_http_client(&ApiConfig::default(), false).unwrap();
/// ```
pub fn build_http_client(
    config: &ApiConfig,
    accept_invalid_certs: bool,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(accept_invalid_certs || config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for one site's content API
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SourceClient {
    /// Creates a client for the given base URL (no trailing slash)
    pub fn new(http: Client, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Total item count reported by the first list page
    pub async fn list_count(&self, kind: Kind) -> Result<i64> {
        let url = self.url(&kind.list_path(1));
        let body = self.get_json(&url).await?;
        let response = Record::from_value(format!("{} list", kind), body)?;

        match response.field("total")? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| IngestError::invalid("total", format!("not an integer: {}", n))),
            other => Err(IngestError::invalid(
                "total",
                format!("expected a number, got {}", json_type(other)),
            )),
        }
    }

    /// Summary records on one list page, in API order
    pub async fn list_page(&self, kind: Kind, page: u32) -> Result<Vec<Record>> {
        let url = self.url(&kind.list_path(page));
        let body = self.get_json(&url).await?;
        let response = Record::from_value(format!("{} list", kind), body)?;
        response.records(kind.collection_field())
    }

    /// Full detail record for one item
    pub async fn detail(&self, kind: Kind, slug: &str, date: Option<&str>) -> Result<Record> {
        let url = self.url(&kind.detail_path(slug, date));
        let body = self.get_json(&url).await?;
        Record::from_value(format!("{} detail", kind), body)
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Fetches and parses a JSON body
    ///
    /// Sending and reading the body are retried per the policy. The status
    /// code is not inspected; whatever came back is parsed.
    async fn get_json(&self, url: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let http = &self.http;
        let body = retry(&self.retry, url, move || async move {
            match http.get(url).send().await {
                Ok(response) => response.bytes().await,
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(|e| IngestError::Transport {
            url: url.to_string(),
            attempts: e.attempts,
            source: e.last,
        })?;

        serde_json::from_slice(&body).map_err(|source| IngestError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
