//! Pass-through client for the third-party event statistics service.
//!
//! Forwards `{"event_id": ...}` to a configured upstream and hands back its
//! JSON unchanged. Transport failures are retried with backoff; upstream
//! status codes are never retried and are surfaced as-is.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Errors from the statistics proxy.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("event_id is required in the body")]
    MissingEventId,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}")]
    Upstream { status: u16, body: Value },

    #[error("Upstream returned invalid JSON: {0}")]
    InvalidResponse(String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

/// Retry policy for transport failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 250,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis((self.initial_delay_ms as f64 * factor) as u64)
    }
}

/// Configuration for the statistics client.
#[derive(Debug, Clone)]
pub struct StatsClientConfig {
    pub upstream_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl Default for StatsClientConfig {
    fn default() -> Self {
        Self {
            upstream_url: "http://localhost:8000/event".to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            user_agent: format!("lineup-builder/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Check that a request body carries a usable `event_id`.
///
/// Accepts a non-empty string or a non-zero number; returns the value to forward.
pub fn extract_event_id(body: &Value) -> Result<Value, StatsError> {
    match body.get("event_id") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(Value::String(s.trim().to_string())),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Ok(Value::Number(n.clone())),
        _ => Err(StatsError::MissingEventId),
    }
}

pub struct StatsClient {
    client: Client,
    upstream: Url,
    retry: RetryPolicy,
}

impl StatsClient {
    pub fn new(config: StatsClientConfig) -> Result<Self, StatsError> {
        let upstream = Url::parse(&config.upstream_url)
            .map_err(|e| StatsError::InvalidUrl(format!("{}: {}", config.upstream_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("lineup-builder")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            upstream,
            retry: config.retry,
        })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// Look up an event upstream, retrying only on transport failures.
    pub async fn lookup_event(&self, event_id: &Value) -> Result<Value, StatsError> {
        let mut attempt = 0;
        loop {
            match self.forward(event_id).await {
                Err(StatsError::Http(e))
                    if (e.is_connect() || e.is_timeout()) && attempt < self.retry.max_retries =>
                {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Stats upstream {} failed ({}), retry {}/{} in {:?}",
                        self.upstream, e, attempt, self.retry.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn forward(&self, event_id: &Value) -> Result<Value, StatsError> {
        debug!("Forwarding event {} to {}", event_id, self.upstream);

        let response = self
            .client
            .post(self.upstream.clone())
            .json(&json!({ "event_id": event_id }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(StatsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        info!("Stats upstream answered {} for event {}", status, event_id);
        serde_json::from_str(&text).map_err(|e| StatsError::InvalidResponse(e.to_string()))
    }
}

impl StatsError {
    /// HTTP status a proxy should answer with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            StatsError::MissingEventId => StatusCode::BAD_REQUEST,
            StatsError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            StatsError::Http(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            StatsError::Http(_) | StatsError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            StatsError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
