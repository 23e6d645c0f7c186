use crate::config::CloudConfig;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;

/// Failure classes for a single variable fetch. The batch recovers from
/// every one of them; nothing here aborts a poll cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure, including the per-request timeout.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The cloud answered with a non-success status; the body usually
    /// carries a JSON error description.
    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response parsed as JSON but had no numeric `result` field.
    #[error("response had no numeric `result` field")]
    MissingResult,
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_timeout())
    }
}

/// Fetches one named variable from the device, with the configured
/// timeout applied to this request alone.
pub async fn fetch_one(
    client: &Client,
    config: &CloudConfig,
    device: &str,
    token: &str,
    name: &str,
) -> Result<f64, FetchError> {
    let url = format!("{}/{}/{}", config.api_url, device, name);
    let resp = client
        .get(&url)
        .query(&[("access_token", token)])
        .timeout(config.fetch_timeout)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await?;
        return Err(FetchError::Status { status, body });
    }

    let value: Value = resp.json().await?;
    value
        .get("result")
        .and_then(Value::as_f64)
        .ok_or(FetchError::MissingResult)
}

/// Fetches every named variable once, in the caller's order. A failed
/// fetch is logged and recorded as `None`; the batch always completes
/// with exactly one entry per requested name.
pub async fn fetch_many(
    client: &Client,
    config: &CloudConfig,
    device: &str,
    token: &str,
    names: &[String],
) -> HashMap<String, Option<f64>> {
    let mut results = HashMap::with_capacity(names.len());
    for name in names {
        let value = match fetch_one(client, config, device, token, name).await {
            Ok(v) => Some(v),
            Err(err @ FetchError::Status { .. }) => {
                error!("HTTP error fetching {name}: {err}");
                None
            }
            Err(err) => {
                error!("error fetching {name}: {err:?}");
                None
            }
        };
        results.insert(name.clone(), value);
    }
    results
}
