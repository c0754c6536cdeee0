//! Async HTTP client wrapping the urgencias JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use urgencias_core::{
  dataset::AppendReceipt,
  incident::IncidentDraft,
  store::Snapshot,
  summary::Summary,
};

/// Connection settings for the urgencias API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the urgencias JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// `GET /api/summary`
  pub async fn summary(&self) -> Result<Summary> {
    let resp = self
      .client
      .get(self.url("/summary"))
      .send()
      .await
      .context("GET /summary failed")?;
    json_or_error(resp, "GET /summary").await
  }

  /// `GET /api/records`
  pub async fn records(&self) -> Result<Snapshot> {
    let resp = self
      .client
      .get(self.url("/records"))
      .send()
      .await
      .context("GET /records failed")?;
    json_or_error(resp, "GET /records").await
  }

  /// `POST /api/records`
  pub async fn append(&self, draft: &IncidentDraft) -> Result<AppendReceipt> {
    let resp = self
      .client
      .post(self.url("/records"))
      .json(draft)
      .send()
      .await
      .context("POST /records failed")?;
    json_or_error(resp, "POST /records").await
  }

  /// `POST /api/refresh`
  pub async fn refresh(&self) -> Result<()> {
    let resp = self
      .client
      .post(self.url("/refresh"))
      .send()
      .await
      .context("POST /refresh failed")?;
    if !resp.status().is_success() {
      return Err(anyhow!("POST /refresh → {}", resp.status()));
    }
    Ok(())
  }
}

/// Deserialise a success body, or turn the API's `{"error": "..."}` body into
/// an error message.
async fn json_or_error<T: DeserializeOwned>(
  resp: Response,
  what: &str,
) -> Result<T> {
  let status = resp.status();
  if status.is_success() {
    return resp.json().await.with_context(|| format!("deserialising {what}"));
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error")?.as_str().map(str::to_owned))
    .unwrap_or_else(|| status.to_string());
  Err(anyhow!("{what} → {status}: {message}"))
}
