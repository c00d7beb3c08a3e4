use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::QuoteConfig;

/// Upstream market-data provider. Behind a trait so tests substitute a fake.
#[async_trait]
pub trait QuoteClient: Send + Sync {
    /// Current price snapshot for a ticker.
    async fn quote(&self, ticker: &str) -> anyhow::Result<Value>;
    /// Company profile for a ticker.
    async fn company_profile(&self, ticker: &str) -> anyhow::Result<Value>;
}

/// Finnhub-style REST client. Each call is a fresh upstream request with a
/// bounded timeout; no caching, no retry.
pub struct FinnhubClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(config: &QuoteConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build quote http client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json(&self, path: &str, ticker: &str) -> anyhow::Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(&[("symbol", ticker), ("token", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;
        let response = response
            .error_for_status()
            .with_context(|| format!("{path} returned an error status"))?;
        let body = response
            .json::<Value>()
            .await
            .with_context(|| format!("{path} returned invalid json"))?;
        Ok(body)
    }
}

#[async_trait]
impl QuoteClient for FinnhubClient {
    async fn quote(&self, ticker: &str) -> anyhow::Result<Value> {
        self.get_json("quote", ticker).await
    }

    async fn company_profile(&self, ticker: &str) -> anyhow::Result<Value> {
        self.get_json("stock/profile2", ticker).await
    }
}
