use crate::config::Settings;
use crate::ingest::retry::{RetryPolicy, Sleeper, TokioSleeper};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://open-api-v4.coinglass.com";
const RHODL_PATH: &str = "/api/index/bitcoin-rhodl-ratio";
const CLIENT_USER_AGENT: &str = "rhodl-fetch/1.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[async_trait::async_trait]
pub trait RhodlSource: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Raw JSON document of the full RHODL history.
    async fn fetch_rhodl(&self) -> Result<Value>;
}

pub struct CoinglassClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl CoinglassClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .coinglass_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = Duration::from_secs(
            settings
                .coinglass_timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let mut retry = RetryPolicy::default();
        if let Some(n) = settings.coinglass_retries {
            retry.max_attempts = n;
        }

        Self::new(&settings.coinglass_api_key, base_url, timeout, retry)
    }

    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build CoinGlass http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.to_string(),
            retry,
            sleeper: Box::new(TokioSleeper),
        })
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), RHODL_PATH)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("CG-API-KEY", HeaderValue::from_str(&self.api_key)?);
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        Ok(headers)
    }

    async fn fetch_once(&self) -> Result<Value> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .send()
            .await
            .context("CoinGlass request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read CoinGlass response")?;
        if !status.is_success() {
            anyhow::bail!("CoinGlass HTTP {status}: {text}");
        }

        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("CoinGlass response is not valid JSON: {text}"))
    }
}

#[async_trait::async_trait]
impl RhodlSource for CoinglassClient {
    fn provider_name(&self) -> &'static str {
        "coinglass"
    }

    async fn fetch_rhodl(&self) -> Result<Value> {
        let doc = self
            .retry
            .run(self.sleeper.as_ref(), |_| self.fetch_once())
            .await?;
        Ok(doc)
    }
}
