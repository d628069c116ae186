//! The analysis pipeline: one URL in, one [`AnalysisResult`] out.
//!
//! Raw HTML and condensed markdown are fetched concurrently. A failed raw
//! fetch fails the whole analysis; a failed extraction only degrades the
//! condensed side to fallback content.

use chrono::Utc;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extraction::ExtractionClient;
use crate::fetcher::ContentFetcher;
use crate::metrics::Metrics;
use crate::preview::PreviewBundle;

/// A URL accepted for analysis, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    url: String,
}

impl AnalysisRequest {
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = || AppError::ValidationError("Invalid URL".to_string());

        // `Url::parse` quietly drops surrounding whitespace and embedded tabs or newlines
        if !url.starts_with("http") || url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid());
        }
        let parsed = Url::parse(url).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid());
        }

        Ok(Self { url: url.to_string() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub metrics: Metrics,
    pub previews: PreviewBundle,
}

pub struct Analyzer {
    fetcher: ContentFetcher,
    extractor: ExtractionClient,
}

impl Analyzer {
    pub fn new(fetcher: ContentFetcher, extractor: ExtractionClient) -> Self {
        Self { fetcher, extractor }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_client(config.outbound_timeout)?;
        Ok(Self::new(
            ContentFetcher::new(client.clone()),
            ExtractionClient::new(client, config.firecrawl_api_key.clone()),
        ))
    }

    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult> {
        let request = AnalysisRequest::parse(url)?;
        // Fail before any network I/O when the credential is missing
        self.extractor.ensure_configured()?;

        let (raw, condensed) = tokio::try_join!(
            self.fetcher.fetch(request.url()),
            self.extractor.extract(request.url()),
        )?;

        if condensed.degraded {
            warn!(url = request.url(), "extraction degraded, reporting fallback content");
        }

        let metrics = Metrics::calculate(&raw, &condensed);
        debug!(
            html_bytes = metrics.html_bytes,
            md_bytes = metrics.md_bytes,
            reduction = metrics.reduction_pct,
            "computed metrics"
        );
        let previews = PreviewBundle::render(&condensed, request.url(), metrics.tokens_saved, Utc::now());

        Ok(AnalysisResult {
            success: true,
            metrics,
            previews,
        })
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}
