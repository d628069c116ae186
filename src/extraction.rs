use serde::Serialize;
use reqwest::Client;
use tracing::{debug, warn};
use crate::error::{AppError, Result};

pub const FIRECRAWL_SCRAPE_URL: &str = "https://api.firecrawl.dev/v1/scrape";

/// Substituted when the extraction service returns no usable markdown.
pub const FALLBACK_MARKDOWN: &str =
    "# Error\nCould not retrieve content from Firecrawl. Please check the URL or API Quota.";

/// Structural tags the service is asked to keep.
const INCLUDE_TAGS: [&str; 6] = ["article", "main", "h1", "p", "ul", "ol"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    only_main_content: bool,
    include_tags: [&'static str; 6],
}

/// Main-content markdown for a page, as an AI-aware crawler would ingest it.
#[derive(Debug, Clone, PartialEq)]
pub struct CondensedContent {
    pub markdown: String,
    pub bytes: usize,
    /// Set when [`FALLBACK_MARKDOWN`] stands in for the service output.
    pub degraded: bool,
}

impl CondensedContent {
    pub fn new(markdown: String) -> Self {
        let bytes = markdown.len();
        Self { markdown, bytes, degraded: false }
    }

    pub fn fallback() -> Self {
        Self {
            markdown: FALLBACK_MARKDOWN.to_string(),
            bytes: FALLBACK_MARKDOWN.len(),
            degraded: true,
        }
    }
}

#[derive(Clone)]
pub struct ExtractionClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl ExtractionClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
            endpoint: FIRECRAWL_SCRAPE_URL.to_string(),
        }
    }

    /// Points the client at another scrape endpoint, e.g. a local mock.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn ensure_configured(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::ConfigError("Server Configuration Error: Missing API Key".to_string())
        })
    }

    /// Asks the service for condensed markdown of `url`.
    ///
    /// Only a transport failure is an error. Any response without
    /// `data.markdown` degrades to [`CondensedContent::fallback`].
    pub async fn extract(&self, url: &str) -> Result<CondensedContent> {
        let api_key = self.ensure_configured()?;

        let body = ScrapeRequest {
            url,
            formats: ["markdown"],
            only_main_content: true,
            include_tags: INCLUDE_TAGS,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let json: serde_json::Value = match res.json().await {
            Ok(json) => json,
            Err(e) => {
                warn!(url, %status, error = %e, "extraction response was not JSON, using fallback");
                return Ok(CondensedContent::fallback());
            }
        };

        match json["data"]["markdown"].as_str().filter(|md| !md.is_empty()) {
            Some(markdown) => {
                debug!(url, bytes = markdown.len(), "extraction succeeded");
                Ok(CondensedContent::new(markdown.to_string()))
            }
            None => {
                warn!(url, %status, "extraction response had no markdown, using fallback");
                Ok(CondensedContent::fallback())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, key: Option<&str>) -> ExtractionClient {
        ExtractionClient::new(Client::new(), key.map(str::to_string))
            .with_endpoint(format!("{}/v1/scrape", server.uri()))
    }

    #[test]
    fn test_fallback_has_own_byte_length() {
        let fallback = CondensedContent::fallback();
        assert!(fallback.degraded);
        assert!(fallback.markdown.starts_with("# Error\n"));
        assert_eq!(fallback.bytes, FALLBACK_MARKDOWN.len());
    }

    #[test]
    fn test_empty_key_is_missing() {
        let client = ExtractionClient::new(Client::new(), Some(String::new()));
        assert!(matches!(client.ensure_configured(), Err(AppError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_extract_sends_scrape_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(header("authorization", "Bearer fc-key"))
            .and(body_json(json!({
                "url": "https://example.com/post",
                "formats": ["markdown"],
                "onlyMainContent": true,
                "includeTags": ["article", "main", "h1", "p", "ul", "ol"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "markdown": "# Post\n\nBody" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let condensed = client_for(&mock_server, Some("fc-key"))
            .extract("https://example.com/post")
            .await
            .unwrap();

        assert_eq!(condensed, CondensedContent::new("# Post\n\nBody".to_string()));
        assert_eq!(condensed.bytes, 12);
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server, None)
            .extract("https://example.com")
            .await;

        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_empty_response_degrades() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        let condensed = client_for(&mock_server, Some("fc-key"))
            .extract("https://example.com")
            .await
            .unwrap();

        assert_eq!(condensed, CondensedContent::fallback());
    }

    #[tokio::test]
    async fn test_malformed_json_degrades() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&mock_server)
            .await;

        let condensed = client_for(&mock_server, Some("fc-key"))
            .extract("https://example.com")
            .await
            .unwrap();

        assert!(condensed.degraded);
    }

    #[tokio::test]
    async fn test_quota_error_degrades() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "success": false,
                "error": "Insufficient credits"
            })))
            .mount(&mock_server)
            .await;

        let condensed = client_for(&mock_server, Some("fc-key"))
            .extract("https://example.com")
            .await
            .unwrap();

        assert_eq!(condensed.markdown, FALLBACK_MARKDOWN);
    }
}
