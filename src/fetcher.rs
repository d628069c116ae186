use reqwest::Client;
use reqwest::header::USER_AGENT;
use scraper::{ElementRef, Html, Selector};
use once_cell::sync::Lazy;
use tracing::debug;
use crate::error::{AppError, Result};

/// Identity presented to target sites, mimicking a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

// Text inside these elements never reaches a reader
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

/// The page exactly as a standard crawler receives it.
#[derive(Debug, Clone)]
pub struct RawContent {
    pub text: String,
    pub bytes: usize,
    /// UTF-8 length of the visible text of the document.
    pub text_bytes: usize,
}

impl RawContent {
    pub fn from_html(text: String) -> Self {
        let bytes = text.len();
        let text_bytes = visible_text(&text).len();
        Self { text, bytes, text_bytes }
    }
}

#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
}

impl ContentFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Single GET; network errors, timeouts and non-2xx statuses all fail the fetch.
    ///
    /// The body is always decoded as UTF-8, whatever charset the server declares.
    pub async fn fetch(&self, url: &str) -> Result<RawContent> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        let html = String::from_utf8_lossy(&body).into_owned();

        // Parsing a large page is CPU-bound, keep it off the async workers
        let raw = tokio::task::spawn_blocking(move || RawContent::from_html(html))
            .await
            .map_err(|e| AppError::FetchError(format!("Failed to measure page text: {}", e)))?;
        debug!(url, bytes = raw.bytes, text_bytes = raw.text_bytes, "fetched raw html");
        Ok(raw)
    }
}

/// Visible text of an HTML document, whitespace-collapsed between text nodes.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());

    collect_text(root)
}

fn collect_text(root: ElementRef<'_>) -> String {
    let mut result = String::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| HIDDEN_TAGS.contains(&el.value().name()));
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(trimmed);
    }

    result
}
