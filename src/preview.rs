//! Bot-specific renderings of condensed content.
//!
//! Each preview simulates how one family of AI consumers would ingest the
//! page: raw markdown, a structured JSON envelope, or HTML annotated with
//! schema.org JSON-LD. Truncation is a plain character slice and the `...`
//! suffix is always appended, even when nothing was cut.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::extraction::CondensedContent;

const SOURCE_LABEL: &str = "Spring AI";
const CONTENT_PREVIEW_CHARS: usize = 500;
const ARTICLE_BODY_CHARS: usize = 200;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewBundle {
    pub gpt: String,
    pub claude: String,
    pub gemini: String,
}

#[derive(Serialize)]
struct StructuredPreview<'a> {
    source: &'static str,
    meta: PreviewMeta<'a>,
    content: String,
}

#[derive(Serialize)]
struct PreviewMeta<'a> {
    url: &'a str,
    generated: String,
    tokens_saved: i64,
}

#[derive(Serialize)]
struct ArticleSchema<'a> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    url: &'a str,
    #[serde(rename = "articleBody")]
    article_body: String,
}

impl PreviewBundle {
    pub fn render(
        condensed: &CondensedContent,
        url: &str,
        tokens_saved: i64,
        generated: DateTime<Utc>,
    ) -> Self {
        PreviewBundle {
            gpt: condensed.markdown.clone(),
            claude: render_structured(&condensed.markdown, url, tokens_saved, generated),
            gemini: render_schema_html(&condensed.markdown, url),
        }
    }
}

fn render_structured(markdown: &str, url: &str, tokens_saved: i64, generated: DateTime<Utc>) -> String {
    let preview = StructuredPreview {
        source: SOURCE_LABEL,
        meta: PreviewMeta {
            url,
            generated: generated.to_rfc3339_opts(SecondsFormat::Millis, true),
            tokens_saved,
        },
        content: format!("{}{}", truncate_chars(markdown, CONTENT_PREVIEW_CHARS), ELLIPSIS),
    };

    to_pretty_json(&preview)
}

fn render_schema_html(markdown: &str, url: &str) -> String {
    let schema = ArticleSchema {
        context: "https://schema.org",
        kind: "Article",
        url,
        article_body: format!("{}{}", truncate_chars(markdown, ARTICLE_BODY_CHARS), ELLIPSIS),
    };
    let schema = to_pretty_json(&schema);
    let body = escape_lt(truncate_chars(markdown, CONTENT_PREVIEW_CHARS));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <script type="application/ld+json">
{schema}
  </script>
</head>
<body>
  <div class="markdown-body">
    {body}{ELLIPSIS}
  </div>
</body>
</html>"#
    )
}

fn to_pretty_json<T: Serialize>(value: &T) -> String {
    // Only string and integer fields, serialization cannot fail
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// First `max_chars` characters of `text`; may cut mid-word.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Escapes `<` only; `&`, `>` and quotes pass through.
fn escape_lt(text: &str) -> String {
    text.replace('<', "&lt;")
}
