//! Comparative size and cost figures for raw HTML versus condensed markdown.

use serde::{Serialize, Serializer};

use crate::extraction::CondensedContent;
use crate::fetcher::RawContent;

/// Heuristic: one token per four bytes.
const BYTES_PER_TOKEN: f64 = 4.0;
const COST_PER_1K_TOKENS: f64 = 0.0025;
/// Costs are reported per thousand requests.
const REQUESTS_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    #[serde(rename = "html_size", serialize_with = "fixed_2")]
    pub html_size_kb: f64,
    #[serde(rename = "md_size", serialize_with = "fixed_2")]
    pub md_size_kb: f64,
    #[serde(rename = "reduction", serialize_with = "fixed_1")]
    pub reduction_pct: f64,
    #[serde(serialize_with = "fixed_2")]
    pub cost_before: f64,
    #[serde(serialize_with = "fixed_2")]
    pub cost_after: f64,
    pub html_bytes: usize,
    pub md_bytes: usize,
    pub tokens_saved: i64,
    #[serde(serialize_with = "fixed_1")]
    pub multiplier: f64,
    #[serde(serialize_with = "fixed_1")]
    pub text_density: f64,
}

impl Metrics {
    pub fn calculate(raw: &RawContent, condensed: &CondensedContent) -> Self {
        let html = raw.bytes as f64;
        let md = condensed.bytes as f64;

        // An empty page has nothing to reduce
        let reduction_pct = if raw.bytes == 0 {
            0.0
        } else {
            (html - md) / html * 100.0
        };

        let multiplier = if condensed.bytes == 0 { 0.0 } else { html / md };

        let text_density = if raw.bytes == 0 {
            0.0
        } else {
            raw.text_bytes as f64 / html * 100.0
        };

        Metrics {
            html_size_kb: html / 1024.0,
            md_size_kb: md / 1024.0,
            reduction_pct,
            cost_before: estimate_cost(raw.bytes),
            cost_after: estimate_cost(condensed.bytes),
            html_bytes: raw.bytes,
            md_bytes: condensed.bytes,
            tokens_saved: round_half_up((html - md) / BYTES_PER_TOKEN),
            multiplier,
            text_density,
        }
    }
}

/// Inference cost per thousand requests for a payload of `bytes`.
pub fn estimate_cost(bytes: usize) -> f64 {
    (bytes as f64 / BYTES_PER_TOKEN / 1000.0) * COST_PER_1K_TOKENS * REQUESTS_SCALE
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Fixed-point formatting with exact ties rounded away from zero.
///
/// `format!` rounds ties to even, so `0.125` would print as `0.12`. A tie is
/// decided on the exact decimal expansion of the double, never on a scaled copy.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if is_exact_tie(value, digits) {
        // An exact tie scales without rounding error, so `round` is safe here
        let scale = 10f64.powi(digits as i32);
        return format!("{:.*}", digits, (value * scale).round() / scale);
    }
    format!("{:.*}", digits, value)
}

// Every finite f64 has fewer than 1100 fractional decimal digits
const EXACT_DIGITS: usize = 1100;

fn is_exact_tie(value: f64, digits: usize) -> bool {
    if !value.is_finite() {
        return false;
    }
    let exact = format!("{:.*}", EXACT_DIGITS, value);
    let Some((_, fraction)) = exact.split_once('.') else {
        return false;
    };
    let rest = &fraction[digits..];
    rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0')
}

fn fixed_1<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_fixed(*value, 1))
}

fn fixed_2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_fixed(*value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(bytes: usize) -> RawContent {
        RawContent::from_html("x".repeat(bytes))
    }

    fn condensed(bytes: usize) -> CondensedContent {
        CondensedContent::new("m".repeat(bytes))
    }

    #[test]
    fn test_quarter_size_report() {
        let metrics = Metrics::calculate(&raw(1024), &condensed(256));
        let value = serde_json::to_value(&metrics).unwrap();

        assert_eq!(value["html_size"], json!("1.00"));
        assert_eq!(value["md_size"], json!("0.25"));
        assert_eq!(value["reduction"], json!("75.0"));
        assert_eq!(value["cost_before"], json!("0.64"));
        assert_eq!(value["cost_after"], json!("0.16"));
        assert_eq!(value["tokens_saved"], json!(192));
        assert_eq!(value["multiplier"], json!("4.0"));
    }

    #[test]
    fn test_equal_sizes_have_no_reduction() {
        let metrics = Metrics::calculate(&raw(500), &condensed(500));
        assert_eq!(metrics.reduction_pct, 0.0);
        assert_eq!(metrics.tokens_saved, 0);
        assert_eq!(metrics.multiplier, 1.0);
    }

    #[test]
    fn test_empty_raw_content_is_guarded() {
        let metrics = Metrics::calculate(&raw(0), &condensed(100));
        assert_eq!(metrics.reduction_pct, 0.0);
        assert_eq!(metrics.text_density, 0.0);
        assert_eq!(metrics.cost_before, 0.0);
        assert!(metrics.reduction_pct.is_finite());
    }

    #[test]
    fn test_empty_condensed_content_is_guarded() {
        let metrics = Metrics::calculate(&raw(100), &condensed(0));
        assert_eq!(metrics.multiplier, 0.0);
        assert_eq!(metrics.reduction_pct, 100.0);
    }

    #[test]
    fn test_growth_gives_negative_reduction() {
        let metrics = Metrics::calculate(&raw(100), &condensed(150));
        assert_eq!(to_fixed(metrics.reduction_pct, 1), "-50.0");
        assert_eq!(metrics.tokens_saved, -12);
    }

    #[test]
    fn test_reduction_formula() {
        let metrics = Metrics::calculate(&raw(3000), &condensed(1000));
        let expected = (3000.0 - 1000.0) / 3000.0 * 100.0;
        assert_eq!(metrics.reduction_pct, expected);
        assert_eq!(to_fixed(metrics.reduction_pct, 1), "66.7");
    }

    #[test]
    fn test_text_density() {
        let raw = RawContent::from_html("<html><body><p>abcd</p></body></html>".to_string());
        let metrics = Metrics::calculate(&raw, &condensed(1));
        assert_eq!(metrics.text_density, 4.0 / raw.bytes as f64 * 100.0);
    }

    #[test]
    fn test_estimate_cost() {
        assert_eq!(to_fixed(estimate_cost(4000), 2), "2.50");
        assert_eq!(estimate_cost(0), 0.0);
    }

    #[test]
    fn test_to_fixed_rounds_ties_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(0.25, 1), "0.3");
        assert_eq!(to_fixed(-0.25, 1), "-0.3");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(75.0, 1), "75.0");
    }

    #[test]
    fn test_to_fixed_uses_exact_value_near_ties() {
        // 0.045 and 0.075 are stored just below the tie
        assert_eq!(to_fixed(estimate_cost(72), 2), "0.04");
        assert_eq!(to_fixed(estimate_cost(120), 2), "0.07");

        let metrics = Metrics::calculate(&raw(2000), &condensed(39));
        assert_eq!(to_fixed(metrics.reduction_pct, 1), "98.0");
        assert_eq!(to_fixed(0.045, 2), "0.04");
    }

    #[test]
    fn test_to_fixed_non_finite() {
        assert_eq!(to_fixed(f64::NAN, 2), "NaN");
        assert_eq!(to_fixed(f64::INFINITY, 1), "inf");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.75), -3);
    }
}
