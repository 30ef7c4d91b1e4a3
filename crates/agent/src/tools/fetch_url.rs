//! fetch_url tool implementation.
//!
//! Fetches a page through the cached fetcher and returns a trimmed
//! projection sized for the model's context.

use aetherforge_client::{FetchOptions, Fetcher};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Default fetch timeout when the model does not pass one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Input parameters for fetch_url tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchUrlArgs {
    /// The URL to fetch; missing means empty.
    #[serde(default)]
    pub url: String,

    /// Timeout in seconds. Numbers and numeric strings are accepted and
    /// truncated to an integer.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub timeout: Option<u64>,
}

impl FetchUrlArgs {
    /// Requested timeout clamped to the declared 1..=60 range.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS).clamp(1, 60))
    }
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.trunc() as u64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Output structure for fetch_url tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchUrlOutput {
    pub url: String,
    pub status: u16,
    pub title: String,
    /// First `text_limit` characters of the extracted text.
    pub text: String,
    pub fetched_at: i64,
}

/// Implementation of the fetch_url tool.
pub async fn fetch_impl(
    fetcher: &Fetcher, defaults: &FetchOptions, args: &FetchUrlArgs, text_limit: usize,
) -> FetchUrlOutput {
    let options = defaults.clone().with_timeout(args.timeout());
    let result = fetcher.fetch_url(&args.url, &options).await;

    FetchUrlOutput {
        url: result.url,
        status: result.status,
        title: result.title,
        text: truncate_chars(&result.text, text_limit),
        fetched_at: result.fetched_at,
    }
}

/// First `limit` characters of `s` (characters, not bytes).
pub fn truncate_chars(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
