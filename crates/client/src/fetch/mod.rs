//! HTTP fetch pipeline with a freshness-checked page cache.
//!
//! ### Pipeline
//! 1. When caching is on, a fresh cached row is returned as-is (no
//!    revalidation request).
//! 2. Otherwise a single GET is sent with the fixed user agent and the
//!    per-call timeout. Redirects follow the client defaults; no retries.
//! 3. Any completed response is run through extraction. Only a 200 with
//!    non-empty text is written back to the cache.
//! 4. Transport failures become a result with `status = 0` and the error
//!    description in `meta.error`.
//!
//! `Fetcher::fetch_url` never returns an error.

use aetherforge_core::{AppConfig, CacheDb, CachedPage, Error, is_fresh};
use reqwest::{Client, header::HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::extract::{Extractor, ReadableExtractor, extract_with};

/// Per-call fetch options.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Request timeout (default: 15s)
    pub timeout: Duration,

    /// Whether to read from and write to the page cache (default: true)
    pub use_cache: bool,

    /// Cached rows older than this are refetched (default: 24h)
    pub max_age: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(15), use_cache: true, max_age: Duration::from_secs(86_400) }
    }
}

impl FetchOptions {
    /// Options seeded from the application defaults.
    pub fn from_config(config: &AppConfig) -> Self {
        Self { timeout: config.fetch_timeout(), use_cache: true, max_age: config.cache_max_age() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outcome of a fetch, whether served from cache, the network, or a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub url: String,
    /// HTTP status; 0 when the request never completed.
    pub status: u16,
    pub title: String,
    pub text: String,
    /// Epoch seconds.
    pub fetched_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl FetchResult {
    /// Result describing a request that never produced a response.
    pub fn failed(url: &str, error: impl std::fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            status: 0,
            title: String::new(),
            text: String::new(),
            fetched_at: chrono::Utc::now().timestamp(),
            meta: Some(json!({ "error": error.to_string() })),
        }
    }

    /// Whether this result is worth persisting.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && !self.text.is_empty()
    }
}

impl From<CachedPage> for FetchResult {
    fn from(page: CachedPage) -> Self {
        Self {
            url: page.url,
            status: page.status,
            title: page.title,
            text: page.text,
            fetched_at: page.fetched_at,
            meta: page.meta,
        }
    }
}

impl From<&FetchResult> for CachedPage {
    fn from(result: &FetchResult) -> Self {
        Self {
            url: result.url.clone(),
            fetched_at: result.fetched_at,
            status: result.status,
            title: result.title.clone(),
            text: result.text.clone(),
            meta: result.meta.clone(),
        }
    }
}

/// Page fetcher backed by the page cache.
pub struct Fetcher {
    http: Client,
    cache: CacheDb,
    extractor: Box<dyn Extractor>,
}

impl Fetcher {
    /// Create a fetcher that identifies itself with `user_agent`.
    pub fn new(cache: CacheDb, user_agent: &str) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, cache, extractor: Box::new(ReadableExtractor::new()) })
    }

    /// Replace the main-content extractor.
    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// The page cache this fetcher reads and writes.
    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    /// Fetch `url`, serving a fresh cached copy when allowed.
    pub async fn fetch_url(&self, url: &str, options: &FetchOptions) -> FetchResult {
        if options.use_cache {
            match self.cache.get_page(url).await {
                Ok(Some(page)) if is_fresh(page.fetched_at, options.max_age) => {
                    tracing::debug!("cache hit for {}", url);
                    return page.into();
                }
                Ok(Some(_)) => tracing::debug!("stale cache entry for {}", url),
                Ok(None) => tracing::debug!("cache miss for {}", url),
                Err(e) => tracing::warn!("cache read failed for {}: {}", url, e),
            }
        }

        let start = Instant::now();
        let result = match self.request(url, options.timeout).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("fetch failed for {}: {}", url, e);
                return FetchResult::failed(url, e);
            }
        };

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} chars of text)",
            url,
            result.status,
            start.elapsed().as_millis(),
            result.text.len()
        );

        if options.use_cache
            && result.is_cacheable()
            && let Err(e) = self.cache.put_page(&CachedPage::from(&result)).await
        {
            tracing::warn!("cache write failed for {}: {}", url, e);
        }

        result
    }

    async fn request(&self, url: &str, timeout: Duration) -> Result<FetchResult, reqwest::Error> {
        let response = self.http.get(url).timeout(timeout).send().await?;

        let status = response.status().as_u16();
        let headers = headers_to_json(response.headers());
        let body = response.text().await?;

        let extracted = extract_with(self.extractor.as_ref(), &body, Some(url));

        Ok(FetchResult {
            url: url.to_string(),
            status,
            title: extracted.title,
            text: extracted.text,
            fetched_at: chrono::Utc::now().timestamp(),
            meta: Some(json!({ "headers": headers })),
        })
    }
}

/// Flatten response headers; repeated names are joined with ", ".
fn headers_to_json(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use aetherforge_core::DEFAULT_USER_AGENT;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><head><title>Alpha Doc</title></head>
        <body><article><h1>A</h1><p>Alpha content.</p></article></body></html>
    "#;

    async fn test_fetcher() -> Fetcher {
        let cache = CacheDb::open_in_memory().await.unwrap();
        Fetcher::new(cache, DEFAULT_USER_AGENT).unwrap()
    }

    fn html_response(status: u16, body: &str) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_raw(body.to_string(), "text/html; charset=utf-8")
    }

    #[test]
    fn test_fetch_options_default() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(15));
        assert!(options.use_cache);
        assert_eq!(options.max_age, Duration::from_secs(86_400));
    }

    #[tokio::test]
    async fn test_fetch_extracts_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc/a.html"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(html_response(200, PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = test_fetcher().await;
        let url = format!("{}/doc/a.html", server.uri());

        let first = fetcher.fetch_url(&url, &FetchOptions::default()).await;
        assert_eq!(first.status, 200);
        assert_eq!(first.title, "Alpha Doc");
        assert!(first.text.contains("Alpha content."));
        assert_eq!(first.meta.as_ref().unwrap()["headers"]["content-type"], "text/html; charset=utf-8");
        assert_eq!(fetcher.cache().count().await.unwrap(), 1);

        // Served from cache; the mock expects exactly one request.
        let second = fetcher.fetch_url(&url, &FetchOptions::default()).await;
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_non_200_is_extracted_but_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(html_response(404, "<html><title>Not Found</title><body><p>Gone.</p></body></html>"))
            .mount(&server)
            .await;

        let fetcher = test_fetcher().await;
        let result = fetcher.fetch_url(&format!("{}/missing", server.uri()), &FetchOptions::default()).await;

        assert_eq!(result.status, 404);
        assert_eq!(result.title, "Not Found");
        assert!(result.text.contains("Gone."));
        assert_eq!(fetcher.cache().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blank"))
            .respond_with(html_response(200, "<html><body><script>render()</script></body></html>"))
            .mount(&server)
            .await;

        let fetcher = test_fetcher().await;
        let result = fetcher.fetch_url(&format!("{}/blank", server.uri()), &FetchOptions::default()).await;

        assert_eq!(result.status, 200);
        assert_eq!(result.title, "");
        assert!(result.text.is_empty());
        assert_eq!(fetcher.cache().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_returns_failure_record() {
        let fetcher = test_fetcher().await;
        let options = FetchOptions::default().with_timeout(Duration::from_secs(2));

        let result = fetcher.fetch_url("http://127.0.0.1:1/", &options).await;

        assert_eq!(result.status, 0);
        assert_eq!(result.title, "");
        assert_eq!(result.text, "");
        assert_eq!(result.url, "http://127.0.0.1:1/");
        let error = result.meta.as_ref().and_then(|m| m["error"].as_str()).unwrap();
        assert!(!error.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_returns_failure_record() {
        let fetcher = test_fetcher().await;
        let result = fetcher.fetch_url("", &FetchOptions::default()).await;
        assert_eq!(result.status, 0);
        assert!(result.meta.unwrap()["error"].is_string());
    }

    #[tokio::test]
    async fn test_fresh_cache_short_circuits_network() {
        let fetcher = test_fetcher().await;
        let url = "http://127.0.0.1:1/cached";
        let page = CachedPage {
            url: url.to_string(),
            fetched_at: chrono::Utc::now().timestamp(),
            status: 200,
            title: "Cached".to_string(),
            text: "From the cache".to_string(),
            meta: None,
        };
        fetcher.cache().put_page(&page).await.unwrap();

        let result = fetcher.fetch_url(url, &FetchOptions::default()).await;
        assert_eq!(result, FetchResult::from(page));
    }

    #[tokio::test]
    async fn test_stale_cache_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc/a.html"))
            .respond_with(html_response(200, PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = test_fetcher().await;
        let url = format!("{}/doc/a.html", server.uri());
        let stale = CachedPage {
            url: url.clone(),
            fetched_at: chrono::Utc::now().timestamp() - 100,
            status: 200,
            title: "Old".to_string(),
            text: "Old text".to_string(),
            meta: None,
        };
        fetcher.cache().put_page(&stale).await.unwrap();

        let options = FetchOptions { max_age: Duration::from_secs(10), ..Default::default() };
        let result = fetcher.fetch_url(&url, &options).await;

        assert_eq!(result.title, "Alpha Doc");
        let stored = fetcher.cache().get_page(&url).await.unwrap().unwrap();
        assert_eq!(stored.title, "Alpha Doc");
    }

    #[tokio::test]
    async fn test_use_cache_false_bypasses_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc/a.html"))
            .respond_with(html_response(200, PAGE))
            .expect(2)
            .mount(&server)
            .await;

        let fetcher = test_fetcher().await;
        let url = format!("{}/doc/a.html", server.uri());
        let options = FetchOptions { use_cache: false, ..Default::default() };

        fetcher.fetch_url(&url, &options).await;
        fetcher.fetch_url(&url, &options).await;

        assert_eq!(fetcher.cache().count().await.unwrap(), 0);
    }

    #[test]
    fn test_headers_joined() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", "a=1".parse().unwrap());
        headers.append("set-cookie", "b=2".parse().unwrap());
        let map = headers_to_json(&headers);
        assert_eq!(map["set-cookie"], "a=1, b=2");
    }
}
