//! Offline search stub.
//!
//! Returns fixed search-page links for a query. No network call is made and
//! nothing is ranked; the model is expected to pick a link and `fetch_url` it.

use serde::{Deserialize, Serialize};

const ENCYCLOPEDIA_SEARCH: &str = "https://en.wikipedia.org/w/index.php?search=";
const FORUM_SEARCH: &str = "https://hn.algolia.com/?q=";

/// A candidate link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Candidate links for `query`, always the same two entries in the same order.
pub fn search(query: &str) -> Vec<SearchHit> {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();

    tracing::debug!("search stub: query={}", query);

    vec![
        SearchHit { title: "Wikipedia search".to_string(), url: format!("{ENCYCLOPEDIA_SEARCH}{encoded}") },
        SearchHit { title: "Hacker News (Algolia) search".to_string(), url: format!("{FORUM_SEARCH}{encoded}") },
    ]
}
