//! web_search tool implementation.

use aetherforge_client::{SearchHit, search};
use serde::{Deserialize, Serialize};

/// Input parameters for web_search tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchArgs {
    /// Search query; missing means empty.
    #[serde(default)]
    pub query: String,
}

/// Output structure for web_search tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchOutput {
    pub results: Vec<SearchHit>,
}

/// Implementation of the web_search tool.
pub fn search_impl(args: &WebSearchArgs) -> WebSearchOutput {
    WebSearchOutput { results: search(&args.query) }
}
