//! Client code for aetherforge.
//!
//! This crate provides the fetch pipeline, HTML content extraction and the
//! search stub used by the agent's tools.

pub mod extract;
pub mod fetch;
pub mod search;

pub use extract::{Extracted, Extractor, ReadableExtractor, extract, strip_tags};
pub use fetch::{FetchOptions, FetchResult, Fetcher};
pub use search::{SearchHit, search};
