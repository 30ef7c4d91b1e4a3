//! SQLite-backed page cache.
//!
//! Pages are keyed by the exact URL string that was fetched. URLs are
//! treated as opaque: no trailing-slash, scheme-case or query-order
//! normalization happens before lookup.
//!
//! - Automatic schema migrations
//! - WAL mode for concurrent access from several processes
//! - Age-based freshness checks against wall-clock time

pub mod connection;
pub mod migrations;
pub mod pages;

pub use crate::Error;

pub use connection::CacheDb;
pub use pages::{CachedPage, MAX_TITLE_CHARS};

use std::time::Duration;

/// True iff `now - fetched_at < max_age`, with `now` taken from the wall clock.
///
/// `fetched_at` is in epoch seconds.
pub fn is_fresh(fetched_at: i64, max_age: Duration) -> bool {
    let now = chrono::Utc::now().timestamp();
    let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(fetched_at) < max_age
}
