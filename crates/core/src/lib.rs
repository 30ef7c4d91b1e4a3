//! Core types and shared functionality for aetherforge.
//!
//! This crate provides:
//! - Page cache with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedPage, is_fresh};
pub use config::{AppConfig, ConfigError, DEFAULT_USER_AGENT};
pub use error::Error;
