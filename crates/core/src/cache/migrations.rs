//! Cache schema setup.
//!
//! The schema version lives in SQLite's `user_version` pragma. Each step
//! below upgrades from the previous version inside one transaction.

use super::Error;
use tokio_rusqlite::{Connection, rusqlite};

/// Version the cache schema is brought up to on open.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = include_str!("../../migrations/001_cached_pages.sql");

/// Bring the schema up to [`SCHEMA_VERSION`]. Safe to call on every open.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current = schema_version(conn)?;
        if current > SCHEMA_VERSION {
            return Err(Error::MigrationFailed(format!(
                "cache schema version {current} is newer than supported version {SCHEMA_VERSION}"
            )));
        }

        if current < 1 {
            let tx = conn.transaction()?;
            tx.execute_batch(SCHEMA_V1)
                .map_err(|e| Error::MigrationFailed(format!("cached_pages schema: {e}")))?;
            tx.pragma_update(None, "user_version", 1)?;
            tx.commit()?;
            tracing::debug!("cache schema upgraded from {current} to 1");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

fn schema_version(conn: &rusqlite::Connection) -> Result<i64, Error> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}
