//! Cached page CRUD operations.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Titles longer than this are cut before they are stored.
pub const MAX_TITLE_CHARS: usize = 512;

/// A cached page: the last successful fetch of one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPage {
    pub url: String,
    /// Epoch seconds.
    pub fetched_at: i64,
    pub status: u16,
    pub title: String,
    pub text: String,
    /// Opaque side data such as response headers.
    pub meta: Option<serde_json::Value>,
}

impl CacheDb {
    /// Look up a page by its exact URL string.
    pub async fn get_page(&self, url: &str) -> Result<Option<CachedPage>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedPage>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, fetched_at, status, title, text, meta_json
                     FROM cached_pages WHERE url = ?1",
                )?;

                let result = stmt.query_row(params![url], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                });

                let (url, fetched_at, status, title, text, meta_json) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let meta = meta_json.as_deref().map(serde_json::from_str).transpose()?;

                Ok(Some(CachedPage {
                    url,
                    fetched_at,
                    status: u16::try_from(status).unwrap_or_default(),
                    title: title.unwrap_or_default(),
                    text: text.unwrap_or_default(),
                    meta,
                }))
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the row for `page.url`.
    ///
    /// All columns are written in one statement, so a reader never sees a
    /// mix of old and new fields. The title is cut to [`MAX_TITLE_CHARS`].
    pub async fn put_page(&self, page: &CachedPage) -> Result<(), Error> {
        let title: String = page.title.chars().take(MAX_TITLE_CHARS).collect();
        let meta_json = page.meta.as_ref().map(serde_json::to_string).transpose()?;
        let page = page.clone();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cached_pages (url, fetched_at, status, title, text, meta_json)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(url) DO UPDATE SET
                        fetched_at = excluded.fetched_at,
                        status = excluded.status,
                        title = excluded.title,
                        text = excluded.text,
                        meta_json = excluded.meta_json",
                    params![&page.url, page.fetched_at, i64::from(page.status), &title, &page.text, &meta_json],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Drop every cached page. Returns the number of rows removed.
    pub async fn clear(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cached_pages", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached pages.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM cached_pages", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
