//! Generation and response entry operations.
//!
//! A generation is a named store of URL-keyed response snapshots. Lookups
//! may span every open generation; deletion only happens a whole
//! generation at a time.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached response snapshot.
///
/// Holds everything needed to replay a response to the page: status,
/// headers, and body, keyed by the request URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub fetched_at: String,
}

impl CacheDb {
    /// Create a generation if it doesn't already exist.
    pub async fn open_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a response entry in a generation.
    ///
    /// Uses UPSERT semantics: last write wins on a duplicate (generation,
    /// url) key. The generation must already exist.
    pub async fn put_response(&self, generation: &str, response: &CachedResponse) -> Result<(), Error> {
        let generation = generation.to_string();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let headers_json = serde_json::to_string(&response.headers)?;
                conn.execute(
                    "INSERT INTO responses (generation, url, status, headers_json, body, fetched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(generation, url) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        fetched_at = excluded.fetched_at",
                    params![
                        generation,
                        &response.url,
                        response.status,
                        headers_json,
                        &response.body,
                        &response.fetched_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a URL across every open generation.
    ///
    /// Generations are searched in creation order, so a hit in an older,
    /// not-yet-deleted generation is accepted.
    pub async fn match_response(&self, url: &str) -> Result<Option<CachedResponse>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT r.url, r.status, r.headers_json, r.body, r.fetched_at
                     FROM responses r
                     JOIN generations g ON g.name = r.generation
                     WHERE r.url = ?1
                     ORDER BY g.rowid ASC
                     LIMIT 1",
                )?;
                let result = stmt.query_row(params![url], row_to_response);
                match result {
                    Ok(r) => Ok(Some(decode_headers(r)?)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a URL in a single generation.
    pub async fn match_in(&self, generation: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let generation = generation.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, headers_json, body, fetched_at
                     FROM responses WHERE generation = ?1 AND url = ?2",
                )?;
                let result = stmt.query_row(params![generation, url], row_to_response);
                match result {
                    Ok(r) => Ok(Some(decode_headers(r)?)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List generation names in creation order.
    pub async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and every entry in it.
    ///
    /// Returns true if the generation existed.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a generation.
    pub async fn generation_len(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM responses WHERE generation = ?1",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

/// Intermediate row with headers still JSON-encoded.
struct RawRow {
    url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
    fetched_at: String,
}

fn row_to_response(row: &rusqlite::Row<'_>) -> Result<RawRow, rusqlite::Error> {
    Ok(RawRow {
        url: row.get(0)?,
        status: row.get(1)?,
        headers_json: row.get(2)?,
        body: row.get(3)?,
        fetched_at: row.get(4)?,
    })
}

fn decode_headers(raw: RawRow) -> Result<CachedResponse, Error> {
    let headers: Vec<(String, String)> = serde_json::from_str(&raw.headers_json)?;
    Ok(CachedResponse {
        url: raw.url,
        status: raw.status,
        headers,
        body: raw.body,
        fetched_at: raw.fetched_at,
    })
}
