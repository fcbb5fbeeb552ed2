//! Durable memoization of gloss expansion token sets.
//!
//! The cache is a mapping from a sense id to the ordered token list its
//! expansion produced. Entries are replaced wholesale: [`TokenSetCache::put`]
//! deletes any prior rows for the sense id and inserts the new list inside a
//! single transaction, so a concurrent reader never observes a half-written
//! entry. Entries are never merged or patched in place.
//!
//! [`SqliteTokenCache`] persists across processes; [`MemoryTokenCache`] backs
//! tests and throwaway sessions. An empty or unreadable entry is treated by
//! callers as a miss, triggering recomputation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};
use thiserror::Error;

use lelesk_types::SenseId;

/// Failure talking to the cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Durable sense-id → token-list mapping with full-replace semantics.
pub trait TokenSetCache: Send + Sync {
    /// Fetch the cached token list for `id`, `None` on miss.
    fn get(&self, id: &SenseId) -> Result<Option<Vec<String>>, CacheError>;

    /// Replace the entry for `id` with `tokens` (delete then insert).
    fn put(&self, id: &SenseId, tokens: &[String]) -> Result<(), CacheError>;

    /// Number of sense ids with an entry.
    fn len(&self) -> Result<usize, CacheError>;

    /// Whether the cache holds no entries.
    fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    /// Drop every entry.
    fn clear(&self) -> Result<(), CacheError>;
}

/// SQLite-backed persistent cache.
pub struct SqliteTokenCache {
    conn: Mutex<Connection>,
}

impl SqliteTokenCache {
    /// Open (creating if needed) a cache database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// An in-process database that vanishes on drop. Useful for tests.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tokens (
                 synsetid TEXT    NOT NULL,
                 position INTEGER NOT NULL,
                 token    TEXT    NOT NULL,
                 PRIMARY KEY (synsetid, position)
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl TokenSetCache for SqliteTokenCache {
    fn get(&self, id: &SenseId) -> Result<Option<Vec<String>>, CacheError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn.prepare_cached(
            "SELECT token FROM tokens WHERE synsetid = ?1 ORDER BY position",
        )?;
        let tokens = stmt
            .query_map(params![id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(if tokens.is_empty() { None } else { Some(tokens) })
    }

    fn put(&self, id: &SenseId, tokens: &[String]) -> Result<(), CacheError> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn.transaction()?;
        {
            let key = id.to_string();
            tx.execute("DELETE FROM tokens WHERE synsetid = ?1", params![key])?;
            let mut insert = tx.prepare_cached(
                "INSERT INTO tokens (synsetid, position, token) VALUES (?1, ?2, ?3)",
            )?;
            for (position, token) in tokens.iter().enumerate() {
                insert.execute(params![key, position as i64, token])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn len(&self) -> Result<usize, CacheError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let count: i64 =
            conn.query_row("SELECT COUNT(DISTINCT synsetid) FROM tokens", [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<(), CacheError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute("DELETE FROM tokens", [])?;
        Ok(())
    }
}

/// In-memory cache with the same replace semantics. No persistence.
#[derive(Default)]
pub struct MemoryTokenCache {
    entries: Mutex<HashMap<SenseId, Vec<String>>>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenSetCache for MemoryTokenCache {
    fn get(&self, id: &SenseId) -> Result<Option<Vec<String>>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(id).filter(|t| !t.is_empty()).cloned())
    }

    fn put(&self, id: &SenseId, tokens: &[String]) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(*id, tokens.to_vec());
        Ok(())
    }

    fn len(&self) -> Result<usize, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.len())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        Ok(())
    }
}
