//! Persistent cache for fetched contract ABIs
//!
//! Keyed by lowercased contract address, holding the raw ABI JSON document.
//! The registry itself is never persisted; this cache only spares repeat
//! fetches across process restarts.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

/// Cached contract ABI
#[derive(Debug, Clone)]
pub struct CachedAbi {
    pub address: String,
    pub abi_json: String,
}

/// SQLite-backed ABI cache
#[derive(Debug)]
pub struct AbiCache {
    conn: Connection,
}

impl AbiCache {
    /// Open or create the cache database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        let cache = Self { conn };
        cache.init()?;
        Ok(cache)
    }

    /// Initialize database schema
    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS abis (
                address     TEXT PRIMARY KEY,
                abi_json    TEXT NOT NULL,
                created_at  INTEGER DEFAULT (strftime('%s', 'now'))
            );

            CREATE INDEX IF NOT EXISTS idx_abis_created ON abis(created_at);
            ",
        )?;
        Ok(())
    }

    /// Save a fetched ABI document
    pub fn save_abi(&self, address: &str, abi_json: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO abis(address, abi_json) VALUES (?1, ?2)
             ON CONFLICT(address) DO UPDATE SET abi_json=excluded.abi_json",
            params![address.to_lowercase(), abi_json],
        )?;
        Ok(())
    }

    /// Get a cached ABI document
    pub fn get_abi(&self, address: &str) -> Result<Option<CachedAbi>> {
        let mut stmt = self
            .conn
            .prepare("SELECT address, abi_json FROM abis WHERE address = ?1")?;

        let mut rows = stmt.query(params![address.to_lowercase()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(CachedAbi {
                address: row.get(0)?,
                abi_json: row.get(1)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Number of cached ABIs
    pub fn stats(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM abis", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abi_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AbiCache::open(&dir.path().join("abis.db")).unwrap();

        cache
            .save_abi(
                "0xABCD000000000000000000000000000000000001",
                r#"[{"type":"function","name":"test","inputs":[],"outputs":[]}]"#,
            )
            .unwrap();

        // lookup is case-insensitive on the address
        let abi = cache
            .get_abi("0xabcd000000000000000000000000000000000001")
            .unwrap()
            .unwrap();
        assert!(abi.abi_json.contains("\"test\""));
        assert_eq!(cache.stats().unwrap(), 1);
    }

    #[test]
    fn test_abi_cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AbiCache::open(&dir.path().join("abis.db")).unwrap();
        assert!(cache
            .get_abi("0x0000000000000000000000000000000000000000")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_abi_cache_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AbiCache::open(&dir.path().join("abis.db")).unwrap();

        cache.save_abi("0x01", "[]").unwrap();
        cache.save_abi("0x01", r#"[{"type":"fallback"}]"#).unwrap();

        let abi = cache.get_abi("0x01").unwrap().unwrap();
        assert!(abi.abi_json.contains("fallback"));
        assert_eq!(cache.stats().unwrap(), 1);
    }
}
