//! Append-only price history store
//!
//! The collector writes one row per tracked coin per poll tick; the signal
//! pipeline and fallback analyzer read short recent windows back out.
//! Duplicate timestamps are permitted, rows are never updated or deleted.

use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

use crate::errors::StoreError;
use crate::logger::{self, LogTag};
use crate::types::{format_timestamp, parse_timestamp, PriceSample};

const SCHEMA_PRICE_HISTORY: &str = r#"
CREATE TABLE IF NOT EXISTS price_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    coin_symbol TEXT,
    price_usd REAL,
    volume REAL DEFAULT 0,
    change_24h REAL
);
"#;

const INDEX_PRICE_HISTORY: &str = r#"
CREATE INDEX IF NOT EXISTS idx_price_history_symbol_ts
ON price_history (coin_symbol, timestamp DESC);
"#;

/// Handle to the price history database. Cheap to share behind an `Arc`;
/// the inner mutex serializes statement execution on the single connection.
pub struct PriceStore {
    conn: Mutex<Connection>,
}

impl PriceStore {
    /// Open (and create if needed) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(SCHEMA_PRICE_HISTORY)?;
        conn.execute_batch(INDEX_PRICE_HISTORY)?;
        Ok(())
    }

    /// Insert one sample. Write failures are fatal to the calling operation
    /// and propagate; silent data loss on the write path is not acceptable.
    pub async fn append(&self, sample: &PriceSample) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO price_history (timestamp, coin_symbol, price_usd, volume, change_24h)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                format_timestamp(sample.timestamp),
                sample.symbol,
                sample.price_usd,
                sample.volume,
                sample.change_24h
            ],
        )?;
        Ok(())
    }

    /// The `limit` most recent samples for a symbol, newest first.
    ///
    /// Matching is case-insensitive against the canonical uppercase symbol.
    /// Unknown symbols and store failures both return an empty vec — read
    /// paths degrade instead of raising, so the decision pipeline always has
    /// something to work with. Failures are logged.
    pub async fn recent(&self, symbol: &str, limit: u32) -> Vec<PriceSample> {
        match self.recent_inner(symbol, limit) {
            Ok(samples) => samples,
            Err(e) => {
                logger::error(LogTag::Prices, &format!("Database error: {}", e));
                Vec::new()
            }
        }
    }

    /// Same window in chronological order (oldest → newest), the orientation
    /// the trend consumers require.
    pub async fn recent_chronological(&self, symbol: &str, limit: u32) -> Vec<PriceSample> {
        let mut samples = self.recent(symbol, limit).await;
        samples.reverse();
        samples
    }

    fn recent_inner(&self, symbol: &str, limit: u32) -> Result<Vec<PriceSample>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT coin_symbol, timestamp, price_usd, volume, change_24h
             FROM price_history
             WHERE coin_symbol = ?1
             ORDER BY timestamp DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![symbol.to_uppercase(), limit], row_to_sample)?;

        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?);
        }
        Ok(samples)
    }

    /// Number of stored rows for a symbol. Used by backfill to skip coins
    /// that already have history.
    pub async fn count_for(&self, symbol: &str) -> Result<u64, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM price_history WHERE coin_symbol = ?1",
            params![symbol.to_uppercase()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn row_to_sample(row: &Row) -> rusqlite::Result<PriceSample> {
    let raw_ts: String = row.get(1)?;
    Ok(PriceSample {
        symbol: row.get(0)?,
        timestamp: parse_timestamp(&raw_ts).unwrap_or_else(chrono::Utc::now),
        price_usd: row.get(2)?,
        volume: row.get(3)?,
        change_24h: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    fn sample(symbol: &str, ts: &str, price: f64) -> PriceSample {
        PriceSample::new(symbol, parse_timestamp(ts).unwrap(), price, 100.0, 0.5)
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let store = PriceStore::open_in_memory().unwrap();
        store.append(&sample("BTC", "2025-03-01 10:00:00", 100.0)).await.unwrap();
        store.append(&sample("BTC", "2025-03-01 10:05:00", 101.0)).await.unwrap();
        store.append(&sample("BTC", "2025-03-01 10:10:00", 102.0)).await.unwrap();

        let recent = store.recent("BTC", 2).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].price_usd, 102.0);
        assert_eq!(recent[1].price_usd, 101.0);
    }

    #[tokio::test]
    async fn test_chronological_window_reverses() {
        let store = PriceStore::open_in_memory().unwrap();
        store.append(&sample("ETH", "2025-03-01 10:00:00", 2000.0)).await.unwrap();
        store.append(&sample("ETH", "2025-03-01 10:05:00", 2100.0)).await.unwrap();

        let window = store.recent_chronological("ETH", 12).await;
        assert_eq!(window[0].price_usd, 2000.0);
        assert_eq!(window[1].price_usd, 2100.0);
    }

    #[tokio::test]
    async fn test_case_insensitive_lookup() {
        let store = PriceStore::open_in_memory().unwrap();
        store.append(&sample("sol", "2025-03-01 10:00:00", 150.0)).await.unwrap();
        assert_eq!(store.recent("Sol", 5).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty_not_error() {
        let store = PriceStore::open_in_memory().unwrap();
        assert!(store.recent("DOGE", 12).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_timestamps_permitted() {
        let store = PriceStore::open_in_memory().unwrap();
        store.append(&sample("BTC", "2025-03-01 10:00:00", 100.0)).await.unwrap();
        store.append(&sample("BTC", "2025-03-01 10:00:00", 100.0)).await.unwrap();
        assert_eq!(store.count_for("btc").await.unwrap(), 2);
    }
}
