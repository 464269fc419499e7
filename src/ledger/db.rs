//! Ledger database: schema, connection handle, row mapping

use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

use super::SEED_BALANCE;
use crate::errors::StoreError;
use crate::logger::{self, LogTag};
use crate::types::{parse_timestamp, OpenPosition, TradeAction, TradeMode, TradeRecord};

const SCHEMA_WALLET: &str = r#"
CREATE TABLE IF NOT EXISTS wallet (
    mode TEXT PRIMARY KEY,
    balance REAL NOT NULL
);
"#;

const SCHEMA_TRADE_HISTORY: &str = r#"
CREATE TABLE IF NOT EXISTS trade_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    coin TEXT NOT NULL,
    action TEXT NOT NULL,
    price REAL NOT NULL,
    amount REAL NOT NULL,
    leverage INTEGER DEFAULT 1,
    reasoning TEXT,
    mode TEXT DEFAULT 'Paper'
);
"#;

const SCHEMA_OPEN_POSITIONS: &str = r#"
CREATE TABLE IF NOT EXISTS open_positions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    coin TEXT NOT NULL,
    avg_price REAL NOT NULL,
    amount REAL NOT NULL,
    leverage INTEGER DEFAULT 1,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    mode TEXT DEFAULT 'Paper'
);
"#;

/// Explicit session handle owning exactly one wallet per mode.
///
/// Constructed once at startup and passed by reference to every ledger
/// operation; there is no ambient global wallet. The inner mutex plus SQL
/// transactions serialize the read-modify-write cycles (balance updates,
/// position insert/delete) within the operator session.
pub struct Ledger {
    pub(super) conn: Mutex<Connection>,
}

impl Ledger {
    /// Open (and create if needed) the ledger at the given path. Wallets
    /// are seeded with [`SEED_BALANCE`] only on first creation.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory ledger for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(SCHEMA_WALLET)?;
        conn.execute_batch(SCHEMA_TRADE_HISTORY)?;
        conn.execute_batch(SCHEMA_OPEN_POSITIONS)?;

        for mode in [TradeMode::Paper, TradeMode::Live] {
            conn.execute(
                "INSERT OR IGNORE INTO wallet (mode, balance) VALUES (?1, ?2)",
                params![mode.as_str(), SEED_BALANCE],
            )?;
        }
        Ok(())
    }

    /// Current wallet balance for a mode.
    pub async fn balance(&self, mode: TradeMode) -> Result<f64, StoreError> {
        let conn = self.conn.lock().unwrap();
        let balance: f64 = conn.query_row(
            "SELECT balance FROM wallet WHERE mode = ?1",
            params![mode.as_str()],
            |row| row.get(0),
        )?;
        Ok(balance)
    }

    /// Unconditional balance overwrite. No audit trail entry.
    pub async fn reset_wallet(&self, mode: TradeMode, new_balance: f64) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE wallet SET balance = ?1 WHERE mode = ?2",
            params![new_balance, mode.as_str()],
        )?;
        logger::info(
            LogTag::Ledger,
            &format!("{} wallet reset to ${:.2}", mode, new_balance),
        );
        Ok(())
    }

    /// All currently open positions for a mode. Read path: degrades to
    /// empty on store failure, with the failure logged.
    pub async fn open_positions(&self, mode: TradeMode) -> Vec<OpenPosition> {
        match self.open_positions_inner(mode) {
            Ok(positions) => positions,
            Err(e) => {
                logger::error(LogTag::Ledger, &format!("Database error: {}", e));
                Vec::new()
            }
        }
    }

    fn open_positions_inner(&self, mode: TradeMode) -> Result<Vec<OpenPosition>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, coin, avg_price, amount, leverage, timestamp, mode
             FROM open_positions WHERE mode = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![mode.as_str()], row_to_position)?;

        let mut positions = Vec::new();
        for row in rows {
            positions.push(row?);
        }
        Ok(positions)
    }

    /// Full trade history, newest first. Read path: degrades to empty.
    pub async fn trade_history(&self) -> Vec<TradeRecord> {
        match self.trade_history_inner() {
            Ok(trades) => trades,
            Err(e) => {
                logger::error(LogTag::Ledger, &format!("Database error: {}", e));
                Vec::new()
            }
        }
    }

    fn trade_history_inner(&self) -> Result<Vec<TradeRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, coin, action, price, amount, leverage, reasoning, mode
             FROM trade_history ORDER BY timestamp DESC, id DESC",
        )?;
        let rows = stmt.query_map([], row_to_trade)?;

        let mut trades = Vec::new();
        for row in rows {
            trades.push(row?);
        }
        Ok(trades)
    }
}

fn row_to_position(row: &Row) -> rusqlite::Result<OpenPosition> {
    let raw_ts: String = row.get(5)?;
    let raw_mode: String = row.get(6)?;
    Ok(OpenPosition {
        id: row.get(0)?,
        coin: row.get(1)?,
        avg_price: row.get(2)?,
        amount: row.get(3)?,
        leverage: row.get(4)?,
        opened_at: parse_timestamp(&raw_ts).unwrap_or_else(chrono::Utc::now),
        mode: TradeMode::parse(&raw_mode).unwrap_or(TradeMode::Paper),
    })
}

fn row_to_trade(row: &Row) -> rusqlite::Result<TradeRecord> {
    let raw_ts: String = row.get(1)?;
    let raw_action: String = row.get(3)?;
    let raw_mode: String = row.get(8)?;
    Ok(TradeRecord {
        id: row.get(0)?,
        timestamp: parse_timestamp(&raw_ts).unwrap_or_else(chrono::Utc::now),
        coin: row.get(2)?,
        action: TradeAction::parse(&raw_action).unwrap_or(TradeAction::Buy),
        price: row.get(4)?,
        amount: row.get(5)?,
        leverage: row.get(6)?,
        reasoning: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        mode: TradeMode::parse(&raw_mode).unwrap_or(TradeMode::Paper),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wallets_seed_only_on_first_creation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let ledger = Ledger::open(&path).unwrap();
            assert_eq!(ledger.balance(TradeMode::Paper).await.unwrap(), SEED_BALANCE);
            ledger.reset_wallet(TradeMode::Paper, 250.0).await.unwrap();
        }

        // Reopening must not reseed an existing wallet
        let reopened = Ledger::open(&path).unwrap();
        assert_eq!(reopened.balance(TradeMode::Paper).await.unwrap(), 250.0);
        assert_eq!(reopened.balance(TradeMode::Live).await.unwrap(), SEED_BALANCE);
    }

    #[tokio::test]
    async fn test_both_mode_wallets_exist() {
        let ledger = Ledger::open_in_memory().unwrap();
        for mode in [TradeMode::Paper, TradeMode::Live] {
            assert_eq!(ledger.balance(mode).await.unwrap(), SEED_BALANCE);
        }
    }
}
