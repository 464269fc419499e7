//! Trade execution and position lifecycle

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Transaction};

use super::db::Ledger;
use crate::errors::{StoreError, TradeError};
use crate::logger::{self, LogTag};
use crate::types::{format_timestamp, TradeAction, TradeMode};

/// One trade submission. `leverage` is carried through to the audit log and
/// the created position; it never changes the cash movement.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub coin: String,
    pub action: TradeAction,
    pub price: f64,
    pub amount: f64,
    pub leverage: i64,
    pub reasoning: String,
    pub mode: TradeMode,
}

/// Result of a close attempt. A double close lands on `NotFound` and is
/// absorbed silently: no error, no second SELL row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed { trade_id: i64 },
    NotFound,
}

impl Ledger {
    /// Execute a trade against the ledger.
    ///
    /// Always appends a trade record. Only Paper-mode trades move the
    /// wallet and position set; a Live trade is logged for audit and
    /// settlement is left to the external swap bridge.
    ///
    /// Deliberately NOT enforced here: funds sufficiency. A BUY that drives
    /// the balance negative is booked as requested — run
    /// [`Ledger::ensure_funds`] first if that matters to you.
    pub async fn execute_trade(&self, request: &TradeRequest) -> Result<i64, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let trade_id = apply_trade(&tx, request)?;
        tx.commit()?;

        logger::info(
            LogTag::Ledger,
            &format!(
                "{} {} {} x {:.6} @ ${:.2} ({}x)",
                request.mode, request.action, request.coin, request.amount, request.price,
                request.leverage
            ),
        );
        Ok(trade_id)
    }

    /// Close an open position at the given mark price.
    ///
    /// Logs the closing SELL with the position's original amount and
    /// leverage, tagged with the position id, then removes the position.
    /// Closing always liquidates the full amount; an unknown id is a no-op.
    pub async fn close_position(
        &self,
        position_id: i64,
        current_price: f64,
    ) -> Result<CloseOutcome, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let position = tx
            .query_row(
                "SELECT coin, amount, mode, leverage FROM open_positions WHERE id = ?1",
                params![position_id],
                |row| {
                    let mode: String = row.get(2)?;
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        mode,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((coin, amount, raw_mode, leverage)) = position else {
            logger::debug(
                LogTag::Ledger,
                &format!("Close for unknown position {} ignored", position_id),
            );
            return Ok(CloseOutcome::NotFound);
        };

        let request = TradeRequest {
            coin,
            action: TradeAction::Sell,
            price: current_price,
            amount,
            leverage,
            reasoning: format!("Closed Position ID: {}", position_id),
            mode: TradeMode::parse(&raw_mode).unwrap_or(TradeMode::Paper),
        };
        let trade_id = apply_trade(&tx, &request)?;

        tx.execute(
            "DELETE FROM open_positions WHERE id = ?1",
            params![position_id],
        )?;
        tx.commit()?;

        logger::info(
            LogTag::Ledger,
            &format!(
                "Closed position {} ({} x {:.6}) @ ${:.2}",
                position_id, request.coin, request.amount, current_price
            ),
        );
        Ok(CloseOutcome::Closed { trade_id })
    }

    /// Caller-side sufficiency check for a Paper BUY. The engine itself
    /// never rejects a trade for funds; run this before submitting.
    pub async fn ensure_funds(&self, cost: f64) -> Result<(), TradeError> {
        let available = self.balance(TradeMode::Paper).await?;
        if cost > available {
            return Err(TradeError::InsufficientFunds {
                needed: cost,
                available,
            });
        }
        Ok(())
    }
}

/// Book one trade inside an open transaction: audit row always, wallet and
/// position movement only for Paper mode.
fn apply_trade(tx: &Transaction, request: &TradeRequest) -> Result<i64, StoreError> {
    let timestamp = format_timestamp(Utc::now());
    tx.execute(
        "INSERT INTO trade_history (timestamp, coin, action, price, amount, leverage, reasoning, mode)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            timestamp,
            request.coin,
            request.action.as_str(),
            request.price,
            request.amount,
            request.leverage,
            request.reasoning,
            request.mode.as_str()
        ],
    )?;
    let trade_id = tx.last_insert_rowid();

    if request.mode == TradeMode::Paper {
        let total_cost = request.price * request.amount;
        match request.action {
            TradeAction::Buy => {
                tx.execute(
                    "UPDATE wallet SET balance = balance - ?1 WHERE mode = ?2",
                    params![total_cost, request.mode.as_str()],
                )?;
                tx.execute(
                    "INSERT INTO open_positions (coin, avg_price, amount, leverage, timestamp, mode)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        request.coin,
                        request.price,
                        request.amount,
                        request.leverage,
                        timestamp,
                        request.mode.as_str()
                    ],
                )?;
            }
            TradeAction::Sell => {
                // Flat manual sells are allowed: no position lookup, just a
                // wallet credit.
                tx.execute(
                    "UPDATE wallet SET balance = balance + ?1 WHERE mode = ?2",
                    params![total_cost, request.mode.as_str()],
                )?;
            }
        }
    }

    Ok(trade_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SEED_BALANCE;

    fn buy(coin: &str, price: f64, amount: f64, leverage: i64) -> TradeRequest {
        TradeRequest {
            coin: coin.to_string(),
            action: TradeAction::Buy,
            price,
            amount,
            leverage,
            reasoning: "test entry".to_string(),
            mode: TradeMode::Paper,
        }
    }

    fn sell(coin: &str, price: f64, amount: f64) -> TradeRequest {
        TradeRequest {
            coin: coin.to_string(),
            action: TradeAction::Sell,
            price,
            amount,
            leverage: 1,
            reasoning: "test exit".to_string(),
            mode: TradeMode::Paper,
        }
    }

    #[tokio::test]
    async fn test_buy_then_close_scenario() {
        let ledger = Ledger::open_in_memory().unwrap();
        assert_eq!(ledger.balance(TradeMode::Paper).await.unwrap(), SEED_BALANCE);

        ledger.execute_trade(&buy("ETH", 2000.0, 1.0, 1)).await.unwrap();
        assert_eq!(ledger.balance(TradeMode::Paper).await.unwrap(), 8000.0);

        let positions = ledger.open_positions(TradeMode::Paper).await;
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].coin, "ETH");
        assert_eq!(positions[0].avg_price, 2000.0);
        assert_eq!(positions[0].amount, 1.0);

        let outcome = ledger.close_position(positions[0].id, 2200.0).await.unwrap();
        assert!(matches!(outcome, CloseOutcome::Closed { .. }));
        assert_eq!(ledger.balance(TradeMode::Paper).await.unwrap(), 10_200.0);
        assert!(ledger.open_positions(TradeMode::Paper).await.is_empty());

        let trades = ledger.trade_history().await;
        assert_eq!(trades.len(), 2);
        let closing = trades
            .iter()
            .find(|t| t.action == TradeAction::Sell)
            .unwrap();
        assert_eq!(closing.price, 2200.0);
        assert_eq!(closing.reasoning, format!("Closed Position ID: {}", positions[0].id));
    }

    #[tokio::test]
    async fn test_double_close_is_idempotent() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.execute_trade(&buy("BTC", 100.0, 2.0, 1)).await.unwrap();
        let id = ledger.open_positions(TradeMode::Paper).await[0].id;

        let first = ledger.close_position(id, 110.0).await.unwrap();
        let second = ledger.close_position(id, 110.0).await.unwrap();
        assert!(matches!(first, CloseOutcome::Closed { .. }));
        assert_eq!(second, CloseOutcome::NotFound);

        // Exactly one closing SELL; balance reflects a single credit.
        let sells: Vec<_> = ledger
            .trade_history()
            .await
            .into_iter()
            .filter(|t| t.action == TradeAction::Sell)
            .collect();
        assert_eq!(sells.len(), 1);
        assert_eq!(
            ledger.balance(TradeMode::Paper).await.unwrap(),
            SEED_BALANCE - 200.0 + 220.0
        );
    }

    #[tokio::test]
    async fn test_accounting_closure() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.execute_trade(&buy("BTC", 50.0, 3.0, 1)).await.unwrap();
        ledger.execute_trade(&buy("ETH", 20.0, 10.0, 2)).await.unwrap();
        ledger.execute_trade(&sell("BTC", 60.0, 3.0)).await.unwrap();

        let expected = SEED_BALANCE - 50.0 * 3.0 - 20.0 * 10.0 + 60.0 * 3.0;
        assert_eq!(ledger.balance(TradeMode::Paper).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_each_buy_creates_its_own_lot() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.execute_trade(&buy("SOL", 100.0, 1.0, 1)).await.unwrap();
        ledger.execute_trade(&buy("SOL", 120.0, 1.0, 1)).await.unwrap();

        let positions = ledger.open_positions(TradeMode::Paper).await;
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].avg_price, 100.0);
        assert_eq!(positions[1].avg_price, 120.0);
    }

    #[tokio::test]
    async fn test_live_trade_is_audit_only() {
        let ledger = Ledger::open_in_memory().unwrap();
        let mut request = buy("ETH", 2000.0, 1.0, 1);
        request.mode = TradeMode::Live;
        ledger.execute_trade(&request).await.unwrap();

        assert_eq!(ledger.balance(TradeMode::Paper).await.unwrap(), SEED_BALANCE);
        assert_eq!(ledger.balance(TradeMode::Live).await.unwrap(), SEED_BALANCE);
        assert!(ledger.open_positions(TradeMode::Live).await.is_empty());
        assert_eq!(ledger.trade_history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_buy_may_drive_balance_negative() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.execute_trade(&buy("BTC", 30_000.0, 1.0, 1)).await.unwrap();
        assert_eq!(ledger.balance(TradeMode::Paper).await.unwrap(), -20_000.0);
    }

    #[tokio::test]
    async fn test_flat_sell_without_position() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.execute_trade(&sell("BTC", 100.0, 1.0)).await.unwrap();
        assert_eq!(
            ledger.balance(TradeMode::Paper).await.unwrap(),
            SEED_BALANCE + 100.0
        );
    }

    #[tokio::test]
    async fn test_ensure_funds() {
        let ledger = Ledger::open_in_memory().unwrap();
        assert!(ledger.ensure_funds(5_000.0).await.is_ok());
        let err = ledger.ensure_funds(15_000.0).await.unwrap_err();
        assert!(matches!(err, TradeError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_reset_wallet_overwrites() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.execute_trade(&buy("ETH", 2000.0, 1.0, 1)).await.unwrap();
        ledger.reset_wallet(TradeMode::Paper, 10_000.0).await.unwrap();
        assert_eq!(ledger.balance(TradeMode::Paper).await.unwrap(), 10_000.0);
        // Reset leaves the audit log untouched.
        assert_eq!(ledger.trade_history().await.len(), 1);
    }
}
