//! Ledger / position engine
//!
//! Owns the virtual wallets, the trade audit log, and the open-position set.
//! This is a pure ledger: it books exactly what it is told. Funds
//! sufficiency is the caller's job ([`Ledger::ensure_funds`]) and Live-mode
//! trades are recorded for audit without touching any wallet.

mod db;
mod operations;

pub use db::Ledger;
pub use operations::{CloseOutcome, TradeRequest};

/// Balance each wallet starts with on first creation, in USD.
pub const SEED_BALANCE: f64 = 10_000.0;
