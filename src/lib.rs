//! gravity-pulse: paper/live crypto trading terminal core
//!
//! Single-operator, minute-granularity simulation tool built around four
//! pieces:
//!
//! - [`database::PriceStore`] — append-only price history written by the
//!   [`collector`] and read by the signal pipeline
//! - [`ai`] — Gemini-backed signal pipeline with a deterministic technical
//!   fallback on quota exhaustion
//! - [`ledger::Ledger`] — virtual wallets, trade audit log, open positions
//!   and P&L accounting
//! - [`apis`] — thin clients for the external market-data, swap-quote, and
//!   reasoning providers

pub mod ai;
pub mod apis;
pub mod collector;
pub mod config;
pub mod database;
pub mod errors;
pub mod ledger;
pub mod logger;
pub mod paths;
pub mod types;
pub mod wallet_link;

// Commonly used re-exports
pub use ai::{SignalAction, TradingSignal};
pub use database::PriceStore;
pub use ledger::{CloseOutcome, Ledger, TradeRequest, SEED_BALANCE};
pub use types::{OpenPosition, PriceSample, TradeAction, TradeMode, TradeRecord};
