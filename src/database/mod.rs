//! SQLite-backed persistence
//!
//! One database file per concern: `prices.db` holds the append-only price
//! history written by the collector; the ledger tables live in their own
//! file owned by [`crate::ledger::Ledger`].

pub mod prices;

pub use prices::PriceStore;
