//! AI-assisted signal generation
//!
//! The pipeline asks Gemini for a structured trading decision over the
//! recent price window and validates the response against the
//! [`schemas::TradingSignal`] contract. When the provider reports quota
//! exhaustion, the deterministic [`fallback`] analyzer answers instead.

pub mod fallback;
pub mod prompts;
pub mod schemas;
pub mod signal;

// Re-exports
pub use schemas::{SignalAction, TradingSignal};
pub use signal::{analyze_market, get_trading_signal};
