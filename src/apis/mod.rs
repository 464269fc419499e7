//! External provider clients
//!
//! Thin typed wrappers over the HTTP collaborators: CoinGecko for market
//! data, 1inch for swap quotes, Gemini for the reasoning provider. All share
//! the timeout-bounded [`client::HttpClient`] and the
//! [`crate::errors::ApiError`] taxonomy, with rate limiting kept distinct
//! from other failures.

pub mod client;
pub mod coingecko;
pub mod gemini;
pub mod oneinch;

pub use coingecko::CoinGeckoClient;
pub use gemini::GeminiClient;
pub use oneinch::OneInchClient;
