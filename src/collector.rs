//! Background price collector
//!
//! Polls CoinGecko for the tracked coins and appends one [`PriceSample`] per
//! coin per tick to the price history store. On first run, coins with no
//! stored history are backfilled from the 1-day market chart so the signal
//! pipeline has a window to work with immediately.
//!
//! The collector is an independent writer: everything else in the crate
//! only ever reads the price store, so no coordination beyond SQLite's own
//! atomicity is needed.

use std::sync::Arc;
use std::time::Duration;

use crate::apis::coingecko::types::MarketCoin;
use crate::apis::CoinGeckoClient;
use crate::config;
use crate::database::PriceStore;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};
use crate::types::PriceSample;

/// Convert one market listing row into a sample. Coins without a price are
/// skipped (delisted or stale listings occasionally return null).
fn coin_to_sample(coin: &MarketCoin) -> Option<PriceSample> {
    let price = coin.current_price?;
    Some(PriceSample::new(
        &coin.symbol,
        chrono::Utc::now(),
        price,
        coin.total_volume.unwrap_or(0.0),
        coin.price_change_percentage_24h.unwrap_or(0.0),
    ))
}

/// One poll tick: fetch the tracked coins and store a sample for each.
async fn fetch_and_store(
    client: &CoinGeckoClient,
    store: &PriceStore,
    tracked: &[String],
) -> Result<usize, ApiError> {
    let coins = client.markets(Some(tracked), tracked.len().max(1) as u32).await?;

    let mut stored = 0;
    for coin in &coins {
        if let Some(sample) = coin_to_sample(coin) {
            if let Err(e) = store.append(&sample).await {
                // Write failures are fatal for this tick; surface them.
                return Err(ApiError::InvalidResponse(e.to_string()));
            }
            stored += 1;
        }
    }
    Ok(stored)
}

/// Backfill 1-day history for tracked coins that have no rows yet.
pub async fn backfill(client: &CoinGeckoClient, store: &PriceStore) {
    let tracked = config::with_config(|c| c.collector.tracked_coins.clone());

    for coin_id in &tracked {
        let symbol = symbol_for(coin_id);
        match store.count_for(&symbol).await {
            Ok(count) if count > 0 => {
                logger::debug(
                    LogTag::Collector,
                    &format!("Skipping backfill for {} (data exists)", coin_id),
                );
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                logger::error(LogTag::Collector, &format!("Backfill check failed: {}", e));
                continue;
            }
        }

        logger::info(
            LogTag::Collector,
            &format!("Backfilling 24h history for {}...", coin_id),
        );
        match client.market_chart(coin_id, 1).await {
            Ok(points) => {
                let mut inserted = 0;
                for point in &points {
                    let sample =
                        PriceSample::new(&symbol, point.timestamp, point.price, 0.0, 0.0);
                    if let Err(e) = store.append(&sample).await {
                        logger::error(
                            LogTag::Collector,
                            &format!("Backfill insert failed for {}: {}", coin_id, e),
                        );
                        break;
                    }
                    inserted += 1;
                }
                logger::info(
                    LogTag::Collector,
                    &format!("Inserted {} points for {}", inserted, coin_id),
                );
            }
            Err(e) => {
                logger::warning(
                    LogTag::Collector,
                    &format!("Backfill error for {}: {}", coin_id, e),
                );
            }
        }
        // Avoid tripping the rate limit right after a chart pull
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

/// Run the poll loop until Ctrl-C.
///
/// A successful tick waits the configured poll interval; a rate-limited or
/// failed tick waits the shorter backoff interval before retrying.
pub async fn run(store: Arc<PriceStore>) {
    let client = match CoinGeckoClient::new() {
        Ok(client) => client,
        Err(e) => {
            logger::error(LogTag::Collector, &format!("HTTP client init failed: {}", e));
            return;
        }
    };

    backfill(&client, &store).await;

    let (tracked, poll_secs, backoff_secs) = config::with_config(|c| {
        (
            c.collector.tracked_coins.clone(),
            c.collector.poll_interval_secs,
            c.collector.backoff_secs,
        )
    });

    logger::info(
        LogTag::Collector,
        &format!(
            "Tracking {} coins, polling every {}s",
            tracked.len(),
            poll_secs
        ),
    );

    loop {
        let wait = match fetch_and_store(&client, &store, &tracked).await {
            Ok(stored) => {
                logger::info(LogTag::Collector, &format!("Stored {} samples", stored));
                Duration::from_secs(poll_secs)
            }
            Err(ApiError::RateLimited) => {
                logger::warning(
                    LogTag::Collector,
                    &format!("Rate limit hit. Retrying in {}s...", backoff_secs),
                );
                Duration::from_secs(backoff_secs)
            }
            Err(e) => {
                logger::error(
                    LogTag::Collector,
                    &format!("Collection failed: {}. Retrying in {}s...", e, backoff_secs),
                );
                Duration::from_secs(backoff_secs)
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                logger::info(LogTag::Collector, "Shutdown requested, stopping collector");
                break;
            }
        }
    }
}

/// Ticker symbol the original collector stored for a CoinGecko id: the
/// first three letters, uppercased. Good enough for the tracked majors.
fn symbol_for(coin_id: &str) -> String {
    coin_id.chars().take(3).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(symbol: &str, price: Option<f64>) -> MarketCoin {
        serde_json::from_value(serde_json::json!({
            "id": symbol.to_lowercase(),
            "symbol": symbol,
            "name": symbol,
            "current_price": price,
            "price_change_percentage_24h": 2.5,
            "total_volume": 1000.0
        }))
        .unwrap()
    }

    #[test]
    fn test_coin_to_sample() {
        let sample = coin_to_sample(&listing("btc", Some(60000.0))).unwrap();
        assert_eq!(sample.symbol, "BTC");
        assert_eq!(sample.price_usd, 60000.0);
        assert_eq!(sample.change_24h, 2.5);
    }

    #[test]
    fn test_priceless_listing_skipped() {
        assert!(coin_to_sample(&listing("btc", None)).is_none());
    }

    #[test]
    fn test_symbol_for_truncates() {
        assert_eq!(symbol_for("bitcoin"), "BIT");
        assert_eq!(symbol_for("ethereum"), "ETH");
        assert_eq!(symbol_for("solana"), "SOL");
    }
}
