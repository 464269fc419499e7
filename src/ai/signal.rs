//! AI signal pipeline
//!
//! Formats recent history into a structured Gemini request, validates the
//! typed response, and degrades transparently to the technical fallback on
//! quota exhaustion. No local state is mutated here; the only side effect is
//! the outbound network call.

use super::fallback;
use super::prompts;
use super::schemas::{self, TradingSignal};
use crate::apis::gemini::GeminiClient;
use crate::config;
use crate::database::PriceStore;
use crate::errors::{ApiError, SignalError};
use crate::logger::{self, LogTag};

/// Analyze the last hour of stored prices for `symbol` and return a
/// decision.
///
/// Failure order matters: an empty history window fails with `NoHistory`
/// before any credential check or network traffic, and a missing credential
/// fails before a request is built. Quota exhaustion never surfaces — the
/// fallback analyzer answers for the same window instead, so the operator
/// sees a decision either way.
pub async fn get_trading_signal(
    store: &PriceStore,
    symbol: &str,
) -> Result<TradingSignal, SignalError> {
    let (window, model, timeout_secs) = config::with_config(|c| {
        (
            c.signals.history_window,
            c.signals.model.clone(),
            c.signals.request_timeout_secs,
        )
    });

    let history = store.recent_chronological(symbol, window).await;
    if history.is_empty() {
        return Err(SignalError::NoHistory {
            symbol: symbol.to_uppercase(),
        });
    }

    let api_key = config::gemini_api_key().ok_or(SignalError::MissingCredential)?;

    let prompt = prompts::trend_prompt(&symbol.to_uppercase(), &history);
    let client = GeminiClient::new(api_key, model, timeout_secs)
        .map_err(|e| SignalError::Provider {
            message: e.to_string(),
        })?;

    let provider_result = client
        .generate_structured(&prompt, schemas::response_schema())
        .await
        .and_then(|text| schemas::parse_signal_response(&text));

    resolve_provider_result(provider_result, &history, symbol)
}

/// Map the provider outcome onto the pipeline contract: quota exhaustion
/// silently degrades to the fallback analyzer over the same window, every
/// other failure surfaces as a provider error.
fn resolve_provider_result(
    result: Result<TradingSignal, ApiError>,
    history: &[crate::types::PriceSample],
    symbol: &str,
) -> Result<TradingSignal, SignalError> {
    match result {
        Ok(signal) => Ok(signal),
        Err(e) if e.is_quota_exhausted() => {
            logger::info(
                LogTag::Ai,
                &format!(
                    "Quota hit, using technical fallback for {}",
                    symbol.to_uppercase()
                ),
            );
            Ok(fallback::analyze(history))
        }
        Err(e) => Err(SignalError::Provider {
            message: e.to_string(),
        }),
    }
}

/// Legacy spot-analysis entry point.
///
/// Takes a single quote instead of pulling history and has no fallback
/// path: every provider error surfaces directly. Shares the response schema
/// and parsing contract with [`get_trading_signal`].
pub async fn analyze_market(
    price: f64,
    change_24h: f64,
    risk_tolerance: &str,
) -> Result<TradingSignal, SignalError> {
    let (model, timeout_secs) =
        config::with_config(|c| (c.signals.model.clone(), c.signals.request_timeout_secs));

    let api_key = config::gemini_api_key().ok_or(SignalError::MissingCredential)?;

    let prompt = prompts::market_prompt(price, change_24h, risk_tolerance);
    let client = GeminiClient::new(api_key, model, timeout_secs)
        .map_err(signal_error)?;

    client
        .generate_structured(&prompt, schemas::response_schema())
        .await
        .and_then(|text| schemas::parse_signal_response(&text))
        .map_err(signal_error)
}

fn signal_error(e: ApiError) -> SignalError {
    SignalError::Provider {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{parse_timestamp, PriceSample};

    #[tokio::test]
    async fn test_empty_history_fails_before_credential_check() {
        // No GEMINI_API_KEY is set in the test environment; NoHistory must
        // still win because the window is checked first.
        let store = PriceStore::open_in_memory().unwrap();
        let err = get_trading_signal(&store, "btc").await.unwrap_err();
        assert_eq!(
            err,
            SignalError::NoHistory {
                symbol: "BTC".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_credential_blocks_remote_call() {
        if config::gemini_api_key().is_some() {
            return; // environment has a real key; skip
        }
        let store = PriceStore::open_in_memory().unwrap();
        let sample = PriceSample::new(
            "BTC",
            parse_timestamp("2025-03-01 10:00:00").unwrap(),
            100.0,
            0.0,
            0.0,
        );
        store.append(&sample).await.unwrap();

        let err = get_trading_signal(&store, "BTC").await.unwrap_err();
        assert_eq!(err, SignalError::MissingCredential);
    }

    fn pumping_window() -> Vec<PriceSample> {
        [100.0, 103.0, 105.0]
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                PriceSample::new(
                    "BTC",
                    parse_timestamp(&format!("2025-03-01 10:{:02}:00", i * 5)).unwrap(),
                    price,
                    0.0,
                    0.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_quota_exhaustion_degrades_to_fallback() {
        let history = pumping_window();
        let resolved =
            resolve_provider_result(Err(ApiError::RateLimited), &history, "btc").unwrap();
        // Exactly what the fallback produces for the same window
        assert_eq!(resolved, fallback::analyze(&history));
        assert!(resolved.reasoning.contains("(AI Offline)"));
    }

    #[test]
    fn test_other_provider_errors_surface() {
        let history = pumping_window();
        let err = resolve_provider_result(
            Err(ApiError::HttpStatus {
                status: 500,
                body: "internal".to_string(),
            }),
            &history,
            "btc",
        )
        .unwrap_err();
        assert!(matches!(err, SignalError::Provider { .. }));
    }

    #[test]
    fn test_valid_provider_signal_passes_through() {
        let history = pumping_window();
        let signal = TradingSignal {
            action: crate::ai::SignalAction::Buy,
            confidence: 64,
            reasoning: "steady climb".to_string(),
        };
        let resolved =
            resolve_provider_result(Ok(signal.clone()), &history, "btc").unwrap();
        assert_eq!(resolved, signal);
    }
}
