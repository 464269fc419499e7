//! Offline technical-analysis fallback
//!
//! Deterministic decision rule used whenever the remote provider is
//! unavailable due to quota or rate limits. Given the same window it always
//! produces the same signal, which is exactly what makes it a safe stand-in
//! and a reliable test target. The reasoning strings carry an explicit
//! "(AI Offline)" marker so the operator can tell this path from the AI one.

use super::schemas::{SignalAction, TradingSignal};
use crate::types::PriceSample;

/// Percentage move (endpoint to endpoint) required before the rule leaves
/// HOLD territory.
const TREND_THRESHOLD_PCT: f64 = 1.5;

/// Cap on trend-scaled confidence.
const MAX_CONFIDENCE: u8 = 85;

/// Analyze a chronological (oldest → newest) price window.
///
/// Uses a simple endpoint delta, not a regression: the percentage change
/// between the first and last sample of the window.
pub fn analyze(history: &[PriceSample]) -> TradingSignal {
    if history.len() < 2 {
        return TradingSignal {
            action: SignalAction::Hold,
            confidence: 50,
            reasoning: "Insufficient data for technical analysis fallback.".to_string(),
        };
    }

    let first_price = history[0].price_usd;
    let last_price = history[history.len() - 1].price_usd;
    let pct_change = (last_price - first_price) / first_price * 100.0;

    if pct_change > TREND_THRESHOLD_PCT {
        TradingSignal {
            action: SignalAction::Buy,
            confidence: trend_confidence(pct_change),
            reasoning: format!(
                "(AI Offline) Technical Pump: Price up {:.1}% in the last hour. Strong upward momentum detected.",
                pct_change
            ),
        }
    } else if pct_change < -TREND_THRESHOLD_PCT {
        TradingSignal {
            action: SignalAction::Sell,
            confidence: trend_confidence(pct_change),
            reasoning: format!(
                "(AI Offline) Technical Drop: Price down {:.1}% in the last hour. Bearish pressure observed.",
                pct_change.abs()
            ),
        }
    } else {
        TradingSignal {
            action: SignalAction::Hold,
            confidence: 70,
            reasoning: format!(
                "(AI Offline) Consolidation: Price variant within {:+.1}%. Market is searching for clear direction.",
                pct_change
            ),
        }
    }
}

fn trend_confidence(pct_change: f64) -> u8 {
    let scaled = (pct_change.abs() * 30.0).round();
    scaled.min(MAX_CONFIDENCE as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    fn window(prices: &[f64]) -> Vec<PriceSample> {
        prices
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
    fn test_insufficient_data_holds_at_50() {
        for prices in [&[][..], &[100.0][..]] {
            let signal = analyze(&window(prices));
            assert_eq!(signal.action, SignalAction::Hold);
            assert_eq!(signal.confidence, 50);
            assert!(signal.reasoning.contains("Insufficient data"));
        }
    }

    #[test]
    fn test_five_percent_pump_caps_at_85() {
        let signal = analyze(&window(&[100.0, 102.0, 105.0]));
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.confidence, 85); // min(round(5*30), 85)
        assert!(signal.reasoning.contains("5.0%"));
    }

    #[test]
    fn test_one_percent_move_is_hold() {
        let signal = analyze(&window(&[100.0, 101.0]));
        assert_eq!(signal.action, SignalAction::Hold);
        assert_eq!(signal.confidence, 70);
    }

    #[test]
    fn test_two_percent_drop_sells_at_60() {
        let signal = analyze(&window(&[100.0, 99.0, 98.0]));
        assert_eq!(signal.action, SignalAction::Sell);
        assert_eq!(signal.confidence, 60); // min(round(2*30), 85)
        assert!(signal.reasoning.contains("2.0%"));
    }

    #[test]
    fn test_flat_window_mentions_zero_percent() {
        let signal = analyze(&window(&[100.0, 100.0, 100.0]));
        assert_eq!(signal.action, SignalAction::Hold);
        assert_eq!(signal.confidence, 70);
        assert!(signal.reasoning.contains("0.0%"));
        assert!(signal.reasoning.contains("(AI Offline)"));
    }

    #[test]
    fn test_endpoint_delta_ignores_middle_samples() {
        // A wild middle swing does not matter: only the endpoints count.
        let signal = analyze(&window(&[100.0, 150.0, 100.5]));
        assert_eq!(signal.action, SignalAction::Hold);
    }

    #[test]
    fn test_deterministic() {
        let samples = window(&[100.0, 103.0]);
        assert_eq!(analyze(&samples), analyze(&samples));
    }
}
