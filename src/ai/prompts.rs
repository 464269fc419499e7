//! Prompt builders for the signal pipeline

use crate::types::{format_timestamp, PriceSample};

/// Trend-analysis prompt: embeds the chronological `timestamp: price` pairs
/// of the recent window and asks for a decision constrained to the
/// TradingSignal schema.
pub fn trend_prompt(symbol: &str, history: &[PriceSample]) -> String {
    let history_str = history
        .iter()
        .map(|sample| {
            format!(
                "{}: ${:.2}",
                format_timestamp(sample.timestamp),
                sample.price_usd
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the following 1-hour price trend for {symbol}:\n\
         {history_str}\n\n\
         Is the price stabilizing, crashing, or pumping?\n\
         Return a trading decision.\n\n\
         Strictly return a JSON object with:\n\
         'action' (BUY/SELL/HOLD),\n\
         'confidence' (0-100),\n\
         'reasoning' (Brief explanation of the trend)."
    )
}

/// Legacy spot-analysis prompt built from a single quote instead of a
/// history window.
pub fn market_prompt(price: f64, change_24h: f64, risk_tolerance: &str) -> String {
    format!(
        "Market Data:\n\
         - Current Price: ${price:.2}\n\
         - 24h Change: {change_24h:.2}%\n\
         - Risk Tolerance: {risk_tolerance}\n\n\
         Provide action (BUY/SELL/HOLD), confidence (0-100), and reasoning."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    #[test]
    fn test_trend_prompt_is_chronological() {
        let history = vec![
            PriceSample::new("BTC", parse_timestamp("2025-03-01 10:00:00").unwrap(), 100.0, 0.0, 0.0),
            PriceSample::new("BTC", parse_timestamp("2025-03-01 10:05:00").unwrap(), 101.0, 0.0, 0.0),
        ];
        let prompt = trend_prompt("BTC", &history);
        assert!(prompt.contains("2025-03-01 10:00:00: $100.00"));
        assert!(prompt.contains("2025-03-01 10:05:00: $101.00"));
        assert!(prompt.find("$100.00").unwrap() < prompt.find("$101.00").unwrap());
    }

    #[test]
    fn test_market_prompt_embeds_quote() {
        let prompt = market_prompt(2000.5, -3.25, "moderate");
        assert!(prompt.contains("$2000.50"));
        assert!(prompt.contains("-3.25%"));
        assert!(prompt.contains("moderate"));
    }
}
