use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp wire format shared by both SQLite stores.
///
/// Kept as sortable plain text so `ORDER BY timestamp` works without any
/// date functions inside SQLite.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp for storage.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp back into a `DateTime<Utc>`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    chrono::NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// One collected market observation. Append-only: never mutated or deleted
/// once written to the price history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    /// Canonical uppercase ticker, e.g. "BTC"
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub price_usd: f64,
    pub volume: f64,
    pub change_24h: f64,
}

impl PriceSample {
    pub fn new(
        symbol: &str,
        timestamp: DateTime<Utc>,
        price_usd: f64,
        volume: f64,
        change_24h: f64,
    ) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            timestamp,
            price_usd,
            volume,
            change_24h,
        }
    }
}

/// Operating mode for a trade or position.
///
/// Paper trades settle against the virtual wallet; Live trades are logged
/// for audit only and settlement is delegated to the external swap bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeMode {
    Paper,
    Live,
}

impl TradeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeMode::Paper => "Paper",
            TradeMode::Live => "Live",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paper" => Some(TradeMode::Paper),
            "live" => Some(TradeMode::Live),
            _ => None,
        }
    }
}

impl std::fmt::Display for TradeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Executed trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(TradeAction::Buy),
            "SELL" => Some(TradeAction::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One open lot. Every BUY creates its own row; a lot is always closed in
/// full, so there is no partial-fill bookkeeping here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub id: i64,
    pub coin: String,
    pub avg_price: f64,
    pub amount: f64,
    pub leverage: i64,
    pub opened_at: DateTime<Utc>,
    pub mode: TradeMode,
}

impl OpenPosition {
    /// Absolute unrealized P&L at the given mark price. Leverage does not
    /// scale this value.
    pub fn unrealized_pnl(&self, mark_price: f64) -> f64 {
        (mark_price - self.avg_price) * self.amount
    }

    /// Percentage P&L at the given mark price. Leverage scales the
    /// percentage, not the absolute P&L.
    pub fn pnl_pct(&self, mark_price: f64) -> f64 {
        (mark_price - self.avg_price) / self.avg_price * 100.0 * self.leverage as f64
    }
}

/// Audit-log entry. One row per executed trade, including the closing SELL
/// generated when a position is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub coin: String,
    pub action: TradeAction,
    pub price: f64,
    pub amount: f64,
    pub leverage: i64,
    pub reasoning: String,
    pub mode: TradeMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip() {
        let ts = parse_timestamp("2025-03-01 10:05:00").unwrap();
        assert_eq!(format_timestamp(ts), "2025-03-01 10:05:00");
    }

    #[test]
    fn test_sample_canonicalizes_symbol() {
        let sample = PriceSample::new("eth", Utc::now(), 2000.0, 0.0, 1.2);
        assert_eq!(sample.symbol, "ETH");
    }

    #[test]
    fn test_leverage_scales_percentage_only() {
        let pos = OpenPosition {
            id: 1,
            coin: "BTC".to_string(),
            avg_price: 100.0,
            amount: 1.0,
            leverage: 10,
            opened_at: Utc::now(),
            mode: TradeMode::Paper,
        };
        assert_eq!(pos.unrealized_pnl(110.0), 10.0);
        assert_eq!(pos.pnl_pct(110.0), 100.0);
    }

    #[test]
    fn test_mode_and_action_parsing() {
        assert_eq!(TradeMode::parse("paper"), Some(TradeMode::Paper));
        assert_eq!(TradeMode::parse("LIVE"), Some(TradeMode::Live));
        assert_eq!(TradeAction::parse("buy"), Some(TradeAction::Buy));
        assert_eq!(TradeAction::parse("hold"), None);
    }
}
