use serde::Deserialize;
use std::collections::HashMap;

/// One row of the /coins/markets listing
#[derive(Debug, Clone, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    /// Contract addresses keyed by platform id, when requested
    #[serde(default)]
    pub platforms: Option<HashMap<String, String>>,
}

/// Raw /market_chart payload: arrays of [unix_millis, value]
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<(i64, f64)>,
}

/// One historical observation extracted from a market chart
#[derive(Debug, Clone, Copy)]
pub struct ChartPoint {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub price: f64,
}

impl MarketChart {
    pub fn points(&self) -> Vec<ChartPoint> {
        self.prices
            .iter()
            .filter_map(|&(millis, price)| {
                chrono::DateTime::from_timestamp_millis(millis)
                    .map(|timestamp| ChartPoint { timestamp, price })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_coin_tolerates_nulls() {
        let coin: MarketCoin = serde_json::from_str(
            r#"{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin",
                "current_price": 60000.0, "price_change_percentage_24h": null}"#,
        )
        .unwrap();
        assert_eq!(coin.symbol, "btc");
        assert_eq!(coin.current_price, Some(60000.0));
        assert_eq!(coin.price_change_percentage_24h, None);
    }

    #[test]
    fn test_chart_points_conversion() {
        let chart: MarketChart =
            serde_json::from_str(r#"{"prices": [[1709290800000, 61234.5]]}"#).unwrap();
        let points = chart.points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 61234.5);
    }
}
