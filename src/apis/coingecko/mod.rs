/// CoinGecko API client
///
/// API Documentation: https://docs.coingecko.com/reference/introduction
///
/// Endpoints implemented:
/// 1. /api/v3/coins/markets - market listing with 24h change and volume
/// 2. /api/v3/coins/{id}/market_chart - historical price series
///
/// HTTP 429 maps to [`ApiError::RateLimited`], kept distinct from empty and
/// error results so the collector can back off instead of hammering.
pub mod types;

use self::types::{ChartPoint, MarketChart, MarketCoin};
use crate::apis::client::HttpClient;
use crate::errors::ApiError;

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Request timeout - CoinGecko can be slow with large datasets
const TIMEOUT_SECS: u64 = 15;

pub struct CoinGeckoClient {
    http_client: HttpClient,
}

impl CoinGeckoClient {
    pub fn new() -> Result<Self, ApiError> {
        let http_client = HttpClient::new(TIMEOUT_SECS)?;
        Ok(Self { http_client })
    }

    /// Fetch the market listing ordered by market cap.
    ///
    /// With `ids` the listing is restricted to those CoinGecko coin ids
    /// (the collector path); without, it is the top `per_page` coins (the
    /// overview path).
    pub async fn markets(
        &self,
        ids: Option<&[String]>,
        per_page: u32,
    ) -> Result<Vec<MarketCoin>, ApiError> {
        let url = format!("{}/coins/markets", COINGECKO_BASE_URL);

        let mut query: Vec<(&str, String)> = vec![
            ("vs_currency", "usd".to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", per_page.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ];
        if let Some(ids) = ids {
            query.push(("ids", ids.join(",")));
        }

        let response = self
            .http_client
            .client()
            .get(&url)
            .query(&query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ApiError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<MarketCoin>>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Historical price series for one coin, oldest first as delivered by
    /// the API.
    pub async fn market_chart(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<ChartPoint>, ApiError> {
        let url = format!("{}/coins/{}/market_chart", COINGECKO_BASE_URL, coin_id);
        let interval = if days > 1 { "daily" } else { "hourly" };

        let response = self
            .http_client
            .client()
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("days", &days.to_string()),
                ("interval", interval),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ApiError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let chart: MarketChart = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        Ok(chart.points())
    }
}
