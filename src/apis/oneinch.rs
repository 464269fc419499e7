/// 1inch Swap API v6.0 client
///
/// API Documentation: https://portal.1inch.dev/documentation/swap/swagger
///
/// Endpoints implemented:
/// 1. /quote - estimated destination amount for a swap
/// 2. /swap - raw transaction calldata for executing a swap
/// 3. /approve/transaction - router spend-approval calldata
///
/// This crate never signs or submits anything; the calldata endpoints exist
/// so the operator can hand them to an external wallet.
use serde::Deserialize;

use crate::apis::client::HttpClient;
use crate::config;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};

const ONEINCH_BASE_URL: &str = "https://api.1inch.dev/swap/v6.0";

const TIMEOUT_SECS: u64 = 15;

/// USDC on Ethereum mainnet, the reference quote asset for USD pricing
const USDC_ADDRESS: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

/// Quote response: `dst_amount` is in destination-token base units
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    #[serde(rename = "dstAmount")]
    pub dst_amount: String,
}

/// Raw swap-transaction payload, passed through untyped: the caller only
/// relays it to an external wallet.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapTransaction {
    pub tx: serde_json::Value,
}

pub struct OneInchClient {
    http_client: HttpClient,
    api_key: Option<String>,
    chain_id: u64,
}

impl OneInchClient {
    pub fn new(chain_id: u64) -> Result<Self, ApiError> {
        let http_client = HttpClient::new(TIMEOUT_SECS)?;
        Ok(Self {
            http_client,
            api_key: config::oneinch_api_key(),
            chain_id,
        })
    }

    fn base_url(&self) -> String {
        format!("{}/{}", ONEINCH_BASE_URL, self.chain_id)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        // No credential means no request: fail fast and locally.
        let api_key = self.api_key.as_ref().ok_or(ApiError::MissingCredential)?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self
            .http_client
            .client()
            .get(&url)
            .query(params)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("accept", "application/json")
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
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Estimated destination amount for swapping `amount` base units of
    /// `from_token` into `to_token`.
    pub async fn quote(
        &self,
        from_token: &str,
        to_token: &str,
        amount: u128,
    ) -> Result<QuoteResponse, ApiError> {
        self.get_json(
            "/quote",
            &[
                ("src", from_token.to_string()),
                ("dst", to_token.to_string()),
                ("amount", amount.to_string()),
            ],
        )
        .await
    }

    /// Raw transaction calldata for executing the swap from
    /// `wallet_address`, with slippage in percent.
    pub async fn swap_transaction(
        &self,
        from_token: &str,
        to_token: &str,
        amount: u128,
        wallet_address: &str,
        slippage: u32,
    ) -> Result<SwapTransaction, ApiError> {
        self.get_json(
            "/swap",
            &[
                ("src", from_token.to_string()),
                ("dst", to_token.to_string()),
                ("amount", amount.to_string()),
                ("from", wallet_address.to_string()),
                ("slippage", slippage.to_string()),
            ],
        )
        .await
    }

    /// Router spend-approval calldata. `amount` of `None` requests an
    /// infinite approval.
    pub async fn approve_transaction(
        &self,
        token_address: &str,
        amount: Option<u128>,
    ) -> Result<serde_json::Value, ApiError> {
        let mut params = vec![("tokenAddress", token_address.to_string())];
        if let Some(amount) = amount {
            params.push(("amount", amount.to_string()));
        }
        self.get_json("/approve/transaction", &params).await
    }

    /// Real-time DEX execution price in USD for one whole token (assumed
    /// 18 decimals), quoted against USDC. Degrades to 0.0 on any failure so
    /// display paths never block on the swap provider.
    pub async fn usd_execution_price(&self, token_address: &str) -> f64 {
        let one_token: u128 = 10u128.pow(18);
        match self.quote(token_address, USDC_ADDRESS, one_token).await {
            Ok(quote) => match quote.dst_amount.parse::<f64>() {
                // USDC has 6 decimals
                Ok(raw) => raw / 1e6,
                Err(_) => 0.0,
            },
            Err(e) => {
                logger::debug(
                    LogTag::Swap,
                    &format!("DEX price unavailable for {}: {}", token_address, e),
                );
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_response_parsing() {
        let quote: QuoteResponse =
            serde_json::from_str(r#"{"dstAmount": "2514300000"}"#).unwrap();
        assert_eq!(quote.dst_amount, "2514300000");
        // 2514.30 USDC for one token
        assert_eq!(quote.dst_amount.parse::<f64>().unwrap() / 1e6, 2514.3);
    }
}
