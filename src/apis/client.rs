/// Base HTTP client shared by the provider wrappers
use reqwest::Client;
use std::time::Duration;

use crate::errors::ApiError;

/// Thin wrapper owning a configured reqwest client with a hard per-request
/// timeout. Every provider call in this crate is bounded by it, so a hung
/// remote maps to a normal provider error instead of an unbounded wait.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
