/// Google Gemini structured-output client
///
/// Endpoint implemented:
/// 1. /v1beta/models/{model}:generateContent - JSON-mode generation against
///    a response schema
///
/// Quota exhaustion (HTTP 429 or a RESOURCE_EXHAUSTED marker in the error
/// body) is reported as [`ApiError::RateLimited`] so the signal pipeline can
/// select the offline fallback instead of surfacing an error.
pub mod types;

use self::types::{
    GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse,
};
use crate::apis::client::HttpClient;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Result<Self, ApiError> {
        let http_client = HttpClient::new(timeout_secs)?;
        Ok(Self {
            http_client,
            api_key,
            model,
        })
    }

    /// Run a JSON-mode generation constrained to `schema` and return the raw
    /// response text for schema validation by the caller.
    pub async fn generate_structured(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<String, ApiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
                role: Some("user".to_string()),
            }],
            generation_config: Some(GeminiGenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
                temperature: None,
            }),
        };

        let response = self
            .http_client
            .client()
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            logger::warning(LogTag::Ai, "Gemini quota exhausted (HTTP 429)");
            return Err(ApiError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // The API also reports quota exhaustion inside error payloads
            if body.contains("RESOURCE_EXHAUSTED") {
                logger::warning(LogTag::Ai, "Gemini quota exhausted (RESOURCE_EXHAUSTED)");
                return Err(ApiError::RateLimited);
            }
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        parsed
            .first_text()
            .ok_or_else(|| ApiError::InvalidResponse("empty candidate list".to_string()))
    }
}
