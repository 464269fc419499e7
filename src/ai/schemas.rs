//! Trading-signal schema and structured-response validation
//!
//! Both pipeline entry points share this schema and the parsing contract:
//! a response missing any required field is rejected rather than passed
//! through partially populated.

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// A trading decision, whether produced by the remote model or the local
/// technical fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub action: SignalAction,
    /// Always within [0, 100] after validation
    pub confidence: u8,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JSON schema constraint sent with the structured-output request.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "action": { "type": "STRING", "enum": ["BUY", "SELL", "HOLD"] },
            "confidence": { "type": "INTEGER" },
            "reasoning": { "type": "STRING" }
        },
        "required": ["action", "confidence", "reasoning"]
    })
}

/// Parse and validate a model response into a [`TradingSignal`].
///
/// Tolerates a ```json code fence around the payload (some models wrap JSON
/// mode output anyway), rejects anything that does not carry all three
/// required fields, and clamps confidence into [0, 100].
pub fn parse_signal_response(text: &str) -> Result<TradingSignal, ApiError> {
    let payload = strip_code_fence(text);

    let raw: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| ApiError::InvalidResponse(format!("not valid JSON: {}", e)))?;

    let action = raw
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::InvalidResponse("missing 'action'".to_string()))?;
    let action = match action.to_ascii_uppercase().as_str() {
        "BUY" => SignalAction::Buy,
        "SELL" => SignalAction::Sell,
        "HOLD" => SignalAction::Hold,
        other => {
            return Err(ApiError::InvalidResponse(format!(
                "unknown action '{}'",
                other
            )))
        }
    };

    let confidence = raw
        .get("confidence")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ApiError::InvalidResponse("missing 'confidence'".to_string()))?;
    let confidence = confidence.clamp(0, 100) as u8;

    let reasoning = raw
        .get("reasoning")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::InvalidResponse("missing 'reasoning'".to_string()))?
        .to_string();

    Ok(TradingSignal {
        action,
        confidence,
        reasoning,
    })
}

/// Strip a leading/trailing markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language token after the opening fence
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_response() {
        let signal = parse_signal_response(
            r#"{"action": "BUY", "confidence": 72, "reasoning": "steady climb"}"#,
        )
        .unwrap();
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.confidence, 72);
        assert_eq!(signal.reasoning, "steady climb");
    }

    #[test]
    fn test_parse_code_fenced_response() {
        let text = "```json\n{\"action\": \"HOLD\", \"confidence\": 55, \"reasoning\": \"flat\"}\n```";
        let signal = parse_signal_response(text).unwrap();
        assert_eq!(signal.action, SignalAction::Hold);
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = parse_signal_response(r#"{"action": "BUY", "confidence": 50}"#).unwrap_err();
        assert!(err.to_string().contains("reasoning"));
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(parse_signal_response(
            r#"{"action": "SHORT", "confidence": 50, "reasoning": "x"}"#
        )
        .is_err());
    }

    #[test]
    fn test_confidence_clamped() {
        let high = parse_signal_response(
            r#"{"action": "SELL", "confidence": 400, "reasoning": "x"}"#,
        )
        .unwrap();
        assert_eq!(high.confidence, 100);

        let low = parse_signal_response(
            r#"{"action": "SELL", "confidence": -3, "reasoning": "x"}"#,
        )
        .unwrap();
        assert_eq!(low.confidence, 0);
    }

    #[test]
    fn test_action_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&SignalAction::Hold).unwrap(),
            "\"HOLD\""
        );
    }
}
