//! Structured error types for gravity-pulse
//!
//! Read paths degrade to empty results and log instead of raising; write
//! paths and the signal pipeline surface these types to the caller.

// =============================================================================
// SIGNAL PIPELINE ERRORS
// =============================================================================

/// Failure modes of the AI signal pipeline.
///
/// Quota exhaustion never appears here: the pipeline recovers from it
/// internally via the technical fallback analyzer, so the operator always
/// receives a decision for a history-having symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalError {
    /// No recent price history exists for the symbol; no remote call is made.
    NoHistory { symbol: String },

    /// No remote-provider credential is configured.
    MissingCredential,

    /// The provider failed for a reason other than quota exhaustion.
    Provider { message: String },
}

impl std::fmt::Display for SignalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalError::NoHistory { symbol } => {
                write!(f, "No recent price history found for {}", symbol)
            }
            SignalError::MissingCredential => {
                write!(f, "API key not found in environment variables")
            }
            SignalError::Provider { message } => write!(f, "AI Signal Error: {}", message),
        }
    }
}

impl std::error::Error for SignalError {}

// =============================================================================
// EXTERNAL PROVIDER ERRORS
// =============================================================================

/// Errors from the HTTP provider clients (CoinGecko, 1inch, Gemini).
///
/// Rate limiting is a dedicated variant so callers can react to it
/// distinctly: the collector backs off, the signal pipeline falls back to
/// local technical analysis.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// HTTP 429 or an explicit quota-exhaustion marker in the response body.
    RateLimited,

    /// Transport-level failure (DNS, TLS, timeout, connection refused).
    Network(String),

    /// Non-success HTTP status outside the rate-limit case.
    HttpStatus { status: u16, body: String },

    /// Response arrived but did not match the expected shape.
    InvalidResponse(String),

    /// The client has no credential configured; no request was sent.
    MissingCredential,
}

impl ApiError {
    /// True when the error should trigger the offline fallback path rather
    /// than surfacing as a provider error.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::RateLimited => write!(f, "Rate limited (quota exhausted)"),
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::HttpStatus { status, body } => {
                write!(f, "HTTP {}: {}", status, body)
            }
            ApiError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ApiError::MissingCredential => write!(f, "API key not configured"),
        }
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// STORAGE ERRORS
// =============================================================================

/// Persistence-layer failure. Fatal for the operation that needed the write;
/// read paths catch this, log it, and degrade to empty results instead.
#[derive(Debug)]
pub struct StoreError {
    pub message: String,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError {
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Store unavailable: {}", self.message)
    }
}

impl std::error::Error for StoreError {}

// =============================================================================
// TRADE EXECUTION ERRORS
// =============================================================================

/// Errors surfaced by trade submission.
///
/// `InsufficientFunds` is produced by the caller-side sufficiency check, not
/// by the ledger engine itself: `execute_trade` is a pure ledger and will
/// book a BUY that drives the balance negative.
#[derive(Debug)]
pub enum TradeError {
    InsufficientFunds { needed: f64, available: f64 },
    Store(StoreError),
}

impl From<StoreError> for TradeError {
    fn from(err: StoreError) -> Self {
        TradeError::Store(err)
    }
}

impl std::fmt::Display for TradeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeError::InsufficientFunds { needed, available } => write!(
                f,
                "Insufficient funds: need ${:.2}, wallet holds ${:.2}",
                needed, available
            ),
            TradeError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TradeError {}
