/// Module tags for log attribution
///
/// Every log line carries the tag of the subsystem that emitted it so the
/// operator can tell collector chatter from ledger activity at a glance.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Collector,
    Prices,
    Ledger,
    Ai,
    Api,
    Swap,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Collector => "COLLECTOR",
            LogTag::Prices => "PRICES",
            LogTag::Ledger => "LEDGER",
            LogTag::Ai => "AI",
            LogTag::Api => "API",
            LogTag::Swap => "SWAP",
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
