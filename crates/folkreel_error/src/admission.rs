//! Admission error types.

/// Reasons a generation request is turned away before the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AdmissionErrorKind {
    /// Subscription is not active
    #[display("Subscription for account {} is not active", _0)]
    EntitlementInactive(String),
    /// Monthly generation allowance used up
    #[display("Account {} reached its monthly limit of {} generations", account, limit)]
    QuotaExceeded {
        /// Account identity
        account: String,
        /// Monthly limit of the account's tier
        limit: u32,
    },
    /// Daily credential allowance used up, or credential inactive
    #[display("API key rate limit reached: {}", _0)]
    RateLimited(String),
    /// No API key supplied
    #[display("API key required")]
    MissingCredential,
    /// API key does not resolve to an account
    #[display("Invalid API key")]
    UnknownCredential,
    /// Account has no entitlement record
    #[display("Unknown account: {}", _0)]
    UnknownAccount(String),
}

/// Admission error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Admission Error: {} at line {} in {}", kind, line, file)]
pub struct AdmissionError {
    /// The kind of error that occurred
    pub kind: AdmissionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AdmissionError {
    /// Create a new admission error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AdmissionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
