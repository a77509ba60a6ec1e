//! Quota ledger error types.

/// Ledger lookups that found no row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LedgerErrorKind {
    /// No usage row for the account
    #[display("No usage recorded for account {}", _0)]
    UnknownAccount(String),
    /// No usage row for the credential
    #[display("No usage recorded for credential {}", _0)]
    UnknownCredential(String),
}

/// Ledger error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ledger Error: {} at line {} in {}", kind, line, file)]
pub struct LedgerError {
    /// The kind of error that occurred
    pub kind: LedgerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LedgerError {
    /// Create a new ledger error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LedgerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
