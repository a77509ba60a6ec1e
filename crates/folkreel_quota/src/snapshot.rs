//! Saved ledger counters.

use crate::{ResetKind, ResetSchedule};
use chrono::{DateTime, Utc};
use folkreel_core::{AccountUsage, CredentialUsage};
use serde::{Deserialize, Serialize};

/// Every counter row of a [`QuotaLedger`](crate::QuotaLedger) at one moment.
///
/// Reservations held by running generations are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// When the rows were read
    pub saved_at: DateTime<Utc>,
    /// Account rows, by account
    pub accounts: Vec<AccountUsage>,
    /// Credential rows, by credential
    pub credentials: Vec<CredentialUsage>,
}

impl LedgerSnapshot {
    /// Whether a `kind` boundary fell between saving and `now`.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use folkreel_quota::{LedgerSnapshot, ResetKind};
    ///
    /// let snapshot = LedgerSnapshot {
    ///     saved_at: Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap(),
    ///     accounts: vec![],
    ///     credentials: vec![],
    /// };
    /// let now = Utc.with_ymd_and_hms(2024, 2, 1, 1, 0, 0).unwrap();
    /// assert!(snapshot.missed(ResetKind::Monthly, now));
    /// assert!(snapshot.missed(ResetKind::Daily, now));
    /// ```
    pub fn missed(&self, kind: ResetKind, now: DateTime<Utc>) -> bool {
        ResetSchedule::new(kind).next_after(self.saved_at) <= now
    }
}
