//! Usage metering for folkreel.
//!
//! The [`QuotaLedger`] owns every usage counter: monthly and total generations per
//! account, daily and total requests per credential. Each counter row sits behind
//! its own mutex, so check-and-increment is atomic per key while unrelated accounts
//! never contend.
//!
//! The [`AdmissionGate`] combines the account's entitlement with the ledger before a
//! generation starts and hands back a [`GenerationPermit`] that is committed only
//! after the generation is persisted.
//!
//! A [`LedgerSnapshot`] carries the counters across restarts.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod gate;
mod ledger;
mod permit;
mod report;
mod schedule;
mod snapshot;

pub use config::QuotaConfig;
pub use gate::{Admission, AdmissionGate};
pub use ledger::QuotaLedger;
pub use permit::GenerationPermit;
pub use report::UsageReport;
pub use schedule::{ResetKind, ResetSchedule};
pub use snapshot::LedgerSnapshot;
