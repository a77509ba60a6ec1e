//! Reset boundaries for the daily and monthly counters.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Which counters a boundary resets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ResetKind {
    /// Per-credential request counts, at every UTC midnight
    Daily,
    /// Per-account generation counts, at 00:00 UTC on the first of each month
    Monthly,
}

/// Computes when the next reset of each kind is due.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use folkreel_quota::{ResetKind, ResetSchedule};
///
/// let now = Utc.with_ymd_and_hms(2024, 12, 31, 18, 30, 0).unwrap();
/// let schedule = ResetSchedule::new(ResetKind::Monthly);
/// assert_eq!(
///     schedule.next_after(now),
///     Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSchedule {
    kind: ResetKind,
}

impl ResetSchedule {
    /// Schedule for one reset kind.
    pub fn new(kind: ResetKind) -> Self {
        Self { kind }
    }

    /// Reset kind.
    pub fn kind(&self) -> ResetKind {
        self.kind
    }

    /// First boundary strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        match self.kind {
            ResetKind::Daily => next_midnight(after),
            ResetKind::Monthly => next_month_start(after),
        }
    }

    /// Time left until the next boundary; never negative.
    pub fn until_next(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.next_after(now) - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    /// Start of the UTC month containing `at`.
    pub fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
        midnight_of(at.year(), at.month(), 1).unwrap_or(at)
    }
}

fn midnight_of(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn next_midnight(after: DateTime<Utc>) -> DateTime<Utc> {
    let today = after.date_naive();
    today
        .succ_opt()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(after + Duration::days(1))
}

fn next_month_start(after: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if after.month() == 12 {
        (after.year() + 1, 1)
    } else {
        (after.year(), after.month() + 1)
    };
    midnight_of(year, month, 1).unwrap_or(after + Duration::days(31))
}
