//! Reservation handed out at admission.

use crate::ledger::SharedAccountRow;
use chrono::Utc;
use folkreel_core::{AccountId, AccountUsage};
use tracing::debug;

/// One reserved generation.
///
/// [`commit`](Self::commit) turns the reservation into a counted generation.
/// Dropping an uncommitted permit gives the reservation back.
#[derive(Debug)]
pub struct GenerationPermit {
    account: AccountId,
    row: SharedAccountRow,
    settled: bool,
}

impl GenerationPermit {
    pub(crate) fn new(account: AccountId, row: SharedAccountRow) -> Self {
        Self {
            account,
            row,
            settled: false,
        }
    }

    /// Account the reservation belongs to.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Count the generation: monthly and total up by one, last generation set.
    pub fn commit(mut self) -> AccountUsage {
        self.settled = true;
        let mut row = self.row.lock();
        row.in_flight = row.in_flight.saturating_sub(1);
        row.usage.monthly = row.usage.monthly.saturating_add(1);
        row.usage.total = row.usage.total.saturating_add(1);
        row.usage.last_generation = Some(Utc::now());
        debug!(
            account = %self.account,
            monthly = row.usage.monthly,
            total = row.usage.total,
            "Generation committed"
        );
        row.usage.clone()
    }
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut row = self.row.lock();
        row.in_flight = row.in_flight.saturating_sub(1);
        debug!(account = %self.account, "Generation reservation released");
    }
}
