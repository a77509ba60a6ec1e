//! Background tasks: ledger resets at UTC boundaries and periodic state saves.

use crate::StateFile;
use chrono::Utc;
use folkreel_quota::{QuotaLedger, ResetKind, ResetSchedule};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span, warn};

/// Handles to the running reset tasks. Dropping them does not stop the tasks.
#[derive(Debug)]
pub struct ResetJobs {
    daily: JoinHandle<()>,
    monthly: JoinHandle<()>,
}

impl ResetJobs {
    /// Stop both tasks.
    pub fn abort(&self) {
        self.daily.abort();
        self.monthly.abort();
    }

    /// Whether both tasks are still running.
    pub fn is_running(&self) -> bool {
        !self.daily.is_finished() && !self.monthly.is_finished()
    }
}

/// Run one reset now.
pub fn run_reset(ledger: &QuotaLedger, kind: ResetKind) -> usize {
    let reset = match kind {
        ResetKind::Daily => ledger.reset_all_daily(),
        ResetKind::Monthly => ledger.reset_all_monthly(),
    };
    info!(kind = %kind, rows = reset, "Usage counters reset");
    reset
}

fn spawn_reset_job(ledger: Arc<QuotaLedger>, kind: ResetKind) -> JoinHandle<()> {
    let schedule = ResetSchedule::new(kind);
    tokio::spawn(
        async move {
            loop {
                let now = Utc::now();
                let wait = schedule.until_next(now);
                info!(next = %schedule.next_after(now), "Next reset scheduled");
                tokio::time::sleep(wait).await;
                run_reset(&ledger, kind);
            }
        }
        .instrument(info_span!("reset_job", kind = %kind)),
    )
}

/// Start the daily credential reset and the monthly generation reset.
pub fn spawn_reset_jobs(ledger: Arc<QuotaLedger>) -> ResetJobs {
    ResetJobs {
        daily: spawn_reset_job(ledger.clone(), ResetKind::Daily),
        monthly: spawn_reset_job(ledger, ResetKind::Monthly),
    }
}

/// Save state every `every` until aborted. The first save happens after one period.
pub fn spawn_checkpoint_job(state: Arc<StateFile>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            let mut ticks = tokio::time::interval(every);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticks.tick().await;
            loop {
                ticks.tick().await;
                if let Err(e) = state.save().await {
                    warn!(error = %e, "Periodic state save failed");
                }
            }
        }
        .instrument(info_span!("checkpoint_job")),
    )
}
