//! Per-key usage counters.

use crate::{GenerationPermit, LedgerSnapshot, QuotaConfig, ResetKind};
use chrono::{DateTime, Utc};
use folkreel_core::{AccountId, AccountUsage, CredentialId, CredentialUsage, SubscriptionTier, TierLimits};
use folkreel_error::{AdmissionError, AdmissionErrorKind, LedgerError, LedgerErrorKind};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Account row: the public snapshot plus reservations held by running generations.
#[derive(Debug)]
pub(crate) struct AccountRow {
    pub(crate) usage: AccountUsage,
    pub(crate) in_flight: u32,
}

pub(crate) type SharedAccountRow = Arc<Mutex<AccountRow>>;
type SharedCredentialRow = Arc<Mutex<CredentialUsage>>;

/// Owner of all usage counters.
///
/// The map locks are held only to find or insert a row; counters change under the
/// row's own mutex. No lock is held across an `.await`.
#[derive(Debug, Default)]
pub struct QuotaLedger {
    config: QuotaConfig,
    accounts: RwLock<HashMap<AccountId, SharedAccountRow>>,
    credentials: RwLock<HashMap<CredentialId, SharedCredentialRow>>,
}

impl QuotaLedger {
    /// Empty ledger using the given tier table.
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            config,
            accounts: RwLock::new(HashMap::new()),
            credentials: RwLock::new(HashMap::new()),
        }
    }

    /// Tier table in force.
    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// Limits in force for a tier.
    pub fn limits_for(&self, tier: SubscriptionTier) -> TierLimits {
        self.config.limits_for(tier)
    }

    fn account_row(&self, account: &AccountId) -> Option<SharedAccountRow> {
        self.accounts.read().get(account).cloned()
    }

    fn credential_row(&self, credential: &CredentialId) -> Option<SharedCredentialRow> {
        self.credentials.read().get(credential).cloned()
    }

    /// Create the account row if missing and bring its tier up to date.
    #[instrument(skip_all, fields(account = %account, tier = %tier))]
    pub fn ensure_account(&self, account: &AccountId, tier: SubscriptionTier) {
        if let Some(row) = self.account_row(account) {
            let mut row = row.lock();
            if row.usage.tier != tier {
                debug!(previous = %row.usage.tier, "Account tier changed");
                row.usage.tier = tier;
            }
            return;
        }

        let row = self
            .accounts
            .write()
            .entry(account.clone())
            .or_insert_with(|| {
                debug!("Registering account usage row");
                Arc::new(Mutex::new(AccountRow {
                    usage: AccountUsage::new(account.clone(), tier),
                    in_flight: 0,
                }))
            })
            .clone();
        // Another caller may have inserted first with an older tier.
        row.lock().usage.tier = tier;
    }

    /// Restore an account's counters from saved usage.
    ///
    /// An existing row keeps its tier and reservations and takes the saved
    /// counters; a missing row is created as saved.
    pub fn restore_account(&self, usage: AccountUsage) {
        if let Some(row) = self.account_row(&usage.account) {
            let mut row = row.lock();
            row.usage.monthly = usage.monthly;
            row.usage.total = usage.total;
            row.usage.last_generation = usage.last_generation;
            return;
        }
        self.accounts
            .write()
            .entry(usage.account.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(AccountRow {
                    usage,
                    in_flight: 0,
                }))
            });
    }

    /// Restore a credential's counters from saved usage.
    ///
    /// An existing row keeps its owner and activation; a missing row is created
    /// as saved.
    pub fn restore_credential(&self, usage: CredentialUsage) {
        if let Some(row) = self.credential_row(&usage.credential) {
            let mut row = row.lock();
            row.daily = usage.daily;
            row.total = usage.total;
            row.last_used = usage.last_used;
            return;
        }
        self.credentials
            .write()
            .entry(usage.credential.clone())
            .or_insert_with(|| Arc::new(Mutex::new(usage)));
    }

    /// Copy of every counter row, sorted by key.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let accounts: Vec<SharedAccountRow> = self.accounts.read().values().cloned().collect();
        let credentials: Vec<SharedCredentialRow> =
            self.credentials.read().values().cloned().collect();

        let mut accounts: Vec<AccountUsage> =
            accounts.iter().map(|row| row.lock().usage.clone()).collect();
        accounts.sort_by(|a, b| a.account.cmp(&b.account));
        let mut credentials: Vec<CredentialUsage> =
            credentials.iter().map(|row| row.lock().clone()).collect();
        credentials.sort_by(|a, b| a.credential.cmp(&b.credential));

        LedgerSnapshot {
            saved_at: Utc::now(),
            accounts,
            credentials,
        }
    }

    /// Load a snapshot taken earlier, applying any reset whose boundary passed
    /// while it sat on disk.
    ///
    /// Returns the number of account rows restored.
    #[instrument(skip_all, fields(saved_at = %snapshot.saved_at))]
    pub fn restore(&self, snapshot: LedgerSnapshot, now: DateTime<Utc>) -> usize {
        let monthly_missed = snapshot.missed(ResetKind::Monthly, now);
        let daily_missed = snapshot.missed(ResetKind::Daily, now);
        if monthly_missed || daily_missed {
            info!(monthly_missed, daily_missed, "Applying resets missed while stopped");
        }

        let restored = snapshot.accounts.len();
        for mut usage in snapshot.accounts {
            if monthly_missed {
                usage.monthly = 0;
            }
            self.restore_account(usage);
        }
        for mut usage in snapshot.credentials {
            if daily_missed {
                usage.daily = 0;
            }
            self.restore_credential(usage);
        }
        info!(accounts = restored, "Ledger restored");
        restored
    }

    /// Register an active credential for an account. Re-registering reactivates it.
    #[instrument(skip_all, fields(credential = %credential, account = %account))]
    pub fn register_credential(&self, credential: &CredentialId, account: &AccountId) {
        if let Some(row) = self.credential_row(credential) {
            let mut row = row.lock();
            row.account = account.clone();
            row.active = true;
            return;
        }
        self.credentials
            .write()
            .entry(credential.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(CredentialUsage::new(
                    credential.clone(),
                    account.clone(),
                )))
            });
    }

    /// Mark a credential inactive; every later call with it is rejected.
    #[instrument(skip_all, fields(credential = %credential))]
    pub fn deactivate_credential(&self, credential: &CredentialId) -> Result<(), LedgerError> {
        let row = self.credential_row(credential).ok_or_else(|| {
            LedgerError::new(LedgerErrorKind::UnknownCredential(credential.to_string()))
        })?;
        row.lock().active = false;
        info!("Credential deactivated");
        Ok(())
    }

    /// `monthly < tier limit`. Unknown accounts are judged as fresh free accounts.
    pub fn can_generate(&self, account: &AccountId) -> bool {
        match self.account_row(account) {
            Some(row) => {
                let row = row.lock();
                self.limits_for(row.usage.tier)
                    .allows_generation(row.usage.monthly)
            }
            None => self
                .limits_for(SubscriptionTier::default())
                .allows_generation(0),
        }
    }

    /// Atomically count one generation: monthly and total up by one, timestamp set.
    #[instrument(skip_all, fields(account = %account))]
    pub fn commit_generation(&self, account: &AccountId) -> Result<AccountUsage, LedgerError> {
        let row = self.account_row(account).ok_or_else(|| {
            LedgerError::new(LedgerErrorKind::UnknownAccount(account.to_string()))
        })?;
        let mut row = row.lock();
        row.usage.monthly = row.usage.monthly.saturating_add(1);
        row.usage.total = row.usage.total.saturating_add(1);
        row.usage.last_generation = Some(Utc::now());
        debug!(monthly = row.usage.monthly, total = row.usage.total, "Generation committed");
        Ok(row.usage.clone())
    }

    /// Reserve one generation against the monthly limit.
    ///
    /// Counts generations already running for the account, so concurrent requests
    /// cannot push `monthly` past the limit once they all commit.
    #[instrument(skip_all, fields(account = %account))]
    pub fn reserve_generation(
        &self,
        account: &AccountId,
    ) -> Result<GenerationPermit, AdmissionError> {
        let shared = self.account_row(account).ok_or_else(|| {
            AdmissionError::new(AdmissionErrorKind::UnknownAccount(account.to_string()))
        })?;

        {
            let mut row = shared.lock();
            let limits = self.limits_for(row.usage.tier);
            let pending = row.usage.monthly.saturating_add(row.in_flight);
            if !limits.allows_generation(pending) {
                warn!(
                    monthly = row.usage.monthly,
                    in_flight = row.in_flight,
                    "Monthly generation limit reached"
                );
                return Err(AdmissionError::new(AdmissionErrorKind::QuotaExceeded {
                    account: account.to_string(),
                    limit: limits.monthly_generations().unwrap_or(u32::MAX),
                }));
            }
            row.in_flight += 1;
            debug!(in_flight = row.in_flight, "Generation reserved");
        }

        Ok(GenerationPermit::new(account.clone(), shared))
    }

    /// `active && daily < daily limit of the owner's tier`. Unknown credentials: false.
    pub fn can_use_credential(&self, credential: &CredentialId) -> bool {
        let Some(row) = self.credential_row(credential) else {
            return false;
        };
        let row = row.lock();
        row.active && row.daily < self.daily_limit_of(&row.account)
    }

    /// Atomically count one request: daily and total up by one, timestamp set.
    #[instrument(skip_all, fields(credential = %credential))]
    pub fn commit_credential_use(
        &self,
        credential: &CredentialId,
    ) -> Result<CredentialUsage, LedgerError> {
        let row = self.credential_row(credential).ok_or_else(|| {
            LedgerError::new(LedgerErrorKind::UnknownCredential(credential.to_string()))
        })?;
        let mut row = row.lock();
        Self::count_use(&mut row);
        Ok(row.clone())
    }

    /// Check and count a request under one lock.
    #[instrument(skip_all, fields(credential = %credential))]
    pub fn try_use_credential(
        &self,
        credential: &CredentialId,
    ) -> Result<CredentialUsage, AdmissionError> {
        let shared = self
            .credential_row(credential)
            .ok_or_else(|| AdmissionError::new(AdmissionErrorKind::UnknownCredential))?;

        // Lock order is credential row, then account row.
        let mut row = shared.lock();
        if !row.active {
            warn!("Inactive credential used");
            return Err(AdmissionError::new(AdmissionErrorKind::RateLimited(
                "API key is inactive".to_string(),
            )));
        }
        let limit = self.daily_limit_of(&row.account);
        if row.daily >= limit {
            warn!(daily = row.daily, limit, "Daily request limit reached");
            return Err(AdmissionError::new(AdmissionErrorKind::RateLimited(
                format!("daily limit of {limit} requests reached"),
            )));
        }
        Self::count_use(&mut row);
        debug!(daily = row.daily, limit, "Credential use counted");
        Ok(row.clone())
    }

    fn count_use(row: &mut CredentialUsage) {
        row.daily = row.daily.saturating_add(1);
        row.total = row.total.saturating_add(1);
        row.last_used = Some(Utc::now());
    }

    fn daily_limit_of(&self, account: &AccountId) -> u32 {
        let tier = self
            .account_row(account)
            .map(|row| row.lock().usage.tier)
            .unwrap_or_default();
        *self.limits_for(tier).daily_requests()
    }

    /// Snapshot of an account's counters.
    pub fn account_usage(&self, account: &AccountId) -> Option<AccountUsage> {
        self.account_row(account).map(|row| row.lock().usage.clone())
    }

    /// Snapshot of a credential's counters.
    pub fn credential_usage(&self, credential: &CredentialId) -> Option<CredentialUsage> {
        self.credential_row(credential).map(|row| row.lock().clone())
    }

    /// Generations currently reserved but not yet committed.
    pub fn in_flight(&self, account: &AccountId) -> u32 {
        self.account_row(account)
            .map(|row| row.lock().in_flight)
            .unwrap_or(0)
    }

    /// Zero every monthly count. Totals and reservations are untouched.
    ///
    /// Returns the number of accounts reset.
    #[instrument(skip(self))]
    pub fn reset_all_monthly(&self) -> usize {
        let rows: Vec<SharedAccountRow> = self.accounts.read().values().cloned().collect();
        for row in &rows {
            row.lock().usage.monthly = 0;
        }
        info!(accounts = rows.len(), "Monthly generation counts reset");
        rows.len()
    }

    /// Zero every daily count. Totals are untouched.
    ///
    /// Returns the number of credentials reset.
    #[instrument(skip(self))]
    pub fn reset_all_daily(&self) -> usize {
        let rows: Vec<SharedCredentialRow> =
            self.credentials.read().values().cloned().collect();
        for row in &rows {
            row.lock().daily = 0;
        }
        info!(credentials = rows.len(), "Daily request counts reset");
        rows.len()
    }
}
