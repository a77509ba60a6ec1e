//! In-memory account and API key directory.

use crate::AccountSeed;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folkreel_core::{AccountId, CredentialId, Entitlement, SubscriptionStatus, SubscriptionTier};
use folkreel_error::{AdmissionError, AdmissionErrorKind};
use folkreel_interface::{CredentialSource, EntitlementSource, ResolvedCredential};
use folkreel_quota::QuotaLedger;
use parking_lot::RwLock;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Length of issued API keys.
pub const API_KEY_LEN: usize = 32;

/// An issued API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialRecord {
    /// The key itself
    pub key: CredentialId,
    /// Owning account
    pub account: AccountId,
    /// Label chosen at issue time
    pub name: String,
    /// Whether the key may be used
    pub active: bool,
    /// Issue time
    pub created_at: DateTime<Utc>,
}

/// Accounts, entitlements and API keys held in process memory.
///
/// Every key is also registered with the ledger, so daily usage is tracked from
/// the moment it is issued.
#[derive(Debug)]
pub struct InMemoryDirectory {
    ledger: Arc<QuotaLedger>,
    accounts: RwLock<HashMap<AccountId, Entitlement>>,
    keys: RwLock<HashMap<CredentialId, CredentialRecord>>,
}

impl InMemoryDirectory {
    /// Empty directory registering keys with `ledger`.
    pub fn new(ledger: Arc<QuotaLedger>) -> Self {
        Self {
            ledger,
            accounts: RwLock::new(HashMap::new()),
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Directory populated from `[[accounts]]` entries.
    pub fn seeded(ledger: Arc<QuotaLedger>, seeds: &[AccountSeed]) -> Self {
        let directory = Self::new(ledger);
        for seed in seeds {
            let account = AccountId::new(seed.name.clone());
            directory.upsert_account(
                &account,
                Entitlement {
                    tier: seed.tier,
                    status: seed.status,
                },
            );
            for key in &seed.keys {
                directory.insert_key(CredentialId::new(key.clone()), &account, "seeded");
            }
        }
        info!(accounts = seeds.len(), "Seeded account directory");
        directory
    }

    /// Add an account or replace its entitlement.
    pub fn upsert_account(&self, account: &AccountId, entitlement: Entitlement) {
        self.accounts.write().insert(account.clone(), entitlement);
        self.ledger.ensure_account(account, entitlement.tier);
    }

    /// Add an active account at `tier`.
    pub fn add_account(&self, account: &AccountId, tier: SubscriptionTier) {
        self.upsert_account(account, Entitlement::active(tier));
    }

    /// Change an account's subscription status.
    pub fn set_status(&self, account: &AccountId, status: SubscriptionStatus) -> Result<(), AdmissionError> {
        let mut accounts = self.accounts.write();
        let entitlement = accounts.get_mut(account).ok_or_else(|| {
            AdmissionError::new(AdmissionErrorKind::UnknownAccount(account.to_string()))
        })?;
        entitlement.status = status;
        Ok(())
    }

    fn insert_key(&self, key: CredentialId, account: &AccountId, name: &str) {
        self.ledger.register_credential(&key, account);
        self.keys.write().insert(
            key.clone(),
            CredentialRecord {
                key,
                account: account.clone(),
                name: name.to_string(),
                active: true,
                created_at: Utc::now(),
            },
        );
    }

    /// Issue a fresh 32-character alphanumeric key for `account`.
    ///
    /// # Errors
    ///
    /// `UnknownAccount` if the account is not in the directory.
    #[instrument(skip(self), fields(account = %account))]
    pub fn issue_credential(&self, account: &AccountId, name: &str) -> Result<CredentialId, AdmissionError> {
        if !self.accounts.read().contains_key(account) {
            return Err(AdmissionError::new(AdmissionErrorKind::UnknownAccount(
                account.to_string(),
            )));
        }

        let key = loop {
            let candidate: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(API_KEY_LEN)
                .map(char::from)
                .collect();
            let candidate = CredentialId::new(candidate);
            if !self.keys.read().contains_key(&candidate) {
                break candidate;
            }
        };

        self.insert_key(key.clone(), account, name);
        info!(credential = %key, "Issued API key");
        Ok(key)
    }

    /// Deactivate a key here and in the ledger.
    ///
    /// # Errors
    ///
    /// `UnknownCredential` if the key was never issued.
    #[instrument(skip_all, fields(credential = %key))]
    pub fn revoke_credential(&self, key: &CredentialId) -> Result<(), AdmissionError> {
        {
            let mut keys = self.keys.write();
            let record = keys
                .get_mut(key)
                .ok_or_else(|| AdmissionError::new(AdmissionErrorKind::UnknownCredential))?;
            record.active = false;
        }
        self.ledger
            .deactivate_credential(key)
            .map_err(|_| AdmissionError::new(AdmissionErrorKind::UnknownCredential))?;
        info!("Revoked API key");
        Ok(())
    }

    /// Keys issued to an account, oldest first.
    pub fn credentials_of(&self, account: &AccountId) -> Vec<CredentialRecord> {
        let mut records: Vec<_> = self
            .keys
            .read()
            .values()
            .filter(|record| &record.account == account)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.created_at);
        records
    }
}

#[async_trait]
impl EntitlementSource for InMemoryDirectory {
    async fn get_entitlement(&self, account: &AccountId) -> Result<Entitlement, AdmissionError> {
        self.accounts.read().get(account).copied().ok_or_else(|| {
            AdmissionError::new(AdmissionErrorKind::UnknownAccount(account.to_string()))
        })
    }
}

#[async_trait]
impl CredentialSource for InMemoryDirectory {
    async fn resolve_credential(&self, key: &CredentialId) -> Result<ResolvedCredential, AdmissionError> {
        let (account, active) = self
            .keys
            .read()
            .get(key)
            .map(|record| (record.account.clone(), record.active))
            .ok_or_else(|| AdmissionError::new(AdmissionErrorKind::UnknownCredential))?;
        let tier = self
            .accounts
            .read()
            .get(&account)
            .map(|entitlement| entitlement.tier)
            .unwrap_or_default();
        Ok(ResolvedCredential {
            account,
            active,
            tier,
        })
    }
}
