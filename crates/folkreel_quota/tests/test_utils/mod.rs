//! Shared fixtures for quota tests.

#![allow(dead_code)]

use async_trait::async_trait;
use folkreel_core::{AccountId, CredentialId, Entitlement, SubscriptionStatus, SubscriptionTier};
use folkreel_error::{AdmissionError, AdmissionErrorKind};
use folkreel_interface::{CredentialSource, EntitlementSource, ResolvedCredential};
use folkreel_quota::{AdmissionGate, QuotaConfig, QuotaLedger};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-test account directory with mutable entitlements.
#[derive(Default)]
pub struct FixedDirectory {
    entitlements: Mutex<HashMap<AccountId, Entitlement>>,
    keys: Mutex<HashMap<CredentialId, (AccountId, bool)>>,
}

impl FixedDirectory {
    pub fn with_account(self, account: &str, tier: SubscriptionTier) -> Self {
        self.entitlements
            .lock()
            .unwrap()
            .insert(AccountId::from(account), Entitlement::active(tier));
        self
    }

    pub fn with_key(self, key: &str, account: &str) -> Self {
        self.keys
            .lock()
            .unwrap()
            .insert(CredentialId::from(key), (AccountId::from(account), true));
        self
    }

    pub fn set_status(&self, account: &str, status: SubscriptionStatus) {
        if let Some(entitlement) = self
            .entitlements
            .lock()
            .unwrap()
            .get_mut(&AccountId::from(account))
        {
            entitlement.status = status;
        }
    }
}

#[async_trait]
impl EntitlementSource for FixedDirectory {
    async fn get_entitlement(&self, account: &AccountId) -> Result<Entitlement, AdmissionError> {
        self.entitlements
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .ok_or_else(|| {
                AdmissionError::new(AdmissionErrorKind::UnknownAccount(account.to_string()))
            })
    }
}

#[async_trait]
impl CredentialSource for FixedDirectory {
    async fn resolve_credential(
        &self,
        key: &CredentialId,
    ) -> Result<ResolvedCredential, AdmissionError> {
        let (account, active) = self
            .keys
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AdmissionError::new(AdmissionErrorKind::UnknownCredential))?;
        let tier = self
            .entitlements
            .lock()
            .unwrap()
            .get(&account)
            .map(|e| e.tier)
            .unwrap_or_default();
        Ok(ResolvedCredential {
            account,
            active,
            tier,
        })
    }
}

/// Gate, ledger and directory wired together, with credentials registered in the ledger.
pub fn gate_with(directory: FixedDirectory) -> (AdmissionGate, Arc<QuotaLedger>, Arc<FixedDirectory>) {
    let ledger = Arc::new(QuotaLedger::new(QuotaConfig::default()));
    let directory = Arc::new(directory);
    for (key, (account, _)) in directory.keys.lock().unwrap().iter() {
        ledger.register_credential(key, account);
    }
    let gate = AdmissionGate::new(ledger.clone(), directory.clone(), directory.clone());
    (gate, ledger, directory)
}
