//! Admission checks run before a generation starts.

use crate::{GenerationPermit, QuotaLedger};
use folkreel_core::{AccountId, CredentialId, Entitlement, SubscriptionTier};
use folkreel_error::{AdmissionError, AdmissionErrorKind};
use folkreel_interface::{CredentialSource, EntitlementSource, ResolvedCredential};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A request that passed admission.
///
/// Holds the generation reservation; commit it once the generation is persisted.
#[derive(Debug, derive_getters::Getters)]
pub struct Admission {
    account: AccountId,
    tier: SubscriptionTier,
    #[getter(skip)]
    permit: GenerationPermit,
}

impl Admission {
    /// Split into account, tier and permit.
    pub fn into_parts(self) -> (AccountId, SubscriptionTier, GenerationPermit) {
        (self.account, self.tier, self.permit)
    }

    /// Borrow the reservation.
    pub fn permit(&self) -> &GenerationPermit {
        &self.permit
    }
}

/// Entitlement plus ledger, in a fixed order.
#[derive(Clone)]
pub struct AdmissionGate {
    ledger: Arc<QuotaLedger>,
    entitlements: Arc<dyn EntitlementSource>,
    credentials: Arc<dyn CredentialSource>,
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl AdmissionGate {
    /// Gate over a ledger and the account collaborators.
    pub fn new(
        ledger: Arc<QuotaLedger>,
        entitlements: Arc<dyn EntitlementSource>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            ledger,
            entitlements,
            credentials,
        }
    }

    /// The ledger behind the gate.
    pub fn ledger(&self) -> &Arc<QuotaLedger> {
        &self.ledger
    }

    async fn active_entitlement(&self, account: &AccountId) -> Result<Entitlement, AdmissionError> {
        let entitlement = self.entitlements.get_entitlement(account).await?;
        if !entitlement.is_active() {
            warn!(status = %entitlement.status, "Subscription not active");
            return Err(AdmissionError::new(AdmissionErrorKind::EntitlementInactive(
                account.to_string(),
            )));
        }
        self.ledger.ensure_account(account, entitlement.tier);
        Ok(entitlement)
    }

    async fn resolve_for(
        &self,
        credential: &CredentialId,
        account: Option<&AccountId>,
    ) -> Result<ResolvedCredential, AdmissionError> {
        let resolved = self.credentials.resolve_credential(credential).await?;
        if !resolved.active {
            warn!("Inactive API key presented");
            return Err(AdmissionError::new(AdmissionErrorKind::UnknownCredential));
        }
        if account.is_some_and(|account| *account != resolved.account) {
            warn!("API key belongs to a different account");
            return Err(AdmissionError::new(AdmissionErrorKind::UnknownCredential));
        }
        Ok(resolved)
    }

    /// Admit a generation for `account`.
    ///
    /// Checks, in order: entitlement is active (`EntitlementInactive`), the monthly
    /// allowance has room (`QuotaExceeded`), the credential, if given, has daily
    /// room (`RateLimited`). The credential use is counted here; the generation is
    /// counted only when the returned permit is committed.
    #[instrument(skip_all, fields(account = %account, with_credential = credential.is_some()))]
    pub async fn admit(
        &self,
        account: &AccountId,
        credential: Option<&CredentialId>,
    ) -> Result<Admission, AdmissionError> {
        let entitlement = self.active_entitlement(account).await?;
        let resolved = match credential {
            Some(key) => Some(self.resolve_for(key, Some(account)).await?),
            None => None,
        };

        let permit = self.ledger.reserve_generation(account)?;

        if let (Some(key), Some(_)) = (credential, resolved) {
            // Dropping the permit on this path hands the reservation back.
            let usage = self.ledger.try_use_credential(key)?;
            debug!(daily = usage.daily, "Credential use counted at admission");
        }

        info!(tier = %entitlement.tier, "Generation admitted");
        Ok(Admission {
            account: account.clone(),
            tier: entitlement.tier,
            permit,
        })
    }

    /// Authenticate a non-generating API call.
    ///
    /// Resolves the key, requires an active subscription and counts one request
    /// against the key's daily allowance.
    #[instrument(skip_all, fields(credential = %credential))]
    pub async fn authorize(&self, credential: &CredentialId) -> Result<AccountId, AdmissionError> {
        let resolved = self.resolve_for(credential, None).await?;
        self.active_entitlement(&resolved.account).await?;
        self.ledger.try_use_credential(credential)?;
        debug!(account = %resolved.account, "Request authorized");
        Ok(resolved.account)
    }

    /// Current entitlement for `account`, whatever its status.
    ///
    /// Also makes sure the ledger tracks the account at its current tier.
    pub async fn entitlement(&self, account: &AccountId) -> Result<Entitlement, AdmissionError> {
        let entitlement = self.entitlements.get_entitlement(account).await?;
        self.ledger.ensure_account(account, entitlement.tier);
        Ok(entitlement)
    }

    /// Resolve a key to its account without counting a request.
    pub async fn identify(&self, credential: &CredentialId) -> Result<AccountId, AdmissionError> {
        Ok(self.resolve_for(credential, None).await?.account)
    }
}
