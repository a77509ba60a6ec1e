//! Usage snapshots handed out by the quota ledger.

use crate::{AccountId, CredentialId, SubscriptionTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-account generation counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUsage {
    /// Account identity
    pub account: AccountId,
    /// Tier the limits are taken from
    pub tier: SubscriptionTier,
    /// Generations since the last monthly reset
    pub monthly: u32,
    /// Generations ever
    pub total: u64,
    /// Time of the most recent generation
    pub last_generation: Option<DateTime<Utc>>,
}

impl AccountUsage {
    /// Zeroed usage for a new account.
    pub fn new(account: AccountId, tier: SubscriptionTier) -> Self {
        Self {
            account,
            tier,
            monthly: 0,
            total: 0,
            last_generation: None,
        }
    }
}

/// Per-credential request counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialUsage {
    /// The API key
    pub credential: CredentialId,
    /// Owning account
    pub account: AccountId,
    /// Requests since the last daily reset
    pub daily: u32,
    /// Requests ever
    pub total: u64,
    /// Inactive credentials reject every call
    pub active: bool,
    /// Time of the most recent accepted call
    pub last_used: Option<DateTime<Utc>>,
}

impl CredentialUsage {
    /// Zeroed, active usage for a new credential.
    pub fn new(credential: CredentialId, account: AccountId) -> Self {
        Self {
            credential,
            account,
            daily: 0,
            total: 0,
            active: true,
            last_used: None,
        }
    }
}
