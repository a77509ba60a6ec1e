//! `[quota]` configuration section.

use folkreel_core::{SubscriptionTier, TierLimits};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tier allowances, keyed by tier name.
///
/// Tiers missing from the table fall back to their built-in limits.
///
/// ```toml
/// [quota.tiers.free]
/// monthly_generations = 3
/// daily_requests = 10
///
/// [quota.tiers.premium]
/// daily_requests = 1000    # no monthly cap
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Per-tier overrides
    #[serde(default)]
    pub tiers: BTreeMap<SubscriptionTier, TierLimits>,
}

impl QuotaConfig {
    /// Limits in force for a tier.
    pub fn limits_for(&self, tier: SubscriptionTier) -> TierLimits {
        self.tiers
            .get(&tier)
            .copied()
            .unwrap_or_else(|| tier.default_limits())
    }

    /// Override one tier.
    pub fn with_tier(mut self, tier: SubscriptionTier, limits: TierLimits) -> Self {
        self.tiers.insert(tier, limits);
        self
    }
}
