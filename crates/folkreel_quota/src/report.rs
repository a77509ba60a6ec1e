//! Usage summary served to account holders.

use folkreel_core::{AccountUsage, Entitlement, SubscriptionStatus, SubscriptionTier, TierLimits};
use serde::{Deserialize, Serialize};

/// Where an account stands against its allowance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    /// Current tier
    pub tier: SubscriptionTier,
    /// Current subscription status
    pub status: SubscriptionStatus,
    /// Monthly cap; `None` means unlimited
    pub monthly_limit: Option<u32>,
    /// Generations counted this month
    pub monthly_used: u32,
    /// Generations left this month; `None` means unlimited
    pub remaining: Option<u32>,
    /// Share of the monthly cap used, 0 to 100; 0 when unlimited
    pub usage_percent: f64,
    /// Generations ever
    pub total_generations: u64,
    /// Records created since the start of the current UTC month
    pub month_generations: u64,
}

impl UsageReport {
    /// Combine a ledger snapshot, the entitlement and the index's month count.
    ///
    /// ```
    /// use folkreel_core::{AccountId, AccountUsage, Entitlement, SubscriptionTier};
    /// use folkreel_quota::UsageReport;
    ///
    /// let mut usage = AccountUsage::new(AccountId::from("ada"), SubscriptionTier::Basic);
    /// usage.monthly = 12;
    /// usage.total = 40;
    /// let entitlement = Entitlement::active(SubscriptionTier::Basic);
    /// let report = UsageReport::build(&usage, &entitlement, SubscriptionTier::Basic.default_limits(), 12);
    /// assert_eq!(report.remaining, Some(18));
    /// assert_eq!(report.usage_percent, 40.0);
    /// ```
    pub fn build(
        usage: &AccountUsage,
        entitlement: &Entitlement,
        limits: TierLimits,
        month_generations: u64,
    ) -> Self {
        let monthly_limit = *limits.monthly_generations();
        let remaining = monthly_limit.map(|limit| limit.saturating_sub(usage.monthly));
        let usage_percent = match monthly_limit {
            Some(limit) if limit > 0 => {
                let percent = f64::from(usage.monthly) / f64::from(limit) * 100.0;
                (percent.min(100.0) * 10.0).round() / 10.0
            }
            Some(_) => 100.0,
            None => 0.0,
        };

        Self {
            tier: entitlement.tier,
            status: entitlement.status,
            monthly_limit,
            monthly_used: usage.monthly,
            remaining,
            usage_percent,
            total_generations: usage.total,
            month_generations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folkreel_core::AccountId;

    #[test]
    fn test_unlimited_tier() {
        let mut usage = AccountUsage::new(AccountId::from("grace"), SubscriptionTier::Premium);
        usage.monthly = 250;
        let report = UsageReport::build(
            &usage,
            &Entitlement::active(SubscriptionTier::Premium),
            SubscriptionTier::Premium.default_limits(),
            250,
        );
        assert_eq!(report.monthly_limit, None);
        assert_eq!(report.remaining, None);
        assert_eq!(report.usage_percent, 0.0);
    }

    #[test]
    fn test_exhausted_free_tier() {
        let mut usage = AccountUsage::new(AccountId::from("ada"), SubscriptionTier::Free);
        usage.monthly = 3;
        let report = UsageReport::build(
            &usage,
            &Entitlement::active(SubscriptionTier::Free),
            SubscriptionTier::Free.default_limits(),
            3,
        );
        assert_eq!(report.remaining, Some(0));
        assert_eq!(report.usage_percent, 100.0);
    }
}
