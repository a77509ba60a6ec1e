//! Subscription tiers and entitlements.

use serde::{Deserialize, Serialize};

/// Subscription level deciding generation and request allowances.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SubscriptionTier {
    /// 3 generations a month, 10 API requests a day
    #[default]
    Free,
    /// 30 generations a month, 100 API requests a day
    Basic,
    /// Unlimited generations, 1000 API requests a day
    Premium,
}

impl SubscriptionTier {
    /// Built-in allowances for the tier.
    ///
    /// ```
    /// use folkreel_core::SubscriptionTier;
    ///
    /// let premium = SubscriptionTier::Premium.default_limits();
    /// assert_eq!(*premium.monthly_generations(), None);
    /// assert_eq!(*premium.daily_requests(), 1000);
    /// ```
    pub fn default_limits(self) -> TierLimits {
        match self {
            Self::Free => TierLimits::new(Some(3), 10),
            Self::Basic => TierLimits::new(Some(30), 100),
            Self::Premium => TierLimits::new(None, 1000),
        }
    }
}

/// Allowances for one tier. `None` monthly means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TierLimits {
    #[serde(default)]
    monthly_generations: Option<u32>,
    daily_requests: u32,
}

impl TierLimits {
    /// Create limits.
    pub fn new(monthly_generations: Option<u32>, daily_requests: u32) -> Self {
        Self {
            monthly_generations,
            daily_requests,
        }
    }

    /// True while `used` is still under the monthly cap.
    pub fn allows_generation(&self, used: u32) -> bool {
        self.monthly_generations.is_none_or(|limit| used < limit)
    }
}

/// Subscription status reported by the billing system.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubscriptionStatus {
    /// Entitled to generate
    #[default]
    Active,
    /// Subscription lapsed or suspended
    Inactive,
    /// Subscription cancelled
    Cancelled,
    /// Payment failed
    PastDue,
}

/// What the billing system says an account may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Current tier
    pub tier: SubscriptionTier,
    /// Current status
    pub status: SubscriptionStatus,
}

impl Entitlement {
    /// Active entitlement at the given tier.
    pub fn active(tier: SubscriptionTier) -> Self {
        Self {
            tier,
            status: SubscriptionStatus::Active,
        }
    }

    /// Whether the account may generate at all.
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}
