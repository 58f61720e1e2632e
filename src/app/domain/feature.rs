use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Named capabilities gated by an organization's active plan, independent of
/// per-principal object permissions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureKey {
    ExtranetPortal,
    OnlinePayments,
    Accounting,
    Documents,
    Reports,
    Messaging,
}

/// Numeric usage limits carried by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum LimitKey {
    Lots,
    Users,
    ExtranetSeats,
}

/// A plan limit. `-1` and NULL in storage normalize to `Unlimited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Limited(i64),
    Unlimited,
}

impl Limit {
    /// Normalize a raw limit column value.
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(n) if n >= 0 => Limit::Limited(n),
            _ => Limit::Unlimited,
        }
    }

    /// Whether `count` is still within this limit.
    pub fn allows(&self, count: i64) -> bool {
        match self {
            Limit::Limited(max) => count < *max,
            Limit::Unlimited => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_missing_normalize_to_unlimited() {
        assert_eq!(Limit::from_raw(Some(-1)), Limit::Unlimited);
        assert_eq!(Limit::from_raw(None), Limit::Unlimited);
        assert_eq!(Limit::from_raw(Some(10)), Limit::Limited(10));
    }

    #[test]
    fn limited_counts() {
        assert!(Limit::Limited(2).allows(1));
        assert!(!Limit::Limited(2).allows(2));
        assert!(Limit::Unlimited.allows(i64::MAX - 1));
    }

    #[test]
    fn feature_key_storage_form() {
        assert_eq!(FeatureKey::ExtranetPortal.to_string(), "extranet_portal");
        assert_eq!(
            "online_payments".parse::<FeatureKey>().unwrap(),
            FeatureKey::OnlinePayments
        );
    }
}
