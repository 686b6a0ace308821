use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::model::Role;
use crate::types::*;
use crate::CommissionResult;

/// Scale that incoming percentages are expressed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentScale {
    /// 0-100 (30 = 30%). The canonical scale.
    #[default]
    Percent,
    /// 0-1 (0.30 = 30%)
    Fraction,
}

impl PercentScale {
    /// Largest value a single allocation may carry on this scale.
    pub fn max(&self) -> Decimal {
        match self {
            PercentScale::Percent => Decimal::ONE_HUNDRED,
            PercentScale::Fraction => Decimal::ONE,
        }
    }

    /// Convert a value on this scale to the canonical 0-100 scale.
    pub fn to_canonical(&self, value: Decimal) -> Percent {
        match self {
            PercentScale::Percent => value,
            PercentScale::Fraction => value * Decimal::ONE_HUNDRED,
        }
    }
}

/// Midpoint handling applied to every monetary rounding in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Banker's rounding: 0.125 -> 0.12
    #[default]
    HalfEven,
    /// 0.125 -> 0.13
    HalfUp,
}

impl RoundingPolicy {
    pub fn strategy(&self) -> RoundingStrategy {
        match self {
            RoundingPolicy::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingPolicy::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        }
    }

    /// Round to cents and pin the scale at 2 so values always render as `x.yy`.
    pub fn round_money(&self, value: Money) -> Money {
        let mut rounded = value.round_dp_with_strategy(2, self.strategy());
        rounded.rescale(2);
        rounded
    }
}

/// Acceptance and arithmetic policy for a commission run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionPolicy {
    /// Reject over-allocated deals instead of admitting them with a warning
    pub strict_validation: bool,
    /// Scale of incoming allocation percentages
    pub percent_scale: PercentScale,
    pub rounding: RoundingPolicy,
    /// When set, allocations for roles outside this list are ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_roles: Option<Vec<Role>>,
}

impl CommissionPolicy {
    /// Parse a policy from YAML. An empty document yields the defaults.
    pub fn from_yaml_str(source: &str) -> CommissionResult<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn role_enabled(&self, role: &Role) -> bool {
        match &self.enabled_roles {
            Some(roles) => roles.contains(role),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fraction_scale_converts_to_percent() {
        assert_eq!(PercentScale::Fraction.to_canonical(dec!(0.3)), dec!(30));
        assert_eq!(PercentScale::Percent.to_canonical(dec!(30)), dec!(30));
    }

    #[test]
    fn test_rounding_midpoints() {
        assert_eq!(RoundingPolicy::HalfEven.round_money(dec!(0.125)), dec!(0.12));
        assert_eq!(RoundingPolicy::HalfUp.round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(RoundingPolicy::HalfEven.round_money(dec!(300)).to_string(), "300.00");
    }

    #[test]
    fn test_policy_from_yaml() {
        let policy = CommissionPolicy::from_yaml_str(
            "strict_validation: true\npercent_scale: fraction\nrounding: half_up\nenabled_roles:\n  - Sales\n  - Team Leader\n",
        )
        .unwrap();
        assert!(policy.strict_validation);
        assert_eq!(policy.percent_scale, PercentScale::Fraction);
        assert_eq!(policy.rounding, RoundingPolicy::HalfUp);
        assert!(policy.role_enabled(&Role::TeamLeader));
        assert!(!policy.role_enabled(&Role::Supervisor));
    }

    #[test]
    fn test_enabled_roles_accept_any_spelling() {
        let policy =
            CommissionPolicy::from_yaml_str("enabled_roles:\n  - sales\n  - Closer\n").unwrap();
        assert!(policy.role_enabled(&Role::Sales));
        assert!(policy.role_enabled(&Role::Other("Closer".into())));
        assert!(!policy.role_enabled(&Role::TeamLeader));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(CommissionPolicy::from_yaml_str("  \n").unwrap(), CommissionPolicy::default());
        assert!(CommissionPolicy::default().role_enabled(&Role::GeneralManager));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = CommissionPolicy::from_yaml_str("rounding: sideways").unwrap_err();
        assert!(matches!(err, crate::CommissionError::Config(_)));
    }
}
