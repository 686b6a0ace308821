use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::Deal;
use super::policy::CommissionPolicy;
use crate::error::CommissionError;
use crate::types::*;
use crate::CommissionResult;

/// Percentages on a deal summed to more than 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("allocation percentages sum to {sum}%, exceeding 100%")]
pub struct OverAllocation {
    pub sum: Percent,
}

/// Structured validation result, reported rather than raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutput {
    pub total_percent: Percent,
    pub is_valid: bool,
    /// Share left to the company (0 when over-allocated)
    pub company_headroom_pct: Percent,
    /// Amount by which the sum exceeds 100 (0 when valid)
    pub over_allocation_pct: Percent,
}

/// Check that percentages sum to at most 100. Returns the sum.
pub fn validate(percents: &[Percent]) -> Result<Percent, OverAllocation> {
    let sum = percents
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(*p));
    if sum > Decimal::ONE_HUNDRED {
        Err(OverAllocation { sum })
    } else {
        Ok(sum)
    }
}

pub fn validate_deal(deal: &Deal) -> Result<Percent, OverAllocation> {
    let percents: Vec<Percent> = deal.allocations.iter().map(|a| a.percent).collect();
    validate(&percents)
}

/// Summarise a set of percentages without failing.
pub fn summarize(percents: &[Percent]) -> ValidationOutput {
    let (total_percent, is_valid) = match validate(percents) {
        Ok(sum) => (sum, true),
        Err(OverAllocation { sum }) => (sum, false),
    };
    ValidationOutput {
        total_percent,
        is_valid,
        company_headroom_pct: (Decimal::ONE_HUNDRED - total_percent).max(Decimal::ZERO),
        over_allocation_pct: (total_percent - Decimal::ONE_HUNDRED).max(Decimal::ZERO),
    }
}

/// Decide whether a deal enters the dataset.
///
/// Under strict validation an over-allocated deal is rejected; otherwise it
/// is admitted and the returned warnings describe the problem.
pub fn admit_deal(deal: &Deal, policy: &CommissionPolicy) -> CommissionResult<Vec<String>> {
    match validate_deal(deal) {
        Ok(_) => Ok(Vec::new()),
        Err(OverAllocation { sum }) if policy.strict_validation => {
            Err(CommissionError::OverAllocation {
                deal_id: deal.id.clone(),
                sum,
            })
        }
        Err(over) => {
            tracing::warn!(deal_id = %deal.id, sum = %over.sum, "admitting over-allocated deal");
            Ok(vec![format!("Deal {}: {}", deal.id, over)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::model::{Allocation, Role};
    use rust_decimal_macros::dec;

    fn over_allocated() -> Deal {
        Deal {
            id: "D9".into(),
            team_id: None,
            net_commission: dec!(1000),
            allocations: vec![
                Allocation::new("Alice", Role::Sales, dec!(60)),
                Allocation::new("Bob", Role::Supervisor, dec!(50)),
            ],
        }
    }

    #[test]
    fn test_rejects_over_100() {
        assert_eq!(
            validate(&[dec!(60), dec!(50)]),
            Err(OverAllocation { sum: dec!(110) })
        );
    }

    #[test]
    fn test_accepts_exactly_100() {
        assert_eq!(validate(&[dec!(60), dec!(40)]), Ok(dec!(100)));
    }

    #[test]
    fn test_accepts_under_100() {
        assert_eq!(validate(&[dec!(30), dec!(20)]), Ok(dec!(50)));
        assert_eq!(validate(&[]), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_summarize() {
        let ok = summarize(&[dec!(30), dec!(20)]);
        assert!(ok.is_valid);
        assert_eq!(ok.company_headroom_pct, dec!(50));
        assert_eq!(ok.over_allocation_pct, Decimal::ZERO);

        let bad = summarize(&[dec!(60), dec!(50)]);
        assert!(!bad.is_valid);
        assert_eq!(bad.total_percent, dec!(110));
        assert_eq!(bad.company_headroom_pct, Decimal::ZERO);
        assert_eq!(bad.over_allocation_pct, dec!(10));
    }

    #[test]
    fn test_admit_lenient_warns() {
        let warnings = admit_deal(&over_allocated(), &CommissionPolicy::default()).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("D9"));
        assert!(warnings[0].contains("110"));
    }

    #[test]
    fn test_admit_strict_rejects() {
        let policy = CommissionPolicy {
            strict_validation: true,
            ..Default::default()
        };
        match admit_deal(&over_allocated(), &policy).unwrap_err() {
            CommissionError::OverAllocation { deal_id, sum } => {
                assert_eq!(deal_id, "D9");
                assert_eq!(sum, dec!(110));
            }
            other => panic!("Expected OverAllocation, got: {other:?}"),
        }
    }
}
