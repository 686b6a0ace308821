use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::{Allocation, Deal, Role};
use super::policy::RoundingPolicy;
use crate::types::*;

/// Monetary share computed for one allocation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub participant_name: String,
    pub role: Role,
    pub percent: Percent,
    /// `net_commission * percent / 100`, rounded to cents
    pub amount: Money,
}

/// Split of a single deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAllocation {
    pub net_commission: Money,
    pub results: Vec<AllocationResult>,
    /// Sum of the rounded amounts
    pub distributed_total: Money,
    /// `net_commission - distributed_total`; negative when over-allocated
    pub company_share: Money,
}

/// Split `net_commission` across `allocations`.
///
/// Rows with a blank participant name are skipped. Percentages are applied
/// as given, never rescaled, even when they sum past 100. Arithmetic
/// saturates at the `Decimal` range instead of overflowing.
pub fn allocate(
    net_commission: Money,
    allocations: &[Allocation],
    rounding: RoundingPolicy,
) -> DealAllocation {
    let mut results = Vec::with_capacity(allocations.len());
    let mut distributed_total = rounding.round_money(Decimal::ZERO);

    for alloc in allocations {
        let name = alloc.participant_name.trim();
        if name.is_empty() {
            tracing::debug!(role = %alloc.role, percent = %alloc.percent, "skipping allocation without a participant name");
            continue;
        }
        let amount = rounding.round_money(
            net_commission.saturating_mul(alloc.percent) / Decimal::ONE_HUNDRED,
        );
        distributed_total = distributed_total.saturating_add(amount);
        results.push(AllocationResult {
            participant_name: name.to_string(),
            role: alloc.role.clone(),
            percent: alloc.percent,
            amount,
        });
    }

    DealAllocation {
        net_commission,
        results,
        distributed_total,
        company_share: net_commission.saturating_sub(distributed_total),
    }
}

pub fn allocate_deal(deal: &Deal, rounding: RoundingPolicy) -> DealAllocation {
    allocate(deal.net_commission, &deal.allocations, rounding)
}
