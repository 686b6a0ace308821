use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::allocation::allocate_deal;
use super::model::{Deal, Team};
use super::policy::RoundingPolicy;
use crate::types::*;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Running total for one participant name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantTotal {
    pub name: String,
    pub amount: Money,
}

/// Totals across a set of deals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// One entry per participant name, in first-seen order
    pub participants: Vec<ParticipantTotal>,
    /// Sum of net commission across included deals
    pub total_net: Money,
    /// Sum of all allocated amounts
    pub total_distributed: Money,
    /// `total_net - total_distributed`
    pub company_share: Money,
    /// Company share as a percentage of total net (0 when total net is 0)
    pub company_share_pct: Percent,
    pub deal_count: usize,
}

impl AggregateReport {
    pub fn amount_for(&self, name: &str) -> Option<Money> {
        self.participants
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.amount)
    }
}

/// Aggregate for one team's deals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    /// `None` groups deals that carry no team reference
    pub team_id: Option<TeamId>,
    /// `None` when the id has no matching team record
    pub team_name: Option<String>,
    pub report: AggregateReport,
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

struct Accumulator {
    rounding: RoundingPolicy,
    index: HashMap<String, usize>,
    participants: Vec<ParticipantTotal>,
    total_net: Money,
    total_distributed: Money,
    deal_count: usize,
}

impl Accumulator {
    fn new(rounding: RoundingPolicy) -> Self {
        Self {
            rounding,
            index: HashMap::new(),
            participants: Vec::new(),
            total_net: Decimal::ZERO,
            total_distributed: rounding.round_money(Decimal::ZERO),
            deal_count: 0,
        }
    }

    fn add(&mut self, deal: &Deal) {
        let split = allocate_deal(deal, self.rounding);
        self.total_net = self.total_net.saturating_add(deal.net_commission);
        self.total_distributed = self.total_distributed.saturating_add(split.distributed_total);
        self.deal_count += 1;

        for result in split.results {
            let slot = self.index.get(&result.participant_name).copied();
            match slot {
                Some(i) => {
                    let total = &mut self.participants[i].amount;
                    *total = total.saturating_add(result.amount);
                }
                None => {
                    self.index
                        .insert(result.participant_name.clone(), self.participants.len());
                    self.participants.push(ParticipantTotal {
                        name: result.participant_name,
                        amount: result.amount,
                    });
                }
            }
        }
    }

    fn finish(self) -> AggregateReport {
        let company_share = self
            .rounding
            .round_money(self.total_net.saturating_sub(self.total_distributed));
        let company_share_pct = if self.total_net.is_zero() {
            Decimal::ZERO
        } else {
            self.rounding
                .round_money((company_share / self.total_net).saturating_mul(Decimal::ONE_HUNDRED))
        };

        AggregateReport {
            participants: self.participants,
            total_net: self.total_net,
            total_distributed: self.total_distributed,
            company_share,
            company_share_pct,
            deal_count: self.deal_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Fold every deal's split into per-participant and overall totals.
///
/// Amounts for the same participant name are summed across deals and roles.
/// Totals saturate at the `Decimal` range rather than overflow.
pub fn aggregate(deals: &[Deal], rounding: RoundingPolicy) -> AggregateReport {
    let mut acc = Accumulator::new(rounding);
    for deal in deals {
        acc.add(deal);
    }
    let report = acc.finish();
    tracing::debug!(
        deals = report.deal_count,
        participants = report.participants.len(),
        total_net = %report.total_net,
        company_share = %report.company_share,
        "aggregated deals"
    );
    report
}

/// Aggregate deals per team, in first-seen order of team references.
///
/// Team ids without a matching record keep their own group; there is no
/// referential integrity between deals and teams.
pub fn aggregate_by_team(
    deals: &[Deal],
    teams: &[Team],
    rounding: RoundingPolicy,
) -> Vec<TeamReport> {
    let names: HashMap<&str, &str> = teams
        .iter()
        .map(|t| (t.id.as_str(), t.name.as_str()))
        .collect();

    let mut order: Vec<Option<TeamId>> = Vec::new();
    let mut groups: HashMap<Option<TeamId>, Accumulator> = HashMap::new();

    for deal in deals {
        let acc = groups.entry(deal.team_id.clone()).or_insert_with(|| {
            order.push(deal.team_id.clone());
            Accumulator::new(rounding)
        });
        acc.add(deal);
    }

    order
        .into_iter()
        .filter_map(|team_id| {
            let acc = groups.remove(&team_id)?;
            let team_name = team_id
                .as_deref()
                .and_then(|id| names.get(id))
                .map(|name| name.to_string());
            if team_id.is_some() && team_name.is_none() {
                tracing::debug!(team_id = ?team_id, "deals reference an unknown team");
            }
            Some(TeamReport {
                team_id,
                team_name,
                report: acc.finish(),
            })
        })
        .collect()
}
