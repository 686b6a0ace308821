//! Envelope-returning entry points used by the CLI and the bindings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::aggregate::{aggregate, aggregate_by_team};
use super::allocation::{allocate, DealAllocation};
use super::model::{Allocation, Deal, Team};
use super::policy::{CommissionPolicy, PercentScale};
use super::report::{deal_breakdown, format_report, BreakdownColumns, DealBreakdown, ReportTable};
use super::validator::{admit_deal, summarize, ValidationOutput};
use crate::error::CommissionError;
use crate::types::*;
use crate::CommissionResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationInput {
    pub percents: Vec<Decimal>,
    #[serde(default)]
    pub percent_scale: PercentScale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationInput {
    pub net_commission: Money,
    pub allocations: Vec<Allocation>,
    #[serde(default)]
    pub policy: CommissionPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommissionReportInput {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub policy: CommissionPolicy,
    /// Also produce one report per team
    #[serde(default)]
    pub by_team: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreakdownInput {
    #[serde(default)]
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub policy: CommissionPolicy,
    #[serde(default)]
    pub columns: BreakdownColumns,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamTable {
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
    #[serde(flatten)]
    pub table: ReportTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionReportOutput {
    #[serde(flatten)]
    pub table: ReportTable,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<TeamTable>,
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Normalise deals under `policy` and run the acceptance check on each.
/// Returns the admitted deals plus any warnings raised along the way.
pub fn ingest_deals(
    deals: &[Deal],
    policy: &CommissionPolicy,
) -> CommissionResult<(Vec<Deal>, Vec<String>)> {
    let mut admitted = Vec::with_capacity(deals.len());
    let mut warnings = Vec::new();
    for deal in deals {
        let deal = deal.normalized(policy)?;
        warnings.extend(admit_deal(&deal, policy)?);
        admitted.push(deal);
    }
    Ok((admitted, warnings))
}

pub fn ingest_teams(teams: &[Team]) -> CommissionResult<Vec<Team>> {
    teams.iter().map(Team::normalized).collect()
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Check a set of allocation percentages and report the sum and headroom.
pub fn run_validation(input: &ValidationInput) -> CommissionResult<ComputationOutput<ValidationOutput>> {
    let start = Instant::now();

    let max = input.percent_scale.max();
    let mut percents = Vec::with_capacity(input.percents.len());
    for (idx, p) in input.percents.iter().enumerate() {
        if *p < Decimal::ZERO || *p > max {
            return Err(CommissionError::InvalidInput {
                field: format!("percents[{}]", idx),
                reason: format!("Percent {} must be between 0 and {}", p, max),
            });
        }
        percents.push(input.percent_scale.to_canonical(*p));
    }

    let output = summarize(&percents);
    let mut warnings = Vec::new();
    if !output.is_valid {
        warnings.push(format!(
            "Allocations exceed 100% by {}%",
            output.over_allocation_pct
        ));
    }

    Ok(with_metadata(
        "Allocation percentage sum check (limit 100%)",
        serde_json::json!({
            "percent_scale": input.percent_scale,
            "num_allocations": input.percents.len(),
        }),
        warnings,
        start,
        output,
    ))
}

/// Split one deal's net commission among its participants.
pub fn run_allocation(input: &AllocationInput) -> CommissionResult<ComputationOutput<DealAllocation>> {
    let start = Instant::now();

    let deal = Deal {
        id: "deal".into(),
        team_id: None,
        net_commission: input.net_commission,
        allocations: input.allocations.clone(),
    };
    let (deals, warnings) = ingest_deals(std::slice::from_ref(&deal), &input.policy)?;
    let deal = &deals[0];

    let output = allocate(deal.net_commission, &deal.allocations, input.policy.rounding);

    Ok(with_metadata(
        "Per-deal commission split (amount = net x pct / 100, rounded to cents)",
        serde_json::json!({
            "net_commission": input.net_commission.to_string(),
            "num_allocations": input.allocations.len(),
            "policy": input.policy,
        }),
        warnings,
        start,
        output,
    ))
}

/// Aggregate a deal set into per-participant totals and the company share.
pub fn run_commission_report(
    input: &CommissionReportInput,
) -> CommissionResult<ComputationOutput<CommissionReportOutput>> {
    let start = Instant::now();

    let teams = ingest_teams(&input.teams)?;
    let (deals, warnings) = ingest_deals(&input.deals, &input.policy)?;
    let rounding = input.policy.rounding;

    let report = aggregate(&deals, rounding);
    let team_tables = if input.by_team {
        aggregate_by_team(&deals, &teams, rounding)
            .into_iter()
            .map(|t| TeamTable {
                team_id: t.team_id,
                team_name: t.team_name,
                table: format_report(&t.report),
            })
            .collect()
    } else {
        Vec::new()
    };

    let output = CommissionReportOutput {
        table: format_report(&report),
        teams: team_tables,
    };

    Ok(with_metadata(
        "Commission aggregation (same-name totals, first-seen order)",
        serde_json::json!({
            "num_deals": input.deals.len(),
            "num_teams": input.teams.len(),
            "by_team": input.by_team,
            "policy": input.policy,
        }),
        warnings,
        start,
        output,
    ))
}

/// Per-deal breakdown with one amount column per participant or role.
pub fn run_breakdown(input: &BreakdownInput) -> CommissionResult<ComputationOutput<DealBreakdown>> {
    let start = Instant::now();

    let (deals, warnings) = ingest_deals(&input.deals, &input.policy)?;
    let output = deal_breakdown(&deals, input.columns, input.policy.rounding);

    Ok(with_metadata(
        "Per-deal commission breakdown",
        serde_json::json!({
            "num_deals": input.deals.len(),
            "columns": input.columns,
            "policy": input.policy,
        }),
        warnings,
        start,
        output,
    ))
}
