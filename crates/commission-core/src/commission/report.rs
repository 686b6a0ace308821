use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::aggregate::{AggregateReport, ParticipantTotal};
use super::allocation::allocate_deal;
use super::model::Deal;
use super::policy::RoundingPolicy;
use crate::error::CommissionError;
use crate::types::*;
use crate::CommissionResult;

/// Header of the per-participant export.
pub const CSV_HEADER: [&str; 2] = ["Name", "Total Commission"];

// ---------------------------------------------------------------------------
// Tabular report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub name: String,
    pub amount: Money,
}

/// Company-level figures, reported next to (never inside) the participant rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub deal_count: usize,
    pub total_net: Money,
    pub total_payout: Money,
    pub company_share: Money,
    pub company_share_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}

/// Lay out an aggregate as display rows plus a summary block.
pub fn format_report(report: &AggregateReport) -> ReportTable {
    ReportTable {
        rows: report
            .participants
            .iter()
            .map(|p| ReportRow {
                name: p.name.clone(),
                amount: p.amount,
            })
            .collect(),
        summary: ReportSummary {
            deal_count: report.deal_count,
            total_net: report.total_net,
            total_payout: report.total_distributed,
            company_share: report.company_share,
            company_share_pct: report.company_share_pct,
        },
    }
}

/// Render a money value with exactly two decimals.
pub fn format_money(value: Money) -> String {
    let mut v = value.round_dp(2);
    v.rescale(2);
    v.to_string()
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> CommissionResult<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| CommissionError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CommissionError::Csv(e.to_string()))
}

/// Per-participant export: `Name,Total Commission`, one row per participant,
/// no summary row. An empty report yields the header alone.
pub fn to_csv(report: &AggregateReport) -> CommissionResult<String> {
    let mut wtr = csv_writer();
    wtr.write_record(CSV_HEADER)?;
    for p in &report.participants {
        wtr.write_record([p.name.as_str(), &format_money(p.amount)])?;
    }
    finish_csv(wtr)
}

/// Read back an export produced by [`to_csv`].
pub fn parse_csv(text: &str) -> CommissionResult<Vec<ParticipantTotal>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.iter().map(str::trim).ne(CSV_HEADER.iter().copied()) {
        return Err(CommissionError::InvalidInput {
            field: "header".into(),
            reason: format!("Expected '{}', got '{}'", CSV_HEADER.join(","), headers.iter().collect::<Vec<_>>().join(",")),
        });
    }

    let mut totals = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let (name, amount) = match (record.get(0), record.get(1)) {
            (Some(name), Some(amount)) => (name, amount),
            _ => {
                return Err(CommissionError::InvalidInput {
                    field: format!("row {}", line + 1),
                    reason: "Expected two columns".into(),
                })
            }
        };
        let amount: Decimal = amount.trim().parse().map_err(|e: rust_decimal::Error| {
            CommissionError::InvalidInput {
                field: format!("row {}", line + 1),
                reason: format!("Invalid amount '{}': {}", amount, e),
            }
        })?;
        totals.push(ParticipantTotal {
            name: name.to_string(),
            amount,
        });
    }
    Ok(totals)
}

// ---------------------------------------------------------------------------
// Per-deal breakdown
// ---------------------------------------------------------------------------

/// What the breakdown's amount columns are keyed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownColumns {
    #[default]
    Participant,
    Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub deal_id: DealId,
    pub team_id: Option<TeamId>,
    pub net_commission: Money,
    /// Aligned with [`DealBreakdown::columns`]; 0 where the deal has no entry
    pub amounts: Vec<Money>,
    pub company_share: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealBreakdown {
    pub keyed_by: BreakdownColumns,
    /// Column labels in first-seen order
    pub columns: Vec<String>,
    pub rows: Vec<BreakdownRow>,
}

/// One row per deal with an amount column per contributing participant
/// (or role).
pub fn deal_breakdown(
    deals: &[Deal],
    keyed_by: BreakdownColumns,
    rounding: RoundingPolicy,
) -> DealBreakdown {
    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let per_deal: Vec<(&Deal, Vec<(usize, Money)>, Money)> = deals
        .iter()
        .map(|deal| {
            let split = allocate_deal(deal, rounding);
            let cells = split
                .results
                .into_iter()
                .map(|r| {
                    let key = match keyed_by {
                        BreakdownColumns::Participant => r.participant_name,
                        BreakdownColumns::Role => r.role.to_string(),
                    };
                    let col = *index.entry(key.clone()).or_insert_with(|| {
                        columns.push(key);
                        columns.len() - 1
                    });
                    (col, r.amount)
                })
                .collect();
            (deal, cells, split.company_share)
        })
        .collect();

    let zero = rounding.round_money(Decimal::ZERO);
    let rows = per_deal
        .into_iter()
        .map(|(deal, cells, company_share)| {
            let mut amounts = vec![zero; columns.len()];
            for (col, amount) in cells {
                amounts[col] += amount;
            }
            BreakdownRow {
                deal_id: deal.id.clone(),
                team_id: deal.team_id.clone(),
                net_commission: deal.net_commission,
                amounts,
                company_share,
            }
        })
        .collect();

    DealBreakdown {
        keyed_by,
        columns,
        rows,
    }
}

/// `Deal,Team,Net Commission,<columns…>,Company Share`, missing cells as `0.00`.
pub fn breakdown_to_csv(breakdown: &DealBreakdown) -> CommissionResult<String> {
    let mut wtr = csv_writer();

    let mut header: Vec<&str> = vec!["Deal", "Team", "Net Commission"];
    header.extend(breakdown.columns.iter().map(String::as_str));
    header.push("Company Share");
    wtr.write_record(&header)?;

    for row in &breakdown.rows {
        let mut record: Vec<String> = vec![
            row.deal_id.clone(),
            row.team_id.clone().unwrap_or_default(),
            format_money(row.net_commission),
        ];
        record.extend(row.amounts.iter().map(|a| format_money(*a)));
        record.push(format_money(row.company_share));
        wtr.write_record(&record)?;
    }
    finish_csv(wtr)
}
