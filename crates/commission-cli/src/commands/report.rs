use clap::{Args, ValueEnum};
use serde_json::{Map, Value};

use commission_core::commission::report::format_money;
use commission_core::commission::service::{self, BreakdownInput, CommissionReportInput};
use commission_core::commission::{
    aggregate, breakdown_to_csv, deal_breakdown, to_csv, BreakdownColumns, CommissionPolicy,
    DealBreakdown, Portfolio,
};

use crate::config::PolicyArgs;
use crate::input;
use crate::input::file::JsonFileRepository;
use crate::output;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColumnsArg {
    Participant,
    Role,
}

impl From<ColumnsArg> for BreakdownColumns {
    fn from(arg: ColumnsArg) -> Self {
        match arg {
            ColumnsArg::Participant => BreakdownColumns::Participant,
            ColumnsArg::Role => BreakdownColumns::Role,
        }
    }
}

/// Load a portfolio from `--input` (through the file repository) or stdin.
fn load_portfolio(path: Option<&str>) -> Result<Portfolio, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        let repo = JsonFileRepository::new(path);
        return Ok(Portfolio::from_repository(&repo)?);
    }
    input::read_payload::<Portfolio>(None)?
        .ok_or_else(|| "--input <portfolio.json> or stdin required".into())
}

/// Arguments for the aggregate report
#[derive(Args)]
pub struct ReportArgs {
    /// Path to portfolio JSON ({"teams": [...], "deals": [...]})
    #[arg(long)]
    pub input: Option<String>,

    /// Add one report per team
    #[arg(long)]
    pub by_team: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

pub fn run_report(
    args: ReportArgs,
    policy: &CommissionPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = load_portfolio(args.input.as_deref())?;
    let report_input = CommissionReportInput {
        teams: portfolio.teams,
        deals: portfolio.deals,
        policy: args.policy.apply(policy),
        by_team: args.by_team,
    };
    let result = service::run_commission_report(&report_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the per-deal breakdown
#[derive(Args)]
pub struct BreakdownArgs {
    /// Path to portfolio JSON
    #[arg(long)]
    pub input: Option<String>,

    /// Key the amount columns by participant or by role
    #[arg(long, default_value = "participant")]
    pub columns: ColumnsArg,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Flatten breakdown rows into objects keyed by column label so the table
/// and CSV renderers show one column per participant (or role).
fn breakdown_rows(breakdown: &DealBreakdown) -> Value {
    let rows = breakdown
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            obj.insert("deal".into(), Value::String(row.deal_id.clone()));
            obj.insert(
                "team".into(),
                Value::String(row.team_id.clone().unwrap_or_default()),
            );
            obj.insert(
                "net_commission".into(),
                Value::String(format_money(row.net_commission)),
            );
            for (label, amount) in breakdown.columns.iter().zip(&row.amounts) {
                obj.insert(label.clone(), Value::String(format_money(*amount)));
            }
            obj.insert(
                "company_share".into(),
                Value::String(format_money(row.company_share)),
            );
            Value::Object(obj)
        })
        .collect();
    Value::Array(rows)
}

pub fn run_breakdown(
    args: BreakdownArgs,
    policy: &CommissionPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = load_portfolio(args.input.as_deref())?;
    let breakdown_input = BreakdownInput {
        deals: portfolio.deals,
        policy: args.policy.apply(policy),
        columns: args.columns.into(),
    };
    let result = service::run_breakdown(&breakdown_input)?;
    let rows = breakdown_rows(&result.result);

    let mut value = serde_json::to_value(&result)?;
    if let Some(res) = value.get_mut("result").and_then(Value::as_object_mut) {
        res.insert("rows".into(), rows);
    }
    Ok(value)
}

/// Arguments for CSV export
#[derive(Args)]
pub struct ExportArgs {
    /// Path to portfolio JSON
    #[arg(long)]
    pub input: Option<String>,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<String>,

    /// Export the per-deal breakdown instead of participant totals
    #[arg(long)]
    pub breakdown: bool,

    /// Breakdown column key (with --breakdown)
    #[arg(long, default_value = "participant")]
    pub columns: ColumnsArg,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Write the CSV export. Over-allocation warnings go to the log, not the file.
pub fn run_export(
    args: ExportArgs,
    policy: &CommissionPolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = args.policy.apply(policy);
    let portfolio = load_portfolio(args.input.as_deref())?;
    let (deals, warnings) = service::ingest_deals(&portfolio.deals, &policy)?;
    for w in &warnings {
        tracing::warn!("{}", w);
    }

    let csv = if args.breakdown {
        breakdown_to_csv(&deal_breakdown(&deals, args.columns.into(), policy.rounding))?
    } else {
        to_csv(&aggregate(&deals, policy.rounding))?
    };

    output::write_text(args.out.as_deref(), &csv)
}
