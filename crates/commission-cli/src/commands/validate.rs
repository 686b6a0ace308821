use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use commission_core::commission::service::{self, ValidationInput};
use commission_core::commission::{CommissionPolicy, Deal, PercentScale};

use crate::config::PolicyArgs;
use crate::input;

/// Arguments for the percentage sum check
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a deal JSON file (overrides --percents)
    #[arg(long)]
    pub input: Option<String>,

    /// Allocation percentages (comma-separated, e.g. "30,20,10")
    #[arg(long, value_delimiter = ',')]
    pub percents: Option<Vec<Decimal>>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

pub fn run_validate(
    args: ValidateArgs,
    policy: &CommissionPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = args.policy.apply(policy);

    let validation_input = match input::read_payload::<Deal>(args.input.as_deref())? {
        Some(deal) => deal_validation_input(&deal, &policy)?,
        None => ValidationInput {
            percents: args
                .percents
                .ok_or("--percents is required (or provide --input)")?,
            percent_scale: policy.percent_scale,
        },
    };

    let result = service::run_validation(&validation_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Normalise the deal the same way a report would (scale, disabled roles)
/// so both commands agree on its percentage total.
fn deal_validation_input(
    deal: &Deal,
    policy: &CommissionPolicy,
) -> Result<ValidationInput, Box<dyn std::error::Error>> {
    let deal = deal.normalized(policy)?;
    Ok(ValidationInput {
        percents: deal.allocations.iter().map(|a| a.percent).collect::<Vec<Decimal>>(),
        percent_scale: PercentScale::Percent,
    })
}
