use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use commission_core::commission::service::{self, AllocationInput};
use commission_core::commission::{Allocation, CommissionPolicy, Role};

use crate::config::PolicyArgs;
use crate::input;

/// Arguments for a single-deal split
#[derive(Args)]
pub struct AllocateArgs {
    /// Path to JSON input file with net_commission and allocations
    #[arg(long)]
    pub input: Option<String>,

    /// Net commission available on the deal
    #[arg(long)]
    pub net_commission: Option<Decimal>,

    /// Allocation as NAME:ROLE:PERCENT (repeatable, e.g. "Alice:Sales:30")
    #[arg(long = "allocation", value_parser = parse_allocation)]
    pub allocations: Vec<Allocation>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Parse `NAME:ROLE:PERCENT`. The name may itself contain colons.
fn parse_allocation(s: &str) -> Result<Allocation, String> {
    let mut parts = s.rsplitn(3, ':');
    let (Some(percent), Some(role), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected NAME:ROLE:PERCENT, got '{}'", s));
    };
    let percent: Decimal = percent
        .trim()
        .parse()
        .map_err(|e| format!("invalid percent '{}': {}", percent, e))?;
    let role = match role.parse::<Role>() {
        Ok(role) => role,
        Err(never) => match never {},
    };
    Ok(Allocation::new(name, role, percent))
}

/// Build the input from a JSON payload. A `policy` in the payload wins over
/// the loaded config; command-line overrides apply on top of either.
fn allocation_from_payload(
    mut payload: Value,
    config: &CommissionPolicy,
    overrides: &PolicyArgs,
) -> Result<AllocationInput, Box<dyn std::error::Error>> {
    let has_policy = payload.get("policy").is_some_and(|p| !p.is_null());
    if !has_policy {
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("policy".into(), serde_json::to_value(config)?);
        }
    }
    let mut alloc_input: AllocationInput = serde_json::from_value(payload)?;
    alloc_input.policy = overrides.apply(&alloc_input.policy);
    Ok(alloc_input)
}

pub fn run_allocate(
    args: AllocateArgs,
    policy: &CommissionPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let alloc_input = if let Some(payload) = input::read_payload::<Value>(args.input.as_deref())? {
        allocation_from_payload(payload, policy, &args.policy)?
    } else {
        let net = args
            .net_commission
            .ok_or("--net-commission is required (or provide --input)")?;
        AllocationInput {
            net_commission: net,
            allocations: args.allocations,
            policy: args.policy.apply(policy),
        }
    };

    let result = service::run_allocation(&alloc_input)?;
    Ok(serde_json::to_value(result)?)
}
