use clap::{Args, ValueEnum};
use std::fs;
use std::path::Path;

use commission_core::commission::{CommissionPolicy, PercentScale};

/// Policy file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "commission.yaml";

/// Load the commission policy: explicit file, then the default file, then
/// built-in defaults.
pub fn load_policy(path: Option<&str>) -> Result<CommissionPolicy, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => Path::new(p).to_path_buf(),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                tracing::debug!("no {} found, using default policy", DEFAULT_CONFIG_FILE);
                return Ok(CommissionPolicy::default());
            }
            default.to_path_buf()
        }
    };

    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let policy = CommissionPolicy::from_yaml_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), ?policy, "loaded commission policy");
    Ok(policy)
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScaleArg {
    /// 0-100
    Percent,
    /// 0-1
    Fraction,
}

impl From<ScaleArg> for PercentScale {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::Percent => PercentScale::Percent,
            ScaleArg::Fraction => PercentScale::Fraction,
        }
    }
}

/// Per-command overrides on top of the loaded policy.
#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Reject over-allocated deals instead of warning
    #[arg(long)]
    pub strict: bool,

    /// Scale the input percentages are expressed on
    #[arg(long)]
    pub scale: Option<ScaleArg>,
}

impl PolicyArgs {
    pub fn apply(&self, policy: &CommissionPolicy) -> CommissionPolicy {
        let mut policy = policy.clone();
        if self.strict {
            policy.strict_validation = true;
        }
        if let Some(scale) = self.scale {
            policy.percent_scale = scale.into();
        }
        policy
    }
}
