use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use commission_core::commission::{Deal, DealRepository, Portfolio, Team};
use commission_core::{CommissionError, CommissionResult};

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

/// Portfolio file (`{"teams": [...], "deals": [...]}`) read on every call,
/// so each listing reflects the file as it is now.
pub struct JsonFileRepository {
    path: String,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> CommissionResult<Portfolio> {
        read_json::<Portfolio>(&self.path).map_err(|e| CommissionError::InvalidInput {
            field: "input".into(),
            reason: e.to_string(),
        })
    }
}

impl DealRepository for JsonFileRepository {
    fn list_deals(&self) -> CommissionResult<Vec<Deal>> {
        Ok(self.load()?.deals)
    }

    fn list_teams(&self) -> CommissionResult<Vec<Team>> {
        Ok(self.load()?.teams)
    }
}
