use serde::{Deserialize, Serialize};

use super::model::{Deal, Team};
use crate::CommissionResult;

/// Source of deal and team snapshots. Storage lives behind this trait; the
/// commission math only ever sees the returned values.
pub trait DealRepository {
    fn list_deals(&self) -> CommissionResult<Vec<Deal>>;
    fn list_teams(&self) -> CommissionResult<Vec<Team>>;
}

/// In-memory snapshot of teams and deals, also the JSON shape of a portfolio
/// file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub deals: Vec<Deal>,
}

impl Portfolio {
    pub fn from_repository(repo: &impl DealRepository) -> CommissionResult<Self> {
        Ok(Self {
            teams: repo.list_teams()?,
            deals: repo.list_deals()?,
        })
    }
}

impl DealRepository for Portfolio {
    fn list_deals(&self) -> CommissionResult<Vec<Deal>> {
        Ok(self.deals.clone())
    }

    fn list_teams(&self) -> CommissionResult<Vec<Team>> {
        Ok(self.teams.clone())
    }
}
