use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::policy::CommissionPolicy;
use crate::error::CommissionError;
use crate::types::*;
use crate::CommissionResult;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Role a participant holds on a deal. Carried as metadata only; the
/// allocation math never branches on it.
///
/// Serialised as its display name; any other string reads back as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Sales,
    Supervisor,
    TeamLeader,
    SalesManager,
    GeneralManager,
    Other(String),
}

impl Role {
    /// The standard roles, in the order a deal form lists them.
    pub const STANDARD: [Role; 5] = [
        Role::Sales,
        Role::Supervisor,
        Role::TeamLeader,
        Role::SalesManager,
        Role::GeneralManager,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sales => f.write_str("Sales"),
            Role::Supervisor => f.write_str("Supervisor"),
            Role::TeamLeader => f.write_str("Team Leader"),
            Role::SalesManager => f.write_str("Sales Manager"),
            Role::GeneralManager => f.write_str("General Manager"),
            Role::Other(name) => f.write_str(name),
        }
    }
}

impl FromStr for Role {
    type Err = Infallible;

    /// Case, spacing, `-` and `_` are ignored. Unknown names become `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Ok(match key.as_str() {
            "sales" => Role::Sales,
            "supervisor" => Role::Supervisor,
            "teamleader" => Role::TeamLeader,
            "salesmanager" => Role::SalesManager,
            "generalmanager" => Role::GeneralManager,
            _ => Role::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

// ---------------------------------------------------------------------------
// Deals and teams
// ---------------------------------------------------------------------------

/// One participant's share of a deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub participant_name: String,
    pub role: Role,
    /// Share of the deal's net commission on the canonical 0-100 scale
    pub percent: Percent,
}

impl Allocation {
    pub fn new(participant_name: impl Into<String>, role: Role, percent: Percent) -> Self {
        Self {
            participant_name: participant_name.into(),
            role,
            percent,
        }
    }
}

/// A commission-generating transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    /// Total amount available for distribution
    pub net_commission: Money,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}

impl Deal {
    /// Sum of allocation percentages, empty-name rows included.
    pub fn total_percent(&self) -> Percent {
        self.allocations
            .iter()
            .fold(Decimal::ZERO, |acc, a| acc.saturating_add(a.percent))
    }

    /// Check field ranges, convert percentages to the canonical scale and
    /// drop allocations for roles the policy has disabled.
    pub fn normalized(&self, policy: &CommissionPolicy) -> CommissionResult<Deal> {
        if self.net_commission < Decimal::ZERO {
            return Err(CommissionError::InvalidInput {
                field: format!("deals[{}].net_commission", self.id),
                reason: "Net commission cannot be negative".into(),
            });
        }

        let scale = policy.percent_scale;
        let mut allocations = Vec::with_capacity(self.allocations.len());
        for (idx, alloc) in self.allocations.iter().enumerate() {
            if alloc.percent < Decimal::ZERO || alloc.percent > scale.max() {
                return Err(CommissionError::InvalidInput {
                    field: format!("deals[{}].allocations[{}].percent", self.id, idx),
                    reason: format!("Percent {} must be between 0 and {}", alloc.percent, scale.max()),
                });
            }
            if !policy.role_enabled(&alloc.role) {
                continue;
            }
            allocations.push(Allocation {
                participant_name: alloc.participant_name.clone(),
                role: alloc.role.clone(),
                percent: scale.to_canonical(alloc.percent),
            });
        }

        Ok(Deal {
            id: self.id.clone(),
            team_id: self.team_id.clone(),
            net_commission: self.net_commission,
            allocations,
        })
    }
}

/// Roster entry of a team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterMember {
    pub name: String,
    pub role: Role,
}

/// Optional grouping of deals. Deals reference participants by name, so the
/// roster is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub roster: Vec<RosterMember>,
}

impl Team {
    /// Reject blank names and collapse duplicate roster entries, keeping the
    /// first occurrence.
    pub fn normalized(&self) -> CommissionResult<Team> {
        if self.name.trim().is_empty() {
            return Err(CommissionError::InvalidInput {
                field: format!("teams[{}].name", self.id),
                reason: "Team name cannot be empty".into(),
            });
        }
        let mut roster: Vec<RosterMember> = Vec::with_capacity(self.roster.len());
        for member in &self.roster {
            if !roster.contains(member) {
                roster.push(member.clone());
            }
        }
        Ok(Team {
            id: self.id.clone(),
            name: self.name.trim().to_string(),
            roster,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::policy::PercentScale;
    use rust_decimal_macros::dec;

    fn deal(net: Money, allocations: Vec<Allocation>) -> Deal {
        Deal {
            id: "D1".into(),
            team_id: None,
            net_commission: net,
            allocations,
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("team leader".parse::<Role>().unwrap(), Role::TeamLeader);
        assert_eq!("Sales_Manager".parse::<Role>().unwrap(), Role::SalesManager);
        assert_eq!("GENERAL-MANAGER".parse::<Role>().unwrap(), Role::GeneralManager);
        assert_eq!(
            " Closer ".parse::<Role>().unwrap(),
            Role::Other("Closer".into())
        );
    }

    #[test]
    fn test_role_display_roundtrips_through_parse() {
        for role in Role::STANDARD {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_serde_uses_display_names() {
        let json = serde_json::to_string(&Role::TeamLeader).unwrap();
        assert_eq!(json, "\"Team Leader\"");
        let role: Role = serde_json::from_str("\"SalesManager\"").unwrap();
        assert_eq!(role, Role::SalesManager);
    }

    #[test]
    fn test_role_serde_accepts_custom_and_lowercase_names() {
        let allocs: Vec<Allocation> = serde_json::from_str(
            r#"[
                {"participant_name": "Alice", "role": "Closer", "percent": 10},
                {"participant_name": "Bob", "role": "sales", "percent": 5}
            ]"#,
        )
        .unwrap();
        assert_eq!(allocs[0].role, Role::Other("Closer".into()));
        assert_eq!(allocs[1].role, Role::Sales);
        assert_eq!(
            serde_json::to_string(&Role::Other("Closer".into())).unwrap(),
            "\"Closer\""
        );
    }

    #[test]
    fn test_normalize_fraction_scale() {
        let policy = CommissionPolicy {
            percent_scale: PercentScale::Fraction,
            ..Default::default()
        };
        let d = deal(dec!(1000), vec![Allocation::new("Alice", Role::Sales, dec!(0.3))]);
        let n = d.normalized(&policy).unwrap();
        assert_eq!(n.allocations[0].percent, dec!(30));
    }

    #[test]
    fn test_normalize_rejects_negative_net() {
        let d = deal(dec!(-1), vec![]);
        match d.normalized(&CommissionPolicy::default()).unwrap_err() {
            CommissionError::InvalidInput { field, .. } => {
                assert_eq!(field, "deals[D1].net_commission");
            }
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_normalize_rejects_out_of_scale_percent() {
        let policy = CommissionPolicy {
            percent_scale: PercentScale::Fraction,
            ..Default::default()
        };
        let d = deal(dec!(100), vec![Allocation::new("Alice", Role::Sales, dec!(30))]);
        assert!(d.normalized(&policy).is_err());
    }

    #[test]
    fn test_normalize_drops_disabled_roles() {
        let policy = CommissionPolicy {
            enabled_roles: Some(vec![Role::Sales]),
            ..Default::default()
        };
        let d = deal(
            dec!(1000),
            vec![
                Allocation::new("Alice", Role::Sales, dec!(30)),
                Allocation::new("Bob", Role::Supervisor, dec!(20)),
            ],
        );
        let n = d.normalized(&policy).unwrap();
        assert_eq!(n.allocations.len(), 1);
        assert_eq!(n.allocations[0].participant_name, "Alice");
    }

    #[test]
    fn test_team_normalize() {
        let team = Team {
            id: "T1".into(),
            name: " North ".into(),
            roster: vec![
                RosterMember { name: "Alice".into(), role: Role::Sales },
                RosterMember { name: "Alice".into(), role: Role::Sales },
                RosterMember { name: "Alice".into(), role: Role::TeamLeader },
            ],
        };
        let n = team.normalized().unwrap();
        assert_eq!(n.name, "North");
        assert_eq!(n.roster.len(), 2);

        let blank = Team { id: "T2".into(), name: "  ".into(), roster: vec![] };
        assert!(blank.normalized().is_err());
    }
}
