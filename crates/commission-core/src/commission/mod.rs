//! Sales commission splitting.
//!
//! Deals flow through ingestion ([`model`]), percentage validation
//! ([`validator`]), per-deal allocation ([`allocation`]), aggregation across
//! the deal set ([`aggregate`]) and finally report formatting ([`report`]).
//! [`service`] bundles these into envelope-returning entry points.

pub mod aggregate;
pub mod allocation;
pub mod model;
pub mod policy;
pub mod report;
pub mod repository;
pub mod service;
pub mod validator;

pub use aggregate::{aggregate, aggregate_by_team, AggregateReport, ParticipantTotal, TeamReport};
pub use allocation::{allocate, allocate_deal, AllocationResult, DealAllocation};
pub use model::{Allocation, Deal, Role, RosterMember, Team};
pub use policy::{CommissionPolicy, PercentScale, RoundingPolicy};
pub use report::{
    breakdown_to_csv, deal_breakdown, format_report, parse_csv, to_csv, BreakdownColumns,
    DealBreakdown, ReportRow, ReportTable,
};
pub use repository::{DealRepository, Portfolio};
pub use validator::{admit_deal, validate, validate_deal, OverAllocation};
