use commission_core::commission::{
    aggregate, aggregate_by_team, allocate, parse_csv, to_csv, validate, Allocation,
    CommissionPolicy, Deal, OverAllocation, ParticipantTotal, Role, RoundingPolicy, Team,
};
use commission_core::commission::service::{self, CommissionReportInput};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Known-answer scenarios
// ===========================================================================

fn deal(id: &str, net: Decimal, allocs: &[(&str, Role, Decimal)]) -> Deal {
    Deal {
        id: id.into(),
        team_id: None,
        net_commission: net,
        allocations: allocs
            .iter()
            .map(|(n, r, p)| Allocation::new(*n, r.clone(), *p))
            .collect(),
    }
}

#[test]
fn test_end_to_end_alice_bob() {
    let d = deal(
        "D1",
        dec!(1000),
        &[("Alice", Role::Sales, dec!(30)), ("Bob", Role::Supervisor, dec!(20))],
    );

    let split = allocate(d.net_commission, &d.allocations, RoundingPolicy::HalfEven);
    let pairs: Vec<(String, Decimal)> = split
        .results
        .iter()
        .map(|r| (r.participant_name.clone(), r.amount))
        .collect();
    assert_eq!(
        pairs,
        vec![("Alice".to_string(), dec!(300.00)), ("Bob".to_string(), dec!(200.00))]
    );
    assert_eq!(split.distributed_total, dec!(500.00));

    let report = aggregate(&[d], RoundingPolicy::HalfEven);
    assert_eq!(report.company_share, dec!(500.00));
    assert_eq!(report.company_share_pct, dec!(50.00));
}

#[test]
fn test_end_to_end_zero_net() {
    let d = deal(
        "D1",
        Decimal::ZERO,
        &[("Alice", Role::Sales, dec!(30)), ("Bob", Role::Supervisor, dec!(70))],
    );
    let report = aggregate(&[d], RoundingPolicy::HalfEven);
    for p in &report.participants {
        assert_eq!(p.amount, Decimal::ZERO);
    }
    assert_eq!(report.company_share, Decimal::ZERO);
    assert_eq!(report.company_share_pct, Decimal::ZERO);
}

#[test]
fn test_same_name_collapsing() {
    let deals = vec![
        deal("D1", dec!(1000), &[("Alice", Role::Sales, dec!(10))]),
        deal("D2", dec!(1000), &[("Alice", Role::Sales, dec!(10))]),
    ];
    let report = aggregate(&deals, RoundingPolicy::HalfEven);
    assert_eq!(report.amount_for("Alice"), Some(dec!(200.00)));
}

#[test]
fn test_validator_cases() {
    assert_eq!(validate(&[dec!(60), dec!(50)]), Err(OverAllocation { sum: dec!(110) }));
    assert!(validate(&[dec!(60), dec!(40)]).is_ok());
    assert!(validate(&[dec!(30), dec!(20)]).is_ok());
}

#[test]
fn test_csv_export_and_reparse() {
    let d = deal(
        "D1",
        dec!(1000),
        &[("Alice", Role::Sales, dec!(30)), ("Bob", Role::Supervisor, dec!(20))],
    );
    let report = aggregate(&[d], RoundingPolicy::HalfEven);
    let csv = to_csv(&report).unwrap();
    assert_eq!(csv, "Name,Total Commission\nAlice,300.00\nBob,200.00\n");
    assert_eq!(
        parse_csv(&csv).unwrap(),
        vec![
            ParticipantTotal { name: "Alice".into(), amount: dec!(300) },
            ParticipantTotal { name: "Bob".into(), amount: dec!(200) },
        ]
    );
}

#[test]
fn test_team_totals_sum_to_overall() {
    let teams = vec![
        Team { id: "T1".into(), name: "North".into(), roster: vec![] },
        Team { id: "T2".into(), name: "South".into(), roster: vec![] },
    ];
    let mut deals = vec![
        deal("D1", dec!(1200), &[("Alice", Role::Sales, dec!(25))]),
        deal("D2", dec!(800), &[("Bob", Role::Sales, dec!(15)), ("Alice", Role::TeamLeader, dec!(5))]),
        deal("D3", dec!(400), &[("Cara", Role::GeneralManager, dec!(2.5))]),
    ];
    deals[0].team_id = Some("T1".into());
    deals[1].team_id = Some("T2".into());
    deals[2].team_id = Some("T1".into());

    let overall = aggregate(&deals, RoundingPolicy::HalfEven);
    let per_team = aggregate_by_team(&deals, &teams, RoundingPolicy::HalfEven);

    let team_net: Decimal = per_team.iter().map(|t| t.report.total_net).sum();
    let team_company: Decimal = per_team.iter().map(|t| t.report.company_share).sum();
    assert_eq!(team_net, overall.total_net);
    assert_eq!(team_company, overall.company_share);
    assert_eq!(per_team[0].report.amount_for("Alice"), Some(dec!(300)));
    assert_eq!(per_team[1].report.amount_for("Alice"), Some(dec!(40)));
    assert_eq!(overall.amount_for("Alice"), Some(dec!(340)));
}

#[test]
fn test_report_from_json_with_fraction_policy() {
    let json = r#"{
        "policy": { "percent_scale": "fraction" },
        "deals": [
            { "id": "S1", "net_commission": 1000, "allocations": [
                { "participant_name": "Alice", "role": "Sales", "percent": "0.3" },
                { "participant_name": "", "role": "Supervisor", "percent": "0.2" }
            ]}
        ]
    }"#;
    let input: CommissionReportInput = serde_json::from_str(json).unwrap();
    let out = service::run_commission_report(&input).unwrap();
    let table = &out.result.table;
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].amount, dec!(300));
    assert_eq!(table.summary.company_share, dec!(700));
    assert_eq!(table.summary.company_share_pct, dec!(70));
}

#[test]
fn test_disabled_roles_excluded_from_report() {
    let input = CommissionReportInput {
        deals: vec![deal(
            "D1",
            dec!(1000),
            &[("Alice", Role::Sales, dec!(30)), ("Gus", Role::GeneralManager, dec!(5))],
        )],
        policy: CommissionPolicy {
            enabled_roles: Some(vec![Role::Sales]),
            ..Default::default()
        },
        ..Default::default()
    };
    let out = service::run_commission_report(&input).unwrap();
    assert_eq!(out.result.table.rows.len(), 1);
    assert_eq!(out.result.table.summary.company_share, dec!(700));
}

// ===========================================================================
// Properties
// ===========================================================================

/// Basis-point cut points that partition 100% into `n` shares.
fn full_split() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(0i64..=10_000, 0..5).prop_map(|mut cuts| {
        cuts.sort_unstable();
        let mut prev = 0i64;
        let mut shares = Vec::with_capacity(cuts.len() + 1);
        for c in cuts.into_iter().chain(std::iter::once(10_000)) {
            shares.push(Decimal::new(c - prev, 2));
            prev = c;
        }
        shares
    })
}

fn net_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn named(shares: &[Decimal]) -> Vec<Allocation> {
    shares
        .iter()
        .enumerate()
        .map(|(i, p)| Allocation::new(format!("P{}", i % 3), Role::Sales, *p))
        .collect()
}

proptest! {
    #[test]
    fn prop_full_split_distributes_net(net in net_amount(), shares in full_split()) {
        let allocations = named(&shares);
        let split = allocate(net, &allocations, RoundingPolicy::HalfEven);
        let tolerance = dec!(0.01) * Decimal::from(allocations.len());
        prop_assert!((split.distributed_total - net).abs() <= tolerance);
        prop_assert_eq!(split.company_share, net - split.distributed_total);
    }

    #[test]
    fn prop_nothing_allocated_goes_to_company(net in net_amount()) {
        let allocations = vec![Allocation::new("Alice", Role::Sales, Decimal::ZERO)];
        let split = allocate(net, &allocations, RoundingPolicy::HalfUp);
        prop_assert_eq!(split.company_share, net);
    }

    #[test]
    fn prop_aggregate_is_deterministic_and_order_independent(
        nets in prop::collection::vec(net_amount(), 1..6),
        shares in full_split(),
    ) {
        let deals: Vec<Deal> = nets
            .iter()
            .enumerate()
            .map(|(i, net)| Deal {
                id: format!("D{i}"),
                team_id: None,
                net_commission: *net,
                allocations: named(&shares),
            })
            .collect();

        let first = aggregate(&deals, RoundingPolicy::HalfEven);
        let again = aggregate(&deals, RoundingPolicy::HalfEven);
        prop_assert_eq!(to_csv(&first).unwrap(), to_csv(&again).unwrap());

        let mut reversed = deals.clone();
        reversed.reverse();
        let rev = aggregate(&reversed, RoundingPolicy::HalfEven);
        prop_assert_eq!(rev.total_net, first.total_net);
        prop_assert_eq!(rev.company_share, first.company_share);
    }

    #[test]
    fn prop_csv_roundtrip(amounts in prop::collection::vec(0i64..1_000_000, 0..8)) {
        let deals: Vec<Deal> = amounts
            .iter()
            .enumerate()
            .map(|(i, cents)| Deal {
                id: format!("D{i}"),
                team_id: None,
                net_commission: Decimal::new(*cents, 2),
                allocations: vec![Allocation::new(format!("Rep {i}"), Role::Sales, dec!(12.5))],
            })
            .collect();
        let report = aggregate(&deals, RoundingPolicy::HalfEven);
        let parsed = parse_csv(&to_csv(&report).unwrap()).unwrap();
        prop_assert_eq!(parsed, report.participants);
    }
}
