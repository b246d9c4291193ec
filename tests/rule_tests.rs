mod common;

use common::{context, context_with_history, d, daily, schedule_of, RegistryBuilder};
use rotaforge::core_types::Engineer;
use rotaforge::loader::{ExclusionRecord, HolidayRecord};
use rotaforge::rules::{
    ClusteringRule, EveryoneParticipatesRule, FairnessRule, IncidentManagerRule,
    NoDoubleBookingRule, PaidHolidayRule, Rule, VacationRule,
};
use rstest::rstest;

// --- NO DOUBLE BOOKING ---

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
#[case(7)]
fn test_double_booking_counts_days(#[case] doubled: usize) {
    let registry = RegistryBuilder::new()
        .engineers(3)
        .queues(&["Primary", "Secondary"])
        .build();
    let rows: Vec<_> = (0..7u32)
        .map(|i| {
            let pair: &[&str] = if (i as usize) < doubled {
                &["e0", "e0"]
            } else {
                &["e1", "e2"]
            };
            (d(2017, 6, 1 + i), pair)
        })
        .collect();
    let schedule = schedule_of(&registry, &rows);

    assert_eq!(
        NoDoubleBookingRule.compute_fitness(&schedule),
        -10_000.0 * doubled as f64
    );
    assert_eq!(
        NoDoubleBookingRule::double_booked_days(&schedule).len(),
        doubled
    );
}

#[test]
fn test_double_booking_counts_each_day_once() {
    let registry = RegistryBuilder::new()
        .engineers(2)
        .queues(&["A", "B", "C"])
        .build();
    // Two engineers doubled on the same day still cost one day.
    let schedule = schedule_of(&registry, &[(d(2017, 6, 1), &["e0", "e0", "e0"])]);
    assert_eq!(NoDoubleBookingRule.compute_fitness(&schedule), -10_000.0);
}

// --- INCIDENT MANAGER ---

#[rstest]
#[case(&["im", "e0"], 0.0)]
#[case(&["e0", "e1"], -7.0)]
#[case(&["im", "im2"], -7.0)]
fn test_incident_manager_per_day(#[case] day: &[&str], #[case] expected: f64) {
    let registry = RegistryBuilder::new()
        .engineers(2)
        .engineer(Engineer::new("im", "Manager", "IM", None, true))
        .engineer(Engineer::new("im2", "Manager 2", "IM2", None, true))
        .queues(&["Primary", "Secondary"])
        .build();
    let schedule = schedule_of(&registry, &[(d(2017, 6, 1), day)]);
    assert_eq!(IncidentManagerRule.compute_fitness(&schedule), expected);
}

// --- EVERYONE PARTICIPATES ---

#[test]
fn test_participation_penalises_missing_engineers() {
    let registry = RegistryBuilder::new().engineers(4).build();
    let ctx = context(&registry, d(2017, 6, 1), d(2017, 6, 5));
    let rule = EveryoneParticipatesRule::new(&ctx);

    let all = daily(&registry, d(2017, 6, 1), &["e0", "e1", "e2", "e3"]);
    assert_eq!(rule.compute_fitness(&all), 0.0);

    let two = daily(&registry, d(2017, 6, 1), &["e0", "e1", "e0", "e1"]);
    assert_eq!(rule.compute_fitness(&two), -20_000.0);

    let mut out = Vec::new();
    rule.dump_stats(&two, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("e2"));
    assert!(text.contains("e3"));
}

// --- CLUSTERING ---

#[test]
fn test_clustering_statistics_split_on_gaps() {
    let registry = RegistryBuilder::new().engineers(2).build();
    let ctx = context(&registry, d(2017, 6, 1), d(2017, 6, 11));
    let rule = ClusteringRule::new(&ctx, &[]);

    // e0 on days 1-3 and 10; e1 fills the rest.
    let schedule = daily(
        &registry,
        d(2017, 6, 1),
        &["e0", "e0", "e0", "e1", "e1", "e1", "e1", "e1", "e1", "e0"],
    );
    let stats = rule.clustering_statistics(&schedule);
    let e0 = registry.engineer_by_alias("e0").unwrap();
    let s = &stats[e0.as_ref()];
    assert_eq!(s.durations, vec![3, 1]);
    // Gaps run from one cluster start to the next: day 10 - day 1.
    assert_eq!(s.gaps, vec![9.0]);
}

#[test]
fn test_clustering_merges_trailing_history() {
    let registry = RegistryBuilder::new().engineers(2).build();
    let history = daily(&registry, d(2017, 5, 29), &["e1", "e0", "e0"]);
    let ctx = context_with_history(&registry, history, d(2017, 6, 1), d(2017, 6, 5));
    let rule = ClusteringRule::new(&ctx, &[]);

    let e0 = registry.engineer_by_alias("e0").unwrap();
    let trailing = rule.trailing_cluster(&e0).unwrap();
    assert_eq!(trailing.start, d(2017, 5, 30));
    assert_eq!(trailing.length, 2);

    let schedule = daily(&registry, d(2017, 6, 1), &["e0", "e1", "e1", "e1"]);
    let stats = rule.clustering_statistics(&schedule);
    assert_eq!(stats[e0.as_ref()].durations, vec![3]);
}

#[test]
fn test_clustering_prefers_optimal_runs() {
    let registry = RegistryBuilder::new().engineers(2).build();
    let ctx = context(&registry, d(2017, 6, 1), d(2017, 6, 15));
    let rule = ClusteringRule::new(&ctx, &[]);

    let paired = daily(
        &registry,
        d(2017, 6, 1),
        &[
            "e0", "e0", "e1", "e1", "e0", "e0", "e1", "e1", "e0", "e0", "e1", "e1", "e0", "e0",
        ],
    );
    let alternating = daily(
        &registry,
        d(2017, 6, 1),
        &[
            "e0", "e1", "e0", "e1", "e0", "e1", "e0", "e1", "e0", "e1", "e0", "e1", "e0", "e1",
        ],
    );
    assert!(rule.compute_fitness(&paired) > rule.compute_fitness(&alternating));
}

#[test]
fn test_clustering_extended_rotation() {
    let registry = RegistryBuilder::new().engineers(2).build();
    let ctx = context(&registry, d(2017, 6, 1), d(2017, 6, 5));
    let rule = ClusteringRule::new(&ctx, &["E0".to_string()]);

    let e0 = registry.engineer_by_alias("e0").unwrap();
    let e1 = registry.engineer_by_alias("e1").unwrap();
    assert_eq!(rule.optimal_duration(&e0), 4);
    assert_eq!(rule.optimal_duration(&e1), 2);
}

// --- FAIRNESS ---

#[test]
fn test_fairness_zero_at_target() {
    let registry = RegistryBuilder::new().engineers(2).build();
    // Monday to Sunday, two full weeks.
    let ctx = context(&registry, d(2017, 6, 5), d(2017, 6, 19));
    let rule = FairnessRule::new(&ctx);

    let mut aliases = vec!["e0"; 7];
    aliases.extend(vec!["e1"; 7]);
    let even = daily(&registry, d(2017, 6, 5), &aliases);
    assert_eq!(rule.targets(d(2017, 6, 18)), (5.0, 2.0));
    assert_eq!(rule.compute_fitness(&even), 0.0);

    let lopsided = daily(&registry, d(2017, 6, 5), &vec!["e0"; 14]);
    // Weekdays 10/0 against 5: max 5, sum 10. Weekends 4/0 against 2: max 2, sum 4.
    assert_eq!(rule.compute_fitness(&lopsided), -(15.0 * 5.0 + 10.0) - (15.0 * 2.0 + 4.0));
}

#[rstest]
#[case(2, (5.0, 2.0))]
#[case(3, (3.0, 1.0))]
#[case(4, (2.0, 1.0))]
#[case(5, (2.0, 0.0))]
fn test_fairness_targets_drop_remainder(#[case] engineers: usize, #[case] expected: (f64, f64)) {
    let registry = RegistryBuilder::new().engineers(engineers).build();
    // 10 weekdays and 4 weekend days on one queue.
    let ctx = context(&registry, d(2017, 6, 5), d(2017, 6, 19));
    let rule = FairnessRule::new(&ctx);
    assert_eq!(rule.targets(d(2017, 6, 18)), expected);
}

#[test]
fn test_fairness_counts_history() {
    let registry = RegistryBuilder::new().engineers(2).build();
    let history = daily(&registry, d(2017, 5, 29), &vec!["e0"; 7]);
    let ctx = context_with_history(&registry, history, d(2017, 6, 5), d(2017, 6, 12));
    let rule = FairnessRule::new(&ctx);

    let catch_up = daily(&registry, d(2017, 6, 5), &vec!["e1"; 7]);
    let repeat = daily(&registry, d(2017, 6, 5), &vec!["e0"; 7]);
    assert_eq!(rule.compute_fitness(&catch_up), 0.0);
    assert!(rule.compute_fitness(&repeat) < rule.compute_fitness(&catch_up));
}

// --- VACATION ---

#[test]
fn test_vacation_penalises_excluded_days() {
    let registry = RegistryBuilder::new().engineers(2).build();
    let ctx = context(&registry, d(2017, 6, 1), d(2017, 6, 8));
    let records = vec![ExclusionRecord {
        alias: "e0".into(),
        start: d(2017, 6, 2),
        end: d(2017, 6, 3),
        queue: None,
    }];
    let rule = VacationRule::new(&ctx, &records);

    let clash = daily(&registry, d(2017, 6, 1), &["e0", "e0", "e0", "e1", "e1", "e1", "e1"]);
    let clear = daily(&registry, d(2017, 6, 1), &["e0", "e1", "e1", "e0", "e0", "e1", "e1"]);
    assert_eq!(rule.compute_fitness(&clash), -20_000.0);
    assert_eq!(rule.compute_fitness(&clear), 0.0);
}

// --- PAID HOLIDAY ---

#[test]
fn test_paid_holiday_is_report_only() {
    let registry = RegistryBuilder::new().engineers(2).build();
    let ctx = context(&registry, d(2017, 7, 1), d(2017, 7, 8));
    // Tuesday, no weekend extension.
    let rule = PaidHolidayRule::new(
        &ctx,
        &[HolidayRecord {
            start: d(2017, 7, 4),
            end: d(2017, 7, 4),
        }],
    );

    let schedule = daily(&registry, d(2017, 7, 1), &["e0", "e0", "e1", "e0", "e1", "e1", "e1"]);
    assert_eq!(rule.compute_fitness(&schedule), 0.0);
    assert!(rule.is_holiday(d(2017, 7, 4)));
    assert!(!rule.is_holiday(d(2017, 7, 3)));

    let counts = rule.per_engineer_counts(&schedule);
    let e0 = counts.iter().find(|(e, _)| e.alias() == "e0").unwrap();
    assert_eq!(e0.1, 1);
}
