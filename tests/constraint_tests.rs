mod common;

use chrono::Days;
use common::{d, daily, schedule_of, RegistryBuilder};
use rotaforge::constraints::{Constraint, ManualOverrideConstraint, RotateByQueueConstraint};
use rotaforge::core_types::AssignmentKey;
use rotaforge::loader::OverrideRecord;
use rotaforge::schedule::Schedule;

fn override_at(date: chrono::NaiveDate, queue: &str, alias: &str) -> OverrideRecord {
    OverrideRecord {
        date,
        queue: queue.to_string(),
        alias: alias.to_string(),
    }
}

// --- MANUAL OVERRIDE ---

#[test]
fn test_override_pins_slot_and_is_idempotent() {
    let registry = RegistryBuilder::new()
        .engineers(3)
        .queues(&["Primary", "Secondary"])
        .build();
    let constraint = ManualOverrideConstraint::new(
        &registry,
        &[override_at(d(2017, 6, 2), "Secondary", "e2")],
    );
    assert_eq!(constraint.len(), 1);

    let schedule = Schedule::make_random(&registry, d(2017, 6, 1), d(2017, 6, 8));
    let once = constraint.constrain(&schedule);
    let twice = constraint.constrain(&once);
    assert_eq!(once, twice);

    let key = AssignmentKey::new(d(2017, 6, 2), registry.queue_by_name("Secondary"));
    assert_eq!(once.engineer_for(&key).unwrap().alias(), "e2");

    // Nothing else moved.
    let changed = schedule
        .iter()
        .zip(once.iter())
        .filter(|(a, b)| a.engineer != b.engineer)
        .count();
    assert!(changed <= 1);
}

#[test]
fn test_override_ignores_unknown_alias() {
    let registry = RegistryBuilder::new().engineers(2).build();
    let constraint =
        ManualOverrideConstraint::new(&registry, &[override_at(d(2017, 6, 2), "Primary", "ghost")]);
    assert!(constraint.is_empty());

    let schedule = Schedule::make_random(&registry, d(2017, 6, 1), d(2017, 6, 4));
    assert_eq!(constraint.constrain(&schedule), schedule);
}

// --- ROTATE BY QUEUE ---

#[test]
fn test_rotation_follows_primary() {
    let registry = RegistryBuilder::new()
        .engineers(6)
        .queues(&["Primary", "Secondary", "Tertiary"])
        .build();
    let history = Schedule::empty(registry.clone());
    let constraint = RotateByQueueConstraint::new(registry.clone(), &history);

    let schedule = Schedule::make_random(&registry, d(2017, 6, 1), d(2017, 6, 15));
    let rotated = constraint.constrain(&schedule);
    assert_eq!(rotated.len(), schedule.len());

    let queues = registry.active_queues();
    for day in rotated.days() {
        let primary = rotated
            .engineer_for(&AssignmentKey::new(day, queues[0].clone()))
            .unwrap();
        for (i, queue) in queues.iter().enumerate().skip(1) {
            let later = day.checked_add_days(Days::new(i as u64)).unwrap();
            if later > d(2017, 6, 14) {
                continue;
            }
            let holder = rotated
                .engineer_for(&AssignmentKey::new(later, queue.clone()))
                .unwrap();
            assert_eq!(holder, primary, "{} on {}", queue.name(), later);
        }
    }

    // Keys and their order are untouched.
    let before: Vec<_> = schedule.iter().map(|a| a.key.clone()).collect();
    let after: Vec<_> = rotated.iter().map(|a| a.key.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_rotation_backfills_from_history() {
    let registry = RegistryBuilder::new()
        .engineers(4)
        .queues(&["Primary", "Secondary"])
        .build();
    let history = daily(&registry, d(2017, 5, 31), &["e3"]);
    // Single-queue helper only fills Primary, which is what we want here.
    let constraint = RotateByQueueConstraint::new(registry.clone(), &history);

    let schedule = schedule_of(
        &registry,
        &[
            (d(2017, 6, 1), &["e0", "e1"]),
            (d(2017, 6, 2), &["e2", "e1"]),
        ],
    );
    let rotated = constraint.constrain(&schedule);
    let secondary = registry.queue_by_name("Secondary");
    let on = |day| {
        rotated
            .engineer_for(&AssignmentKey::new(day, secondary.clone()))
            .unwrap()
            .alias()
            .to_string()
    };
    assert_eq!(on(d(2017, 6, 1)), "e3");
    assert_eq!(on(d(2017, 6, 2)), "e0");
}

#[test]
fn test_rotation_single_queue_is_noop() {
    let registry = RegistryBuilder::new().engineers(3).build();
    let constraint = RotateByQueueConstraint::new(registry.clone(), &Schedule::empty(registry.clone()));
    let schedule = Schedule::make_random(&registry, d(2017, 6, 1), d(2017, 6, 8));
    assert_eq!(constraint.constrain(&schedule), schedule);
}
