use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use rotaforge::context::RunContext;
use rotaforge::core_types::{Engineer, Queue};
use rotaforge::optimizer::SchedulerConfig;
use rotaforge::random::StrongRandom;
use rotaforge::registry::Registry;
use rotaforge::rules::{self, RuleInputs};
use rotaforge::schedule::Schedule;
use std::hint::black_box;
use std::sync::Arc;
use strum::IntoEnumIterator;

fn setup_config() -> SchedulerConfig {
    let engineers = (0..20)
        .map(|i| {
            Engineer::new(
                format!("e{}", i),
                format!("Engineer {}", i),
                format!("E{}", i),
                None,
                i % 5 == 0,
            )
        })
        .collect();
    let queues = vec![Queue::new("Primary"), Queue::new("Secondary")];
    let registry = Arc::new(
        Registry::new(engineers, queues)
            .expect("Failed to build registry")
            .with_random(Arc::new(StrongRandom::with_seed(1))),
    );

    let start = NaiveDate::from_ymd_opt(2017, 6, 1).expect("valid date");
    let history = Schedule::make_random(
        &registry,
        NaiveDate::from_ymd_opt(2016, 6, 1).expect("valid date"),
        start,
    );
    let end = NaiveDate::from_ymd_opt(2017, 6, 29).expect("valid date");
    let ctx = RunContext::new(registry, history, start, end).expect("valid window");

    let mut config = SchedulerConfig::new(&ctx, 300).expect("valid population");
    let inputs = RuleInputs::default();
    for kind in rules::RuleKind::iter().filter(|k| k.enabled_by_default()) {
        config.add_rule(rules::build_rule(kind, &ctx, &inputs));
    }
    config
}

fn criterion_benchmark(c: &mut Criterion) {
    let config = setup_config();
    let schedule = config.make_random();

    c.bench_function("compute_fitness (28 days, 1y history)", |b| {
        b.iter(|| config.compute_fitness(black_box(&schedule)))
    });

    c.bench_function("cross + mutate", |b| {
        let partner = config.make_random();
        b.iter(|| {
            let child = schedule.cross(black_box(&partner)).expect("same window");
            child.mutate(black_box(45))
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
