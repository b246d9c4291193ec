#![allow(dead_code)]

use chrono::NaiveDate;
use rotaforge::context::RunContext;
use rotaforge::core_types::{Assignment, AssignmentKey, Engineer, Queue};
use rotaforge::random::StrongRandom;
use rotaforge::registry::Registry;
use rotaforge::schedule::Schedule;
use std::sync::Arc;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Builder for registries used across the integration tests.
pub struct RegistryBuilder {
    engineers: Vec<Engineer>,
    queues: Vec<Queue>,
    seed: u64,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            engineers: Vec::new(),
            queues: vec![Queue::new("Primary")],
            seed: 42,
        }
    }

    /// `count` tenured engineers aliased `e0, e1, ...`.
    pub fn engineers(mut self, count: usize) -> Self {
        for i in 0..count {
            self.engineers.push(Engineer::new(
                format!("e{}", i),
                format!("Engineer {}", i),
                format!("E{}", i),
                None,
                false,
            ));
        }
        self
    }

    pub fn engineer(mut self, engineer: Engineer) -> Self {
        self.engineers.push(engineer);
        self
    }

    pub fn queues(mut self, names: &[&str]) -> Self {
        self.queues = names.iter().map(|n| Queue::new(*n)).collect();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Arc<Registry> {
        Arc::new(
            Registry::new(self.engineers, self.queues)
                .unwrap()
                .with_random(Arc::new(StrongRandom::with_seed(self.seed))),
        )
    }
}

/// A schedule from rows of aliases, one alias per active queue per day.
pub fn schedule_of(registry: &Arc<Registry>, rows: &[(NaiveDate, &[&str])]) -> Schedule {
    let queues = registry.active_queues();
    let mut assignments = Vec::new();
    for (date, aliases) in rows {
        for (queue, alias) in queues.iter().zip(aliases.iter()) {
            let engineer = registry
                .engineer_by_alias(alias)
                .unwrap_or_else(|| panic!("unknown alias {}", alias));
            assignments.push(Assignment::new(
                AssignmentKey::new(*date, queue.clone()),
                engineer,
            ));
        }
    }
    Schedule::new(registry.clone(), assignments)
}

/// One engineer per day on a single-queue registry, starting at `start`.
pub fn daily(registry: &Arc<Registry>, start: NaiveDate, aliases: &[&str]) -> Schedule {
    let rows: Vec<(NaiveDate, [&str; 1])> = aliases
        .iter()
        .zip(start.iter_days())
        .map(|(a, date)| (date, [*a]))
        .collect();
    let refs: Vec<(NaiveDate, &[&str])> = rows.iter().map(|(d, a)| (*d, &a[..])).collect();
    schedule_of(registry, &refs)
}

pub fn context(registry: &Arc<Registry>, start: NaiveDate, end: NaiveDate) -> RunContext {
    RunContext::new(registry.clone(), Schedule::empty(registry.clone()), start, end).unwrap()
}

pub fn context_with_history(
    registry: &Arc<Registry>,
    history: Schedule,
    start: NaiveDate,
    end: NaiveDate,
) -> RunContext {
    RunContext::new(registry.clone(), history, start, end).unwrap()
}
