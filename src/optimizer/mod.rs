//! Run configuration: the ordered rule and constraint lists plus the
//! population hyperparameters, and the generational search over it.

pub mod runner;

use crate::constraints::Constraint;
use crate::context::RunContext;
use crate::error::{RotaError, RotaResult};
use crate::registry::Registry;
use crate::rules::{Rule, RuleKind};
use crate::schedule::Schedule;
use chrono::NaiveDate;
use std::io::{self, Write};
use std::sync::Arc;

pub const DEFAULT_TOURNAMENT_SIZE: usize = 5;
const ELITE_FRACTION: f64 = 0.05;

pub struct SchedulerConfig {
    registry: Arc<Registry>,
    start: NaiveDate,
    end: NaiveDate,
    population: usize,
    tournament_size: usize,
    rules: Vec<Box<dyn Rule>>,
    constraints: Vec<Box<dyn Constraint>>,
}

impl SchedulerConfig {
    pub fn new(ctx: &RunContext, population: usize) -> RotaResult<Self> {
        if population == 0 {
            return Err(RotaError::Config("population must be at least 1".into()));
        }
        Ok(Self {
            registry: ctx.registry.clone(),
            start: ctx.start,
            end: ctx.end,
            population,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            rules: Vec::new(),
            constraints: Vec::new(),
        })
    }

    pub fn with_tournament_size(mut self, size: usize) -> RotaResult<Self> {
        if size == 0 {
            return Err(RotaError::Config("tournament size must be at least 1".into()));
        }
        self.tournament_size = size;
        Ok(self)
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn elite_size(&self) -> usize {
        (self.population as f64 * ELITE_FRACTION).floor() as usize
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    pub fn rules(&self) -> impl Iterator<Item = RuleKind> + '_ {
        self.rules.iter().map(|r| r.kind())
    }

    pub fn constraint_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constraints.iter().map(|c| c.name())
    }

    /// Sum of every rule's score.
    pub fn compute_fitness(&self, schedule: &Schedule) -> f64 {
        self.rules.iter().map(|r| r.compute_fitness(schedule)).sum()
    }

    pub fn fitness_breakdown(&self, schedule: &Schedule) -> Vec<(RuleKind, f64)> {
        self.rules
            .iter()
            .map(|r| (r.kind(), r.compute_fitness(schedule)))
            .collect()
    }

    /// Applies every constraint in registration order.
    pub fn constrain(&self, schedule: &Schedule) -> Schedule {
        self.constraints
            .iter()
            .fold(schedule.clone(), |s, c| c.constrain(&s))
    }

    /// A random schedule over the window with constraints applied.
    pub fn make_random(&self) -> Schedule {
        self.constrain(&Schedule::make_random(&self.registry, self.start, self.end))
    }

    pub fn dump_stats(&self, schedule: &Schedule, out: &mut dyn Write) -> io::Result<()> {
        for rule in &self.rules {
            rule.dump_stats(schedule, out)?;
        }
        Ok(())
    }
}
