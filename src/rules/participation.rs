use super::{Rule, RuleKind, HARD_PENALTY};
use crate::context::RunContext;
use crate::core_types::Engineer;
use crate::registry::Registry;
use crate::schedule::Schedule;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Arc;

/// Every active engineer should appear at least once.
pub struct EveryoneParticipatesRule {
    registry: Arc<Registry>,
}

impl EveryoneParticipatesRule {
    pub fn new(ctx: &RunContext) -> Self {
        Self {
            registry: ctx.registry.clone(),
        }
    }

    fn used<'a>(&self, schedule: &'a Schedule) -> HashSet<&'a Engineer> {
        schedule
            .iter()
            .map(|a| a.engineer.as_ref())
            .filter(|e| self.registry.is_active_engineer(e))
            .collect()
    }
}

impl Rule for EveryoneParticipatesRule {
    fn kind(&self) -> RuleKind {
        RuleKind::EveryoneParticipates
    }

    fn compute_fitness(&self, schedule: &Schedule) -> f64 {
        let used = self.used(schedule).len() as f64;
        let total = self.registry.active_engineers().len() as f64;
        (used - total) * HARD_PENALTY
    }

    fn dump_stats(&self, schedule: &Schedule, out: &mut dyn Write) -> io::Result<()> {
        let used = self.used(schedule);
        let missing: Vec<&str> = self
            .registry
            .active_engineers()
            .iter()
            .filter(|&e| !used.contains(&**e))
            .map(|e| e.alias())
            .collect();
        if !missing.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", self.kind())?;
            writeln!(out, " Not scheduled: {}", missing.join(","))?;
        }
        Ok(())
    }
}
