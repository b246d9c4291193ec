use super::{Rule, RuleKind};
use crate::schedule::Schedule;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Per day without exactly one incident manager on duty.
const MISSING_MANAGER_PENALTY: f64 = 7.0;

/// Exactly one incident manager should be on duty each day.
pub struct IncidentManagerRule;

impl IncidentManagerRule {
    pub fn managers_per_day(schedule: &Schedule) -> BTreeMap<NaiveDate, usize> {
        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for a in schedule {
            let count = per_day.entry(a.date()).or_insert(0);
            if a.engineer.is_incident_manager() {
                *count += 1;
            }
        }
        per_day
    }
}

impl Rule for IncidentManagerRule {
    fn kind(&self) -> RuleKind {
        RuleKind::IncidentManager
    }

    fn compute_fitness(&self, schedule: &Schedule) -> f64 {
        let off = Self::managers_per_day(schedule)
            .values()
            .filter(|&&n| n != 1)
            .count();
        -MISSING_MANAGER_PENALTY * off as f64
    }

    fn dump_stats(&self, schedule: &Schedule, out: &mut dyn Write) -> io::Result<()> {
        let off: Vec<_> = Self::managers_per_day(schedule)
            .into_iter()
            .filter(|(_, n)| *n != 1)
            .collect();
        if off.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        writeln!(out, "{}", self.kind())?;
        for (day, n) in off {
            writeln!(out, " {} {} incident managers", day, n)?;
        }
        Ok(())
    }
}
