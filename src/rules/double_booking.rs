use super::{Rule, RuleKind, HARD_PENALTY};
use crate::core_types::Engineer;
use crate::schedule::Schedule;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};

/// An engineer may hold at most one queue per day.
pub struct NoDoubleBookingRule;

impl NoDoubleBookingRule {
    /// Days on which some engineer holds more than one queue, with the
    /// offending engineers.
    pub fn double_booked_days(schedule: &Schedule) -> BTreeMap<NaiveDate, Vec<&Engineer>> {
        let mut seen: HashSet<(NaiveDate, &Engineer)> = HashSet::with_capacity(schedule.len());
        let mut doubled: BTreeMap<NaiveDate, Vec<&Engineer>> = BTreeMap::new();
        for a in schedule {
            if !seen.insert((a.date(), a.engineer.as_ref())) {
                let list = doubled.entry(a.date()).or_default();
                if !list.contains(&a.engineer.as_ref()) {
                    list.push(a.engineer.as_ref());
                }
            }
        }
        doubled
    }
}

impl Rule for NoDoubleBookingRule {
    fn kind(&self) -> RuleKind {
        RuleKind::NoDoubleBooking
    }

    fn compute_fitness(&self, schedule: &Schedule) -> f64 {
        let mut seen: HashSet<(NaiveDate, &Engineer)> = HashSet::with_capacity(schedule.len());
        let mut doubled: HashSet<NaiveDate> = HashSet::new();
        for a in schedule {
            if !seen.insert((a.date(), a.engineer.as_ref())) {
                doubled.insert(a.date());
            }
        }
        -HARD_PENALTY * doubled.len() as f64
    }

    fn dump_stats(&self, schedule: &Schedule, out: &mut dyn Write) -> io::Result<()> {
        let doubled = Self::double_booked_days(schedule);
        if doubled.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        writeln!(out, "{}", self.kind())?;
        for (day, engineers) in doubled {
            let names: Vec<&str> = engineers.iter().map(|e| e.alias()).collect();
            writeln!(out, " {} {}", day, names.join(","))?;
        }
        Ok(())
    }
}
