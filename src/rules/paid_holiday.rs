use super::{Rule, RuleKind};
use crate::context::RunContext;
use crate::core_types::Engineer;
use crate::loader::HolidayRecord;
use crate::registry::Registry;
use crate::schedule::Schedule;
use crate::util;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Arc;

/// Reports how many holiday shifts each engineer has worked. Does not score.
pub struct PaidHolidayRule {
    registry: Arc<Registry>,
    history: Schedule,
    holidays: HashSet<NaiveDate>,
}

impl PaidHolidayRule {
    pub fn new(ctx: &RunContext, records: &[HolidayRecord]) -> Self {
        let mut holidays = HashSet::new();
        for record in records {
            holidays.extend(util::date_sequence(
                long_weekend_start(record.start),
                long_weekend_end(record.end),
            ));
        }
        Self {
            registry: ctx.registry.clone(),
            history: ctx.history.clone(),
            holidays,
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Holiday assignments per active engineer over history overlaid with
    /// `schedule`, in declaration order.
    pub fn per_engineer_counts(&self, schedule: &Schedule) -> Vec<(Arc<Engineer>, usize)> {
        let combined = self.history.combine(schedule);
        self.registry
            .active_engineers()
            .iter()
            .map(|e| {
                let n = combined
                    .iter()
                    .filter(|a| &a.engineer == e && self.is_holiday(a.date()))
                    .count();
                (e.clone(), n)
            })
            .collect()
    }
}

/// A Monday holiday starts the long weekend on Saturday.
fn long_weekend_start(date: NaiveDate) -> NaiveDate {
    if date.weekday() == Weekday::Mon {
        date.checked_sub_days(Days::new(2)).unwrap_or(date)
    } else {
        date
    }
}

/// A Friday holiday runs through Sunday.
fn long_weekend_end(date: NaiveDate) -> NaiveDate {
    if date.weekday() == Weekday::Fri {
        date.checked_add_days(Days::new(2)).unwrap_or(date)
    } else {
        date
    }
}

impl Rule for PaidHolidayRule {
    fn kind(&self) -> RuleKind {
        RuleKind::PaidHoliday
    }

    fn compute_fitness(&self, _schedule: &Schedule) -> f64 {
        0.0
    }

    fn dump_stats(&self, schedule: &Schedule, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.kind())?;
        let mut counts = self.per_engineer_counts(schedule);
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        for (e, n) in counts {
            writeln!(out, "{}\t{}", e, n)?;
        }
        Ok(())
    }
}
