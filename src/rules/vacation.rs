use super::{Rule, RuleKind, HARD_PENALTY};
use crate::context::RunContext;
use crate::core_types::{Assignment, AssignmentKey};
use crate::loader::ExclusionRecord;
use crate::schedule::Schedule;
use crate::util;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;
use std::io::{self, Write};
use tracing::warn;

/// Exclusions longer than this many days are flagged for confirmation.
pub const LONG_EXCLUSION_DAYS: usize = 90;

/// Nobody is scheduled while excluded, or before their start date.
pub struct VacationRule {
    start: NaiveDate,
    /// Queue-less keys exclude every queue that day.
    exclusions: HashMap<NaiveDate, Vec<Assignment>>,
    warnings: Vec<String>,
}

impl VacationRule {
    pub fn new(ctx: &RunContext, records: &[ExclusionRecord]) -> Self {
        let registry = &ctx.registry;
        let mut exclusions: HashMap<NaiveDate, Vec<Assignment>> = HashMap::new();
        let mut warnings = Vec::new();

        for record in records {
            let Some(engineer) = registry.engineer_by_alias(&record.alias) else {
                warn!("Ignoring exclusion for unknown engineer '{}'", record.alias);
                continue;
            };
            let queue = record.queue.as_deref().map(|q| registry.queue_by_name(q));

            // Out from Saturday means off the Friday shift as well.
            let mut first = record.start;
            if first.weekday() == Weekday::Sat {
                first = first.pred_opt().unwrap_or(first);
            }

            let days: Vec<NaiveDate> = util::date_sequence(first, record.end)
                .filter(|d| *d > ctx.start)
                .collect();

            if days.len() > LONG_EXCLUSION_DAYS {
                let message = format!(
                    "Engineer {}'s exclusion {} - {} exceeds {} days",
                    record.alias, first, record.end, LONG_EXCLUSION_DAYS
                );
                warn!("{}", message);
                warnings.push(message);
            }

            for date in days {
                let key = AssignmentKey {
                    date,
                    queue: queue.clone(),
                };
                exclusions
                    .entry(date)
                    .or_default()
                    .push(Assignment::new(key, engineer.clone()));
            }
        }

        for engineer in registry.active_engineers() {
            let Some(joined) = engineer.start_date() else {
                continue;
            };
            let Some(last_absent) = joined.pred_opt() else {
                continue;
            };
            for date in util::date_sequence(ctx.start, last_absent) {
                exclusions
                    .entry(date)
                    .or_default()
                    .push(Assignment::new(AssignmentKey::any_queue(date), engineer.clone()));
            }
        }

        Self {
            start: ctx.start,
            exclusions,
            warnings,
        }
    }

    /// Soft warnings raised while reading the exclusions.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn violations<'a>(&'a self, schedule: &'a Schedule) -> impl Iterator<Item = &'a Assignment> {
        schedule
            .iter()
            .filter(move |a| a.date() > self.start)
            .flat_map(move |a| {
                self.exclusions
                    .get(&a.date())
                    .into_iter()
                    .flatten()
                    .filter(move |x| {
                        x.engineer == a.engineer
                            && (x.key.queue.is_none() || x.key.queue == a.key.queue)
                    })
                    .map(move |_| a)
            })
    }
}

impl Rule for VacationRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Vacation
    }

    fn compute_fitness(&self, schedule: &Schedule) -> f64 {
        -HARD_PENALTY * self.violations(schedule).count() as f64
    }

    fn dump_stats(&self, schedule: &Schedule, out: &mut dyn Write) -> io::Result<()> {
        let hits: Vec<&Assignment> = self.violations(schedule).collect();
        if hits.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        writeln!(out, "{}", self.kind())?;
        for a in hits {
            let queue = a.key.queue.as_ref().map(|q| q.name()).unwrap_or("*");
            writeln!(out, " {} {} {}", a.date(), queue, a.engineer.alias())?;
        }
        Ok(())
    }
}
