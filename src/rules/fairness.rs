//! Equal weekday and weekend load across engineers, over all recorded history.
//!
//! Engineers who joined after history began receive a credit proportional to
//! the time they were absent, so they are not pushed to catch up on days
//! before they existed. The credit overshoots by 15%.

use super::{Rule, RuleKind};
use crate::context::RunContext;
use crate::core_types::{AssignmentKey, Engineer};
use crate::registry::Registry;
use crate::schedule::Schedule;
use crate::util;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::sync::Arc;

const CREDIT_OVERSHOOT: f64 = 1.15;
const MAX_DEVIATION_WEIGHT: f64 = 15.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayCounts {
    pub weekdays: u32,
    pub weekends: u32,
}

impl DayCounts {
    /// Weekdays and weekend days in `[min, max]`.
    pub fn between(min: NaiveDate, max: NaiveDate) -> Self {
        let mut counts = Self::default();
        for date in util::date_sequence(min, max) {
            counts.add(date);
        }
        counts
    }

    pub fn add(&mut self, date: NaiveDate) {
        if util::is_weekend(date) {
            self.weekends += 1;
        } else {
            self.weekdays += 1;
        }
    }

    fn plus(self, other: DayCounts) -> Self {
        Self {
            weekdays: self.weekdays + other.weekdays,
            weekends: self.weekends + other.weekends,
        }
    }
}

pub struct FairnessRule {
    registry: Arc<Registry>,
    history: Schedule,
    start: NaiveDate,
    end: NaiveDate,
    min_date: NaiveDate,
    /// Index into `registry.active_engineers()`.
    slots: HashMap<Arc<Engineer>, usize>,
    credits: Vec<DayCounts>,
    /// Credits plus history outside the window, per active engineer.
    base: Vec<DayCounts>,
    /// History inside the window, counted only where the candidate leaves
    /// the key unassigned.
    in_window: Vec<(AssignmentKey, usize)>,
    window_days: DayCounts,
}

impl FairnessRule {
    pub fn new(ctx: &RunContext) -> Self {
        let registry = ctx.registry.clone();
        let history = &ctx.history;
        let min_date = history.min_date().unwrap_or(ctx.start);
        let history_span = history
            .max_date()
            .map(|max| (max - min_date).num_days())
            .unwrap_or(0);

        let (weekday_counts, weekend_counts) = per_engineer_counts(history.iter().map(|a| (a.engineer.as_ref(), a.date())));
        let rate = |counts: &HashMap<&Engineer, u32>| {
            let tenured: Vec<f64> = counts
                .iter()
                .filter(|(e, _)| e.start_date().is_none())
                .map(|(_, n)| f64::from(*n))
                .collect();
            if tenured.is_empty() || history_span <= 0 {
                return 0.0;
            }
            let average = tenured.iter().sum::<f64>() / tenured.len() as f64;
            average / history_span as f64
        };
        let weekday_rate = rate(&weekday_counts);
        let weekend_rate = rate(&weekend_counts);

        let slots: HashMap<Arc<Engineer>, usize> = registry
            .active_engineers()
            .iter()
            .enumerate()
            .map(|(i, e)| (e.clone(), i))
            .collect();

        let credits: Vec<DayCounts> = registry
            .active_engineers()
            .iter()
            .map(|e| match e.start_date() {
                Some(joined) => {
                    let absent = (joined - min_date).num_days().max(0) as f64;
                    DayCounts {
                        weekdays: (weekday_rate * absent * CREDIT_OVERSHOOT) as u32,
                        weekends: (weekend_rate * absent * CREDIT_OVERSHOOT) as u32,
                    }
                }
                None => DayCounts::default(),
            })
            .collect();

        let mut base = credits.clone();
        let mut in_window = Vec::new();
        for a in history {
            let Some(&i) = slots.get(a.engineer.as_ref()) else {
                continue;
            };
            if ctx.contains(a.date()) {
                in_window.push((a.key.clone(), i));
            } else {
                base[i].add(a.date());
            }
        }

        let last_day = ctx.end.pred_opt().unwrap_or(ctx.end);
        let window_days = DayCounts::between(min_date, last_day);

        Self {
            registry,
            history: ctx.history.clone(),
            start: ctx.start,
            end: ctx.end,
            min_date,
            slots,
            credits,
            base,
            in_window,
            window_days,
        }
    }

    pub fn credits(&self, engineer: &Engineer) -> DayCounts {
        self.slots
            .get(engineer)
            .map(|&i| self.credits[i])
            .unwrap_or_default()
    }

    /// Per-engineer targets for the period ending on `max_date`. Slots are
    /// split in whole days; the remainder is dropped.
    pub fn targets(&self, max_date: NaiveDate) -> (f64, f64) {
        let last_day = self.end.pred_opt().unwrap_or(self.end);
        let days = if max_date == last_day {
            self.window_days
        } else {
            DayCounts::between(self.min_date, max_date)
        };
        let queues = self.registry.active_queues().len();
        let engineers = self.registry.active_engineers().len().max(1);
        let share = |n: u32| (n as usize * queues / engineers) as f64;
        (share(days.weekdays), share(days.weekends))
    }

    /// History overlaid with `schedule`, restricted to active engineers, plus
    /// credits. Indexed like `registry.active_engineers()`.
    pub fn combined_counts(&self, schedule: &Schedule) -> Vec<DayCounts> {
        let inside = match (schedule.min_date(), schedule.max_date()) {
            (Some(lo), Some(hi)) => lo >= self.start && hi < self.end,
            _ => true,
        };
        if !inside {
            let mut counts = self.credits.clone();
            for a in self.history.combine(schedule).iter() {
                if let Some(&i) = self.slots.get(a.engineer.as_ref()) {
                    counts[i].add(a.date());
                }
            }
            return counts;
        }

        let mut counts = self.base.clone();
        let keys: HashSet<&AssignmentKey> = schedule.iter().map(|a| &a.key).collect();
        for (key, i) in &self.in_window {
            if !keys.contains(key) {
                counts[*i].add(key.date);
            }
        }
        for a in schedule {
            if let Some(&i) = self.slots.get(a.engineer.as_ref()) {
                counts[i].add(a.date());
            }
        }
        counts
    }
}

fn per_engineer_counts<'a>(
    assignments: impl Iterator<Item = (&'a Engineer, NaiveDate)>,
) -> (HashMap<&'a Engineer, u32>, HashMap<&'a Engineer, u32>) {
    let mut weekdays = HashMap::new();
    let mut weekends = HashMap::new();
    for (e, date) in assignments {
        let map = if util::is_weekend(date) {
            &mut weekends
        } else {
            &mut weekdays
        };
        *map.entry(e).or_insert(0) += 1;
    }
    (weekdays, weekends)
}

fn deviation_penalty(counts: impl Iterator<Item = u32>, target: f64) -> f64 {
    let mut max: f64 = 0.0;
    let mut sum = 0.0;
    for c in counts {
        let dev = (f64::from(c) - target).abs();
        max = max.max(dev);
        sum += dev;
    }
    -MAX_DEVIATION_WEIGHT * max - sum
}

impl Rule for FairnessRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Fairness
    }

    fn compute_fitness(&self, schedule: &Schedule) -> f64 {
        let last_day = self.end.pred_opt().unwrap_or(self.end);
        let (weekday_target, weekend_target) =
            self.targets(schedule.max_date().unwrap_or(last_day));
        let counts = self.combined_counts(schedule);

        deviation_penalty(counts.iter().map(|c| c.weekdays), weekday_target)
            + deviation_penalty(counts.iter().map(|c| c.weekends), weekend_target)
    }

    fn dump_stats(&self, schedule: &Schedule, out: &mut dyn Write) -> io::Result<()> {
        let mut current = vec![DayCounts::default(); self.slots.len()];
        for a in schedule {
            if let Some(&i) = self.slots.get(a.engineer.as_ref()) {
                current[i].add(a.date());
            }
        }
        let combined = self.combined_counts(schedule);

        writeln!(out)?;
        writeln!(out, "{}", self.kind())?;
        writeln!(out, "Current Period\t| All Time\t| Credits\t| All+Credits")?;
        writeln!(out, "Week\t Week\t| Week\t Week\t| Week\t Week\t| Week\t Week")?;
        writeln!(out, "Day\t End\t| Day\t End\t| Day\t End\t| Day\t End")?;

        let mut engineers: Vec<(usize, &Arc<Engineer>)> =
            self.registry.active_engineers().iter().enumerate().collect();
        engineers.sort_by(|a, b| a.1.cmp(b.1));
        for (i, e) in engineers {
            let credit = self.credits[i];
            let total = combined[i];
            let all_time = DayCounts {
                weekdays: total.weekdays - credit.weekdays,
                weekends: total.weekends - credit.weekends,
            };
            writeln!(
                out,
                " {}\t  {}\t|  {}\t  {}\t|  {}\t  {}\t|  {}\t  {}\t- {}",
                current[i].weekdays,
                current[i].weekends,
                all_time.weekdays,
                all_time.weekends,
                credit.weekdays,
                credit.weekends,
                all_time.plus(credit).weekdays,
                all_time.plus(credit).weekends,
                e
            )?;
        }
        Ok(())
    }
}
