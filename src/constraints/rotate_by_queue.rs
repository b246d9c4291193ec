use super::Constraint;
use crate::core_types::{AssignmentKey, Engineer};
use crate::registry::Registry;
use crate::schedule::Schedule;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;

/// Whoever holds the primary queue on day D holds the i-th queue (in
/// declaration order) on day D+i.
///
/// The first `queues - 1` days of a window inherit their secondary slots from
/// the primary assignments in history, or from a random engineer where
/// history has none.
pub struct RotateByQueueConstraint {
    registry: Arc<Registry>,
    history_primary: HashMap<NaiveDate, Arc<Engineer>>,
}

impl RotateByQueueConstraint {
    pub fn new(registry: Arc<Registry>, history: &Schedule) -> Self {
        let primary = registry.primary_queue().clone();
        let mut history_primary = HashMap::new();
        for a in history {
            if a.key.queue.as_ref() == Some(&primary) {
                history_primary
                    .entry(a.date())
                    .or_insert_with(|| a.engineer.clone());
            }
        }
        Self {
            registry,
            history_primary,
        }
    }

    fn propagate(
        &self,
        derived: &mut HashMap<AssignmentKey, Arc<Engineer>>,
        from: NaiveDate,
        engineer: &Arc<Engineer>,
        range: (NaiveDate, NaiveDate),
    ) {
        let (min, max) = range;
        for (i, queue) in self.registry.active_queues().iter().enumerate().skip(1) {
            let Some(date) = from.checked_add_days(Days::new(i as u64)) else {
                break;
            };
            if date > max {
                break;
            }
            if date >= min {
                derived.insert(AssignmentKey::new(date, queue.clone()), engineer.clone());
            }
        }
    }
}

impl Constraint for RotateByQueueConstraint {
    fn name(&self) -> &'static str {
        "rotate-by-queue"
    }

    fn constrain(&self, schedule: &Schedule) -> Schedule {
        let queues = self.registry.active_queues();
        let (Some(min), Some(max)) = (schedule.min_date(), schedule.max_date()) else {
            return schedule.clone();
        };
        if queues.len() < 2 {
            return schedule.clone();
        }
        let primary = &queues[0];

        let mut derived: HashMap<AssignmentKey, Arc<Engineer>> = HashMap::new();
        for a in schedule {
            if a.key.queue.as_ref() == Some(primary) {
                self.propagate(&mut derived, a.date(), &a.engineer, (min, max));
            }
        }

        for back in 1..queues.len() {
            let Some(day) = min.checked_sub_days(Days::new(back as u64)) else {
                continue;
            };
            let engineer = match self.history_primary.get(&day) {
                Some(e) => e.clone(),
                None => self.registry.random_engineer(),
            };
            self.propagate(&mut derived, day, &engineer, (min, max));
        }

        let assignments = schedule
            .iter()
            .map(|a| match derived.get(&a.key) {
                Some(e) => a.reassign(e.clone()),
                None => a.clone(),
            })
            .collect();
        Schedule::new(schedule.registry().clone(), assignments)
    }
}
