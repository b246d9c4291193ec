use super::Constraint;
use crate::core_types::{AssignmentKey, Engineer};
use crate::loader::OverrideRecord;
use crate::registry::Registry;
use crate::schedule::Schedule;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// Pins specific (day, queue) slots to a named engineer.
pub struct ManualOverrideConstraint {
    overrides: HashMap<AssignmentKey, Arc<Engineer>>,
    days: HashSet<NaiveDate>,
}

impl ManualOverrideConstraint {
    pub fn new(registry: &Registry, records: &[OverrideRecord]) -> Self {
        let mut overrides = HashMap::with_capacity(records.len());
        let mut days = HashSet::new();
        for record in records {
            let Some(engineer) = registry.engineer_by_alias(&record.alias) else {
                warn!(
                    "Ignoring override on {} for unknown engineer '{}'",
                    record.date, record.alias
                );
                continue;
            };
            let key = AssignmentKey::new(record.date, registry.queue_by_name(&record.queue));
            days.insert(record.date);
            overrides.insert(key, engineer);
        }
        Self { overrides, days }
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl Constraint for ManualOverrideConstraint {
    fn name(&self) -> &'static str {
        "manual-override"
    }

    fn constrain(&self, schedule: &Schedule) -> Schedule {
        let assignments = schedule
            .iter()
            .map(|a| {
                if !self.days.contains(&a.date()) {
                    return a.clone();
                }
                match self.overrides.get(&a.key) {
                    Some(e) => a.reassign(e.clone()),
                    None => a.clone(),
                }
            })
            .collect();
        Schedule::new(schedule.registry().clone(), assignments)
    }
}
