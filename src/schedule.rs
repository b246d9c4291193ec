use crate::core_types::{Assignment, AssignmentKey, Engineer};
use crate::error::{RotaError, RotaResult};
use crate::registry::Registry;
use crate::util;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const UNFILLED: &str = "null";

/// An immutable, ordered list of assignments bound to one registry.
///
/// Every operator returns a new schedule. Schedules produced by
/// [`Schedule::make_random`] enumerate keys date-major, then in queue
/// declaration order, and the genetic operators only ever replace the
/// engineer at a position, so all members of one population share the same
/// key sequence.
#[derive(Clone)]
pub struct Schedule {
    registry: Arc<Registry>,
    assignments: Vec<Assignment>,
    max_date: Option<NaiveDate>,
}

impl Schedule {
    pub fn new(registry: Arc<Registry>, assignments: Vec<Assignment>) -> Self {
        let max_date = assignments.iter().map(|a| a.date()).max();
        Self {
            registry,
            assignments,
            max_date,
        }
    }

    pub fn empty(registry: Arc<Registry>) -> Self {
        Self::new(registry, Vec::new())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.max_date
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.assignments.iter().map(|a| a.date()).min()
    }

    /// Linear lookup of the engineer holding `key`.
    pub fn engineer_for(&self, key: &AssignmentKey) -> Option<&Arc<Engineer>> {
        self.assignments
            .iter()
            .find(|a| &a.key == key)
            .map(|a| &a.engineer)
    }

    pub fn to_map(&self) -> HashMap<AssignmentKey, Arc<Engineer>> {
        self.assignments
            .iter()
            .map(|a| (a.key.clone(), a.engineer.clone()))
            .collect()
    }

    pub fn make_random(registry: &Arc<Registry>, start: NaiveDate, end: NaiveDate) -> Self {
        let mut keyed = KeyedAssignments::default();
        for date in start.iter_days().take_while(|d| *d < end) {
            for queue in registry.active_queues() {
                let key = AssignmentKey::new(date, queue.clone());
                keyed.insert(Assignment::new(key, registry.random_engineer()));
            }
        }
        Self::new(registry.clone(), keyed.into_vec())
    }

    /// Swap-then-replace mutation of up to `size` positions.
    pub fn mutate(&self, size: usize) -> Self {
        let mut assignments = self.assignments.clone();
        if assignments.is_empty() {
            return self.with_assignments(assignments);
        }

        let random = self.registry.random();
        let len = assignments.len();

        let swaps = random.next_index(size);
        for _ in 0..swaps {
            let i = random.next_index(len);
            let j = random.next_index(len);
            let a = assignments[i].engineer.clone();
            let b = assignments[j].engineer.clone();
            assignments[i] = assignments[i].reassign(b);
            assignments[j] = assignments[j].reassign(a);
        }

        for _ in 0..size - swaps {
            let i = random.next_index(len);
            assignments[i] = assignments[i].reassign(self.registry.random_engineer());
        }

        self.with_assignments(assignments)
    }

    /// Copies the partner's engineers over `[a, b]`, where the two cut points
    /// are drawn independently and left unordered (`a > b` copies nothing).
    pub fn cross(&self, partner: &Schedule) -> RotaResult<Self> {
        if self.len() != partner.len() {
            return Err(RotaError::LengthMismatch {
                left: self.len(),
                right: partner.len(),
            });
        }

        let mut assignments = self.assignments.clone();
        let random = self.registry.random();
        let a = random.next_index(assignments.len());
        let b = random.next_index(assignments.len());

        if a <= b && b < assignments.len() {
            for i in a..=b {
                assignments[i] = assignments[i].reassign(partner.assignments[i].engineer.clone());
            }
        }

        Ok(self.with_assignments(assignments))
    }

    /// Overlays `other` on this schedule; `other` wins on shared keys.
    pub fn combine(&self, other: &Schedule) -> Self {
        let mut keyed = KeyedAssignments::default();
        for a in self.assignments.iter().chain(other.assignments.iter()) {
            keyed.insert(a.clone());
        }
        self.with_assignments(keyed.into_vec())
    }

    /// Assignments dated within `[start, end)`.
    pub fn within(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let assignments = self
            .assignments
            .iter()
            .filter(|a| a.date() >= start && a.date() < end)
            .cloned()
            .collect();
        self.with_assignments(assignments)
    }

    /// Stretches a previously saved schedule over `[start, end)`.
    ///
    /// Days the saved schedule does not cover are filled randomly. The result
    /// has exactly the key sequence of [`Schedule::make_random`] over the
    /// same window, so it can stand in as a population member.
    pub fn fit_to_window(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let trimmed: Vec<Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.date() >= start && a.date() < end)
            .filter(|a| {
                a.key
                    .queue
                    .as_ref()
                    .is_some_and(|q| self.registry.is_active_queue(q))
            })
            .cloned()
            .collect();

        debug!(
            "Resuming from {} of {} saved assignments",
            trimmed.len(),
            self.assignments.len()
        );

        let base = Self::make_random(&self.registry, start, end);
        base.combine(&self.with_assignments(trimmed))
    }

    /// Writes one header row of active queue names, then one row per day.
    pub fn save(&self, path: impl AsRef<Path>) -> RotaResult<()> {
        let queues = self.registry.active_queues();
        let mut writer = csv::WriterBuilder::new().from_path(path.as_ref())?;

        let mut header = Vec::with_capacity(queues.len() + 1);
        header.push("Rotation Start".to_string());
        header.extend(queues.iter().map(|q| q.name().to_string()));
        writer.write_record(&header)?;

        let mut days: Vec<NaiveDate> = Vec::new();
        let mut by_day: HashMap<NaiveDate, Vec<&Assignment>> = HashMap::new();
        for a in &self.assignments {
            by_day
                .entry(a.date())
                .or_insert_with(|| {
                    days.push(a.date());
                    Vec::new()
                })
                .push(a);
        }

        let time = self.registry.rotation_start();
        for day in days {
            let slots = &by_day[&day];
            let mut row = Vec::with_capacity(queues.len() + 1);
            row.push(day.and_time(time).format("%Y-%-m-%-d %H:%M:%S").to_string());
            for queue in queues {
                let cell = slots
                    .iter()
                    .find(|a| a.key.queue.as_deref() == Some(queue.as_ref()))
                    .map(|a| a.engineer.external_name().to_string())
                    .unwrap_or_else(|| UNFILLED.to_string());
                row.push(cell);
            }
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn load(registry: &Arc<Registry>, path: impl AsRef<Path>) -> RotaResult<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let queues: Vec<_> = reader
            .headers()?
            .iter()
            .skip(1)
            .map(|name| registry.queue_by_name(name))
            .collect();

        let mut assignments = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let raw_date = record.get(0).unwrap_or("");
            let date = util::parse_date(raw_date).ok_or_else(|| RotaError::Parse {
                path: path.to_path_buf(),
                line,
                message: format!("invalid rotation start '{}'", raw_date),
            })?;

            if record.len() > queues.len() + 1 {
                return Err(RotaError::Parse {
                    path: path.to_path_buf(),
                    line,
                    message: format!(
                        "{} cells for {} queues",
                        record.len() - 1,
                        queues.len()
                    ),
                });
            }

            for (queue, cell) in queues.iter().zip(record.iter().skip(1)) {
                if cell.is_empty() || cell.eq_ignore_ascii_case(UNFILLED) {
                    continue;
                }
                let engineer = registry.engineer_by_external_name(cell);
                assignments.push(Assignment::new(
                    AssignmentKey::new(date, queue.clone()),
                    engineer,
                ));
            }
        }

        debug!(
            "Loaded {} assignments from {}",
            assignments.len(),
            path.display()
        );
        Ok(Self::new(registry.clone(), assignments))
    }

    /// Distinct days in first-seen order.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut seen = HashSet::new();
        self.assignments
            .iter()
            .map(|a| a.date())
            .filter(|d| seen.insert(*d))
            .collect()
    }

    fn with_assignments(&self, assignments: Vec<Assignment>) -> Self {
        Self::new(self.registry.clone(), assignments)
    }
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        self.assignments == other.assignments
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("max_date", &self.max_date)
            .field("assignments", &self.assignments)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.iter()
    }
}

/// Key-unique assignment list. A re-inserted key keeps its first position
/// and takes the new engineer.
#[derive(Default)]
struct KeyedAssignments {
    slots: Vec<Assignment>,
    index: HashMap<AssignmentKey, usize>,
}

impl KeyedAssignments {
    fn insert(&mut self, assignment: Assignment) {
        match self.index.get(&assignment.key) {
            Some(&i) => self.slots[i] = assignment,
            None => {
                self.index.insert(assignment.key.clone(), self.slots.len());
                self.slots.push(assignment);
            }
        }
    }

    fn into_vec(self) -> Vec<Assignment> {
        self.slots
    }
}
