use crate::error::{RotaError, RotaResult};
use crate::registry::Registry;
use crate::schedule::Schedule;
use chrono::NaiveDate;
use std::sync::Arc;

/// Per-run inputs shared by every rule and constraint constructor.
///
/// Rules build their precomputed caches from this once; nothing is shared
/// between runs.
#[derive(Clone)]
pub struct RunContext {
    pub registry: Arc<Registry>,
    pub history: Schedule,
    /// First scheduled day (inclusive).
    pub start: NaiveDate,
    /// End of the window (exclusive).
    pub end: NaiveDate,
}

impl RunContext {
    pub fn new(
        registry: Arc<Registry>,
        history: Schedule,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RotaResult<Self> {
        if start >= end {
            return Err(RotaError::Config(format!(
                "start date {} must be before end date {}",
                start, end
            )));
        }
        Ok(Self {
            registry,
            history,
            start,
            end,
        })
    }

    pub fn window_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}
