use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An on-call engineer. Identity is the alias, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct Engineer {
    alias: String,
    alias_key: String,
    external_name: String,
    display_name: String,
    start_date: Option<NaiveDate>,
    incident_manager: bool,
}

impl Engineer {
    pub fn new(
        alias: impl Into<String>,
        external_name: impl Into<String>,
        display_name: impl Into<String>,
        start_date: Option<NaiveDate>,
        incident_manager: bool,
    ) -> Self {
        let alias = alias.into();
        let alias_key = alias.to_lowercase();
        Self {
            alias,
            alias_key,
            external_name: external_name.into(),
            display_name: display_name.into(),
            start_date,
            incident_manager,
        }
    }

    /// Placeholder for someone only referenced by historical data.
    pub fn placeholder(name: &str) -> Self {
        Self::new(name, name, name, None, false)
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn external_name(&self) -> &str {
        &self.external_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn is_incident_manager(&self) -> bool {
        self.incident_manager
    }
}

impl PartialEq for Engineer {
    fn eq(&self, other: &Self) -> bool {
        self.alias_key == other.alias_key
    }
}

impl Eq for Engineer {}

impl Hash for Engineer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias_key.hash(state);
    }
}

impl PartialOrd for Engineer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Engineer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.alias_key.cmp(&other.alias_key)
    }
}

impl fmt::Display for Engineer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.alias, self.external_name, self.display_name
        )
    }
}

/// A duty queue. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Queue {
    name: String,
}

impl Queue {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A (day, queue) slot. A `None` queue means "any queue that day" and only
/// appears in exclusion data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssignmentKey {
    pub date: NaiveDate,
    pub queue: Option<Arc<Queue>>,
}

impl AssignmentKey {
    pub fn new(date: NaiveDate, queue: Arc<Queue>) -> Self {
        Self {
            date,
            queue: Some(queue),
        }
    }

    pub fn any_queue(date: NaiveDate) -> Self {
        Self { date, queue: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: AssignmentKey,
    pub engineer: Arc<Engineer>,
}

impl Assignment {
    pub fn new(key: AssignmentKey, engineer: Arc<Engineer>) -> Self {
        Self { key, engineer }
    }

    pub fn date(&self) -> NaiveDate {
        self.key.date
    }

    /// Same slot, different engineer.
    pub fn reassign(&self, engineer: Arc<Engineer>) -> Self {
        Self {
            key: self.key.clone(),
            engineer,
        }
    }
}
