use crate::core_types::{Engineer, Queue};
use crate::error::{RotaError, RotaResult};
use crate::random::{self, StrongRandom};
use chrono::NaiveTime;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Engineers and queues known to one run.
///
/// Active entries come from the load-time rosters and keep their declaration
/// order (the first queue is the primary). Names that only appear in history
/// are registered lazily as inactive placeholders.
pub struct Registry {
    engineers: Vec<Arc<Engineer>>,
    engineers_by_alias: HashMap<String, Arc<Engineer>>,
    queues: Vec<Arc<Queue>>,
    queues_by_name: HashMap<String, Arc<Queue>>,
    inactive_engineers: RwLock<HashMap<String, Arc<Engineer>>>,
    inactive_queues: RwLock<HashMap<String, Arc<Queue>>>,
    rotation_start: NaiveTime,
    random: Arc<StrongRandom>,
}

impl Registry {
    pub fn new(engineers: Vec<Engineer>, queues: Vec<Queue>) -> RotaResult<Self> {
        if engineers.is_empty() {
            return Err(RotaError::Config("no active engineers".into()));
        }
        if queues.is_empty() {
            return Err(RotaError::Config("no active queues".into()));
        }

        let engineers: Vec<Arc<Engineer>> = engineers.into_iter().map(Arc::new).collect();
        let mut engineers_by_alias = HashMap::with_capacity(engineers.len());
        for e in &engineers {
            if engineers_by_alias
                .insert(e.alias().to_lowercase(), e.clone())
                .is_some()
            {
                return Err(RotaError::Config(format!(
                    "duplicate engineer alias '{}'",
                    e.alias()
                )));
            }
        }

        let queues: Vec<Arc<Queue>> = queues.into_iter().map(Arc::new).collect();
        let mut queues_by_name = HashMap::with_capacity(queues.len());
        for q in &queues {
            if queues_by_name.insert(q.name().to_string(), q.clone()).is_some() {
                return Err(RotaError::Config(format!("duplicate queue '{}'", q.name())));
            }
        }

        Ok(Self {
            engineers,
            engineers_by_alias,
            queues,
            queues_by_name,
            inactive_engineers: RwLock::new(HashMap::new()),
            inactive_queues: RwLock::new(HashMap::new()),
            rotation_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            random: random::shared(),
        })
    }

    pub fn with_rotation_start(mut self, rotation_start: NaiveTime) -> Self {
        self.rotation_start = rotation_start;
        self
    }

    pub fn with_random(mut self, random: Arc<StrongRandom>) -> Self {
        self.random = random;
        self
    }

    pub fn active_engineers(&self) -> &[Arc<Engineer>] {
        &self.engineers
    }

    pub fn active_queues(&self) -> &[Arc<Queue>] {
        &self.queues
    }

    pub fn primary_queue(&self) -> &Arc<Queue> {
        // Registry::new rejects an empty queue list.
        &self.queues[0]
    }

    pub fn rotation_start(&self) -> NaiveTime {
        self.rotation_start
    }

    pub fn random(&self) -> &StrongRandom {
        &self.random
    }

    pub fn engineer_by_alias(&self, alias: &str) -> Option<Arc<Engineer>> {
        self.engineers_by_alias.get(&alias.to_lowercase()).cloned()
    }

    /// Resolves a name as written in schedule files. Unknown names become
    /// inactive placeholders so history can reference departed engineers.
    pub fn engineer_by_external_name(&self, name: &str) -> Arc<Engineer> {
        if let Some(e) = self.engineers.iter().find(|e| e.external_name() == name) {
            return e.clone();
        }

        {
            let inactive = self
                .inactive_engineers
                .read()
                .unwrap_or_else(|e| e.into_inner());
            if let Some(e) = inactive.get(name) {
                return e.clone();
            }
        }

        let mut inactive = self
            .inactive_engineers
            .write()
            .unwrap_or_else(|e| e.into_inner());
        inactive
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Registering inactive engineer '{}'", name);
                Arc::new(Engineer::placeholder(name))
            })
            .clone()
    }

    pub fn queue_by_name(&self, name: &str) -> Arc<Queue> {
        if let Some(q) = self.queues_by_name.get(name) {
            return q.clone();
        }

        {
            let inactive = self
                .inactive_queues
                .read()
                .unwrap_or_else(|e| e.into_inner());
            if let Some(q) = inactive.get(name) {
                return q.clone();
            }
        }

        let mut inactive = self
            .inactive_queues
            .write()
            .unwrap_or_else(|e| e.into_inner());
        inactive
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Registering inactive queue '{}'", name);
                Arc::new(Queue::new(name))
            })
            .clone()
    }

    pub fn is_active_engineer(&self, engineer: &Engineer) -> bool {
        self.engineers_by_alias
            .get(&engineer.alias().to_lowercase())
            .is_some_and(|e| e.as_ref() == engineer)
    }

    pub fn is_active_queue(&self, queue: &Queue) -> bool {
        self.queues_by_name.contains_key(queue.name())
    }

    pub fn random_engineer(&self) -> Arc<Engineer> {
        let idx = self.random.next_index(self.engineers.len());
        self.engineers[idx].clone()
    }

    /// Number of lazily registered placeholder engineers.
    pub fn inactive_engineer_count(&self) -> usize {
        self.inactive_engineers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
