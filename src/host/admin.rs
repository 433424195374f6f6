//! Administrative tasks
//!
//! Tasks are named operations an operator triggers on the admin port, such
//! as flushing a cache or rotating a log.

use crate::{BoxError, HostError};
use ahash::AHashMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// Query parameters passed to a task, each key with all of its values
pub type TaskParameters = HashMap<String, Vec<String>>;

/// An operator-triggered action.
pub trait Task: Send + Sync {
    /// Name the task is addressed by, unique per admin environment
    fn name(&self) -> &str;

    /// Run the task, writing any report to `output`.
    fn execute(&self, parameters: &TaskParameters, output: &mut String) -> Result<(), BoxError>;
}

/// Registry of administrative tasks, keyed by task name.
#[derive(Default)]
pub struct AdminEnvironment {
    tasks: RwLock<AHashMap<String, Arc<dyn Task>>>,
}

impl AdminEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Fails if a task with the same name is already present.
    pub fn add_task(&self, task: Arc<dyn Task>) -> Result<(), HostError> {
        use std::collections::hash_map::Entry;

        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        match tasks.entry(task.name().to_string()) {
            Entry::Occupied(slot) => Err(HostError::DuplicateTask {
                name: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                #[cfg(feature = "logging")]
                debug!(target: "injector_bundle", task = task.name(), "Added admin task");

                slot.insert(task);
                Ok(())
            }
        }
    }

    pub fn task(&self, name: &str) -> Option<Arc<dyn Task>> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        tasks.get(name).cloned()
    }

    /// Task names, sorted
    pub fn task_names(&self) -> Vec<String> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<_> = tasks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run a task by name and return what it wrote.
    pub fn execute(&self, name: &str, parameters: &TaskParameters) -> Result<String, HostError> {
        let task = self.task(name).ok_or_else(|| HostError::UnknownTask {
            name: name.to_string(),
        })?;

        #[cfg(feature = "logging")]
        info!(target: "injector_bundle", task = name, "Executing admin task");

        let mut output = String::new();
        task.execute(parameters, &mut output)
            .map_err(|e| HostError::TaskFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(output)
    }
}

impl std::fmt::Debug for AdminEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminEnvironment")
            .field("tasks", &self.task_names())
            .finish()
    }
}
