// Task store: the in-memory collection and its persistence

use crate::error::TaskError;
use crate::filter::TaskFilter;
use crate::models::{NewTask, Stats, Task, TaskPatch, now};
use crate::storage::Storage;
use crate::views;
use eyre::{Context, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Storage key holding the serialized task list
pub const TASKS_KEY: &str = "tasks";

/// Handle returned by [`TaskStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[Task])>;

/// Single source of truth for the task collection
///
/// Every mutation is applied to a copy of the collection, written to storage
/// as a whole, and only then swapped in. A failed write leaves the store
/// exactly as it was. Subscribers see the new collection after each
/// successful mutation.
pub struct TaskStore<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: Storage> TaskStore<S> {
    /// Open a store over `storage`, loading whatever it holds
    ///
    /// Missing or malformed data yields an empty collection. Only a failure to
    /// read from storage at all is an error.
    pub fn open(storage: S) -> Result<Self> {
        let tasks = Self::load(&storage)?;
        info!(count = tasks.len(), "Opened task store");

        Ok(Self {
            storage,
            tasks,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    fn load(storage: &S) -> Result<Vec<Task>> {
        let Some(raw) = storage.get(TASKS_KEY).context("Failed to read tasks from storage")? else {
            debug!("No stored tasks, starting empty");
            return Ok(Vec::new());
        };

        let tasks: Vec<Task> = match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = ?e, "Stored tasks are malformed, starting empty");
                return Ok(Vec::new());
            }
        };

        // Keep the first occurrence of any repeated id
        let mut seen = HashSet::new();
        let loaded = tasks.len();
        let mut tasks: Vec<Task> = tasks.into_iter().filter(|t| seen.insert(t.id.clone())).collect();
        if tasks.len() != loaded {
            warn!(dropped = loaded - tasks.len(), "Dropped stored tasks with duplicate ids");
        }

        let repaired = normalize_all(&mut tasks);
        if repaired > 0 {
            warn!(repaired, "Repaired completion times on stored tasks");
        }

        Ok(tasks)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a task; the store assigns its id and creation time
    pub fn add(&mut self, new: NewTask) -> Result<Task> {
        let id = self.fresh_id();
        let task = Task::from_new(id, new, now());

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;

        info!(id = %task.id, title = %task.title, "Added task");
        Ok(task)
    }

    /// Merge `patch` into the task with `id`
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let index = self.position(id)?;

        let mut next = self.tasks.clone();
        next[index].apply(patch, now());
        let updated = next[index].clone();
        self.commit(next)?;

        info!(id, status = %updated.status, "Updated task");
        Ok(updated)
    }

    /// Remove the task with `id`, returning it
    pub fn delete(&mut self, id: &str) -> Result<Task> {
        let index = self.position(id)?;

        let mut next = self.tasks.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        info!(id, "Deleted task");
        Ok(removed)
    }

    /// Move a task one step along not-started, in-progress, done
    pub fn advance_status(&mut self, id: &str) -> Result<Task> {
        let index = self.position(id)?;
        let status = self.tasks[index].status.next();
        self.update(id, TaskPatch::status(status))
    }

    /// Overwrite the whole collection
    ///
    /// Completion times are brought in line with each task's status.
    pub fn replace_all(&mut self, mut tasks: Vec<Task>) -> Result<()> {
        {
            let mut seen = HashSet::new();
            if let Some(dup) = tasks.iter().find(|t| !seen.insert(t.id.as_str())) {
                return Err(TaskError::DuplicateId(dup.id.clone()).into());
            }
        }

        let repaired = normalize_all(&mut tasks);
        let count = tasks.len();
        self.commit(tasks)?;
        info!(count, repaired, "Replaced task collection");
        Ok(())
    }

    /// Remove every task and the persisted copy
    pub fn clear(&mut self) -> Result<()> {
        self.storage
            .remove(TASKS_KEY)
            .context("Failed to remove tasks from storage")?;
        self.tasks.clear();
        self.notify();

        info!("Cleared all tasks");
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All tasks in insertion order
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn stats(&self) -> Stats {
        views::stats(&self.tasks)
    }

    pub fn filter(&self, filter: &TaskFilter) -> Vec<&Task> {
        filter.apply(&self.tasks)
    }

    pub fn upcoming(&self, limit: usize) -> Vec<&Task> {
        views::upcoming(&self.tasks, limit)
    }

    pub fn recent(&self, limit: usize) -> Vec<&Task> {
        views::recent(&self.tasks, limit)
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Call `listener` with the collection after every successful mutation
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[Task]) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn position(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()).into())
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::now_v7().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn commit(&mut self, tasks: Vec<Task>) -> Result<()> {
        let json = serde_json::to_string(&tasks).context("Failed to serialize tasks")?;
        self.storage
            .set(TASKS_KEY, &json)
            .context("Failed to write tasks to storage")?;
        debug!(count = tasks.len(), bytes = json.len(), "Persisted tasks");

        self.tasks = tasks;
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.tasks);
        }
    }
}

/// Normalize every task, returning how many needed repair
fn normalize_all(tasks: &mut [Task]) -> usize {
    tasks.iter_mut().map(Task::normalize).filter(|changed| *changed).count()
}
