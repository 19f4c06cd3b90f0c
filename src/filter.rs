// Task list filtering

use crate::models::{Category, Priority, Status, Task};
use std::fmt;
use std::str::FromStr;

/// Either every value (`all`) or exactly one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }
}

impl<T: FromStr> FromStr for Selector<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Selector::All);
        }
        s.parse().map(Selector::Only)
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => write!(f, "all"),
            Selector::Only(value) => write!(f, "{}", value),
        }
    }
}

/// A task list query; all conditions must hold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of title or description; empty matches everything
    pub search: String,
    pub status: Selector<Status>,
    pub category: Selector<Category>,
    pub priority: Selector<Priority>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Selector::Only(status);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Selector::Only(category);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Selector::Only(priority);
        self
    }

    /// True when no condition narrows the result
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.status.is_all() && self.category.is_all() && self.priority.is_all()
    }

    pub fn matches_search(&self, task: &Task) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        task.title.to_lowercase().contains(&term) || task.description.to_lowercase().contains(&term)
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task)
            && self.status.matches(&task.status)
            && self.category.matches(&task.category)
            && self.priority.matches(&task.priority)
    }

    /// Matching tasks in their original order
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}
