// TaskHub - single-user task manager with local JSON persistence

pub mod config;
pub mod display;
pub mod error;
pub mod filter;
pub mod models;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod views;

// Re-export main types for convenience
pub use config::Config;
pub use error::TaskError;
pub use filter::{Selector, TaskFilter};
pub use models::{Category, NewTask, Priority, Stats, Status, Task, TaskPatch, now, parse_due_date};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{SubscriptionId, TASKS_KEY, TaskStore};
