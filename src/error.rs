// Domain errors callers may want to match on
//
// Everything else travels as a plain `eyre::Report`. These variants are wrapped
// into a report too and can be recovered with `report.downcast_ref::<TaskError>()`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// No task with this id exists in the collection
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Two tasks in the same collection share an id
    #[error("Duplicate task id: {0}")]
    DuplicateId(String),

    /// An import document could not be parsed as a task list
    #[error("Invalid import data: {0}")]
    InvalidImport(String),

    /// A textual value did not name a known variant
    #[error("Invalid {kind}: {value} (expected one of: {expected})")]
    InvalidValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}
