use thiserror::Error;

/// Reasons an instance is rejected at construction.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum InstanceError {
    #[error("resource {resource} has negative capacity {capacity}")]
    NegativeCapacity { resource: usize, capacity: i64 },

    #[error("task {task} has negative duration {duration}")]
    NegativeDuration { task: usize, duration: i64 },

    #[error("task {task} requires negative amount {amount} of resource {resource}")]
    NegativeRequirement {
        task: usize,
        resource: usize,
        amount: i64,
    },

    #[error("task {task} lists {found} requirements, expected {expected}")]
    RequirementCount {
        task: usize,
        expected: usize,
        found: usize,
    },

    #[error("task {task} references unknown successor {successor}")]
    DanglingSuccessor { task: usize, successor: usize },

    #[error("task {task} lists itself as a successor")]
    SelfLoop { task: usize },

    #[error("task {task} lists successor {successor} more than once")]
    DuplicateEdge { task: usize, successor: usize },

    #[error("precedence graph contains a cycle through task {task}")]
    Cycle { task: usize },
}

/// Reasons a start-time vector cannot be evaluated.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SolutionError {
    #[error("expected {expected} start times, found {found}")]
    Length { expected: usize, found: usize },

    #[error("task {task} has negative start time {start}")]
    NegativeStart { task: usize, start: i64 },
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid instance: {0}")]
    InvalidInstance(#[from] InstanceError),

    #[error("malformed solution: {0}")]
    MalformedSolution(#[from] SolutionError),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
