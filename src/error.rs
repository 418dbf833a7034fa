// Error taxonomy for one command cycle
//
// Every variant is handled at the dispatch boundary in the controller and
// turned into a single error line; none of them outlive the cycle.

use crate::motor::DriverError;

/// The line had the right prefix but its fields could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("field {field:?} is not an integer")]
    NotANumber { field: String },

    #[error("expected {expected} fields, got {actual}")]
    FieldCount { expected: &'static str, actual: usize },
}

/// A numeric field parsed but lies outside what the arm accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("angle {value} outside 0..=180")]
    Angle { value: i64 },

    #[error("joint index {value} outside 1..=6")]
    Index { value: i64 },
}

/// SMOOTH duration that cannot be divided into interpolation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("smooth duration must be positive, got {value} ms")]
pub struct DurationError {
    pub value: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("malformed command: {0}")]
    Parse(#[from] ParseError),

    #[error("out of range: {0}")]
    Range(#[from] RangeError),

    #[error(transparent)]
    Duration(#[from] DurationError),

    #[error("unknown command {raw:?}")]
    Unknown { raw: String },

    #[error("actuator failure: {0}")]
    Driver(#[from] DriverError),
}

/// Loading or storing the saved pose library
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("pose file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pose file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("saved pose {name:?}: {source}")]
    Range { name: String, source: RangeError },
}
