use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    /// Malformed CSV input (unterminated quotes, uneven row lengths).
    Parse(String),
    /// Required columns absent from the uploaded table.
    Schema(Vec<String>),
    /// Invalid filter bounds (min > max).
    Range { min: f64, max: f64 },
    /// Operation that needs at least one row ran against zero rows.
    EmptyTable(String),
    ValidationError(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AppError::Schema(missing) => write!(
                f,
                "The following columns are missing from the dataset: {}",
                missing.join(", ")
            ),
            AppError::Range { min, max } => {
                write!(f, "Invalid range: min {} is greater than max {}", min, max)
            }
            AppError::EmptyTable(msg) => write!(f, "Empty table: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
