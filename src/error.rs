use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RotaError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse Error in '{}' (line {line}): {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Length of the two schedules must be identical. {left}!={right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Thread Pool Error: {0}")]
    ThreadPool(String),
}

pub type RotaResult<T> = Result<T, RotaError>;
