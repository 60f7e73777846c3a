//! Error types shared across the crate.
//! Storage and CSV failures carry their own enums so callers can decide
//! whether to degrade (storage) or surface a message (import).

use std::io;
use thiserror::Error;

use crate::editor::ValidationError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed storage file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("Invalid CSV format")]
    TooFewLines,

    #[error("Invalid CSV header")]
    InvalidHeader,

    #[error("Invalid duration for item {0}")]
    InvalidDuration(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type AppResult<T> = Result<T, AppError>;
