// WHY: single error type for the library so callers can match on the failure kind
// Configuration and path errors surface at construction, I/O errors while iterating

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    /// Invalid flag, token or translation configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Data that is not the expected text shape (e.g. non UTF-8 lines)
    #[error("Invalid input: {0}")]
    InputType(String),

    #[error("File does not exist: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("Invalid split pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex_automata::meta::BuildError,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
