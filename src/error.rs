//! Error types for conversion operations
//!
//! Only conditions that stop a conversion outright live here. Everything the
//! builders can recover from is reported as a [`crate::diagnostics::Diagnostic`]
//! instead.

use thiserror::Error;

/// Errors that can occur while loading or converting an interview
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Source file or directory could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Character encoding error
    #[error("Encoding error: {0}")]
    Encoding(String),
    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ConversionError {
    /// Get numeric error code, used as the CLI exit status
    pub fn code(&self) -> u8 {
        match self {
            ConversionError::Io(_) => 1,
            ConversionError::Encoding(_) => 2,
            ConversionError::InvalidInput(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
