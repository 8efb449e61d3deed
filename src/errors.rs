//! Error types for the astronotes application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during persistence and chat operations.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the astronotes application.
#[derive(Error, Debug)]
pub enum AstroError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// The chat-completion service could not be reached.
    #[error("Failed to connect to OpenAI: {message}")]
    Connectivity { message: String },

    /// The chat-completion service answered with an error.
    #[error("{message}")]
    Api { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
