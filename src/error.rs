//! Centralized error types for mailcards.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailcards library.
#[derive(Error, Debug)]
pub enum CardsError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A viewable part could not be read while flattening. Aborts the render.
    #[error("Couldn't extract viewable parts: {0}")]
    ContentExtraction(String),

    /// One structured-data payload was malformed. Callers skip it and continue.
    #[error("Malformed {source_kind} payload: {reason}")]
    StructuredDataParse {
        source_kind: &'static str,
        reason: String,
    },

    /// An iCalendar payload could not be decoded.
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// A single button could not be produced from a field.
    #[error("Button generation failed for '{field}': {reason}")]
    ButtonGeneration { field: String, reason: String },

    /// A card template failed to compile or render.
    #[error("Template error: {0}")]
    Template(String),

    /// The raw message could not be parsed as MIME.
    #[error("MIME decoding error: {0}")]
    Mime(String),

    /// The configuration file is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias for `Result<T, CardsError>`.
pub type Result<T> = std::result::Result<T, CardsError>;

impl CardsError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for a [`CardsError::StructuredDataParse`].
    pub fn parse(source_kind: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::StructuredDataParse {
            source_kind,
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a [`CardsError::ButtonGeneration`].
    pub fn button(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::ButtonGeneration {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available.
impl From<std::io::Error> for CardsError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}

impl From<handlebars::RenderError> for CardsError {
    fn from(e: handlebars::RenderError) -> Self {
        Self::Template(e.to_string())
    }
}

impl From<handlebars::TemplateError> for CardsError {
    fn from(e: handlebars::TemplateError) -> Self {
        Self::Template(e.to_string())
    }
}
