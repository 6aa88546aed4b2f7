//! Error types for raster attribute table operations.

use thiserror::Error;

use crate::model::FieldType;

/// Errors that can occur while editing, loading or persisting a RAT.
#[derive(Error, Debug)]
pub enum RatError {
    /// Malformed edit request: bad index, duplicate name or usage, or a
    /// change that would break the mandatory schema.
    #[error("{message}")]
    Validation {
        /// Description of the rejected request
        message: String,
    },

    /// Missing, unparseable or inconsistent table data.
    #[error("Invalid format: {message}")]
    Format {
        /// Description of the format error
        message: String,
    },

    /// A cell edit could not be converted to the column type.
    #[error("Cannot convert '{value}' to {}", field_type.type_name())]
    Conversion {
        /// The rejected input, as text
        value: String,
        /// The declared type of the target field
        field_type: FieldType,
    },

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The temporary file could not replace the destination
    #[error("Could not replace destination file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl RatError {
    /// Create a validation error with a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a format error with a message.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a conversion error for `value` targeting `field_type`.
    pub fn conversion(value: impl Into<String>, field_type: FieldType) -> Self {
        Self::Conversion {
            value: value.into(),
            field_type,
        }
    }

    /// Whether this error rejected an edit request rather than failing I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result alias used throughout the crate.
pub type RatResult<T> = Result<T, RatError>;
