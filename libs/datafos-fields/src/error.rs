//! Error types for field definitions and adapters

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The stored type tag does not name a known field type.
    #[error("Field \"{name}\" uses the unknown field type \"{field_type}\"")]
    UnknownFieldType { name: String, field_type: String },

    #[error("Invalid configuration for field \"{name}\": {reason}")]
    InvalidFieldConfig { name: String, reason: String },

    #[error("A field named \"{0}\" already exists")]
    DuplicateFieldName(String),

    #[error("Invalid value for field \"{name}\": {reason}")]
    InvalidValue { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
