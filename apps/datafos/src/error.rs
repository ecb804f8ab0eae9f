//! Error types for the datafos application

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Field(#[from] datafos_fields::Error),

    #[error("Form not found: {0}")]
    FormNotFound(i64),

    #[error("Field not found: {0}")]
    FieldNotFound(i64),

    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error comes from form design rather than storage.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Field(_) | Error::Config(_))
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
