//! Unified error handling.
//!
//! Provides a unified `AppError` type for everything outside the screen
//! controller's notices: startup, command-line arguments and the terminal
//! host. Internal detail stays in the `Display` text for logs and is
//! left out of the user message.

use rubico_core::CustomerIdError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::repository::RepositoryError;
use crate::store::StoreError;
use crate::wizard::WizardError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Store could not be opened.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Wizard action was rejected or could not run.
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    /// A customer ID given by the user is malformed.
    #[error("Invalid customer id: {0}")]
    InvalidId(#[from] CustomerIdError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A form action was requested while no form is open.
    #[error("No customer form is open")]
    NoActiveForm,

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Message safe to show to the user.
    ///
    /// Storage and data problems are reduced to a generic message. Callers
    /// log the full error themselves.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Store(_)
            | Self::Repository(RepositoryError::Storage(_) | RepositoryError::DataCorruption(_))
            | Self::Wizard(WizardError::Repository(_)) => {
                "Customer data could not be read or written".to_string()
            }
            Self::Repository(RepositoryError::NotFound(_)) => "Customer not found".to_string(),
            Self::Io(_) => "Input or output failed".to_string(),
            Self::Config(err) => err.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
