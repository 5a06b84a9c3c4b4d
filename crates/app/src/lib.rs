//! Rubico customer management.
//!
//! Persistence, the entry wizard, list queries and the screen controller that
//! front ends drive. Validation rules and record types live in `rubico-core`.
//!
//! # Layers
//!
//! - [`store`] - key-value documents plus an ordered index
//! - [`repository`] - customer CRUD on top of a store
//! - [`wizard`] - three-step form with per-step validation
//! - [`listing`] - search, sort and pagination
//! - [`controller`] - screens, notices and delete confirmation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod controller;
pub mod error;
pub mod listing;
pub mod repository;
pub mod store;
pub mod wizard;

use std::sync::Arc;

use tracing::info;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use controller::{CustomerApp, Notice, NoticeKind, Screen, SubmitStatus};
pub use error::AppError;
pub use listing::{CustomerPage, CustomerQuery, SortOrder};
pub use repository::{CustomerRepository, RepositoryError, StoreRepository};
pub use store::{FileStore, MemoryStore, RecordStore, StoreError};
pub use wizard::{CustomerWizard, Step, StepOutcome, SubmitOutcome, WizardError};

/// Build the repository selected by `config`.
///
/// # Errors
///
/// Returns an error if the file store's directory cannot be created.
pub async fn open_repository(
    config: &AppConfig,
) -> Result<Arc<dyn CustomerRepository>, StoreError> {
    let repo: Arc<dyn CustomerRepository> = match config.backend {
        StoreBackend::File => {
            let store = FileStore::open(config.store_dir()).await?;
            Arc::new(StoreRepository::new(store))
        }
        StoreBackend::Memory => Arc::new(StoreRepository::new(MemoryStore::new())),
    };
    info!(backend = %config.backend, "Repository ready");
    Ok(repo)
}
