//! Integration tests for Rubico.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rubico-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `customer_lifecycle` - Repository behaviour against the file store
//! - `wizard_flow` - Screen controller driving the wizard end to end
//! - `file_store` - On-disk layout and reopening
//!
//! Every test gets its own temporary data directory, so tests run in
//! parallel without sharing state.

use std::path::PathBuf;
use std::sync::Arc;

use rubico_app::{AppConfig, CustomerApp, CustomerRepository, StoreBackend, StoreError};
use rubico_core::{CustomerDraft, Email, Phone};
use tempfile::TempDir;

/// A temporary data directory plus a config pointing at it.
pub struct TestContext {
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestContext {
    /// A fresh, empty file-backed configuration.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            backend: StoreBackend::File,
            ..AppConfig::default()
        };
        Self { config, _dir: dir }
    }

    /// Directory holding the customer documents.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        self.config.store_dir()
    }

    /// Open a repository on the context's directory. Each call opens a new
    /// handle on the same files.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be created.
    pub async fn repository(&self) -> Result<Arc<dyn CustomerRepository>, StoreError> {
        rubico_app::open_repository(&self.config).await
    }

    /// A controller on a fresh repository handle, with the list loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be created.
    pub async fn app(&self) -> Result<CustomerApp, StoreError> {
        let mut app = CustomerApp::new(self.repository().await?, self.config.page_size);
        app.load().await;
        Ok(app)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A valid draft with the given name and email.
///
/// # Panics
///
/// Panics if `email` is not a valid address.
#[must_use]
pub fn draft(full_name: &str, email: &str) -> CustomerDraft {
    CustomerDraft {
        full_name: full_name.to_string(),
        email: Some(Email::parse(email).expect("Invalid test email")),
        phone: None,
        billing_address: "12 Orchard House Lane, Concord".to_string(),
        shipping_same_as_billing: true,
        shipping_address: None,
    }
}

/// A valid draft reachable only by phone.
///
/// # Panics
///
/// Panics if `phone` is not a valid number.
#[must_use]
pub fn phone_draft(full_name: &str, phone: &str) -> CustomerDraft {
    CustomerDraft {
        email: None,
        phone: Some(Phone::parse(phone).expect("Invalid test phone")),
        ..draft(full_name, "unused@example.com")
    }
}
