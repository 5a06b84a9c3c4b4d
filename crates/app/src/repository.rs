//! Customer repository.
//!
//! Persists customers in a [`RecordStore`] and maintains the index with the
//! newest customer first. Every write takes the repository's write lock so
//! read-modify-write sequences on the index never interleave.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rubico_core::{Customer, CustomerDraft, CustomerId, CustomerPatch};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::store::{RecordStore, StoreError};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No customer with this ID.
    #[error("Customer not found: {0}")]
    NotFound(CustomerId),

    /// The underlying store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// A stored record does not decode as a customer.
    #[error("Data corruption: {0}")]
    DataCorruption(String),
}

/// Persistence operations for customers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Store a new customer and put it at the head of the index.
    async fn create(&self, draft: CustomerDraft) -> Result<Customer, RepositoryError>;

    /// Merge `patch` into an existing customer.
    async fn update(&self, id: &CustomerId, patch: CustomerPatch)
    -> Result<Customer, RepositoryError>;

    /// Fetch one customer.
    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// All customers in index order. Index entries whose record is missing
    /// are skipped.
    async fn get_all(&self) -> Result<Vec<Customer>, RepositoryError>;

    /// Remove a customer and its index entry. Unknown IDs are a no-op.
    async fn delete(&self, id: &CustomerId) -> Result<(), RepositoryError>;

    /// Whether any customer has this email, ignoring case.
    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError>;

    /// Whether any customer has this phone number, comparing digits only.
    async fn phone_exists(&self, phone: &str) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Default)]
struct WriteState {
    last_created_at: Option<DateTime<Utc>>,
}

/// [`CustomerRepository`] on top of any [`RecordStore`].
#[derive(Debug)]
pub struct StoreRepository<S> {
    store: S,
    writes: Mutex<WriteState>,
}

impl<S: RecordStore> StoreRepository<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            writes: Mutex::new(WriteState::default()),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    async fn load(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let Some(record) = self.store.get(id.as_str()).await? else {
            return Ok(None);
        };

        serde_json::from_value(record)
            .map(Some)
            .map_err(|e| RepositoryError::DataCorruption(format!("customer {id}: {e}")))
    }

    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let record = serde_json::to_value(customer).map_err(|e| {
            RepositoryError::DataCorruption(format!("customer {}: {e}", customer.id))
        })?;
        self.store.put(customer.id.as_str(), &record).await?;
        Ok(())
    }

    /// A generated ID that does not collide with a stored record.
    async fn fresh_id(&self) -> Result<CustomerId, RepositoryError> {
        loop {
            let id = CustomerId::generate();
            if self.store.get(id.as_str()).await?.is_none() {
                return Ok(id);
            }
            warn!(id = %id, "Generated customer id already in use, retrying");
        }
    }

    /// Timestamp of the newest stored customer, if any.
    async fn newest_created_at(
        &self,
        index: &[String],
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        for key in index {
            let Ok(id) = CustomerId::parse(key) else {
                continue;
            };
            if let Some(customer) = self.load(&id).await? {
                return Ok(Some(customer.created_at));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl<S: RecordStore> CustomerRepository for StoreRepository<S> {
    #[instrument(skip_all)]
    async fn create(&self, draft: CustomerDraft) -> Result<Customer, RepositoryError> {
        let mut writes = self.writes.lock().await;

        let mut index = self.store.read_index().await?;
        if writes.last_created_at.is_none() {
            writes.last_created_at = self.newest_created_at(&index).await?;
        }

        // Never older than the previous customer, even if the clock stepped back.
        let now = Utc::now();
        let created_at = writes.last_created_at.map_or(now, |last| last.max(now));

        let customer = Customer::from_draft(self.fresh_id().await?, created_at, draft);
        self.save(&customer).await?;

        index.retain(|key| key != customer.id.as_str());
        index.insert(0, customer.id.to_string());
        self.store.write_index(&index).await?;
        writes.last_created_at = Some(created_at);

        info!(id = %customer.id, "Customer created");
        Ok(customer)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update(
        &self,
        id: &CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer, RepositoryError> {
        let _writes = self.writes.lock().await;

        let existing = self
            .load(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;

        let updated = patch.apply(existing);
        self.save(&updated).await?;

        info!("Customer updated");
        Ok(updated)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.load(id).await
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let index = self.store.read_index().await?;
        let mut customers = Vec::with_capacity(index.len());

        for key in &index {
            let Ok(id) = CustomerId::parse(key) else {
                warn!(key = %key, "Skipping malformed index entry");
                continue;
            };
            match self.load(&id).await? {
                Some(customer) => customers.push(customer),
                None => debug!(id = %id, "Index entry has no record"),
            }
        }

        debug!(count = customers.len(), "Customers loaded");
        Ok(customers)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete(&self, id: &CustomerId) -> Result<(), RepositoryError> {
        let _writes = self.writes.lock().await;

        self.store.remove(id.as_str()).await?;

        let index = self.store.read_index().await?;
        if index.iter().any(|key| key == id.as_str()) {
            let index: Vec<String> = index.into_iter().filter(|key| key != id.as_str()).collect();
            self.store.write_index(&index).await?;
        }

        info!("Customer deleted");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(false);
        }

        Ok(self
            .get_all()
            .await?
            .iter()
            .filter_map(|c| c.email.as_ref())
            .any(|existing| existing.matches(email)))
    }

    #[instrument(skip(self, phone))]
    async fn phone_exists(&self, phone: &str) -> Result<bool, RepositoryError> {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Ok(false);
        }

        Ok(self
            .get_all()
            .await?
            .iter()
            .filter_map(|c| c.phone.as_ref())
            .any(|existing| existing.digits() == digits))
    }
}
