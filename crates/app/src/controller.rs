//! Screen controller.
//!
//! `CustomerApp` owns everything a front end needs to render: which screen is
//! showing, the loaded customers, the list query, the open wizard, a pending
//! delete confirmation and the latest notice. Repository failures become
//! error notices and leave the previous state in place. The customer list is
//! only replaced by a successful `get_all`, never updated optimistically.

use std::sync::Arc;

use rubico_core::{Customer, CustomerId, CustomerPatch};
use tracing::{error, info, instrument};

use crate::error::{AppError, Result};
use crate::listing::{CustomerPage, CustomerQuery, SortOrder};
use crate::repository::{CustomerRepository, RepositoryError};
use crate::wizard::{CustomerWizard, Step, StepOutcome, SubmitOutcome, WizardError};

/// User-facing notice texts.
pub mod notices {
    pub const CUSTOMER_ADDED: &str = "Customer added successfully!";
    pub const CUSTOMER_UPDATED: &str = "Customer updated successfully!";
    pub const CUSTOMER_DELETED: &str = "Customer deleted successfully!";
    pub const CUSTOMER_NOT_FOUND: &str = "Customer not found";
    pub const LOAD_FAILED: &str = "Failed to load customers";
    pub const ADD_FAILED: &str = "Failed to add customer";
    pub const UPDATE_FAILED: &str = "Failed to update customer";
    pub const DELETE_FAILED: &str = "Failed to delete customer";
}

/// Which view is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    List,
    Add,
    Edit(CustomerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.to_string(),
        }
    }
}

/// Result of [`CustomerApp::submit_form`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Stored; the app is back on the list.
    Saved(Customer),
    /// Validation failed; the form stays open with field errors.
    Invalid,
    /// The repository failed; the form stays open with an error notice.
    Failed,
}

/// Headless customer management front end.
pub struct CustomerApp {
    repo: Arc<dyn CustomerRepository>,
    screen: Screen,
    customers: Vec<Customer>,
    query: CustomerQuery,
    wizard: Option<CustomerWizard>,
    pending_delete: Option<CustomerId>,
    notice: Option<Notice>,
}

impl CustomerApp {
    /// A controller on the list screen with nothing loaded yet.
    #[must_use]
    pub fn new(repo: Arc<dyn CustomerRepository>, page_size: usize) -> Self {
        Self {
            repo,
            screen: Screen::List,
            customers: Vec::new(),
            query: CustomerQuery::new(page_size),
            wizard: None,
            pending_delete: None,
            notice: None,
        }
    }

    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Customers from the last successful load, newest first.
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Remove and return the current notice.
    pub const fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    #[must_use]
    pub const fn wizard(&self) -> Option<&CustomerWizard> {
        self.wizard.as_ref()
    }

    pub const fn wizard_mut(&mut self) -> Option<&mut CustomerWizard> {
        self.wizard.as_mut()
    }

    /// The customer awaiting delete confirmation.
    #[must_use]
    pub const fn pending_delete(&self) -> Option<&CustomerId> {
        self.pending_delete.as_ref()
    }

    #[must_use]
    pub const fn query(&self) -> &CustomerQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.set_search(search);
    }

    pub const fn set_sort(&mut self, sort: SortOrder) {
        self.query.set_sort(sort);
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.set_page(page);
    }

    /// The visible slice of the customer list.
    #[must_use]
    pub fn page(&self) -> CustomerPage<'_> {
        self.query.apply(&self.customers)
    }

    /// Replace the customer list with a fresh read.
    ///
    /// On failure the previous list stays and an error notice is set.
    /// Returns `true` on success.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> bool {
        match self.repo.get_all().await {
            Ok(customers) => {
                info!(count = customers.len(), "Customers loaded");
                self.customers = customers;
                true
            }
            Err(e) => {
                self.fail(notices::LOAD_FAILED, &e);
                false
            }
        }
    }

    /// Show an empty add form.
    pub fn open_add(&mut self) {
        self.wizard = Some(CustomerWizard::create());
        self.screen = Screen::Add;
    }

    /// Show the edit form pre-filled from the stored record.
    ///
    /// Returns `true` if the form opened.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn open_edit(&mut self, id: &CustomerId) -> bool {
        match self.repo.get(id).await {
            Ok(Some(customer)) => {
                self.wizard = Some(CustomerWizard::edit(customer));
                self.screen = Screen::Edit(id.clone());
                true
            }
            Ok(None) => {
                self.notice = Some(Notice::error(notices::CUSTOMER_NOT_FOUND));
                false
            }
            Err(e) => {
                self.fail(notices::LOAD_FAILED, &e);
                false
            }
        }
    }

    /// Close the form without saving.
    pub fn cancel_form(&mut self) {
        self.wizard = None;
        self.screen = Screen::List;
    }

    /// Advance the open wizard.
    ///
    /// # Errors
    ///
    /// Returns an error if no form is open, the wizard is on its last step,
    /// or the email uniqueness check could not run.
    pub async fn next_step(&mut self) -> Result<StepOutcome> {
        let repo = Arc::clone(&self.repo);
        let wizard = self.wizard.as_mut().ok_or(AppError::NoActiveForm)?;
        Ok(wizard.next(repo.as_ref()).await?)
    }

    /// Step the open wizard back.
    ///
    /// # Errors
    ///
    /// Returns an error if no form is open or the wizard is on its first step.
    pub fn back_step(&mut self) -> Result<Step> {
        let wizard = self.wizard.as_mut().ok_or(AppError::NoActiveForm)?;
        Ok(wizard.back()?)
    }

    /// Jump from review to an earlier step.
    ///
    /// # Errors
    ///
    /// Returns an error if no form is open or the jump is not allowed.
    pub fn jump_to(&mut self, step: Step) -> Result<()> {
        let wizard = self.wizard.as_mut().ok_or(AppError::NoActiveForm)?;
        Ok(wizard.jump_to(step)?)
    }

    /// Submit the open form.
    ///
    /// Creates a customer from the add screen or overwrites every editable
    /// field from the edit screen, then reloads the list and returns to it.
    ///
    /// # Errors
    ///
    /// Returns an error if no form is open or the wizard is not on review.
    #[instrument(skip(self), fields(screen = ?self.screen))]
    pub async fn submit_form(&mut self) -> Result<SubmitStatus> {
        let editing = match &self.screen {
            Screen::List => return Err(AppError::NoActiveForm),
            Screen::Add => None,
            Screen::Edit(id) => Some(id.clone()),
        };
        let failure = if editing.is_some() {
            notices::UPDATE_FAILED
        } else {
            notices::ADD_FAILED
        };

        let repo = Arc::clone(&self.repo);
        let wizard = self.wizard.as_mut().ok_or(AppError::NoActiveForm)?;
        let draft = match wizard.submit(repo.as_ref()).await {
            Ok(SubmitOutcome::Ready(draft)) => draft,
            Ok(SubmitOutcome::Blocked) => return Ok(SubmitStatus::Invalid),
            Err(WizardError::Repository(e)) => {
                self.fail(failure, &e);
                return Ok(SubmitStatus::Failed);
            }
            Err(e) => return Err(e.into()),
        };

        let saved = match &editing {
            None => repo.create(draft).await,
            Some(id) => repo.update(id, CustomerPatch::from(draft)).await,
        };
        let customer = match saved {
            Ok(customer) => customer,
            Err(e) => {
                self.fail(failure, &e);
                return Ok(SubmitStatus::Failed);
            }
        };

        self.wizard = None;
        self.screen = Screen::List;
        self.notice = Some(Notice::success(if editing.is_some() {
            notices::CUSTOMER_UPDATED
        } else {
            notices::CUSTOMER_ADDED
        }));
        // A failed reload replaces the success notice.
        self.load().await;
        Ok(SubmitStatus::Saved(customer))
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: CustomerId) {
        self.pending_delete = Some(id);
    }

    /// Drop the pending confirmation.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the customer awaiting confirmation.
    ///
    /// The confirmation closes whether or not the delete succeeds. Returns
    /// `true` if a customer was deleted.
    #[instrument(skip(self))]
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.pending_delete.take() else {
            return false;
        };

        match self.repo.delete(&id).await {
            Ok(()) => {
                self.notice = Some(Notice::success(notices::CUSTOMER_DELETED));
                self.load().await;
                true
            }
            Err(e) => {
                self.fail(notices::DELETE_FAILED, &e);
                false
            }
        }
    }

    fn fail(&mut self, message: &str, err: &RepositoryError) {
        error!(error = %err, "{message}");
        self.notice = Some(Notice::error(message));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::{MockCustomerRepository, StoreRepository};
    use crate::store::{MemoryStore, StoreError};
    use chrono::Utc;
    use rubico_core::{CustomerDraft, Email};

    fn storage_error() -> RepositoryError {
        RepositoryError::Storage(StoreError::Io {
            key: "customers_index".to_string(),
            source: std::io::Error::other("disk full"),
        })
    }

    fn sample(id: &str) -> Customer {
        Customer::from_draft(
            CustomerId::parse(id).unwrap(),
            Utc::now(),
            CustomerDraft {
                full_name: "Jo March".to_string(),
                email: Some(Email::parse("jo@x.com").unwrap()),
                phone: None,
                billing_address: "12 Orchard House Lane".to_string(),
                shipping_same_as_billing: true,
                shipping_address: None,
            },
        )
    }

    fn memory_app() -> CustomerApp {
        CustomerApp::new(
            Arc::new(StoreRepository::new(MemoryStore::new())),
            crate::listing::DEFAULT_PAGE_SIZE,
        )
    }

    async fn fill_and_review(app: &mut CustomerApp) {
        let form = app.wizard_mut().unwrap().form_mut();
        form.full_name = "Jo".to_string();
        assert_eq!(app.next_step().await.unwrap(), StepOutcome::Blocked);

        app.wizard_mut().unwrap().form_mut().email = "jo@x.com".to_string();
        assert_eq!(
            app.next_step().await.unwrap(),
            StepOutcome::Advanced(Step::Address)
        );

        app.wizard_mut().unwrap().form_mut().billing_address = "short".to_string();
        assert_eq!(app.next_step().await.unwrap(), StepOutcome::Blocked);

        app.wizard_mut().unwrap().form_mut().billing_address = "15 Baker Street".to_string();
        assert_eq!(
            app.next_step().await.unwrap(),
            StepOutcome::Advanced(Step::Review)
        );
    }

    #[tokio::test]
    async fn test_add_flow_returns_to_list_with_notice() {
        let mut app = memory_app();
        assert!(app.load().await);
        app.open_add();
        assert_eq!(app.screen(), &Screen::Add);

        fill_and_review(&mut app).await;
        assert_eq!(
            app.wizard().unwrap().review().shipping_address,
            crate::wizard::SAME_AS_BILLING
        );

        let SubmitStatus::Saved(customer) = app.submit_form().await.unwrap() else {
            panic!("expected the customer to be saved");
        };
        assert_eq!(app.screen(), &Screen::List);
        assert!(app.wizard().is_none());
        assert_eq!(app.customers(), std::slice::from_ref(&customer));
        assert_eq!(
            app.notice(),
            Some(&Notice::success(notices::CUSTOMER_ADDED))
        );
    }

    #[tokio::test]
    async fn test_add_calls_create_once() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|draft| Ok(Customer::from_draft(CustomerId::generate(), Utc::now(), draft)));
        repo.expect_get_all().returning(|| Ok(Vec::new()));

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        app.open_add();
        fill_and_review(&mut app).await;

        assert!(matches!(
            app.submit_form().await.unwrap(),
            SubmitStatus::Saved(_)
        ));
    }

    #[tokio::test]
    async fn test_create_failure_keeps_form_open() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_create().returning(|_| Err(storage_error()));
        repo.expect_get_all().never();

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        app.open_add();
        fill_and_review(&mut app).await;

        assert_eq!(app.submit_form().await.unwrap(), SubmitStatus::Failed);
        assert_eq!(app.screen(), &Screen::Add);
        assert_eq!(app.wizard().unwrap().form().email, "jo@x.com");
        assert_eq!(app.notice(), Some(&Notice::error(notices::ADD_FAILED)));
    }

    #[tokio::test]
    async fn test_edit_flow_overwrites_record() {
        let existing = sample("c-1");
        let mut repo = MockCustomerRepository::new();
        let stored = existing.clone();
        repo.expect_get().returning(move |_| Ok(Some(stored.clone())));
        repo.expect_email_exists().never();
        let base = existing.clone();
        repo.expect_update()
            .times(1)
            .returning(move |_, patch| {
                assert_eq!(patch.phone, Some(None));
                Ok(patch.apply(base.clone()))
            });
        repo.expect_get_all().returning(|| Ok(Vec::new()));

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        assert!(app.open_edit(&existing.id).await);
        assert_eq!(app.screen(), &Screen::Edit(existing.id.clone()));
        assert_eq!(app.wizard().unwrap().form().full_name, "Jo March");

        app.wizard_mut().unwrap().form_mut().full_name = "Josephine March".to_string();
        app.next_step().await.unwrap();
        app.next_step().await.unwrap();

        let SubmitStatus::Saved(updated) = app.submit_form().await.unwrap() else {
            panic!("expected the customer to be saved");
        };
        assert_eq!(updated.full_name, "Josephine March");
        assert_eq!(updated.id, existing.id);
        assert_eq!(
            app.notice(),
            Some(&Notice::success(notices::CUSTOMER_UPDATED))
        );
    }

    #[tokio::test]
    async fn test_update_failure_notice() {
        let existing = sample("c-1");
        let mut repo = MockCustomerRepository::new();
        let stored = existing.clone();
        repo.expect_get().returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update().returning(|id, _| Err(RepositoryError::NotFound(id.clone())));

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        app.open_edit(&existing.id).await;
        app.next_step().await.unwrap();
        app.next_step().await.unwrap();

        assert_eq!(app.submit_form().await.unwrap(), SubmitStatus::Failed);
        assert_eq!(app.notice(), Some(&Notice::error(notices::UPDATE_FAILED)));
        assert_eq!(app.screen(), &Screen::Edit(existing.id));
    }

    #[tokio::test]
    async fn test_open_edit_unknown_id() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_get().returning(|_| Ok(None));

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        assert!(!app.open_edit(&CustomerId::parse("ghost").unwrap()).await);
        assert_eq!(app.screen(), &Screen::List);
        assert_eq!(
            app.notice(),
            Some(&Notice::error(notices::CUSTOMER_NOT_FOUND))
        );
    }

    #[tokio::test]
    async fn test_load_failure_keeps_previous_list() {
        let mut repo = MockCustomerRepository::new();
        let mut calls = 0;
        repo.expect_get_all().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![sample("c-1")])
            } else {
                Err(storage_error())
            }
        });

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        assert!(app.load().await);
        assert!(!app.load().await);
        assert_eq!(app.customers().len(), 1);
        assert_eq!(app.notice(), Some(&Notice::error(notices::LOAD_FAILED)));
    }

    #[tokio::test]
    async fn test_delete_confirmation() {
        let mut app = memory_app();
        app.open_add();
        fill_and_review(&mut app).await;
        let SubmitStatus::Saved(customer) = app.submit_form().await.unwrap() else {
            panic!("expected the customer to be saved");
        };

        app.request_delete(customer.id.clone());
        app.cancel_delete();
        assert!(!app.confirm_delete().await);
        assert_eq!(app.customers().len(), 1);

        app.request_delete(customer.id.clone());
        assert_eq!(app.pending_delete(), Some(&customer.id));
        assert!(app.confirm_delete().await);
        assert!(app.pending_delete().is_none());
        assert!(app.customers().is_empty());
        assert_eq!(
            app.take_notice(),
            Some(Notice::success(notices::CUSTOMER_DELETED))
        );
        assert!(app.notice().is_none());
    }

    #[tokio::test]
    async fn test_reload_failure_after_add_shows_load_error() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|draft| Ok(Customer::from_draft(CustomerId::generate(), Utc::now(), draft)));
        repo.expect_get_all().returning(|| Err(storage_error()));

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        app.open_add();
        fill_and_review(&mut app).await;

        assert!(matches!(
            app.submit_form().await.unwrap(),
            SubmitStatus::Saved(_)
        ));
        assert_eq!(app.screen(), &Screen::List);
        assert_eq!(app.notice(), Some(&Notice::error(notices::LOAD_FAILED)));
    }

    #[tokio::test]
    async fn test_reload_failure_after_delete_shows_load_error() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_delete().times(1).returning(|_| Ok(()));
        repo.expect_get_all().returning(|| Err(storage_error()));

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        app.request_delete(CustomerId::parse("c-1").unwrap());

        assert!(app.confirm_delete().await);
        assert_eq!(app.notice(), Some(&Notice::error(notices::LOAD_FAILED)));
    }

    #[tokio::test]
    async fn test_delete_failure_closes_confirmation() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_delete().returning(|_| Err(storage_error()));
        repo.expect_get_all().never();

        let mut app = CustomerApp::new(Arc::new(repo), 10);
        app.request_delete(CustomerId::parse("c-1").unwrap());

        assert!(!app.confirm_delete().await);
        assert!(app.pending_delete().is_none());
        assert_eq!(app.notice(), Some(&Notice::error(notices::DELETE_FAILED)));
    }

    #[tokio::test]
    async fn test_form_actions_need_an_open_form() {
        let mut app = memory_app();
        assert!(matches!(
            app.next_step().await,
            Err(AppError::NoActiveForm)
        ));
        assert!(matches!(app.submit_form().await, Err(AppError::NoActiveForm)));

        app.open_add();
        app.cancel_form();
        assert_eq!(app.screen(), &Screen::List);
        assert!(app.wizard().is_none());
    }

    #[tokio::test]
    async fn test_list_query_through_controller() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_get_all()
            .returning(|| Ok((0..12).map(|n| sample(&format!("c{n}"))).collect()));

        let mut app = CustomerApp::new(Arc::new(repo), 5);
        app.load().await;
        app.set_page(3);
        assert_eq!(app.page().items.len(), 2);

        app.set_search("jo march");
        assert_eq!(app.query().page(), 1);
        assert_eq!(app.page().total_matches, 12);

        app.set_search("nobody");
        app.set_sort(SortOrder::NameDesc);
        assert_eq!(app.page().summary(), "Showing 0 of 0 customers");
    }
}
