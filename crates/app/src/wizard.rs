//! Three-step customer entry wizard.
//!
//! ```text
//! Personal --next--> Address --next--> Review --submit--> CustomerDraft
//!    ^                  |  ^              |
//!    +------back--------+  +----back------+
//!    ^                                    |
//!    +-----------jump_to (from Review)----+
//! ```
//!
//! `next` only advances when the current step's fields validate. Field errors
//! are returned as data and kept on the wizard until the same step is
//! validated again.

use std::fmt;

use rubico_core::validation::messages;
use rubico_core::{Customer, CustomerDraft, CustomerForm, Field, FieldErrors};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::repository::{CustomerRepository, RepositoryError};

/// Shown on the review step in place of a separate shipping address.
pub const SAME_AS_BILLING: &str = "Same as billing address";

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Personal,
    Address,
    Review,
}

impl Step {
    /// 1-based position, for "Step 2 of 3" style progress.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            Self::Personal => 1,
            Self::Address => 2,
            Self::Review => 3,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Personal => "Personal Information",
            Self::Address => "Address Information",
            Self::Review => "Review & Confirm",
        }
    }

    /// Fields validated before leaving this step.
    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::Personal => &[Field::FullName, Field::Email, Field::Phone],
            Self::Address => &[
                Field::BillingAddress,
                Field::ShippingSameAsBilling,
                Field::ShippingAddress,
            ],
            Self::Review => &Field::ALL,
        }
    }

    const fn following(self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Address),
            Self::Address => Some(Self::Review),
            Self::Review => None,
        }
    }

    const fn preceding(self) -> Option<Self> {
        match self {
            Self::Personal => None,
            Self::Address => Some(Self::Personal),
            Self::Review => Some(Self::Address),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Whether the wizard creates a new customer or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WizardMode {
    Create,
    Edit(Box<Customer>),
}

/// Errors from wizard actions that are not allowed or could not run.
///
/// Invalid input is not an error; see [`StepOutcome`] and [`SubmitOutcome`].
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("cannot {action} from the {from} step")]
    InvalidTransition { from: Step, action: &'static str },

    #[error("email uniqueness check failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of [`CustomerWizard::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to this step.
    Advanced(Step),
    /// Stayed put; see [`CustomerWizard::errors`].
    Blocked,
}

/// Result of [`CustomerWizard::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every rule passed.
    Ready(CustomerDraft),
    /// Stayed on review; see [`CustomerWizard::errors`].
    Blocked,
}

/// Read-only summary shown on the review step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: String,
    pub shipping_address: String,
}

impl ReviewSummary {
    /// Label/value rows in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        vec![
            (Field::FullName.label(), self.full_name.as_str()),
            (Field::Email.label(), self.email.as_deref().unwrap_or("-")),
            (Field::Phone.label(), self.phone.as_deref().unwrap_or("-")),
            (Field::BillingAddress.label(), self.billing_address.as_str()),
            (Field::ShippingAddress.label(), self.shipping_address.as_str()),
        ]
    }
}

/// Wizard state for one add or edit session.
#[derive(Debug, Clone)]
pub struct CustomerWizard {
    step: Step,
    form: CustomerForm,
    errors: FieldErrors,
    mode: WizardMode,
}

impl CustomerWizard {
    /// An empty form on the first step.
    #[must_use]
    pub fn create() -> Self {
        Self {
            step: Step::Personal,
            form: CustomerForm::default(),
            errors: FieldErrors::new(),
            mode: WizardMode::Create,
        }
    }

    /// A form pre-filled from `customer`, on the first step.
    #[must_use]
    pub fn edit(customer: Customer) -> Self {
        Self {
            step: Step::Personal,
            form: CustomerForm::from_customer(&customer),
            errors: FieldErrors::new(),
            mode: WizardMode::Edit(Box::new(customer)),
        }
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub const fn form(&self) -> &CustomerForm {
        &self.form
    }

    /// Mutable access to the form inputs.
    pub const fn form_mut(&mut self) -> &mut CustomerForm {
        &mut self.form
    }

    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The record being edited, if any.
    #[must_use]
    pub fn original(&self) -> Option<&Customer> {
        match &self.mode {
            WizardMode::Create => None,
            WizardMode::Edit(customer) => Some(customer),
        }
    }

    /// Validate the current step and move forward if it passes.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidTransition`] on the review step and
    /// [`WizardError::Repository`] if the email uniqueness check fails to run.
    #[instrument(skip_all, fields(step = ?self.step))]
    pub async fn next(
        &mut self,
        repo: &dyn CustomerRepository,
    ) -> Result<StepOutcome, WizardError> {
        let Some(target) = self.step.following() else {
            return Err(self.invalid("go forward"));
        };

        if !self.validate_scope(self.step.fields(), repo).await? {
            debug!(errors = %self.errors, "Step blocked");
            return Ok(StepOutcome::Blocked);
        }

        self.step = target;
        debug!(to = ?target, "Step advanced");
        Ok(StepOutcome::Advanced(target))
    }

    /// Go to the previous step without validating.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidTransition`] on the first step.
    pub fn back(&mut self) -> Result<Step, WizardError> {
        let target = self.step.preceding().ok_or_else(|| self.invalid("go back"))?;
        self.step = target;
        Ok(target)
    }

    /// From review, return to an earlier step to change it.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidTransition`] unless on the review step
    /// and targeting the personal or address step.
    pub fn jump_to(&mut self, step: Step) -> Result<(), WizardError> {
        if self.step != Step::Review || step == Step::Review {
            return Err(self.invalid("jump"));
        }
        self.step = step;
        Ok(())
    }

    /// Validate everything one last time and hand back the draft.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidTransition`] unless on the review step
    /// and [`WizardError::Repository`] if the uniqueness check fails to run.
    #[instrument(skip_all)]
    pub async fn submit(
        &mut self,
        repo: &dyn CustomerRepository,
    ) -> Result<SubmitOutcome, WizardError> {
        if self.step != Step::Review {
            return Err(self.invalid("submit"));
        }

        if !self.validate_scope(&Field::ALL, repo).await? {
            debug!(errors = %self.errors, "Submit blocked");
            return Ok(SubmitOutcome::Blocked);
        }

        match self.form.clone().into_draft() {
            Ok(draft) => Ok(SubmitOutcome::Ready(draft)),
            Err(errors) => {
                self.errors = errors;
                Ok(SubmitOutcome::Blocked)
            }
        }
    }

    /// Summary of the current inputs.
    #[must_use]
    pub fn review(&self) -> ReviewSummary {
        let optional = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        let shipping_address = if self.form.shipping_same_as_billing {
            SAME_AS_BILLING.to_owned()
        } else {
            self.form.shipping_address.clone()
        };

        ReviewSummary {
            full_name: self.form.full_name.clone(),
            email: optional(&self.form.email),
            phone: optional(&self.form.phone),
            billing_address: self.form.billing_address.clone(),
            shipping_address,
        }
    }

    /// Replace the errors for `scope` with a fresh validation run.
    /// Returns `true` if the scope is valid.
    async fn validate_scope(
        &mut self,
        scope: &[Field],
        repo: &dyn CustomerRepository,
    ) -> Result<bool, WizardError> {
        let mut found = self.form.validate_fields(scope);

        if scope.contains(&Field::Email)
            && self.needs_uniqueness_check(&found)
            && repo.email_exists(&self.form.email).await?
        {
            found.insert(Field::Email, messages::EMAIL_ALREADY_EXISTS);
        }

        self.errors.clear_fields(scope);
        let valid = found.is_empty();
        self.errors.extend(found);
        Ok(valid)
    }

    fn needs_uniqueness_check(&self, found: &FieldErrors) -> bool {
        if self.form.email.is_empty() || found.contains(Field::Email) {
            return false;
        }
        let unchanged = self
            .original()
            .and_then(|c| c.email.as_ref())
            .is_some_and(|original| original.matches(&self.form.email));
        !unchanged
    }

    fn invalid(&self, action: &'static str) -> WizardError {
        WizardError::InvalidTransition {
            from: self.step,
            action,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::MockCustomerRepository;
    use chrono::Utc;
    use rubico_core::CustomerId;

    fn no_duplicates() -> MockCustomerRepository {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo
    }

    fn fill_personal(wizard: &mut CustomerWizard) {
        wizard.form_mut().full_name = "Jo March".to_string();
        wizard.form_mut().email = "jo@x.com".to_string();
    }

    fn existing() -> Customer {
        let mut wizard = CustomerWizard::create();
        fill_personal(&mut wizard);
        wizard.form_mut().billing_address = "12 Orchard House Lane".to_string();
        let draft = wizard.form().clone().into_draft().unwrap();
        Customer::from_draft(CustomerId::parse("c-1").unwrap(), Utc::now(), draft)
    }

    #[tokio::test]
    async fn test_personal_step_requires_contact() {
        let repo = no_duplicates();
        let mut wizard = CustomerWizard::create();
        wizard.form_mut().full_name = "Jo".to_string();

        assert_eq!(wizard.next(&repo).await.unwrap(), StepOutcome::Blocked);
        assert_eq!(wizard.step(), Step::Personal);
        assert_eq!(
            wizard.errors().get(Field::Email),
            Some(messages::EMAIL_OR_PHONE_REQUIRED)
        );

        wizard.form_mut().email = "jo@x.com".to_string();
        assert_eq!(
            wizard.next(&repo).await.unwrap(),
            StepOutcome::Advanced(Step::Address)
        );
        assert!(wizard.errors().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_blocks_personal_step() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists()
            .times(1)
            .returning(|email| Ok(email == "jo@x.com"));

        let mut wizard = CustomerWizard::create();
        fill_personal(&mut wizard);

        assert_eq!(wizard.next(&repo).await.unwrap(), StepOutcome::Blocked);
        assert_eq!(
            wizard.errors().get(Field::Email),
            Some(messages::EMAIL_ALREADY_EXISTS)
        );
    }

    #[tokio::test]
    async fn test_invalid_email_skips_uniqueness_check() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists().never();

        let mut wizard = CustomerWizard::create();
        wizard.form_mut().full_name = "Jo".to_string();
        wizard.form_mut().email = "nope".to_string();

        assert_eq!(wizard.next(&repo).await.unwrap(), StepOutcome::Blocked);
        assert_eq!(
            wizard.errors().get(Field::Email),
            Some(messages::INVALID_EMAIL)
        );
    }

    #[tokio::test]
    async fn test_edit_with_unchanged_email_skips_uniqueness_check() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists().never();

        let mut wizard = CustomerWizard::edit(existing());
        assert_eq!(wizard.form().full_name, "Jo March");
        wizard.form_mut().email = "JO@X.COM".to_string();

        assert_eq!(
            wizard.next(&repo).await.unwrap(),
            StepOutcome::Advanced(Step::Address)
        );
    }

    #[tokio::test]
    async fn test_edit_with_new_email_checks_uniqueness() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists().times(1).returning(|_| Ok(true));

        let mut wizard = CustomerWizard::edit(existing());
        wizard.form_mut().email = "beth@x.com".to_string();

        assert_eq!(wizard.next(&repo).await.unwrap(), StepOutcome::Blocked);
    }

    #[tokio::test]
    async fn test_uniqueness_check_failure_is_an_error() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_email_exists().returning(|_| {
            Err(RepositoryError::DataCorruption("bad record".to_string()))
        });

        let mut wizard = CustomerWizard::create();
        fill_personal(&mut wizard);

        assert!(matches!(
            wizard.next(&repo).await,
            Err(WizardError::Repository(_))
        ));
        assert_eq!(wizard.step(), Step::Personal);
    }

    #[tokio::test]
    async fn test_address_step_and_review() {
        let repo = no_duplicates();
        let mut wizard = CustomerWizard::create();
        fill_personal(&mut wizard);
        wizard.next(&repo).await.unwrap();

        wizard.form_mut().billing_address = "short".to_string();
        assert_eq!(wizard.next(&repo).await.unwrap(), StepOutcome::Blocked);
        assert_eq!(
            wizard.errors().get(Field::BillingAddress),
            Some(messages::ADDRESS_TOO_SHORT)
        );

        wizard.form_mut().billing_address = "15 Baker Street".to_string();
        assert_eq!(
            wizard.next(&repo).await.unwrap(),
            StepOutcome::Advanced(Step::Review)
        );

        let summary = wizard.review();
        assert_eq!(summary.shipping_address, SAME_AS_BILLING);
        assert_eq!(summary.email.as_deref(), Some("jo@x.com"));
        assert_eq!(summary.phone, None);
    }

    #[tokio::test]
    async fn test_submit_returns_draft() {
        let repo = no_duplicates();
        let mut wizard = CustomerWizard::create();
        fill_personal(&mut wizard);
        wizard.next(&repo).await.unwrap();
        wizard.form_mut().billing_address = "15 Baker Street".to_string();
        wizard.next(&repo).await.unwrap();

        let SubmitOutcome::Ready(draft) = wizard.submit(&repo).await.unwrap() else {
            panic!("expected a draft");
        };
        assert_eq!(draft.full_name, "Jo March");
        assert_eq!(draft.email.unwrap().as_str(), "jo@x.com");
        assert!(draft.shipping_same_as_billing);
    }

    #[tokio::test]
    async fn test_submit_revalidates_everything() {
        let repo = no_duplicates();
        let mut wizard = CustomerWizard::create();
        fill_personal(&mut wizard);
        wizard.next(&repo).await.unwrap();
        wizard.form_mut().billing_address = "15 Baker Street".to_string();
        wizard.next(&repo).await.unwrap();

        wizard.form_mut().full_name = "J".to_string();
        assert_eq!(wizard.submit(&repo).await.unwrap(), SubmitOutcome::Blocked);
        assert_eq!(wizard.step(), Step::Review);
        assert!(wizard.errors().contains(Field::FullName));
    }

    #[tokio::test]
    async fn test_back_and_jump_keep_data() {
        let repo = no_duplicates();
        let mut wizard = CustomerWizard::create();
        fill_personal(&mut wizard);
        wizard.next(&repo).await.unwrap();
        wizard.form_mut().billing_address = "15 Baker Street".to_string();
        wizard.next(&repo).await.unwrap();

        wizard.jump_to(Step::Personal).unwrap();
        assert_eq!(wizard.step(), Step::Personal);
        assert_eq!(wizard.form().billing_address, "15 Baker Street");

        wizard.next(&repo).await.unwrap();
        assert_eq!(wizard.back().unwrap(), Step::Personal);
        assert_eq!(wizard.form().email, "jo@x.com");
    }

    #[tokio::test]
    async fn test_invalid_transitions_leave_state_unchanged() {
        let repo = no_duplicates();
        let mut wizard = CustomerWizard::create();

        assert!(matches!(
            wizard.back(),
            Err(WizardError::InvalidTransition { from: Step::Personal, .. })
        ));
        assert!(wizard.jump_to(Step::Address).is_err());
        assert!(wizard.submit(&repo).await.is_err());
        assert_eq!(wizard.step(), Step::Personal);

        fill_personal(&mut wizard);
        wizard.next(&repo).await.unwrap();
        wizard.form_mut().billing_address = "15 Baker Street".to_string();
        wizard.next(&repo).await.unwrap();

        assert!(wizard.next(&repo).await.is_err());
        assert!(wizard.jump_to(Step::Review).is_err());
        assert_eq!(wizard.step(), Step::Review);
    }

    #[test]
    fn test_review_shows_separate_shipping_address() {
        let mut wizard = CustomerWizard::create();
        wizard.form_mut().shipping_same_as_billing = false;
        wizard.form_mut().shipping_address = "9 Plumfield Road".to_string();

        let summary = wizard.review();
        assert_eq!(summary.shipping_address, "9 Plumfield Road");
        assert_eq!(summary.rows().len(), 5);
    }
}
