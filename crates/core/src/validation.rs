//! Validation rules for customer forms.
//!
//! Rules come in two kinds:
//!
//! - **Field-level rules** look at a single field (`fullName` length, email
//!   syntax, ...).
//! - **Cross-field rules** look at several fields together (email *or* phone
//!   must be present; a separate shipping address is needed when shipping
//!   differs from billing).
//!
//! Validation never fails with an error type. It returns a [`FieldErrors`]
//! map with at most one human-readable message per field, so a form can show
//! several problems at once.
//!
//! Validation can be scoped to a subset of fields, which is how each wizard
//! step checks only its own inputs. Cross-field rules run after the scoped
//! field-level rules pass, and only when the field they report on is in scope.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Customer, CustomerDraft, Email, Phone};

/// Minimum length of `fullName`, in characters.
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum length of `fullName`, in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Minimum length of `billingAddress`, in characters.
pub const ADDRESS_MIN_CHARS: usize = 10;

/// User-facing validation messages.
pub mod messages {
    pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
    pub const NAME_TOO_LONG: &str = "Name must be at most 100 characters";
    pub const INVALID_EMAIL: &str = "Invalid email";
    pub const INVALID_PHONE: &str = "Invalid phone format";
    pub const ADDRESS_TOO_SHORT: &str = "Address too short";
    pub const EMAIL_OR_PHONE_REQUIRED: &str = "Either email or phone is required";
    pub const SHIPPING_ADDRESS_REQUIRED: &str =
        "Shipping address required when different from billing";
    pub const EMAIL_ALREADY_EXISTS: &str = "Email already exists";
}

/// A customer form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FullName,
    Email,
    Phone,
    BillingAddress,
    ShippingSameAsBilling,
    ShippingAddress,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Self; 6] = [
        Self::FullName,
        Self::Email,
        Self::Phone,
        Self::BillingAddress,
        Self::ShippingSameAsBilling,
        Self::ShippingAddress,
    ];

    /// The field's name in the persisted record.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::BillingAddress => "billingAddress",
            Self::ShippingSameAsBilling => "shippingSameAsBilling",
            Self::ShippingAddress => "shippingAddress",
        }
    }

    /// A short label for display next to an input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::BillingAddress => "Billing Address",
            Self::ShippingSameAsBilling => "Shipping same as billing",
            Self::ShippingAddress => "Shipping Address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validation messages keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// An empty set of errors.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// A set holding a single error.
    #[must_use]
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Record an error. The first message recorded for a field wins.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// The message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Returns `true` if `field` has an error.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Returns `true` if there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Drop the errors for the given fields.
    pub fn clear_fields(&mut self, fields: &[Field]) {
        self.0.retain(|field, _| !fields.contains(field));
    }

    /// Copy every error from `other`, keeping existing messages.
    pub fn extend(&mut self, other: Self) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }

    /// Iterate over `(field, message)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Raw form input, exactly as typed.
///
/// Empty strings stand for "not provided" in the optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub billing_address: String,
    pub shipping_same_as_billing: bool,
    pub shipping_address: String,
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            billing_address: String::new(),
            shipping_same_as_billing: true,
            shipping_address: String::new(),
        }
    }
}

impl CustomerForm {
    /// Pre-fill a form from an existing record.
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            full_name: customer.full_name.clone(),
            email: customer
                .email
                .as_ref()
                .map(|e| e.as_str().to_owned())
                .unwrap_or_default(),
            phone: customer
                .phone
                .as_ref()
                .map(|p| p.as_str().to_owned())
                .unwrap_or_default(),
            billing_address: customer.billing_address.clone(),
            shipping_same_as_billing: customer.shipping_same_as_billing,
            shipping_address: customer.shipping_address.clone().unwrap_or_default(),
        }
    }

    /// Run every rule against the whole form.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        self.validate_fields(&Field::ALL)
    }

    /// Run the rules for `scope` only.
    #[must_use]
    pub fn validate_fields(&self, scope: &[Field]) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for field in scope {
            if let Some(message) = self.check_field(*field) {
                errors.insert(*field, message);
            }
        }

        if !errors.is_empty() {
            return errors;
        }

        if scope.contains(&Field::Email) && self.email.is_empty() && self.phone.is_empty() {
            errors.insert(Field::Email, messages::EMAIL_OR_PHONE_REQUIRED);
        }

        if scope.contains(&Field::ShippingAddress)
            && !self.shipping_same_as_billing
            && self.shipping_address.trim().is_empty()
        {
            errors.insert(Field::ShippingAddress, messages::SHIPPING_ADDRESS_REQUIRED);
        }

        errors
    }

    /// Validate the whole form and convert it into a draft.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any rule fails.
    pub fn into_draft(self) -> Result<CustomerDraft, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let email = non_empty(&self.email)
            .map(Email::parse)
            .transpose()
            .map_err(|_| FieldErrors::single(Field::Email, messages::INVALID_EMAIL))?;
        let phone = non_empty(&self.phone)
            .map(Phone::parse)
            .transpose()
            .map_err(|_| FieldErrors::single(Field::Phone, messages::INVALID_PHONE))?;

        Ok(CustomerDraft {
            full_name: self.full_name,
            email,
            phone,
            billing_address: self.billing_address,
            shipping_same_as_billing: self.shipping_same_as_billing,
            shipping_address: non_empty(&self.shipping_address).map(str::to_owned),
        })
    }

    fn check_field(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::FullName => {
                let len = self.full_name.chars().count();
                if len < NAME_MIN_CHARS {
                    Some(messages::NAME_TOO_SHORT)
                } else if len > NAME_MAX_CHARS {
                    Some(messages::NAME_TOO_LONG)
                } else {
                    None
                }
            }
            Field::Email => non_empty(&self.email)
                .and_then(|email| Email::parse(email).err())
                .map(|_| messages::INVALID_EMAIL),
            Field::Phone => non_empty(&self.phone)
                .and_then(|phone| Phone::parse(phone).err())
                .map(|_| messages::INVALID_PHONE),
            Field::BillingAddress => (self.billing_address.chars().count() < ADDRESS_MIN_CHARS)
                .then_some(messages::ADDRESS_TOO_SHORT),
            Field::ShippingSameAsBilling | Field::ShippingAddress => None,
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
