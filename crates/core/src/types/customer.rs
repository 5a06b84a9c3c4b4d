//! Customer record, draft and patch types.
//!
//! The persisted JSON shape uses camelCase field names with the exception of
//! `created_at`, and omits optional fields that are not set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CustomerId, Email, Phone};

/// A stored customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Generated on create, never changes.
    pub id: CustomerId,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    pub billing_address: String,
    pub shipping_same_as_billing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    /// Set once on create, never changes.
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Build a record from a draft plus the repository-assigned fields.
    #[must_use]
    pub fn from_draft(id: CustomerId, created_at: DateTime<Utc>, draft: CustomerDraft) -> Self {
        Self {
            id,
            full_name: draft.full_name,
            email: draft.email,
            phone: draft.phone,
            billing_address: draft.billing_address,
            shipping_same_as_billing: draft.shipping_same_as_billing,
            shipping_address: draft.shipping_address,
            created_at,
        }
    }

    /// The editable part of this record.
    #[must_use]
    pub fn to_draft(&self) -> CustomerDraft {
        CustomerDraft {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            billing_address: self.billing_address.clone(),
            shipping_same_as_billing: self.shipping_same_as_billing,
            shipping_address: self.shipping_address.clone(),
        }
    }
}

/// A customer without the repository-assigned `id` and `created_at`.
///
/// This is the payload accepted by the repository's `create` and produced by
/// a successfully validated form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    pub billing_address: String,
    pub shipping_same_as_billing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
}

/// A partial update to a customer.
///
/// `None` keeps the existing value. For the optional fields, `Some(None)`
/// clears the value. There is no way to express a change to `id` or
/// `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub full_name: Option<String>,
    pub email: Option<Option<Email>>,
    pub phone: Option<Option<Phone>>,
    pub billing_address: Option<String>,
    pub shipping_same_as_billing: Option<bool>,
    pub shipping_address: Option<Option<String>>,
}

impl CustomerPatch {
    /// Returns `true` if applying this patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.billing_address.is_none()
            && self.shipping_same_as_billing.is_none()
            && self.shipping_address.is_none()
    }

    /// Shallow field-level merge of this patch over `customer`.
    #[must_use]
    pub fn apply(self, mut customer: Customer) -> Customer {
        if let Some(full_name) = self.full_name {
            customer.full_name = full_name;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if let Some(billing_address) = self.billing_address {
            customer.billing_address = billing_address;
        }
        if let Some(same) = self.shipping_same_as_billing {
            customer.shipping_same_as_billing = same;
        }
        if let Some(shipping_address) = self.shipping_address {
            customer.shipping_address = shipping_address;
        }
        customer
    }
}

impl From<CustomerDraft> for CustomerPatch {
    /// A patch that overwrites every editable field, clearing optional
    /// fields the draft leaves unset.
    fn from(draft: CustomerDraft) -> Self {
        Self {
            full_name: Some(draft.full_name),
            email: Some(draft.email),
            phone: Some(draft.phone),
            billing_address: Some(draft.billing_address),
            shipping_same_as_billing: Some(draft.shipping_same_as_billing),
            shipping_address: Some(draft.shipping_address),
        }
    }
}
