//! Core types for Rubico.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer;
pub mod email;
pub mod id;
pub mod phone;

pub use customer::{Customer, CustomerDraft, CustomerPatch};
pub use email::{Email, EmailError};
pub use id::{CustomerId, CustomerIdError};
pub use phone::{Phone, PhoneError};
