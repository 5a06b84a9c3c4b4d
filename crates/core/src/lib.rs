//! Rubico Core - Shared customer types and validation rules.
//!
//! This crate provides the types used across all Rubico components:
//! - `app` - Record store, customer repository, wizard and screen controller
//! - `cli` - Terminal front end driving the screen controller
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no storage
//! access, no async. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for customer IDs, emails and phone numbers,
//!   plus the customer record, draft and patch types
//! - [`validation`] - Field-level and cross-field rules for customer forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{CustomerForm, Field, FieldErrors};
