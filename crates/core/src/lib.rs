//! Fresh Cart Core - Shared types library.
//!
//! This crate provides the value types and form validation used by the
//! storefront and its integration tests:
//! - `storefront` - Server-rendered shop in front of the remote e-commerce API
//! - `integration-tests` - End-to-end tests against a fake remote API
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no
//! HTTP clients. Every record these types describe is owned by the remote
//! API; the storefront only reads and displays them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails and titles
//! - [`validation`] - Form validation applied before anything is submitted

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
