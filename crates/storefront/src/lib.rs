//! Fresh Cart Storefront library.
//!
//! A server-rendered shop in front of a remote e-commerce REST API. The
//! remote service owns every record; this crate fetches, displays and
//! mutates them on behalf of a signed-in shopper.
//!
//! The binary in `main.rs` only wires configuration, telemetry and the
//! listener; everything else lives here so the integration tests can build
//! the same application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod stores;
