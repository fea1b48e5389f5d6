//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across the Bazaar components:
//! - `storefront` - Catalog shaping, local state, and REST/currency clients
//! - `integration-tests` - End-to-end checks against stub HTTP servers
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, currencies, and product tags

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
