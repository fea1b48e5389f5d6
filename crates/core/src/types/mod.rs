//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod tag;

pub use id::*;
pub use price::{CurrencyCode, CurrencyCodeError, Money};
pub use tag::ProductTag;
