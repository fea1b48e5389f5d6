//! Bazaar storefront data layer.
//!
//! Turns raw storefront API payloads into the view-models a front-end
//! renders, and keeps the shopper's client-side state.
//!
//! # Modules
//!
//! - [`catalog`] - Category organizer and product/cart transformers
//! - [`settings`] - Storefront settings parser
//! - [`validation`] - Address and profile form validators
//! - [`storage`] - Wishlist, currency, token, and language persistence
//! - [`api`] - REST client for the storefront API
//! - [`currency`] - Exchange rates and visitor currency detection
//! - [`config`] - Environment configuration
//! - [`telemetry`] - Tracing subscriber setup

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod currency;
pub mod error;
pub mod settings;
pub mod storage;
pub mod telemetry;
pub mod validation;

pub use error::{AppError, Result};
