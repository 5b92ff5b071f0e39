//! Downpour Core - Shared domain types.
//!
//! This crate provides the types shared by every Downpour component:
//! - `mailer` - Purchase receipt and sale notice composition
//! - `cli` - Command-line tools for sending notifications
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no mail transport,
//! no configuration loading. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and payment records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
