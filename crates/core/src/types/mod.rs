//! Core types for Downpour.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod payment;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use payment::{BuyerIdentity, LineItem, Payment, UserInfo};
pub use price::{CurrencyCode, Price};
