//! Core type definitions.
//!
//! Newtype wrappers that prevent mixing up the various string identifiers
//! and raw decimals flowing through the storefront.

mod email;
mod id;
mod price;

pub use email::{Email, EmailError};
pub use id::{ProductId, QuoteId, UserId};
pub use price::{CurrencyCode, Price};
