//! # Spreadbook Core
//!
//! Foundational types for the Spreadbook workspace: calendar dates, tenors,
//! and the core error type. Everything here is pure and synchronous; the
//! heavier machinery (parsing, solving, valuation) lives in the
//! `spreadbook-pricing` and `spreadbook-portfolio` crates.

#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{Date, Tenor, TenorUnit};
