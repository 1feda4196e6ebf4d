//! Test Utilities Crate
//!
//! Shared fixtures and helpers for the quoting test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built products, vehicles and instants
//! - `builders`: Builders for products and quote requests
//! - `assertions`: Assertion helpers for money and premium breakdowns
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
