//! Quoting domain errors
//!
//! An eligibility failure is not an error: it is the `Ineligible` outcome
//! and routes to a special quote request. Everything here is a failure of
//! the pricing or review attempt itself.

use thiserror::Error;

use core_kernel::{MoneyError, PortError, ProductId, TemporalError, TenantId};

use crate::vehicle::VehicleClass;

/// No rate-table entry exists for the requested combination
///
/// Kept as its own type so callers can never confuse an unpriced product
/// with a zero premium.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("No rate found for tier '{tier}', term {term_months} months, class {vehicle_class}")]
pub struct RateNotFoundError {
    pub tier: String,
    pub term_months: u32,
    pub vehicle_class: VehicleClass,
}

/// Errors that can occur in the quoting domain
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Rate lookup failed; the product cannot be sold for this selection
    #[error(transparent)]
    RateNotFound(#[from] RateNotFoundError),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Product {0} is not active")]
    ProductInactive(String),

    /// The product belongs to a different tenant than the caller
    #[error("Tenant mismatch: product belongs to {expected}, request made for {actual}")]
    TenantMismatch { expected: TenantId, actual: TenantId },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Reviewer acted on a request past its expiry
    #[error("Special quote request {0} has expired")]
    RequestExpired(String),

    #[error("Missing review detail: {0}")]
    MissingReviewDetail(String),

    /// Ineligible vehicle, but no contact to hand the case to underwriting
    #[error("Customer contact is required to route a special quote request")]
    CustomerContactRequired { reasons: Vec<String> },

    #[error("A special quote request needs at least one eligibility failure")]
    NoEligibilityFailures,

    #[error("Invalid product configuration: {}", .0.join("; "))]
    InvalidConfiguration(Vec<String>),

    #[error("Could not generate a unique number after {0} attempts")]
    NumberGenerationExhausted(u32),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Financial error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Storage error: {0}")]
    Port(#[from] PortError),
}

impl QuoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        QuoteError::Validation(message.into())
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        QuoteError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
