//! Vehicle Service Contract Quoting Domain
//!
//! Decides whether a vehicle can be priced automatically for a product,
//! prices it when it can, and routes it to manual underwriting review when
//! it cannot.
//!
//! # Layout
//!
//! The core is pure and synchronous: [`eligibility`], [`premium`] and
//! [`special_request`] take every input, including tenant context and the
//! current instant, as arguments and never log or touch storage.
//! [`services::QuoteService`] composes them with the [`ports`].
//!
//! # Flow
//!
//! ```text
//!   QuoteRequest ──► check_eligibility ──Eligible──► price_quote ──► QuoteResult
//!                                      └─Ineligible─► route_special_request ──► SpecialQuoteRequest
//!                                                                               pending ─► reviewing ─► quoted | declined
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_quote::{check_eligibility, price_quote, PricingContext, Eligibility};
//!
//! let ctx = PricingContext::new(tenant_id, &product)?;
//! if let Eligibility::Eligible = check_eligibility(&ctx, &vehicle, &selections, now) {
//!     let quote = price_quote(&ctx, &product.rate_table, tax_rate, &vehicle, &selections, number, now)?;
//!     println!("{}", quote.total_premium());
//! }
//! ```

pub mod adapters;
pub mod catalog;
pub mod eligibility;
pub mod error;
pub mod numbering;
pub mod ports;
pub mod premium;
pub mod product;
pub mod rating;
pub mod services;
pub mod special_request;
pub mod tax;
pub mod vehicle;

pub use adapters::{InMemoryCatalogAdapter, InMemoryQuoteRepository, InMemorySpecialRequestRepository};
pub use catalog::ProductCatalog;
pub use eligibility::{check_eligibility, evaluate_rules, Eligibility, EligibilityRule, RuleResult};
pub use error::{QuoteError, RateNotFoundError};
pub use numbering::{
    NumberGenerator, SequentialNumberGenerator, TimestampNumberGenerator, QUOTE_NUMBER_PREFIX,
    SPECIAL_REQUEST_NUMBER_PREFIX,
};
pub use ports::{ProductCatalogPort, QuoteRepository, SpecialQuoteRequestRepository, SpecialRequestQuery};
pub use premium::{price_quote, PremiumBreakdown, PremiumCalculator, QuoteResult};
pub use product::{
    CoverageOptionDefinition, EligibilityConstraints, FeeConfig, PricingContext, Product,
    ProductCategory, MAX_QUOTE_VALIDITY_DAYS,
};
pub use rating::{RateEntry, RateKey, RateLookup, RateTable, RateTableError};
pub use services::{
    QuoteOutcome, QuoteRequest, QuoteService, QuoteServiceSettings, DEFAULT_NUMBER_ATTEMPTS,
};
pub use special_request::{
    route_special_request, AlternativeQuote, CustomerContact, EffectiveStatus, ReviewAction,
    RoutingInput, SpecialQuoteRequest, SpecialQuoteStatus, DEFAULT_REQUEST_REASON,
    SPECIAL_REQUEST_LIFETIME_DAYS,
};
pub use tax::{Jurisdiction, TaxSchedule};
pub use vehicle::{CoverageSelections, CoverageTier, VehicleClass, VehicleData, VehicleError, Vin};
