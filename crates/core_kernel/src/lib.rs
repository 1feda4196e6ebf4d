//! Core Kernel - Foundational types and utilities for the quoting platform
//!
//! This crate provides the building blocks used by the domain and API crates:
//! - Money and rate types with precise decimal arithmetic and half-up rounding
//! - Strongly-typed identifiers for tenants, products, quotes, and requests
//! - Clocks and validity windows for expiry handling
//! - Port error and marker traits for the ports-and-adapters layout

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Clock, SystemClock, FixedClock, ValidityWindow, TemporalError};
pub use identifiers::{IdParseError, TenantId, ProductId, QuoteId, SpecialQuoteRequestId};
pub use ports::{PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable};
