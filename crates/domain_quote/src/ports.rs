//! Quoting Domain Ports
//!
//! The pure core never touches storage. `QuoteService` reaches products,
//! priced quotes and special quote requests through these traits, and the
//! application picks the adapters at startup:
//!
//! ```rust,ignore
//! let catalog = ProductCatalog::from_file(&config.catalog_path)?;
//! let service = QuoteService::new(
//!     Arc::new(InMemoryCatalogAdapter::new(catalog.products)),
//!     Arc::new(InMemoryQuoteRepository::new()),
//!     Arc::new(InMemorySpecialRequestRepository::new()),
//!     Arc::new(SystemClock),
//! );
//! ```
//!
//! Every lookup is scoped by tenant. An entity that exists under another
//! tenant is reported as not found.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{DomainPort, HealthCheckable, PortError, ProductId, SpecialQuoteRequestId, TenantId};

use crate::premium::QuoteResult;
use crate::product::Product;
use crate::special_request::{EffectiveStatus, SpecialQuoteRequest, SpecialQuoteStatus};

/// Filter for listing special quote requests
#[derive(Debug, Clone, Copy)]
pub struct SpecialRequestQuery {
    /// Only requests with this effective status
    pub status: Option<EffectiveStatus>,
    /// Instant at which the effective status is evaluated
    pub as_of: DateTime<Utc>,
}

impl SpecialRequestQuery {
    pub fn all(as_of: DateTime<Utc>) -> Self {
        Self { status: None, as_of }
    }

    pub fn with_status(mut self, status: EffectiveStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, request: &SpecialQuoteRequest) -> bool {
        self.status
            .map_or(true, |s| request.effective_status(self.as_of) == s)
    }
}

/// Read access to the product catalog
#[async_trait]
pub trait ProductCatalogPort: DomainPort + HealthCheckable {
    /// The product, or `PortError::NotFound` when it is absent or owned by
    /// another tenant
    async fn get_product(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Product, PortError>;

    /// Every product of the tenant, active or not, ordered by code
    async fn list_products(&self, tenant_id: TenantId) -> Result<Vec<Product>, PortError>;
}

/// Storage for priced quotes
#[async_trait]
pub trait QuoteRepository: DomainPort + HealthCheckable {
    /// Stores a new quote; `PortError::Conflict` if the number is taken
    async fn insert_quote(&self, quote: QuoteResult) -> Result<(), PortError>;

    async fn get_quote(&self, tenant_id: TenantId, quote_number: &str) -> Result<QuoteResult, PortError>;

    /// Newest first
    async fn list_quotes(&self, tenant_id: TenantId) -> Result<Vec<QuoteResult>, PortError>;
}

/// Storage for special quote requests
#[async_trait]
pub trait SpecialQuoteRequestRepository: DomainPort + HealthCheckable {
    /// Stores a new request; `PortError::Conflict` if the number is taken
    async fn insert_request(&self, request: SpecialQuoteRequest) -> Result<(), PortError>;

    async fn get_request(
        &self,
        tenant_id: TenantId,
        id: SpecialQuoteRequestId,
    ) -> Result<SpecialQuoteRequest, PortError>;

    /// Replaces a stored request if its stored status is still `expected`
    ///
    /// `PortError::NotFound` if it was never inserted, `PortError::Conflict`
    /// if another writer moved it on since it was read.
    async fn update_request(
        &self,
        request: SpecialQuoteRequest,
        expected: SpecialQuoteStatus,
    ) -> Result<(), PortError>;

    /// Newest first
    async fn list_requests(
        &self,
        tenant_id: TenantId,
        query: SpecialRequestQuery,
    ) -> Result<Vec<SpecialQuoteRequest>, PortError>;
}
