//! In-memory adapters
//!
//! Back the ports with `tokio::sync::RwLock<HashMap<..>>`. Used by the API
//! binary when no database is configured and by every service test.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, PortError, ProductId, SpecialQuoteRequestId,
    TenantId,
};

use crate::ports::{ProductCatalogPort, QuoteRepository, SpecialQuoteRequestRepository, SpecialRequestQuery};
use crate::premium::QuoteResult;
use crate::product::Product;
use crate::special_request::{SpecialQuoteRequest, SpecialQuoteStatus};

/// Catalog held in memory, typically loaded from a catalog file
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogAdapter {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryCatalogAdapter {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }

    /// Adds or replaces a product
    pub async fn upsert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }
}

impl DomainPort for InMemoryCatalogAdapter {}

#[async_trait]
impl HealthCheckable for InMemoryCatalogAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory-catalog")
    }
}

#[async_trait]
impl ProductCatalogPort for InMemoryCatalogAdapter {
    async fn get_product(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Product, PortError> {
        self.products
            .read()
            .await
            .get(&product_id)
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Product", product_id))
    }

    async fn list_products(&self, tenant_id: TenantId) -> Result<Vec<Product>, PortError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(products)
    }
}

/// Quotes keyed by quote number
#[derive(Debug, Default, Clone)]
pub struct InMemoryQuoteRepository {
    quotes: Arc<RwLock<HashMap<String, QuoteResult>>>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.quotes.read().await.len()
    }
}

impl DomainPort for InMemoryQuoteRepository {}

#[async_trait]
impl HealthCheckable for InMemoryQuoteRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory-quotes")
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn insert_quote(&self, quote: QuoteResult) -> Result<(), PortError> {
        let mut quotes = self.quotes.write().await;
        if quotes.contains_key(quote.quote_number()) {
            return Err(PortError::conflict(format!(
                "quote number {} already exists",
                quote.quote_number()
            )));
        }
        quotes.insert(quote.quote_number().to_string(), quote);
        Ok(())
    }

    async fn get_quote(&self, tenant_id: TenantId, quote_number: &str) -> Result<QuoteResult, PortError> {
        self.quotes
            .read()
            .await
            .get(quote_number)
            .filter(|q| q.tenant_id() == tenant_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Quote", quote_number))
    }

    async fn list_quotes(&self, tenant_id: TenantId) -> Result<Vec<QuoteResult>, PortError> {
        let mut quotes: Vec<QuoteResult> = self
            .quotes
            .read()
            .await
            .values()
            .filter(|q| q.tenant_id() == tenant_id)
            .cloned()
            .collect();
        quotes.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(quotes)
    }
}

/// Special quote requests keyed by id, with a number index for uniqueness
#[derive(Debug, Default, Clone)]
pub struct InMemorySpecialRequestRepository {
    inner: Arc<RwLock<RequestStore>>,
}

#[derive(Debug, Default)]
struct RequestStore {
    by_id: HashMap<SpecialQuoteRequestId, SpecialQuoteRequest>,
    numbers: HashMap<String, SpecialQuoteRequestId>,
}

impl InMemorySpecialRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemorySpecialRequestRepository {}

#[async_trait]
impl HealthCheckable for InMemorySpecialRequestRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory-special-requests")
    }
}

#[async_trait]
impl SpecialQuoteRequestRepository for InMemorySpecialRequestRepository {
    async fn insert_request(&self, request: SpecialQuoteRequest) -> Result<(), PortError> {
        let mut store = self.inner.write().await;
        if store.numbers.contains_key(request.request_number()) {
            return Err(PortError::conflict(format!(
                "request number {} already exists",
                request.request_number()
            )));
        }
        if store.by_id.contains_key(&request.id()) {
            return Err(PortError::conflict(format!("request {} already exists", request.id())));
        }
        store
            .numbers
            .insert(request.request_number().to_string(), request.id());
        store.by_id.insert(request.id(), request);
        Ok(())
    }

    async fn get_request(
        &self,
        tenant_id: TenantId,
        id: SpecialQuoteRequestId,
    ) -> Result<SpecialQuoteRequest, PortError> {
        self.inner
            .read()
            .await
            .by_id
            .get(&id)
            .filter(|r| r.tenant_id() == tenant_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("SpecialQuoteRequest", id))
    }

    async fn update_request(
        &self,
        request: SpecialQuoteRequest,
        expected: SpecialQuoteStatus,
    ) -> Result<(), PortError> {
        let mut store = self.inner.write().await;
        match store.by_id.get_mut(&request.id()) {
            Some(existing) if existing.tenant_id() == request.tenant_id() => {
                if existing.status() != expected {
                    return Err(PortError::conflict(format!(
                        "request {} is {}, expected {}",
                        existing.request_number(),
                        existing.status(),
                        expected
                    )));
                }
                *existing = request;
                Ok(())
            }
            _ => Err(PortError::not_found("SpecialQuoteRequest", request.id())),
        }
    }

    async fn list_requests(
        &self,
        tenant_id: TenantId,
        query: SpecialRequestQuery,
    ) -> Result<Vec<SpecialQuoteRequest>, PortError> {
        let mut requests: Vec<SpecialQuoteRequest> = self
            .inner
            .read()
            .await
            .by_id
            .values()
            .filter(|r| r.tenant_id() == tenant_id && query.matches(r))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(requests)
    }
}
