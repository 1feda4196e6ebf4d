//! Quoting application service
//!
//! `QuoteService` wires the pure core to the ports: it loads the product,
//! runs the eligibility check, then either prices and stores a quote or
//! routes and stores a special quote request. Reviewer actions go through
//! here too, so that expiry is always judged against the service clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use core_kernel::{Clock, HealthCheckResult, PortError, ProductId, SpecialQuoteRequestId, TenantId};

use crate::eligibility::{check_eligibility, Eligibility};
use crate::error::QuoteError;
use crate::numbering::{
    NumberGenerator, TimestampNumberGenerator, QUOTE_NUMBER_PREFIX, SPECIAL_REQUEST_NUMBER_PREFIX,
};
use crate::ports::{ProductCatalogPort, QuoteRepository, SpecialQuoteRequestRepository, SpecialRequestQuery};
use crate::premium::{price_quote, QuoteResult};
use crate::product::{PricingContext, Product};
use crate::special_request::{
    route_special_request, CustomerContact, EffectiveStatus, ReviewAction, RoutingInput,
    SpecialQuoteRequest,
};
use crate::tax::{Jurisdiction, TaxSchedule};
use crate::vehicle::{CoverageSelections, VehicleData};

/// Default number of draws before giving up on a unique number
pub const DEFAULT_NUMBER_ATTEMPTS: u32 = 3;

/// Tunables for [`QuoteService`]
#[derive(Debug, Clone)]
pub struct QuoteServiceSettings {
    pub tax: TaxSchedule,
    /// How many numbers to draw when the repository reports a duplicate
    pub number_attempts: u32,
}

impl Default for QuoteServiceSettings {
    fn default() -> Self {
        Self {
            tax: TaxSchedule::default(),
            number_attempts: DEFAULT_NUMBER_ATTEMPTS,
        }
    }
}

/// A caller's request for a price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub product_id: ProductId,
    pub vehicle: VehicleData,
    pub selections: CoverageSelections,
    /// Needed only when the vehicle turns out to be ineligible
    #[serde(default)]
    pub customer: Option<CustomerContact>,
    /// Where the contract is sold; falls back to the customer's jurisdiction
    #[serde(default)]
    pub jurisdiction: Option<Jurisdiction>,
    #[serde(default)]
    pub request_reason: Option<String>,
}

impl QuoteRequest {
    pub fn new(product_id: ProductId, vehicle: VehicleData, selections: CoverageSelections) -> Self {
        Self {
            product_id,
            vehicle,
            selections,
            customer: None,
            jurisdiction: None,
            request_reason: None,
        }
    }

    pub fn with_customer(mut self, customer: CustomerContact) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.jurisdiction = Some(jurisdiction);
        self
    }

    fn tax_jurisdiction(&self) -> Option<&Jurisdiction> {
        self.jurisdiction
            .as_ref()
            .or_else(|| self.customer.as_ref().and_then(|c| c.jurisdiction.as_ref()))
    }
}

/// What a quote request produced
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Quoted(QuoteResult),
    SpecialRequest(SpecialQuoteRequest),
}

/// Orchestrates eligibility, pricing, routing and review
pub struct QuoteService {
    catalog: Arc<dyn ProductCatalogPort>,
    quotes: Arc<dyn QuoteRepository>,
    requests: Arc<dyn SpecialQuoteRequestRepository>,
    clock: Arc<dyn Clock>,
    numbers: Arc<dyn NumberGenerator>,
    settings: QuoteServiceSettings,
}

impl QuoteService {
    pub fn new(
        catalog: Arc<dyn ProductCatalogPort>,
        quotes: Arc<dyn QuoteRepository>,
        requests: Arc<dyn SpecialQuoteRequestRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            quotes,
            requests,
            clock,
            numbers: Arc::new(TimestampNumberGenerator),
            settings: QuoteServiceSettings::default(),
        }
    }

    pub fn with_number_generator(mut self, numbers: Arc<dyn NumberGenerator>) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn with_settings(mut self, settings: QuoteServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current instant according to the service clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Health of every adapter behind the service
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.catalog.health_check().await,
            self.quotes.health_check().await,
            self.requests.health_check().await,
        ]
    }

    /// Active products offered to a tenant
    pub async fn list_products(&self, tenant_id: TenantId) -> Result<Vec<Product>, QuoteError> {
        let products = self.catalog.list_products(tenant_id).await?;
        Ok(products.into_iter().filter(|p| p.active).collect())
    }

    /// Prices the request, or routes it to manual review when ineligible
    pub async fn request_quote(
        &self,
        tenant_id: TenantId,
        request: QuoteRequest,
    ) -> Result<QuoteOutcome, QuoteError> {
        let product = self.load_product(tenant_id, request.product_id).await?;
        if !product.active {
            return Err(QuoteError::ProductInactive(product.code.clone()));
        }
        let ctx = PricingContext::new(tenant_id, &product)?;
        let now = self.clock.now();

        match check_eligibility(&ctx, &request.vehicle, &request.selections, now) {
            Eligibility::Eligible => {
                let quote = self.price_and_store(&ctx, &request, now).await?;
                info!(
                    tenant_id = %tenant_id,
                    product = %product.code,
                    quote_number = quote.quote_number(),
                    total = %quote.total_premium(),
                    "Quote issued"
                );
                Ok(QuoteOutcome::Quoted(quote))
            }
            eligibility @ Eligibility::Ineligible { .. } => {
                let routed = self
                    .route_and_store(&ctx, &request, &eligibility, now)
                    .await?;
                info!(
                    tenant_id = %tenant_id,
                    product = %product.code,
                    request_number = routed.request_number(),
                    failures = ?routed.eligibility_failures(),
                    "Vehicle ineligible, special quote request created"
                );
                Ok(QuoteOutcome::SpecialRequest(routed))
            }
        }
    }

    pub async fn get_quote(&self, tenant_id: TenantId, quote_number: &str) -> Result<QuoteResult, QuoteError> {
        Ok(self.quotes.get_quote(tenant_id, quote_number).await?)
    }

    pub async fn list_quotes(&self, tenant_id: TenantId) -> Result<Vec<QuoteResult>, QuoteError> {
        Ok(self.quotes.list_quotes(tenant_id).await?)
    }

    pub async fn get_special_request(
        &self,
        tenant_id: TenantId,
        id: SpecialQuoteRequestId,
    ) -> Result<SpecialQuoteRequest, QuoteError> {
        Ok(self.requests.get_request(tenant_id, id).await?)
    }

    /// Lists requests, filtered by status as seen now
    pub async fn list_special_requests(
        &self,
        tenant_id: TenantId,
        status: Option<EffectiveStatus>,
    ) -> Result<Vec<SpecialQuoteRequest>, QuoteError> {
        let mut query = SpecialRequestQuery::all(self.clock.now());
        if let Some(status) = status {
            query = query.with_status(status);
        }
        Ok(self.requests.list_requests(tenant_id, query).await?)
    }

    /// Applies a reviewer action and stores the result
    ///
    /// The write only lands if the stored status is still the one the action
    /// was checked against. A reviewer who loses a race gets
    /// `InvalidStateTransition` and the winning decision stands.
    pub async fn review_special_request(
        &self,
        tenant_id: TenantId,
        id: SpecialQuoteRequestId,
        action: ReviewAction,
    ) -> Result<SpecialQuoteRequest, QuoteError> {
        let mut request = self.requests.get_request(tenant_id, id).await?;
        let from = request.status();
        let reviewer = action.reviewer().to_string();

        if let Err(e) = request.apply_review(action, self.clock.now()) {
            warn!(
                tenant_id = %tenant_id,
                request_number = request.request_number(),
                reviewer = %reviewer,
                error = %e,
                "Review action rejected"
            );
            return Err(e);
        }
        match self.requests.update_request(request.clone(), from).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                let current = self.requests.get_request(tenant_id, id).await?;
                warn!(
                    tenant_id = %tenant_id,
                    request_number = request.request_number(),
                    reviewer = %reviewer,
                    stored = %current.status(),
                    "Review lost to a concurrent decision"
                );
                return Err(QuoteError::invalid_transition(current.status(), request.status()));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            tenant_id = %tenant_id,
            request_number = request.request_number(),
            reviewer = %reviewer,
            from = %from,
            to = %request.status(),
            "Special quote request reviewed"
        );
        Ok(request)
    }

    async fn load_product(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Product, QuoteError> {
        self.catalog
            .get_product(tenant_id, product_id)
            .await
            .map_err(|e| match e {
                PortError::NotFound { .. } => QuoteError::ProductNotFound(product_id),
                other => QuoteError::Port(other),
            })
    }

    async fn price_and_store(
        &self,
        ctx: &PricingContext<'_>,
        request: &QuoteRequest,
        now: DateTime<Utc>,
    ) -> Result<QuoteResult, QuoteError> {
        let tax_rate = self.settings.tax.rate_for(request.tax_jurisdiction());
        let rates = &ctx.product().rate_table;

        for attempt in 1..=self.settings.number_attempts {
            let number = self.numbers.next(QUOTE_NUMBER_PREFIX, now);
            let quote = price_quote(
                ctx,
                rates,
                tax_rate,
                &request.vehicle,
                &request.selections,
                number,
                now,
            )?;
            match self.quotes.insert_quote(quote.clone()).await {
                Ok(()) => return Ok(quote),
                Err(e) if e.is_conflict() => {
                    debug!(attempt, quote_number = quote.quote_number(), "Quote number taken, drawing again");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(QuoteError::NumberGenerationExhausted(self.settings.number_attempts))
    }

    async fn route_and_store(
        &self,
        ctx: &PricingContext<'_>,
        request: &QuoteRequest,
        eligibility: &Eligibility,
        now: DateTime<Utc>,
    ) -> Result<SpecialQuoteRequest, QuoteError> {
        for attempt in 1..=self.settings.number_attempts {
            let number = self.numbers.next(SPECIAL_REQUEST_NUMBER_PREFIX, now);
            let input = RoutingInput {
                vehicle: &request.vehicle,
                selections: &request.selections,
                customer: request.customer.as_ref(),
                eligibility,
                request_reason: request.request_reason.as_deref(),
            };
            let routed = route_special_request(ctx, input, number, now)?;
            match self.requests.insert_request(routed.clone()).await {
                Ok(()) => return Ok(routed),
                Err(e) if e.is_conflict() => {
                    debug!(attempt, request_number = routed.request_number(), "Request number taken, drawing again");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(QuoteError::NumberGenerationExhausted(self.settings.number_attempts))
    }
}
