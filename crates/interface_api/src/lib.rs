//! HTTP API Layer
//!
//! This crate provides the REST API for vehicle service contract quoting
//! using Axum. Every business route is scoped by tenant in its path.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for products, quotes and special quote requests
//! - **Middleware**: Request ids, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects with structural validation
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{build_service, create_router};
//!
//! let service = build_service(&config, catalog)?;
//! let app = create_router(Arc::new(service), config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::SystemClock;
use domain_quote::{
    InMemoryCatalogAdapter, InMemoryQuoteRepository, InMemorySpecialRequestRepository,
    ProductCatalog, QuoteError, QuoteService, QuoteServiceSettings,
};

use crate::config::ApiConfig;
use crate::handlers::{health, products, quotes, special_requests};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QuoteService>,
    pub config: ApiConfig,
}

/// Wires a quote service over in-memory adapters for a loaded catalog
///
/// `default_tax_percent` from the configuration replaces the catalog's
/// default rate; state and zip overrides are kept.
pub fn build_service(config: &ApiConfig, catalog: ProductCatalog) -> Result<QuoteService, QuoteError> {
    let mut tax = catalog.tax;
    if let Some(percent) = config.default_tax_percent {
        tax.default_percent = percent;
    }
    let problems = tax.problems();
    if !problems.is_empty() {
        return Err(QuoteError::InvalidConfiguration(problems));
    }
    if config.number_attempts == 0 {
        return Err(QuoteError::InvalidConfiguration(vec![
            "number_attempts must be at least 1".to_string(),
        ]));
    }

    let service = QuoteService::new(
        Arc::new(InMemoryCatalogAdapter::new(catalog.products)),
        Arc::new(InMemoryQuoteRepository::new()),
        Arc::new(InMemorySpecialRequestRepository::new()),
        Arc::new(SystemClock),
    )
    .with_settings(QuoteServiceSettings {
        tax,
        number_attempts: config.number_attempts,
    });
    Ok(service)
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - Quote service shared by all handlers
/// * `config` - API configuration
pub fn create_router(service: Arc<QuoteService>, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let tenant_routes = Router::new()
        .route("/products", get(products::list_products))
        .route("/quotes", post(quotes::create_quote).get(quotes::list_quotes))
        .route("/quotes/:quote_number", get(quotes::get_quote))
        .route("/special-quote-requests", get(special_requests::list_requests))
        .route("/special-quote-requests/:id", get(special_requests::get_request))
        .route(
            "/special-quote-requests/:id/review",
            post(special_requests::review_request),
        );

    let api_routes = Router::new()
        .nest("/tenants/:tenant_id", tenant_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
