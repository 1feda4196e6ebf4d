//! Quote handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use domain_quote::QuoteOutcome;

use crate::dto::quote::{CreateQuoteRequest, QuoteOutcomeResponse, QuoteResponse};
use crate::dto::special_request::SpecialQuoteRequestResponse;
use crate::handlers::parse_tenant;
use crate::{error::ApiError, AppState};

/// Requests a quote
///
/// Responds `201 Created` with the priced quote, or `202 Accepted` with the
/// special quote request when the vehicle needs manual review.
pub async fn create_quote(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<CreateQuoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<QuoteOutcomeResponse>), ApiError> {
    let tenant_id = parse_tenant(&tenant_id)?;
    let Json(body) = payload?;
    let request = body.into_domain()?;

    let now = state.service.now();
    let (status, body) = match state.service.request_quote(tenant_id, request).await? {
        QuoteOutcome::Quoted(quote) => (
            StatusCode::CREATED,
            QuoteOutcomeResponse::Quoted(QuoteResponse::from_quote(&quote, now)),
        ),
        QuoteOutcome::SpecialRequest(routed) => (
            StatusCode::ACCEPTED,
            QuoteOutcomeResponse::SpecialRequest(SpecialQuoteRequestResponse::from_request(
                &routed, now,
            )),
        ),
    };
    Ok((status, Json(body)))
}

/// Lists the tenant's quotes, newest first
pub async fn list_quotes(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<Vec<QuoteResponse>>, ApiError> {
    let tenant_id = parse_tenant(&tenant_id)?;
    let now = state.service.now();
    let quotes = state.service.list_quotes(tenant_id).await?;
    Ok(Json(
        quotes.iter().map(|q| QuoteResponse::from_quote(q, now)).collect(),
    ))
}

/// Gets a quote by its quote number
pub async fn get_quote(
    State(state): State<AppState>,
    Path((tenant_id, quote_number)): Path<(String, String)>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let tenant_id = parse_tenant(&tenant_id)?;
    let quote = state.service.get_quote(tenant_id, &quote_number).await?;
    Ok(Json(QuoteResponse::from_quote(&quote, state.service.now())))
}
