//! Special quote request handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use crate::dto::special_request::{ListRequestsQuery, ReviewRequest, SpecialQuoteRequestResponse};
use crate::handlers::{parse_request_id, parse_tenant};
use crate::{error::ApiError, AppState};

/// Lists requests, optionally filtered by effective status (`?status=expired`)
pub async fn list_requests(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    query: Result<Query<ListRequestsQuery>, QueryRejection>,
) -> Result<Json<Vec<SpecialQuoteRequestResponse>>, ApiError> {
    let tenant_id = parse_tenant(&tenant_id)?;
    let Query(query) = query?;

    let requests = state
        .service
        .list_special_requests(tenant_id, query.status()?)
        .await?;
    let now = state.service.now();
    Ok(Json(
        requests
            .iter()
            .map(|r| SpecialQuoteRequestResponse::from_request(r, now))
            .collect(),
    ))
}

/// Gets a request by id
pub async fn get_request(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, String)>,
) -> Result<Json<SpecialQuoteRequestResponse>, ApiError> {
    let tenant_id = parse_tenant(&tenant_id)?;
    let id = parse_request_id(&id)?;
    let request = state.service.get_special_request(tenant_id, id).await?;
    Ok(Json(SpecialQuoteRequestResponse::from_request(
        &request,
        state.service.now(),
    )))
}

/// Applies a reviewer action
pub async fn review_request(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, String)>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<SpecialQuoteRequestResponse>, ApiError> {
    let tenant_id = parse_tenant(&tenant_id)?;
    let id = parse_request_id(&id)?;
    let Json(body) = payload?;
    let action = body.into_domain()?;

    let reviewed = state
        .service
        .review_special_request(tenant_id, id, action)
        .await?;
    Ok(Json(SpecialQuoteRequestResponse::from_request(
        &reviewed,
        state.service.now(),
    )))
}
