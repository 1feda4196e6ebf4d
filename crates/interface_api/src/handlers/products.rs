//! Product catalog handlers

use axum::{extract::{Path, State}, Json};

use crate::dto::product::ProductResponse;
use crate::handlers::parse_tenant;
use crate::{error::ApiError, AppState};

/// Lists the tenant's active products
pub async fn list_products(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let tenant_id = parse_tenant(&tenant_id)?;
    let products = state.service.list_products(tenant_id).await?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}
