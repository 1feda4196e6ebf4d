//! Request handlers

pub mod health;
pub mod products;
pub mod quotes;
pub mod special_requests;

use core_kernel::{SpecialQuoteRequestId, TenantId};

use crate::error::ApiError;

/// Parses a tenant id from the path, with or without its `TEN-` prefix
pub(crate) fn parse_tenant(raw: &str) -> Result<TenantId, ApiError> {
    Ok(raw.parse()?)
}

pub(crate) fn parse_request_id(raw: &str) -> Result<SpecialQuoteRequestId, ApiError> {
    Ok(raw.parse()?)
}
