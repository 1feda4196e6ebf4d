//! Ports and Adapters Infrastructure
//!
//! Shared types for the hexagonal layout used across the workspace. The
//! quoting core is pure; persistence and catalog lookups live behind port
//! traits defined in the domain crate and implemented by adapters.
//!
//! ```text
//!   interface_api (HTTP) ──► QuoteService ──► pure core (eligibility, pricing, routing)
//!                                 │
//!                                 ▼
//!                        port traits (catalog, quotes, special requests)
//!                                 ▲
//!                    ┌────────────┴────────────┐
//!                 in-memory adapter      database / external adapter
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure reported by an adapter
///
/// The in-memory adapters and any storage-backed replacement speak this one
/// type, so `QuoteService` can tell a missing record from a duplicate number
/// from an outage without knowing which adapter is plugged in.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: String, id: String },

    /// The adapter refused the record as stored data
    #[error("Rejected by storage: {message}")]
    Validation { message: String },

    /// Uniqueness violation, e.g. a quote number already issued
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage unreachable: {message}")]
    Connection { message: String },

    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    #[error("Adapter failure: {message}")]
    Internal { message: String },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict { message: message.into() }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal { message: message.into() }
    }

    /// Outages that a later attempt may get past
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. } | PortError::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Callers answer a conflict by drawing a fresh number
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports must be shareable across request handlers.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn healthy(adapter_id: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}
