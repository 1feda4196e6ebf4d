//! Time sources and validity windows
//!
//! Quotes and special quote requests carry a creation instant and an expiry
//! instant. Expiry is always evaluated against a caller-supplied `now`, which
//! comes from a [`Clock`] so that services can be driven deterministically.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid window: start {start} must be before end {end}")]
    InvalidWindow { start: String, end: String },

    #[error("Window length must be at least one day, got {0}")]
    NonPositiveLength(i64),

    #[error("Window of {days} days from {start} is past the representable range")]
    OutOfRange { start: String, days: i64 },
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a settable instant, for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Moves the clock to `instant`
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = instant;
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// The interval during which a quote or request is live
///
/// `starts_at` is inclusive. A window is expired once `now` is strictly
/// after `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ValidityWindow {
    pub fn new(starts_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<Self, TemporalError> {
        if starts_at >= expires_at {
            return Err(TemporalError::InvalidWindow {
                start: starts_at.to_string(),
                end: expires_at.to_string(),
            });
        }
        Ok(Self {
            starts_at,
            expires_at,
        })
    }

    /// Creates a window of exactly `days` whole days from `starts_at`
    pub fn days_from(starts_at: DateTime<Utc>, days: i64) -> Result<Self, TemporalError> {
        if days <= 0 {
            return Err(TemporalError::NonPositiveLength(days));
        }
        let expires_at = Duration::try_days(days)
            .and_then(|length| starts_at.checked_add_signed(length))
            .ok_or_else(|| TemporalError::OutOfRange {
                start: starts_at.to_string(),
                days,
            })?;
        Self::new(starts_at, expires_at)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
