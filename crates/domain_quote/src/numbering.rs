//! Human-readable quote and request numbers
//!
//! Numbers look like `QTE-1735689600000-9F3A1C`: a prefix, the creation
//! instant in Unix milliseconds, and six random upper-case hex digits.
//! Uniqueness is not guaranteed here; repositories reject duplicates and
//! the service draws again.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

pub const QUOTE_NUMBER_PREFIX: &str = "QTE";
pub const SPECIAL_REQUEST_NUMBER_PREFIX: &str = "SQR";

const SUFFIX_LEN: usize = 6;

/// Source of quote and request numbers
pub trait NumberGenerator: Send + Sync {
    fn next(&self, prefix: &str, now: DateTime<Utc>) -> String;
}

/// Timestamp plus random hex suffix
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampNumberGenerator;

impl NumberGenerator for TimestampNumberGenerator {
    fn next(&self, prefix: &str, now: DateTime<Utc>) -> String {
        let random = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
        format!(
            "{}-{}-{}",
            prefix,
            now.timestamp_millis(),
            &random[..SUFFIX_LEN]
        )
    }
}

/// Deterministic counter-based numbers for tests and replays
#[derive(Debug, Default)]
pub struct SequentialNumberGenerator {
    counter: AtomicU64,
}

impl SequentialNumberGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }
}

impl NumberGenerator for SequentialNumberGenerator {
    fn next(&self, prefix: &str, now: DateTime<Utc>) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) & 0xFF_FFFF;
        format!("{}-{}-{:06X}", prefix, now.timestamp_millis(), n)
    }
}
