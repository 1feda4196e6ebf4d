//! Base-rate lookup
//!
//! The calculator only needs `rate(tier, term, class) -> amount`. How rates
//! are stored is the caller's business: a [`RateTable`] loaded from an
//! uploaded rate sheet, a closure, or an adapter over some other store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use core_kernel::{Currency, Money};

use crate::vehicle::{CoverageSelections, CoverageTier, VehicleClass};

/// Key into a rate table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateKey {
    tier: String,
    term_months: u32,
    vehicle_class: VehicleClass,
}

impl RateKey {
    pub fn new(tier: &CoverageTier, term_months: u32, vehicle_class: VehicleClass) -> Self {
        Self {
            tier: tier.normalized(),
            term_months,
            vehicle_class,
        }
    }

    pub fn from_selections(selections: &CoverageSelections) -> Self {
        Self::new(
            &selections.tier,
            selections.term_months,
            selections.vehicle_class,
        )
    }

    /// Normalized (lower-cased) tier name
    pub fn tier(&self) -> &str {
        &self.tier
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn vehicle_class(&self) -> VehicleClass {
        self.vehicle_class
    }
}

/// Synchronous base-rate lookup
pub trait RateLookup {
    /// Returns the base amount for `key`, or `None` when no entry exists
    fn rate(&self, key: &RateKey) -> Option<Money>;
}

impl<F> RateLookup for F
where
    F: Fn(&RateKey) -> Option<Money>,
{
    fn rate(&self, key: &RateKey) -> Option<Money> {
        self(key)
    }
}

/// A single row of an uploaded rate sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub tier: CoverageTier,
    pub term_months: u32,
    pub vehicle_class: VehicleClass,
    pub base_amount: Decimal,
}

impl RateEntry {
    pub fn new(
        tier: impl Into<String>,
        term_months: u32,
        vehicle_class: VehicleClass,
        base_amount: Decimal,
    ) -> Self {
        Self {
            tier: CoverageTier::new(tier),
            term_months,
            vehicle_class,
            base_amount,
        }
    }

    pub fn key(&self) -> RateKey {
        RateKey::new(&self.tier, self.term_months, self.vehicle_class)
    }
}

/// Errors raised while assembling a rate table
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("Duplicate rate entry for tier '{tier}', term {term_months}, class {vehicle_class}")]
    DuplicateEntry {
        tier: String,
        term_months: u32,
        vehicle_class: VehicleClass,
    },
}

/// Serialized shape of a rate table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTableDocument {
    #[serde(default)]
    pub currency: Currency,
    pub entries: Vec<RateEntry>,
}

/// In-memory rate table keyed by (tier, term, class)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RateTableDocument", into = "RateTableDocument")]
pub struct RateTable {
    currency: Currency,
    entries: HashMap<RateKey, RateEntry>,
}

impl RateTable {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            entries: HashMap::new(),
        }
    }

    /// Builds a table, rejecting duplicate keys
    pub fn from_entries(
        currency: Currency,
        entries: impl IntoIterator<Item = RateEntry>,
    ) -> Result<Self, RateTableError> {
        let mut table = Self::new(currency);
        for entry in entries {
            table.insert(entry)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, entry: RateEntry) -> Result<(), RateTableError> {
        let key = entry.key();
        if self.entries.contains_key(&key) {
            return Err(RateTableError::DuplicateEntry {
                tier: entry.tier.to_string(),
                term_months: entry.term_months,
                vehicle_class: entry.vehicle_class,
            });
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &RateKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in a stable order (tier, term, class)
    pub fn entries(&self) -> Vec<&RateEntry> {
        let mut entries: Vec<&RateEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            (a.tier.normalized(), a.term_months, a.vehicle_class)
                .cmp(&(b.tier.normalized(), b.term_months, b.vehicle_class))
        });
        entries
    }
}

impl RateLookup for RateTable {
    fn rate(&self, key: &RateKey) -> Option<Money> {
        self.entries
            .get(key)
            .map(|entry| Money::new(entry.base_amount, self.currency))
    }
}

impl TryFrom<RateTableDocument> for RateTable {
    type Error = RateTableError;

    fn try_from(doc: RateTableDocument) -> Result<Self, Self::Error> {
        Self::from_entries(doc.currency, doc.entries)
    }
}

impl From<RateTable> for RateTableDocument {
    fn from(table: RateTable) -> Self {
        let entries = table.entries().into_iter().cloned().collect();
        RateTableDocument {
            currency: table.currency,
            entries,
        }
    }
}
