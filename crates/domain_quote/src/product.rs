//! Product definitions
//!
//! A product is a named vehicle-service-contract offering with typed
//! eligibility thresholds, a fee rule, and its base-rate table. Thresholds
//! are configuration; nothing here hard-codes a limit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use core_kernel::{Currency, Money, MoneyError, ProductId, Rate, TenantId};

use crate::error::QuoteError;
use crate::rating::{RateKey, RateTable};
use crate::tax::is_percentage;
use crate::vehicle::{CoverageTier, VehicleClass};

/// Default number of days a priced quote stays valid
pub const DEFAULT_QUOTE_VALIDITY_DAYS: u32 = 30;

/// Longest quote validity a product may configure
pub const MAX_QUOTE_VALIDITY_DAYS: u32 = 3650;

/// Product line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Auto,
    Rv,
    Marine,
    Powersports,
    Home,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Auto => "auto",
            ProductCategory::Rv => "rv",
            ProductCategory::Marine => "marine",
            ProductCategory::Powersports => "powersports",
            ProductCategory::Home => "home",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ProductCategory::Auto),
            "rv" => Ok(ProductCategory::Rv),
            "marine" => Ok(ProductCategory::Marine),
            "powersports" => Ok(ProductCategory::Powersports),
            "home" => Ok(ProductCategory::Home),
            other => Err(QuoteError::validation(format!("unknown product category: {other}"))),
        }
    }
}

/// A coverage level offered by the product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageOptionDefinition {
    pub tier: CoverageTier,
    pub description: String,
    /// Terms on offer, in months
    pub term_months: Vec<u32>,
    /// Components covered at this tier
    #[serde(default)]
    pub features: Vec<String>,
}

/// Thresholds a vehicle must meet for automated pricing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConstraints {
    pub max_vehicle_age_years: u32,
    pub max_mileage: u32,
    /// Makes that are never priced automatically, compared case-insensitively
    #[serde(default)]
    pub excluded_makes: BTreeSet<String>,
    pub supported_classes: BTreeSet<VehicleClass>,
}

impl EligibilityConstraints {
    /// Creates constraints supporting every vehicle class and excluding no makes
    pub fn new(max_vehicle_age_years: u32, max_mileage: u32) -> Self {
        Self {
            max_vehicle_age_years,
            max_mileage,
            excluded_makes: BTreeSet::new(),
            supported_classes: VehicleClass::ALL.into_iter().collect(),
        }
    }

    pub fn exclude_make(mut self, make: impl Into<String>) -> Self {
        self.excluded_makes.insert(make.into());
        self
    }

    /// Restricts the supported classes to exactly `classes`
    pub fn only_classes(mut self, classes: impl IntoIterator<Item = VehicleClass>) -> Self {
        self.supported_classes = classes.into_iter().collect();
        self
    }

    pub fn is_make_excluded(&self, make: &str) -> bool {
        let make = make.trim();
        self.excluded_makes
            .iter()
            .any(|excluded| excluded.trim().eq_ignore_ascii_case(make))
    }

    pub fn supports(&self, class: VehicleClass) -> bool {
        self.supported_classes.contains(&class)
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.max_mileage == 0 {
            problems.push("max_mileage must be greater than zero".to_string());
        }
        if self.supported_classes.is_empty() {
            problems.push("at least one vehicle class must be supported".to_string());
        }
        if self.excluded_makes.iter().any(|m| m.trim().is_empty()) {
            problems.push("excluded makes must not be blank".to_string());
        }
        problems
    }
}

/// Administrative fee rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeConfig {
    /// Fixed amount in the product currency
    Flat { amount: Decimal },
    /// Percentage of the base premium (5 means 5%)
    Percentage { percent: Decimal },
}

impl Default for FeeConfig {
    fn default() -> Self {
        FeeConfig::Flat { amount: dec!(0) }
    }
}

impl FeeConfig {
    /// Fee for a base premium, rounded half-up to cents
    pub fn fee_for(&self, base_premium: &Money) -> Result<Money, MoneyError> {
        match self {
            FeeConfig::Flat { amount } => {
                Ok(Money::new(*amount, base_premium.currency()).round_half_up(2))
            }
            FeeConfig::Percentage { percent } => {
                Rate::from_percentage(*percent).apply_rounded(base_premium, 2)
            }
        }
    }

    fn problems(&self) -> Vec<String> {
        match self {
            FeeConfig::Flat { amount } if amount.is_sign_negative() && !amount.is_zero() => {
                vec![format!("flat fee {} must not be negative", amount)]
            }
            FeeConfig::Percentage { percent } if !is_percentage(*percent) => {
                vec![format!("fee percent {} must be between 0 and 100", percent)]
            }
            _ => Vec::new(),
        }
    }
}

fn default_quote_validity_days() -> u32 {
    DEFAULT_QUOTE_VALIDITY_DAYS
}

fn default_active() -> bool {
    true
}

/// A named insurance offering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub tenant_id: TenantId,
    pub code: String,
    pub name: String,
    pub category: ProductCategory,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub coverage_options: Vec<CoverageOptionDefinition>,
    pub eligibility: EligibilityConstraints,
    #[serde(default)]
    pub fees: FeeConfig,
    pub rate_table: RateTable,
    #[serde(default = "default_quote_validity_days")]
    pub quote_validity_days: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Product {
    pub fn coverage_option(&self, tier: &CoverageTier) -> Option<&CoverageOptionDefinition> {
        self.coverage_options.iter().find(|o| o.tier.matches(tier))
    }

    /// Lists every configuration problem with this product
    pub fn problems(&self) -> Vec<String> {
        let prefix = |p: String| format!("product {}: {}", self.code, p);
        let mut problems = Vec::new();

        if self.code.trim().is_empty() {
            problems.push("product code must not be blank".to_string());
        }
        if self.quote_validity_days == 0 {
            problems.push("quote_validity_days must be greater than zero".to_string());
        } else if self.quote_validity_days > MAX_QUOTE_VALIDITY_DAYS {
            problems.push(format!(
                "quote_validity_days {} exceeds maximum of {MAX_QUOTE_VALIDITY_DAYS}",
                self.quote_validity_days
            ));
        }
        if self.rate_table.currency() != self.currency {
            problems.push(format!(
                "rate table currency {} differs from product currency {}",
                self.rate_table.currency(),
                self.currency
            ));
        }
        for entry in self.rate_table.entries() {
            if entry.base_amount.is_sign_negative() && !entry.base_amount.is_zero() {
                problems.push(format!(
                    "negative base rate {} for tier '{}', term {}, class {}",
                    entry.base_amount, entry.tier, entry.term_months, entry.vehicle_class
                ));
            }
        }
        problems.extend(self.eligibility.problems());
        problems.extend(self.fees.problems());

        problems.into_iter().map(prefix).collect()
    }

    /// Offered (tier, term, class) combinations that have no rate entry
    pub fn unpriced_options(&self) -> Vec<RateKey> {
        let mut missing = Vec::new();
        for option in &self.coverage_options {
            for term in &option.term_months {
                for class in &self.eligibility.supported_classes {
                    let key = RateKey::new(&option.tier, *term, *class);
                    if !self.rate_table.contains(&key) {
                        missing.push(key);
                    }
                }
            }
        }
        missing
    }
}

/// Tenant and product a pricing call runs under
///
/// Built once per request and passed explicitly to every core function.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    tenant_id: TenantId,
    product: &'a Product,
}

impl<'a> PricingContext<'a> {
    /// Fails when the product belongs to another tenant
    pub fn new(tenant_id: TenantId, product: &'a Product) -> Result<Self, QuoteError> {
        if product.tenant_id != tenant_id {
            return Err(QuoteError::TenantMismatch {
                expected: product.tenant_id,
                actual: tenant_id,
            });
        }
        Ok(Self { tenant_id, product })
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn product(&self) -> &'a Product {
        self.product
    }
}
