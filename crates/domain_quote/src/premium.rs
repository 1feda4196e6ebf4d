//! Premium calculation and priced quotes
//!
//! Each component is rounded half-up to cents on its own, and the total is
//! the sum of the rounded components. A breakdown therefore always adds up
//! exactly as printed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, MoneyError, ProductId, QuoteId, Rate, TenantId, ValidityWindow};

use crate::error::{QuoteError, RateNotFoundError};
use crate::product::{FeeConfig, PricingContext};
use crate::rating::{RateKey, RateLookup};
use crate::vehicle::{CoverageSelections, VehicleData};

/// Decimal places every premium component is rounded to
pub const PREMIUM_DECIMAL_PLACES: u32 = 2;

/// Base, taxes, fees and total for one selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub base_premium: Money,
    pub taxes: Money,
    pub fees: Money,
    pub total_premium: Money,
}

impl PremiumBreakdown {
    /// Computes the breakdown for a base amount
    ///
    /// Taxes and percentage fees are both taken on the rounded base.
    pub fn compute(base: Money, tax_rate: Rate, fees: &FeeConfig) -> Result<Self, MoneyError> {
        let base_premium = base.round_half_up(PREMIUM_DECIMAL_PLACES);
        let taxes = tax_rate.apply_rounded(&base_premium, PREMIUM_DECIMAL_PLACES)?;
        let fees = fees.fee_for(&base_premium)?;
        let total_premium = Money::sum(base_premium.currency(), [&base_premium, &taxes, &fees])?
            .round_half_up(PREMIUM_DECIMAL_PLACES);

        Ok(Self {
            base_premium,
            taxes,
            fees,
            total_premium,
        })
    }

    /// True when the total equals the sum of the components
    pub fn is_balanced(&self) -> bool {
        Money::sum(
            self.total_premium.currency(),
            [&self.base_premium, &self.taxes, &self.fees],
        )
        .map(|sum| sum == self.total_premium)
        .unwrap_or(false)
    }
}

/// Prices coverage selections against a rate source
pub struct PremiumCalculator<'a> {
    rates: &'a dyn RateLookup,
    tax_rate: Rate,
    fees: FeeConfig,
}

impl<'a> PremiumCalculator<'a> {
    pub fn new(rates: &'a dyn RateLookup, tax_rate: Rate, fees: FeeConfig) -> Self {
        Self {
            rates,
            tax_rate,
            fees,
        }
    }

    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    /// Looks up the base rate and derives the breakdown
    ///
    /// A missing rate entry is an error, never a zero premium.
    pub fn calculate(&self, selections: &CoverageSelections) -> Result<PremiumBreakdown, QuoteError> {
        let key = RateKey::from_selections(selections);
        let base = self.rates.rate(&key).ok_or_else(|| RateNotFoundError {
            tier: selections.tier.to_string(),
            term_months: selections.term_months,
            vehicle_class: selections.vehicle_class,
        })?;
        Ok(PremiumBreakdown::compute(base, self.tax_rate, &self.fees)?)
    }
}

/// An immutable priced quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    id: QuoteId,
    quote_number: String,
    tenant_id: TenantId,
    product_id: ProductId,
    product_code: String,
    vehicle: VehicleData,
    selections: CoverageSelections,
    #[serde(flatten)]
    premium: PremiumBreakdown,
    tax_rate: Rate,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl QuoteResult {
    pub fn id(&self) -> QuoteId {
        self.id
    }

    pub fn quote_number(&self) -> &str {
        &self.quote_number
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn vehicle(&self) -> &VehicleData {
        &self.vehicle
    }

    pub fn selections(&self) -> &CoverageSelections {
        &self.selections
    }

    pub fn premium(&self) -> &PremiumBreakdown {
        &self.premium
    }

    pub fn base_premium(&self) -> Money {
        self.premium.base_premium
    }

    pub fn taxes(&self) -> Money {
        self.premium.taxes
    }

    pub fn fees(&self) -> Money {
        self.premium.fees
    }

    pub fn total_premium(&self) -> Money {
        self.premium.total_premium
    }

    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Prices an eligible vehicle and builds the quote
///
/// The caller supplies the quote number and `now`; amounts depend only on
/// the rate source, tax rate and the product's fee rule.
pub fn price_quote(
    ctx: &PricingContext<'_>,
    rates: &dyn RateLookup,
    tax_rate: Rate,
    vehicle: &VehicleData,
    selections: &CoverageSelections,
    quote_number: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<QuoteResult, QuoteError> {
    let product = ctx.product();
    let premium = PremiumCalculator::new(rates, tax_rate, product.fees).calculate(selections)?;
    let validity = ValidityWindow::days_from(now, i64::from(product.quote_validity_days))?;

    Ok(QuoteResult {
        id: QuoteId::new_v7(),
        quote_number: quote_number.into(),
        tenant_id: ctx.tenant_id(),
        product_id: product.id,
        product_code: product.code.clone(),
        vehicle: vehicle.clone(),
        selections: selections.clone(),
        premium,
        tax_rate,
        created_at: validity.starts_at,
        expires_at: validity.expires_at,
    })
}
