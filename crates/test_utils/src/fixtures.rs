//! Pre-built Test Fixtures
//!
//! Ready-to-use data for the quoting tests. Values mirror the worked
//! examples used throughout the suite: a Gold/48/A rate of 1894.46, 6.5%
//! tax and a flat $50 admin fee, with age and mileage limits of 15 years
//! and 150,000 miles.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Currency, Money, ProductId, TenantId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_quote::{
    CoverageOptionDefinition, CoverageSelections, CoverageTier, CustomerContact,
    EligibilityConstraints, FeeConfig, Jurisdiction, Product, ProductCategory, RateEntry,
    RateTable, TaxSchedule, VehicleClass, VehicleData,
};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// Base rate for Gold, 48 months, class A
    pub fn gold_48_a_base() -> Money {
        Money::new(dec!(1894.46), Currency::USD)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// For currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for instants used by clocks
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Mid-2025, the "as of" instant for the worked examples
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    pub fn new_year_2025() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }
}

/// Fixture for tenant and product identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn tenant_id() -> TenantId {
        TenantId::new()
    }

    pub fn product_id() -> ProductId {
        ProductId::new()
    }
}

/// Fixture for products and their parts
pub struct ProductFixtures;

impl ProductFixtures {
    /// 15 years, 150,000 miles, Ferrari excluded, classes A and B
    pub fn standard_constraints() -> EligibilityConstraints {
        EligibilityConstraints::new(15, 150_000)
            .exclude_make("Ferrari")
            .only_classes([VehicleClass::A, VehicleClass::B])
    }

    pub fn flat_fee() -> FeeConfig {
        FeeConfig::Flat { amount: dec!(50) }
    }

    pub fn rate_table() -> RateTable {
        RateTable::from_entries(
            Currency::USD,
            vec![
                RateEntry::new("Gold", 48, VehicleClass::A, dec!(1894.46)),
                RateEntry::new("Gold", 36, VehicleClass::A, dec!(1520.00)),
                RateEntry::new("Gold", 48, VehicleClass::B, dec!(2140.10)),
                RateEntry::new("Silver", 36, VehicleClass::A, dec!(1105.25)),
                RateEntry::new("Silver", 36, VehicleClass::B, dec!(1288.80)),
            ],
        )
        .expect("fixture rate table has no duplicates")
    }

    pub fn coverage_options() -> Vec<CoverageOptionDefinition> {
        vec![
            CoverageOptionDefinition {
                tier: CoverageTier::new("Gold"),
                description: "Powertrain, electrical and air conditioning".to_string(),
                term_months: vec![36, 48],
                features: vec!["engine".to_string(), "transmission".to_string()],
            },
            CoverageOptionDefinition {
                tier: CoverageTier::new("Silver"),
                description: "Powertrain".to_string(),
                term_months: vec![36],
                features: vec!["engine".to_string()],
            },
        ]
    }

    /// An active auto product owned by `tenant_id`
    pub fn auto_product(tenant_id: TenantId) -> Product {
        Product {
            id: ProductId::new(),
            tenant_id,
            code: "VSC-AUTO".to_string(),
            name: "Vehicle Service Contract".to_string(),
            category: ProductCategory::Auto,
            currency: Currency::USD,
            coverage_options: Self::coverage_options(),
            eligibility: Self::standard_constraints(),
            fees: Self::flat_fee(),
            rate_table: Self::rate_table(),
            quote_validity_days: 30,
            active: true,
        }
    }

    /// 6.5% default, Florida at 7%
    pub fn tax_schedule() -> TaxSchedule {
        TaxSchedule::flat(dec!(6.5)).with_state("FL", dec!(7))
    }
}

/// Fixture for vehicles, selections and customers
pub struct VehicleFixtures;

impl VehicleFixtures {
    /// Passes every standard rule as of 2025
    pub fn eligible_vehicle() -> VehicleData {
        VehicleData::new(2020, "Honda", "Accord", 42_000)
    }

    /// Within the age limit but over the mileage limit
    pub fn high_mileage_vehicle() -> VehicleData {
        VehicleData::new(2010, "Toyota", "Camry", 160_000)
    }

    pub fn gold_48_a() -> CoverageSelections {
        CoverageSelections::new("Gold", 48, VehicleClass::A)
    }

    pub fn customer() -> CustomerContact {
        CustomerContact::new("Dana Reyes", "dana.reyes@example.com")
            .with_phone("+1-555-0100")
            .with_jurisdiction(Jurisdiction::state("TX"))
    }
}
