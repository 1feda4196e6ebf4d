//! Property-Based Test Generators
//!
//! Proptest strategies that respect the value-object invariants of the
//! quoting domain.

use core_kernel::{Currency, Money, Rate};
use domain_quote::{CoverageSelections, FeeConfig, VehicleClass, VehicleData};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Base rates between $0.01 and $99,999.99
pub fn base_rate_strategy() -> impl Strategy<Value = Money> {
    (1i64..10_000_000i64).prop_map(|cents| Money::from_minor(cents, Currency::USD))
}

/// Tax percentages from 0 to 15 with up to three decimals
pub fn tax_rate_strategy() -> impl Strategy<Value = Rate> {
    (0i64..=15_000i64).prop_map(|n| Rate::from_percentage(Decimal::new(n, 3)))
}

/// Flat fees up to $500 or percentage fees up to 10%
pub fn fee_config_strategy() -> impl Strategy<Value = FeeConfig> {
    prop_oneof![
        (0i64..50_000i64).prop_map(|cents| FeeConfig::Flat {
            amount: Decimal::new(cents, 2)
        }),
        (0i64..1_000i64).prop_map(|n| FeeConfig::Percentage {
            percent: Decimal::new(n, 2)
        }),
    ]
}

pub fn vehicle_class_strategy() -> impl Strategy<Value = VehicleClass> {
    prop_oneof![
        Just(VehicleClass::A),
        Just(VehicleClass::B),
        Just(VehicleClass::C),
    ]
}

pub fn make_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Honda".to_string()),
        Just("Toyota".to_string()),
        Just("Ford".to_string()),
        Just("Subaru".to_string()),
        Just("Ferrari".to_string()),
        Just("FERRARI".to_string()),
    ]
}

/// Vehicles from model year 1990 to 2026 and up to 300,000 miles
pub fn vehicle_strategy() -> impl Strategy<Value = VehicleData> {
    (1990i32..=2026i32, make_strategy(), 0u32..300_000u32)
        .prop_map(|(year, make, mileage)| VehicleData::new(year, make, "Model", mileage))
}

pub fn selections_strategy() -> impl Strategy<Value = CoverageSelections> {
    (
        prop_oneof![Just("Gold"), Just("Silver"), Just("Platinum")],
        prop_oneof![Just(12u32), Just(24u32), Just(36u32), Just(48u32)],
        vehicle_class_strategy(),
    )
        .prop_map(|(tier, term, class)| CoverageSelections::new(tier, term, class))
}
