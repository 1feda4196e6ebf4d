//! Eligibility for automated pricing
//!
//! Every rule is evaluated on every call so that a reviewer sees the full
//! list of reasons a vehicle was routed to manual review, not only the
//! first one.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::product::{EligibilityConstraints, PricingContext};
use crate::vehicle::{CoverageSelections, VehicleData};

/// The thresholds a vehicle is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityRule {
    MaxVehicleAge,
    MaxMileage,
    ExcludedMake,
    SupportedClass,
}

impl EligibilityRule {
    pub const ALL: [EligibilityRule; 4] = [
        EligibilityRule::MaxVehicleAge,
        EligibilityRule::MaxMileage,
        EligibilityRule::ExcludedMake,
        EligibilityRule::SupportedClass,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EligibilityRule::MaxVehicleAge => "max_vehicle_age",
            EligibilityRule::MaxMileage => "max_mileage",
            EligibilityRule::ExcludedMake => "excluded_make",
            EligibilityRule::SupportedClass => "supported_class",
        }
    }
}

impl fmt::Display for EligibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub rule: EligibilityRule,
    pub passed: bool,
    pub message: String,
}

impl RuleResult {
    fn pass(rule: EligibilityRule, message: String) -> Self {
        Self {
            rule,
            passed: true,
            message,
        }
    }

    fn fail(rule: EligibilityRule, message: String) -> Self {
        Self {
            rule,
            passed: false,
            message,
        }
    }
}

/// Whether a vehicle may be priced automatically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    /// One human-readable reason per violated rule, in rule order
    Ineligible { reasons: Vec<String> },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Eligibility::Eligible => &[],
            Eligibility::Ineligible { reasons } => reasons,
        }
    }

    fn from_results(results: &[RuleResult]) -> Self {
        let reasons: Vec<String> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.message.clone())
            .collect();
        if reasons.is_empty() {
            Eligibility::Eligible
        } else {
            Eligibility::Ineligible { reasons }
        }
    }
}

/// Runs every rule against the vehicle and selections
///
/// Returns one result per rule in [`EligibilityRule::ALL`] order.
pub fn evaluate_rules(
    constraints: &EligibilityConstraints,
    vehicle: &VehicleData,
    selections: &CoverageSelections,
    as_of_year: i32,
) -> Vec<RuleResult> {
    let mut results = Vec::with_capacity(EligibilityRule::ALL.len());

    let age = vehicle.age_in(as_of_year);
    let max_age = constraints.max_vehicle_age_years;
    results.push(if age <= max_age {
        RuleResult::pass(
            EligibilityRule::MaxVehicleAge,
            format!("vehicle age {age} is within maximum of {max_age} years"),
        )
    } else {
        RuleResult::fail(
            EligibilityRule::MaxVehicleAge,
            format!("vehicle exceeds maximum age of {max_age} years"),
        )
    });

    let max_mileage = constraints.max_mileage;
    results.push(if vehicle.mileage <= max_mileage {
        RuleResult::pass(
            EligibilityRule::MaxMileage,
            format!("mileage {} is within maximum of {max_mileage}", vehicle.mileage),
        )
    } else {
        RuleResult::fail(
            EligibilityRule::MaxMileage,
            format!("vehicle exceeds maximum mileage of {max_mileage}"),
        )
    });

    let make = vehicle.make.trim();
    results.push(if constraints.is_make_excluded(make) {
        RuleResult::fail(
            EligibilityRule::ExcludedMake,
            format!("vehicle make {make} is excluded from this product"),
        )
    } else {
        RuleResult::pass(
            EligibilityRule::ExcludedMake,
            format!("vehicle make {make} is accepted"),
        )
    });

    let class = selections.vehicle_class;
    results.push(if constraints.supports(class) {
        RuleResult::pass(
            EligibilityRule::SupportedClass,
            format!("vehicle class {class} is supported"),
        )
    } else {
        RuleResult::fail(
            EligibilityRule::SupportedClass,
            format!("vehicle class {class} is not supported by this product"),
        )
    });

    results
}

/// Decides whether the vehicle can be priced automatically
///
/// Vehicle age is measured in model years against the calendar year of
/// `as_of`. The tenant check already happened when `ctx` was built.
pub fn check_eligibility(
    ctx: &PricingContext<'_>,
    vehicle: &VehicleData,
    selections: &CoverageSelections,
    as_of: DateTime<Utc>,
) -> Eligibility {
    let results = evaluate_rules(
        &ctx.product().eligibility,
        vehicle,
        selections,
        as_of.year(),
    );
    Eligibility::from_results(&results)
}
