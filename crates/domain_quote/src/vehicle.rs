//! Vehicle and coverage-selection value objects
//!
//! These are the inputs to eligibility and pricing. Structural checks that
//! belong to the value itself (VIN shape, class code) live here; business
//! rules live in [`crate::eligibility`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while constructing vehicle values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VehicleError {
    #[error("VIN must be 17 characters, got {0}")]
    VinLength(usize),

    #[error("VIN contains invalid character '{0}'")]
    VinCharacter(char),

    #[error("Unknown vehicle class: {0}")]
    UnknownClass(String),
}

/// A 17-character Vehicle Identification Number
///
/// Stored upper-cased. The letters I, O and Q never appear in a VIN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    pub const LENGTH: usize = 17;

    pub fn parse(raw: &str) -> Result<Self, VehicleError> {
        let vin = raw.trim().to_ascii_uppercase();
        let len = vin.chars().count();
        if len != Self::LENGTH {
            return Err(VehicleError::VinLength(len));
        }
        if let Some(bad) = vin
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() || matches!(*c, 'I' | 'O' | 'Q'))
        {
            return Err(VehicleError::VinCharacter(bad));
        }
        Ok(Self(vin))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Vin {
    type Error = VehicleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> String {
        vin.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse risk bucket used to look up base rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleClass {
    A,
    B,
    C,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [VehicleClass::A, VehicleClass::B, VehicleClass::C];

    pub fn code(&self) -> &'static str {
        match self {
            VehicleClass::A => "A",
            VehicleClass::B => "B",
            VehicleClass::C => "C",
        }
    }
}

impl FromStr for VehicleClass {
    type Err = VehicleError;

    /// Accepts `A`, `a`, `Class A` and `class-a` style tags
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let code = lowered
            .strip_prefix("class")
            .map(|rest| rest.trim_start_matches([' ', '-', '_']))
            .unwrap_or(lowered.as_str());

        match code {
            "a" => Ok(VehicleClass::A),
            "b" => Ok(VehicleClass::B),
            "c" => Ok(VehicleClass::C),
            _ => Err(VehicleError::UnknownClass(trimmed.to_string())),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Vehicle attributes as supplied by the caller (or a VIN decoder upstream)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleData {
    /// Model year
    pub year: i32,
    pub make: String,
    pub model: String,
    /// Odometer reading
    pub mileage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<Vin>,
}

impl VehicleData {
    pub fn new(year: i32, make: impl Into<String>, model: impl Into<String>, mileage: u32) -> Self {
        Self {
            year,
            make: make.into(),
            model: model.into(),
            mileage,
            vin: None,
        }
    }

    pub fn with_vin(mut self, vin: Vin) -> Self {
        self.vin = Some(vin);
        self
    }

    /// Age in whole model years as of `current_year`
    ///
    /// Next year's models report an age of zero.
    pub fn age_in(&self, current_year: i32) -> u32 {
        u32::try_from(current_year.saturating_sub(self.year)).unwrap_or(0)
    }
}

/// A named coverage level such as Platinum, Gold or Silver
///
/// Tier names are compared case-insensitively when rates are looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageTier(String);

impl CoverageTier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used as a lookup key
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn matches(&self, other: &CoverageTier) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for CoverageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The coverage choices made for a single pricing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSelections {
    pub tier: CoverageTier,
    /// Contract term in months
    pub term_months: u32,
    pub vehicle_class: VehicleClass,
    /// Per-visit deductible, informational for rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible: Option<Decimal>,
    /// Mileage band label such as "unlimited" or "60k"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage_band: Option<String>,
}

impl CoverageSelections {
    pub fn new(tier: impl Into<String>, term_months: u32, vehicle_class: VehicleClass) -> Self {
        Self {
            tier: CoverageTier::new(tier),
            term_months,
            vehicle_class,
            deductible: None,
            mileage_band: None,
        }
    }

    pub fn with_deductible(mut self, deductible: Decimal) -> Self {
        self.deductible = Some(deductible);
        self
    }

    pub fn with_mileage_band(mut self, band: impl Into<String>) -> Self {
        self.mileage_band = Some(band.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vin_normalizes_case() {
        let vin = Vin::parse(" 1hgcm82633a004352 ").unwrap();
        assert_eq!(vin.as_str(), "1HGCM82633A004352");
    }

    #[test]
    fn test_vin_rejects_wrong_length() {
        assert_eq!(Vin::parse("1HGCM826"), Err(VehicleError::VinLength(8)));
    }

    #[test]
    fn test_vin_rejects_forbidden_letters() {
        assert_eq!(
            Vin::parse("1HGCM82633A00435O"),
            Err(VehicleError::VinCharacter('O'))
        );
    }

    #[test]
    fn test_vin_deserializes_through_validation() {
        let ok: Result<Vin, _> = serde_json::from_str("\"1HGCM82633A004352\"");
        assert!(ok.is_ok());
        let bad: Result<Vin, _> = serde_json::from_str("\"SHORT\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_vehicle_class_parsing() {
        assert_eq!("A".parse::<VehicleClass>().unwrap(), VehicleClass::A);
        assert_eq!("class b".parse::<VehicleClass>().unwrap(), VehicleClass::B);
        assert_eq!("Class-C".parse::<VehicleClass>().unwrap(), VehicleClass::C);
        assert!("D".parse::<VehicleClass>().is_err());
    }

    #[test]
    fn test_age_saturates_for_future_model_year() {
        let vehicle = VehicleData::new(2026, "Honda", "Civic", 10);
        assert_eq!(vehicle.age_in(2025), 0);
        assert_eq!(VehicleData::new(2010, "Honda", "Civic", 10).age_in(2025), 15);
    }

    #[test]
    fn test_tier_matching_ignores_case() {
        assert!(CoverageTier::new("Gold").matches(&CoverageTier::new("GOLD")));
        assert_eq!(CoverageTier::new(" Gold ").normalized(), "gold");
    }
}
