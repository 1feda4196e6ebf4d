//! Product DTOs

use serde::Serialize;
use uuid::Uuid;

use domain_quote::{CoverageOptionDefinition, Product};

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category: String,
    pub currency: String,
    pub coverage_options: Vec<CoverageOptionResponse>,
    pub eligibility: EligibilitySummary,
    pub quote_validity_days: u32,
}

#[derive(Debug, Serialize)]
pub struct CoverageOptionResponse {
    pub tier: String,
    pub description: String,
    pub term_months: Vec<u32>,
    pub features: Vec<String>,
}

/// Published thresholds so a caller can see why a vehicle might be routed
#[derive(Debug, Serialize)]
pub struct EligibilitySummary {
    pub max_vehicle_age_years: u32,
    pub max_mileage: u32,
    pub excluded_makes: Vec<String>,
    pub supported_classes: Vec<String>,
}

impl From<&CoverageOptionDefinition> for CoverageOptionResponse {
    fn from(option: &CoverageOptionDefinition) -> Self {
        Self {
            tier: option.tier.to_string(),
            description: option.description.clone(),
            term_months: option.term_months.clone(),
            features: option.features.clone(),
        }
    }
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        let constraints = &product.eligibility;
        Self {
            id: *product.id.as_uuid(),
            code: product.code.clone(),
            name: product.name.clone(),
            category: product.category.to_string(),
            currency: product.currency.code().to_string(),
            coverage_options: product.coverage_options.iter().map(Into::into).collect(),
            eligibility: EligibilitySummary {
                max_vehicle_age_years: constraints.max_vehicle_age_years,
                max_mileage: constraints.max_mileage,
                excluded_makes: constraints.excluded_makes.iter().cloned().collect(),
                supported_classes: constraints
                    .supported_classes
                    .iter()
                    .map(|c| c.code().to_string())
                    .collect(),
            },
            quote_validity_days: product.quote_validity_days,
        }
    }
}
