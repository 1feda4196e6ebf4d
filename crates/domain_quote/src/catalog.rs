//! Product catalog loading and validation
//!
//! The catalog is the admin-editable document holding every tenant's
//! products, rate tables and thresholds. It is validated as a whole when
//! loaded, so a bad threshold or a missing currency is reported once at
//! startup rather than on the first affected quote.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use core_kernel::{ProductId, TenantId};

use crate::error::QuoteError;
use crate::product::Product;
use crate::tax::TaxSchedule;

/// Products plus the tax schedule they are sold under
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub tax: TaxSchedule,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(tax: TaxSchedule, products: Vec<Product>) -> Self {
        Self { tax, products }
    }

    /// Parses and validates a catalog document
    pub fn from_json(json: &str) -> Result<Self, QuoteError> {
        let catalog: ProductCatalog = serde_json::from_str(json).map_err(|e| {
            QuoteError::InvalidConfiguration(vec![format!("malformed catalog document: {e}")])
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads, parses and validates a catalog file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, QuoteError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            QuoteError::InvalidConfiguration(vec![format!(
                "cannot read catalog {}: {e}",
                path.display()
            )])
        })?;
        let catalog = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            products = catalog.products.len(),
            "Loaded product catalog"
        );
        Ok(catalog)
    }

    /// Checks every product and the tax schedule
    ///
    /// All problems are collected into a single `InvalidConfiguration`.
    /// Offered terms without a rate entry are not fatal: they are logged and
    /// surface later as `RateNotFound` if someone selects them.
    pub fn validate(&self) -> Result<(), QuoteError> {
        let mut problems = self.tax.problems();

        let mut seen_ids = HashSet::new();
        let mut seen_codes = HashSet::new();
        for product in &self.products {
            if !seen_ids.insert(product.id) {
                problems.push(format!("duplicate product id {}", product.id));
            }
            if !seen_codes.insert((product.tenant_id, product.code.to_ascii_uppercase())) {
                problems.push(format!(
                    "duplicate product code {} for tenant {}",
                    product.code, product.tenant_id
                ));
            }
            problems.extend(product.problems());

            for key in product.unpriced_options() {
                warn!(
                    product = %product.code,
                    tier = key.tier(),
                    term_months = key.term_months(),
                    vehicle_class = %key.vehicle_class(),
                    "Offered coverage option has no rate entry"
                );
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(QuoteError::InvalidConfiguration(problems))
        }
    }

    pub fn product(&self, tenant_id: TenantId, product_id: ProductId) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == product_id && p.tenant_id == tenant_id)
    }

    pub fn products_for(&self, tenant_id: TenantId) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.tenant_id == tenant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CATALOG: &str = r#"{
        "tax": { "default_percent": "6.5", "by_state": { "FL": "7" } },
        "products": [{
            "id": "0190a5c8-7b6e-7c3a-9d5e-1f2a3b4c5d6e",
            "tenant_id": "0190a5c8-7b6e-7c3a-9d5e-000000000001",
            "code": "VSC-AUTO",
            "name": "Vehicle Service Contract",
            "category": "auto",
            "coverage_options": [
                { "tier": "Gold", "description": "Powertrain plus", "term_months": [36, 48] }
            ],
            "eligibility": {
                "max_vehicle_age_years": 15,
                "max_mileage": 150000,
                "excluded_makes": ["Ferrari"],
                "supported_classes": ["A", "B"]
            },
            "fees": { "type": "flat", "amount": "50" },
            "rate_table": {
                "currency": "USD",
                "entries": [
                    { "tier": "Gold", "term_months": 48, "vehicle_class": "A", "base_amount": "1894.46" }
                ]
            }
        }]
    }"#;

    #[test]
    fn test_parses_catalog_with_defaults() {
        let catalog = ProductCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.products.len(), 1);
        let product = &catalog.products[0];
        assert!(product.active);
        assert_eq!(product.quote_validity_days, 30);
        assert_eq!(catalog.tax.default_percent, dec!(6.5));
    }

    #[test]
    fn test_malformed_document_is_configuration_error() {
        let result = ProductCatalog::from_json("{ not json");
        assert!(matches!(result, Err(QuoteError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_duplicate_codes_reported() {
        let mut catalog = ProductCatalog::from_json(CATALOG).unwrap();
        let mut copy = catalog.products[0].clone();
        copy.id = ProductId::new();
        copy.code = "vsc-auto".to_string();
        catalog.products.push(copy);

        match catalog.validate() {
            Err(QuoteError::InvalidConfiguration(problems)) => {
                assert_eq!(problems.len(), 1);
                assert!(problems[0].contains("duplicate product code"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_tenant_scoped_lookup() {
        let catalog = ProductCatalog::from_json(CATALOG).unwrap();
        let product = &catalog.products[0];
        assert!(catalog.product(product.tenant_id, product.id).is_some());
        assert!(catalog.product(TenantId::new(), product.id).is_none());
        assert_eq!(catalog.products_for(TenantId::new()).count(), 0);
    }
}
