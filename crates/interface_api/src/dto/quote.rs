//! Quote DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::ProductId;
use domain_quote::{
    CoverageSelections, CustomerContact, Jurisdiction, QuoteRequest, QuoteResult, VehicleClass,
    VehicleData, Vin,
};

use crate::dto::special_request::SpecialQuoteRequestResponse;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct VehicleRequest {
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,

    #[validate(length(min = 1, max = 100))]
    pub make: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    pub mileage: u32,

    #[validate(length(equal = 17))]
    pub vin: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CoverageRequest {
    #[validate(length(min = 1, max = 50))]
    pub tier: String,

    #[validate(range(min = 1, max = 120))]
    pub term_months: u32,

    /// `A`, `B`, `C` or `Class A` style tag
    #[validate(length(min = 1, max = 20))]
    pub vehicle_class: String,

    pub deductible: Option<Decimal>,

    #[validate(length(min = 1, max = 30))]
    pub mileage_band: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JurisdictionRequest {
    #[validate(length(equal = 2))]
    pub state: Option<String>,

    #[validate(length(min = 5, max = 10))]
    pub zip: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 7, max = 30))]
    pub phone: Option<String>,

    #[validate(nested)]
    pub jurisdiction: Option<JurisdictionRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    pub product_id: String,

    #[validate(nested)]
    pub vehicle: VehicleRequest,

    #[validate(nested)]
    pub coverage: CoverageRequest,

    /// Required only if the vehicle is routed to manual review
    #[validate(nested)]
    pub customer: Option<CustomerRequest>,

    #[validate(nested)]
    pub jurisdiction: Option<JurisdictionRequest>,

    #[validate(length(min = 1, max = 500))]
    pub request_reason: Option<String>,
}

impl From<JurisdictionRequest> for Jurisdiction {
    fn from(request: JurisdictionRequest) -> Self {
        Jurisdiction {
            state: request.state.map(|s| s.trim().to_ascii_uppercase()),
            zip: request.zip.map(|z| z.trim().to_string()),
        }
    }
}

impl From<CustomerRequest> for CustomerContact {
    fn from(request: CustomerRequest) -> Self {
        CustomerContact {
            name: request.name,
            email: request.email,
            phone: request.phone,
            jurisdiction: request.jurisdiction.map(Into::into),
        }
    }
}

impl VehicleRequest {
    fn into_domain(self) -> Result<VehicleData, ApiError> {
        let vehicle = VehicleData::new(self.year, self.make, self.model, self.mileage);
        match self.vin {
            Some(raw) => {
                let vin = Vin::parse(&raw).map_err(|e| ApiError::Validation {
                    message: "Request failed validation".to_string(),
                    details: vec![format!("vehicle.vin: {e}")],
                })?;
                Ok(vehicle.with_vin(vin))
            }
            None => Ok(vehicle),
        }
    }
}

impl CoverageRequest {
    fn into_domain(self) -> Result<CoverageSelections, ApiError> {
        let class: VehicleClass = self.vehicle_class.parse().map_err(|e| ApiError::Validation {
            message: "Request failed validation".to_string(),
            details: vec![format!("coverage.vehicle_class: {e}")],
        })?;
        let mut selections = CoverageSelections::new(self.tier, self.term_months, class);
        selections.deductible = self.deductible;
        selections.mileage_band = self.mileage_band;
        Ok(selections)
    }
}

impl CreateQuoteRequest {
    /// Runs the structural checks and converts into the service request
    pub fn into_domain(self) -> Result<QuoteRequest, ApiError> {
        self.validate()?;

        let product_id: ProductId = self.product_id.parse()?;

        let mut request = QuoteRequest::new(
            product_id,
            self.vehicle.into_domain()?,
            self.coverage.into_domain()?,
        );
        request.customer = self.customer.map(Into::into);
        request.jurisdiction = self.jurisdiction.map(Into::into);
        request.request_reason = self.request_reason;
        Ok(request)
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub id: Uuid,
    pub quote_number: String,
    pub product_id: Uuid,
    pub product_code: String,
    pub vehicle: VehicleData,
    pub selections: CoverageSelections,
    pub currency: String,
    pub base_premium: Decimal,
    pub taxes: Decimal,
    pub fees: Decimal,
    pub total_premium: Decimal,
    pub tax_rate_percent: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

impl QuoteResponse {
    pub fn from_quote(quote: &QuoteResult, now: DateTime<Utc>) -> Self {
        Self {
            id: *quote.id().as_uuid(),
            quote_number: quote.quote_number().to_string(),
            product_id: *quote.product_id().as_uuid(),
            product_code: quote.product_code().to_string(),
            vehicle: quote.vehicle().clone(),
            selections: quote.selections().clone(),
            currency: quote.total_premium().currency().code().to_string(),
            base_premium: quote.base_premium().amount(),
            taxes: quote.taxes().amount(),
            fees: quote.fees().amount(),
            total_premium: quote.total_premium().amount(),
            tax_rate_percent: quote.tax_rate().as_percentage().normalize(),
            created_at: quote.created_at(),
            expires_at: quote.expires_at(),
            expired: quote.is_expired_at(now),
        }
    }
}

/// Body of `POST /quotes`: a priced quote or a routed special request
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QuoteOutcomeResponse {
    Quoted(QuoteResponse),
    SpecialRequest(SpecialQuoteRequestResponse),
}
