//! Special quote request DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, Money};
use domain_quote::{
    AlternativeQuote, CoverageSelections, CustomerContact, EffectiveStatus, PremiumBreakdown,
    ReviewAction, SpecialQuoteRequest, VehicleData,
};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewActionKind {
    OpenReview,
    Approve,
    Decline,
}

/// Premium offered by the reviewer, in the product's currency
#[derive(Debug, Deserialize, Validate)]
pub struct AlternativeQuoteRequest {
    #[serde(default)]
    pub currency: Currency,
    pub base_premium: Decimal,
    pub taxes: Decimal,
    pub fees: Decimal,
    pub total_premium: Decimal,

    #[validate(length(max = 2000))]
    pub terms: Option<String>,

    #[validate(range(min = 1, max = 120))]
    pub term_months: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    pub action: ReviewActionKind,

    #[validate(length(min = 1, max = 100))]
    pub reviewer: String,

    #[validate(nested)]
    pub alternative_quote: Option<AlternativeQuoteRequest>,

    #[validate(length(max = 1000))]
    pub reason: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
}

impl ListRequestsQuery {
    pub fn status(&self) -> Result<Option<EffectiveStatus>, ApiError> {
        self.status
            .as_deref()
            .map(|raw| raw.parse::<EffectiveStatus>().map_err(|e| ApiError::BadRequest(e.to_string())))
            .transpose()
    }
}

impl From<AlternativeQuoteRequest> for AlternativeQuote {
    fn from(request: AlternativeQuoteRequest) -> Self {
        let money = |amount| Money::new(amount, request.currency);
        AlternativeQuote {
            premium: PremiumBreakdown {
                base_premium: money(request.base_premium),
                taxes: money(request.taxes),
                fees: money(request.fees),
                total_premium: money(request.total_premium),
            },
            terms: request.terms.unwrap_or_default(),
            term_months: request.term_months,
        }
    }
}

impl ReviewRequest {
    /// Structural checks only; whether the action is allowed is decided by the domain
    pub fn into_domain(self) -> Result<ReviewAction, ApiError> {
        self.validate()?;

        let action = match self.action {
            ReviewActionKind::OpenReview => ReviewAction::OpenReview {
                reviewer: self.reviewer,
            },
            ReviewActionKind::Approve => ReviewAction::Approve {
                reviewer: self.reviewer,
                alternative_quote: self.alternative_quote.map(Into::into),
                notes: self.notes,
            },
            ReviewActionKind::Decline => ReviewAction::Decline {
                reviewer: self.reviewer,
                reason: self.reason,
                notes: self.notes,
            },
        };
        Ok(action)
    }
}

#[derive(Debug, Serialize)]
pub struct AlternativeQuoteResponse {
    pub currency: String,
    pub base_premium: Decimal,
    pub taxes: Decimal,
    pub fees: Decimal,
    pub total_premium: Decimal,
    pub terms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
}

impl From<&AlternativeQuote> for AlternativeQuoteResponse {
    fn from(alt: &AlternativeQuote) -> Self {
        let p = &alt.premium;
        Self {
            currency: p.total_premium.currency().code().to_string(),
            base_premium: p.base_premium.amount(),
            taxes: p.taxes.amount(),
            fees: p.fees.amount(),
            total_premium: p.total_premium.amount(),
            terms: alt.terms.clone(),
            term_months: alt.term_months,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SpecialQuoteRequestResponse {
    pub id: Uuid,
    pub request_number: String,
    pub product_id: Uuid,
    pub currency: String,
    pub vehicle: VehicleData,
    pub selections: CoverageSelections,
    pub customer: CustomerContact,
    pub eligibility_failures: Vec<String>,
    pub request_reason: String,
    /// Status as of the response time, `expired` included
    pub status: EffectiveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_quote: Option<AlternativeQuoteResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SpecialQuoteRequestResponse {
    pub fn from_request(request: &SpecialQuoteRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: *request.id().as_uuid(),
            request_number: request.request_number().to_string(),
            product_id: *request.product_id().as_uuid(),
            currency: request.currency().code().to_string(),
            vehicle: request.vehicle().clone(),
            selections: request.selections().clone(),
            customer: request.customer().clone(),
            eligibility_failures: request.eligibility_failures().to_vec(),
            request_reason: request.request_reason().to_string(),
            status: request.effective_status(now),
            alternative_quote: request.alternative_quote().map(Into::into),
            decline_reason: request.decline_reason().map(str::to_string),
            reviewed_by: request.reviewed_by().map(str::to_string),
            review_notes: request.review_notes().map(str::to_string),
            reviewed_at: request.reviewed_at(),
            created_at: request.created_at(),
            updated_at: request.updated_at(),
            expires_at: request.expires_at(),
        }
    }
}
