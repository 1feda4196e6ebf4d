//! Special quote requests
//!
//! A vehicle that fails eligibility is not priced. Instead it is routed to
//! manual underwriting review as a special quote request, which lives for
//! thirty days. Reviewers move it through a small state machine:
//!
//! ```text
//!   pending ──OpenReview──► reviewing ──Approve──► quoted
//!                                     └─Decline──► declined
//! ```
//!
//! Expiry is never stored. A request that is still pending or reviewing
//! once `expires_at` has passed reads as `expired` and accepts no further
//! reviewer actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Currency, ProductId, SpecialQuoteRequestId, TenantId, ValidityWindow};

use crate::eligibility::Eligibility;
use crate::error::QuoteError;
use crate::premium::PremiumBreakdown;
use crate::product::PricingContext;
use crate::tax::Jurisdiction;
use crate::vehicle::{CoverageSelections, VehicleData};

/// Lifetime of a special quote request
pub const SPECIAL_REQUEST_LIFETIME_DAYS: i64 = 30;

/// Reason recorded when the caller gives none
pub const DEFAULT_REQUEST_REASON: &str = "automated eligibility check failed";

/// Who to contact with the reviewed quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Jurisdiction>,
}

impl CustomerContact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            jurisdiction: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.jurisdiction = Some(jurisdiction);
        self
    }
}

/// Stored review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialQuoteStatus {
    Pending,
    Reviewing,
    Quoted,
    Declined,
}

impl SpecialQuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialQuoteStatus::Pending => "pending",
            SpecialQuoteStatus::Reviewing => "reviewing",
            SpecialQuoteStatus::Quoted => "quoted",
            SpecialQuoteStatus::Declined => "declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SpecialQuoteStatus::Quoted | SpecialQuoteStatus::Declined)
    }

    pub fn can_transition_to(&self, target: SpecialQuoteStatus) -> bool {
        use SpecialQuoteStatus::*;
        matches!(
            (self, target),
            (Pending, Reviewing) | (Reviewing, Quoted) | (Reviewing, Declined)
        )
    }
}

impl fmt::Display for SpecialQuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status as observed at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Pending,
    Reviewing,
    Quoted,
    Declined,
    Expired,
}

impl EffectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveStatus::Pending => "pending",
            EffectiveStatus::Reviewing => "reviewing",
            EffectiveStatus::Quoted => "quoted",
            EffectiveStatus::Declined => "declined",
            EffectiveStatus::Expired => "expired",
        }
    }
}

impl From<SpecialQuoteStatus> for EffectiveStatus {
    fn from(status: SpecialQuoteStatus) -> Self {
        match status {
            SpecialQuoteStatus::Pending => EffectiveStatus::Pending,
            SpecialQuoteStatus::Reviewing => EffectiveStatus::Reviewing,
            SpecialQuoteStatus::Quoted => EffectiveStatus::Quoted,
            SpecialQuoteStatus::Declined => EffectiveStatus::Declined,
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectiveStatus {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(EffectiveStatus::Pending),
            "reviewing" => Ok(EffectiveStatus::Reviewing),
            "quoted" => Ok(EffectiveStatus::Quoted),
            "declined" => Ok(EffectiveStatus::Declined),
            "expired" => Ok(EffectiveStatus::Expired),
            other => Err(QuoteError::validation(format!("unknown request status: {other}"))),
        }
    }
}

/// Premium a reviewer offers in place of the automated price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeQuote {
    #[serde(flatten)]
    pub premium: PremiumBreakdown,
    /// Custom terms or exclusions attached by the reviewer
    #[serde(default)]
    pub terms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
}

impl AlternativeQuote {
    /// Amounts must be in the product's currency, at its minor-unit precision
    fn validate(&self, currency: Currency) -> Result<(), QuoteError> {
        let p = &self.premium;
        let amounts = [p.base_premium, p.taxes, p.fees, p.total_premium];
        if let Some(other) = amounts.iter().find(|m| m.currency() != currency) {
            return Err(QuoteError::validation(format!(
                "alternative quote currency {} differs from product currency {currency}",
                other.currency()
            )));
        }
        if amounts
            .iter()
            .any(|m| m.round_to_currency().amount() != m.amount())
        {
            return Err(QuoteError::validation(format!(
                "alternative quote amounts must have at most {} decimal places",
                currency.decimal_places()
            )));
        }
        if amounts.iter().any(|m| m.is_negative())
        {
            return Err(QuoteError::validation(
                "alternative quote amounts must not be negative",
            ));
        }
        if !p.is_balanced() {
            return Err(QuoteError::validation(
                "alternative quote total must equal base plus taxes plus fees",
            ));
        }
        Ok(())
    }
}

/// A reviewer's action on a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReviewAction {
    OpenReview {
        reviewer: String,
    },
    Approve {
        reviewer: String,
        #[serde(default)]
        alternative_quote: Option<AlternativeQuote>,
        #[serde(default)]
        notes: Option<String>,
    },
    Decline {
        reviewer: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl ReviewAction {
    pub fn target_status(&self) -> SpecialQuoteStatus {
        match self {
            ReviewAction::OpenReview { .. } => SpecialQuoteStatus::Reviewing,
            ReviewAction::Approve { .. } => SpecialQuoteStatus::Quoted,
            ReviewAction::Decline { .. } => SpecialQuoteStatus::Declined,
        }
    }

    pub fn reviewer(&self) -> &str {
        match self {
            ReviewAction::OpenReview { reviewer }
            | ReviewAction::Approve { reviewer, .. }
            | ReviewAction::Decline { reviewer, .. } => reviewer,
        }
    }
}

/// An ineligible vehicle awaiting manual review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialQuoteRequest {
    id: SpecialQuoteRequestId,
    request_number: String,
    tenant_id: TenantId,
    product_id: ProductId,
    /// Currency of the product, which any alternative quote must use
    currency: Currency,
    vehicle: VehicleData,
    selections: CoverageSelections,
    customer: CustomerContact,
    eligibility_failures: Vec<String>,
    request_reason: String,
    status: SpecialQuoteStatus,
    alternative_quote: Option<AlternativeQuote>,
    decline_reason: Option<String>,
    reviewed_by: Option<String>,
    review_notes: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SpecialQuoteRequest {
    pub fn id(&self) -> SpecialQuoteRequestId {
        self.id
    }

    pub fn request_number(&self) -> &str {
        &self.request_number
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn vehicle(&self) -> &VehicleData {
        &self.vehicle
    }

    pub fn selections(&self) -> &CoverageSelections {
        &self.selections
    }

    pub fn customer(&self) -> &CustomerContact {
        &self.customer
    }

    pub fn eligibility_failures(&self) -> &[String] {
        &self.eligibility_failures
    }

    pub fn request_reason(&self) -> &str {
        &self.request_reason
    }

    /// Stored status, ignoring expiry
    pub fn status(&self) -> SpecialQuoteStatus {
        self.status
    }

    pub fn alternative_quote(&self) -> Option<&AlternativeQuote> {
        self.alternative_quote.as_ref()
    }

    pub fn decline_reason(&self) -> Option<&str> {
        self.decline_reason.as_deref()
    }

    pub fn reviewed_by(&self) -> Option<&str> {
        self.reviewed_by.as_deref()
    }

    pub fn review_notes(&self) -> Option<&str> {
        self.review_notes.as_deref()
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Status as seen at `now`
    ///
    /// Terminal decisions stand after expiry; open requests read as expired.
    pub fn effective_status(&self, now: DateTime<Utc>) -> EffectiveStatus {
        if !self.status.is_terminal() && self.is_expired_at(now) {
            EffectiveStatus::Expired
        } else {
            self.status.into()
        }
    }

    /// Applies a reviewer action at `now`
    ///
    /// On error the request is left untouched.
    pub fn apply_review(&mut self, action: ReviewAction, now: DateTime<Utc>) -> Result<(), QuoteError> {
        let target = action.target_status();
        if self.status.is_terminal() || !self.status.can_transition_to(target) {
            return Err(QuoteError::invalid_transition(self.status, target));
        }
        if self.is_expired_at(now) {
            return Err(QuoteError::RequestExpired(self.request_number.clone()));
        }
        let reviewer = non_blank(Some(action.reviewer()))
            .ok_or_else(|| QuoteError::MissingReviewDetail("reviewer".to_string()))?;

        match action {
            ReviewAction::OpenReview { .. } => {}
            ReviewAction::Approve {
                alternative_quote,
                notes,
                ..
            } => {
                let alternative = alternative_quote.ok_or_else(|| {
                    QuoteError::MissingReviewDetail("alternative quote".to_string())
                })?;
                alternative.validate(self.currency)?;
                self.alternative_quote = Some(alternative);
                self.review_notes = non_blank(notes.as_deref());
                self.reviewed_at = Some(now);
            }
            ReviewAction::Decline { reason, notes, .. } => {
                let reason = non_blank(reason.as_deref()).ok_or_else(|| {
                    QuoteError::MissingReviewDetail("decline reason".to_string())
                })?;
                self.decline_reason = Some(reason);
                self.review_notes = non_blank(notes.as_deref());
                self.reviewed_at = Some(now);
            }
        }

        self.reviewed_by = Some(reviewer);
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Inputs for routing an ineligible vehicle
#[derive(Debug, Clone)]
pub struct RoutingInput<'a> {
    pub vehicle: &'a VehicleData,
    pub selections: &'a CoverageSelections,
    pub customer: Option<&'a CustomerContact>,
    pub eligibility: &'a Eligibility,
    pub request_reason: Option<&'a str>,
}

/// Creates a pending request for an ineligible vehicle
///
/// The request expires exactly [`SPECIAL_REQUEST_LIFETIME_DAYS`] days after
/// `now`. An eligible outcome or a missing customer contact cannot be
/// routed.
pub fn route_special_request(
    ctx: &PricingContext<'_>,
    input: RoutingInput<'_>,
    request_number: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<SpecialQuoteRequest, QuoteError> {
    let reasons = input.eligibility.reasons();
    if reasons.is_empty() {
        return Err(QuoteError::NoEligibilityFailures);
    }
    let customer = input
        .customer
        .cloned()
        .ok_or_else(|| QuoteError::CustomerContactRequired {
            reasons: reasons.to_vec(),
        })?;
    let window = ValidityWindow::days_from(now, SPECIAL_REQUEST_LIFETIME_DAYS)?;

    Ok(SpecialQuoteRequest {
        id: SpecialQuoteRequestId::new_v7(),
        request_number: request_number.into(),
        tenant_id: ctx.tenant_id(),
        product_id: ctx.product().id,
        currency: ctx.product().currency,
        vehicle: input.vehicle.clone(),
        selections: input.selections.clone(),
        customer,
        eligibility_failures: reasons.to_vec(),
        request_reason: non_blank(input.request_reason)
            .unwrap_or_else(|| DEFAULT_REQUEST_REASON.to_string()),
        status: SpecialQuoteStatus::Pending,
        alternative_quote: None,
        decline_reason: None,
        reviewed_by: None,
        review_notes: None,
        reviewed_at: None,
        created_at: window.starts_at,
        updated_at: window.starts_at,
        expires_at: window.expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use SpecialQuoteStatus::*;
        assert!(Pending.can_transition_to(Reviewing));
        assert!(Reviewing.can_transition_to(Quoted));
        assert!(Reviewing.can_transition_to(Declined));

        assert!(!Pending.can_transition_to(Quoted));
        assert!(!Pending.can_transition_to(Declined));
        assert!(!Quoted.can_transition_to(Reviewing));
        assert!(!Declined.can_transition_to(Quoted));
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("Expired".parse::<EffectiveStatus>().unwrap(), EffectiveStatus::Expired);
        assert!("archived".parse::<EffectiveStatus>().is_err());
    }

    #[test]
    fn test_review_action_json_shape() {
        let action: ReviewAction =
            serde_json::from_str(r#"{"action":"decline","reviewer":"uw-7","reason":"salvage title"}"#)
                .unwrap();
        assert_eq!(action.target_status(), SpecialQuoteStatus::Declined);
        assert_eq!(action.reviewer(), "uw-7");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" x ")), Some("x".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
