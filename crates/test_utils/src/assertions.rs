//! Custom Test Assertions
//!
//! Assertion helpers for money and premium breakdowns that print the
//! offending amounts on failure.

use core_kernel::Money;
use domain_quote::{PremiumBreakdown, QuoteOutcome, QuoteResult, SpecialQuoteRequest};
use rust_decimal::Decimal;

/// Asserts currency and exact amount
pub fn assert_money_eq(actual: &Money, expected_amount: Decimal, context: &str) {
    assert_eq!(
        actual.amount(),
        expected_amount,
        "{}: expected {}, got {}",
        context,
        expected_amount,
        actual
    );
}

/// Asserts that a Money value carries exactly `dp` decimal places
pub fn assert_money_scale(money: &Money, dp: u32) {
    assert_eq!(
        money.amount().scale(),
        dp,
        "Expected {} decimal places, got {}",
        dp,
        money.amount()
    );
}

/// Asserts the breakdown's total equals base + taxes + fees, all at 2 dp
pub fn assert_breakdown_balanced(breakdown: &PremiumBreakdown) {
    for (name, money) in [
        ("base_premium", &breakdown.base_premium),
        ("taxes", &breakdown.taxes),
        ("fees", &breakdown.fees),
        ("total_premium", &breakdown.total_premium),
    ] {
        assert!(
            money.amount().scale() <= 2,
            "{} has more than two decimal places: {}",
            name,
            money.amount()
        );
    }
    assert!(
        breakdown.is_balanced(),
        "Breakdown does not balance: {} + {} + {} != {}",
        breakdown.base_premium.amount(),
        breakdown.taxes.amount(),
        breakdown.fees.amount(),
        breakdown.total_premium.amount()
    );
}

/// Unwraps a priced quote or panics with the routed request
pub fn expect_quoted(outcome: QuoteOutcome) -> QuoteResult {
    match outcome {
        QuoteOutcome::Quoted(quote) => quote,
        QuoteOutcome::SpecialRequest(request) => panic!(
            "Expected a quote, got special request with failures {:?}",
            request.eligibility_failures()
        ),
    }
}

/// Unwraps a special quote request or panics with the quote
pub fn expect_special_request(outcome: QuoteOutcome) -> SpecialQuoteRequest {
    match outcome {
        QuoteOutcome::SpecialRequest(request) => request,
        QuoteOutcome::Quoted(quote) => panic!(
            "Expected a special request, got quote {} for {}",
            quote.quote_number(),
            quote.total_premium()
        ),
    }
}
