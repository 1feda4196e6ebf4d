//! QuoteService Tests
//!
//! Drives the service over in-memory adapters and a fixed clock.
//!
//! # Test Organization
//!
//! - `quote_flow_tests` - Eligible and ineligible requests end to end
//! - `tenant_tests` - Tenant scoping of products, quotes and requests
//! - `review_flow_tests` - Reviewer actions, listing and expiry
//! - `concurrent_review_tests` - Two reviewers deciding the same request
//! - `numbering_tests` - Retry on duplicate numbers

use chrono::{DateTime, Duration, Utc};
use core_kernel::{Clock, Currency, Money, TenantId};
use domain_quote::{
    AlternativeQuote, CoverageSelections, EffectiveStatus, Jurisdiction, NumberGenerator,
    PremiumBreakdown, QuoteError, ReviewAction, SpecialQuoteStatus, VehicleClass,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use test_utils::{
    assert_breakdown_balanced, assert_money_eq, expect_quoted, expect_special_request,
    TestProductBuilder, TestQuoteRequestBuilder, TestQuoteServiceBuilder, VehicleFixtures,
};

fn alternative() -> AlternativeQuote {
    let usd = |amount| Money::new(amount, Currency::USD);
    AlternativeQuote {
        premium: PremiumBreakdown {
            base_premium: usd(dec!(2400.00)),
            taxes: usd(dec!(156.00)),
            fees: usd(dec!(50.00)),
            total_premium: usd(dec!(2606.00)),
        },
        terms: "Excludes turbocharger".to_string(),
        term_months: None,
    }
}

// ============================================================================
// QUOTE FLOW TESTS
// ============================================================================

mod quote_flow_tests {
    use super::*;

    /// An eligible vehicle is priced, stored and retrievable by number
    #[tokio::test]
    async fn test_eligible_request_is_quoted() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new()
            .with_product(product.clone())
            .with_flat_tax(dec!(6.5))
            .build();

        let outcome = harness
            .service
            .request_quote(tenant, TestQuoteRequestBuilder::new(&product).build())
            .await
            .unwrap();
        let quote = expect_quoted(outcome);

        assert!(quote.quote_number().starts_with("QTE-"));
        assert_money_eq(&quote.base_premium(), dec!(1894.46), "base");
        assert_money_eq(&quote.taxes(), dec!(123.14), "taxes");
        assert_money_eq(&quote.fees(), dec!(50.00), "fees");
        assert_money_eq(&quote.total_premium(), dec!(2067.60), "total");
        assert_breakdown_balanced(quote.premium());
        assert_eq!(quote.created_at(), harness.clock.now());

        let stored = harness
            .service
            .get_quote(tenant, quote.quote_number())
            .await
            .unwrap();
        assert_eq!(stored, quote);
        assert_eq!(harness.quotes.len().await, 1);
    }

    /// Worked example: the high-mileage vehicle becomes a pending request
    #[tokio::test]
    async fn test_ineligible_request_is_routed() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();

        let outcome = harness
            .service
            .request_quote(
                tenant,
                TestQuoteRequestBuilder::new(&product)
                    .with_vehicle(VehicleFixtures::high_mileage_vehicle())
                    .build(),
            )
            .await
            .unwrap();
        let request = expect_special_request(outcome);

        assert!(request.request_number().starts_with("SQR-"));
        assert_eq!(request.status(), SpecialQuoteStatus::Pending);
        assert_eq!(
            request.eligibility_failures(),
            &["vehicle exceeds maximum mileage of 150000".to_string()]
        );
        assert_eq!(request.expires_at(), request.created_at() + Duration::days(30));
        assert_eq!(harness.quotes.len().await, 0);

        let stored = harness
            .service
            .get_special_request(tenant, request.id())
            .await
            .unwrap();
        assert_eq!(stored, request);
    }

    /// Tax follows the request jurisdiction, then the customer's, then the default
    #[tokio::test]
    async fn test_tax_resolved_by_jurisdiction() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();

        let florida = harness
            .service
            .request_quote(
                tenant,
                TestQuoteRequestBuilder::new(&product)
                    .with_jurisdiction(Jurisdiction::state("fl"))
                    .build(),
            )
            .await
            .unwrap();
        // 1894.46 * 7% = 132.6122
        assert_money_eq(&expect_quoted(florida).taxes(), dec!(132.61), "FL taxes");

        let texas_customer = harness
            .service
            .request_quote(tenant, TestQuoteRequestBuilder::new(&product).build())
            .await
            .unwrap();
        assert_money_eq(&expect_quoted(texas_customer).taxes(), dec!(123.14), "default taxes");
    }

    /// A missing rate entry surfaces as RateNotFound and stores nothing
    #[tokio::test]
    async fn test_rate_not_found() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();

        let result = harness
            .service
            .request_quote(
                tenant,
                TestQuoteRequestBuilder::new(&product)
                    .with_selections(CoverageSelections::new("Silver", 48, VehicleClass::B))
                    .build(),
            )
            .await;
        assert!(matches!(result, Err(QuoteError::RateNotFound(_))));
        assert_eq!(harness.quotes.len().await, 0);
    }

    /// Inactive products cannot be quoted
    #[tokio::test]
    async fn test_inactive_product() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).inactive().build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();

        let result = harness
            .service
            .request_quote(tenant, TestQuoteRequestBuilder::new(&product).build())
            .await;
        assert!(matches!(result, Err(QuoteError::ProductInactive(code)) if code == "VSC-AUTO"));
        assert!(harness.service.list_products(tenant).await.unwrap().is_empty());
    }

    /// Ineligible without a customer contact is an error
    #[tokio::test]
    async fn test_ineligible_without_contact() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();

        let result = harness
            .service
            .request_quote(
                tenant,
                TestQuoteRequestBuilder::new(&product)
                    .with_mileage(200_000)
                    .without_customer()
                    .build(),
            )
            .await;
        assert!(matches!(result, Err(QuoteError::CustomerContactRequired { .. })));
    }
}

// ============================================================================
// TENANT TESTS
// ============================================================================

mod tenant_tests {
    use super::*;

    /// Another tenant's product is reported as not found
    #[tokio::test]
    async fn test_foreign_product_not_found() {
        let owner = TenantId::new();
        let product = TestProductBuilder::new(owner).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();

        let result = harness
            .service
            .request_quote(TenantId::new(), TestQuoteRequestBuilder::new(&product).build())
            .await;
        assert!(matches!(result, Err(QuoteError::ProductNotFound(id)) if id == product.id));
    }

    /// Quotes and requests are invisible to other tenants
    #[tokio::test]
    async fn test_records_scoped_by_tenant() {
        let owner = TenantId::new();
        let other = TenantId::new();
        let product = TestProductBuilder::new(owner).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();

        let quote = expect_quoted(
            harness
                .service
                .request_quote(owner, TestQuoteRequestBuilder::new(&product).build())
                .await
                .unwrap(),
        );
        let request = expect_special_request(
            harness
                .service
                .request_quote(owner, TestQuoteRequestBuilder::new(&product).with_year(1990).build())
                .await
                .unwrap(),
        );

        let quote_lookup = harness.service.get_quote(other, quote.quote_number()).await;
        assert!(matches!(quote_lookup, Err(QuoteError::Port(ref e)) if e.is_not_found()));

        let request_lookup = harness.service.get_special_request(other, request.id()).await;
        assert!(matches!(request_lookup, Err(QuoteError::Port(ref e)) if e.is_not_found()));

        assert!(harness.service.list_quotes(other).await.unwrap().is_empty());
        assert!(harness
            .service
            .list_special_requests(other, None)
            .await
            .unwrap()
            .is_empty());
    }

    /// Products are listed per tenant, ordered by code
    #[tokio::test]
    async fn test_list_products() {
        let tenant = TenantId::new();
        let harness = TestQuoteServiceBuilder::new()
            .with_product(TestProductBuilder::new(tenant).with_code("VSC-RV").build())
            .with_product(TestProductBuilder::new(tenant).with_code("VSC-AUTO").build())
            .with_product(TestProductBuilder::new(TenantId::new()).build())
            .build();

        let codes: Vec<String> = harness
            .service
            .list_products(tenant)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.code)
            .collect();
        assert_eq!(codes, vec!["VSC-AUTO".to_string(), "VSC-RV".to_string()]);
    }
}

// ============================================================================
// REVIEW FLOW TESTS
// ============================================================================

mod review_flow_tests {
    use super::*;

    /// A reviewer opens, then approves, and the stored request follows
    #[tokio::test]
    async fn test_review_to_quoted() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();
        let request = expect_special_request(
            harness
                .service
                .request_quote(tenant, TestQuoteRequestBuilder::new(&product).with_mileage(180_000).build())
                .await
                .unwrap(),
        );

        harness.clock.advance(Duration::days(2));
        let reviewing = harness
            .service
            .review_special_request(
                tenant,
                request.id(),
                ReviewAction::OpenReview {
                    reviewer: "uw-kim".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(reviewing.status(), SpecialQuoteStatus::Reviewing);

        let quoted = harness
            .service
            .review_special_request(
                tenant,
                request.id(),
                ReviewAction::Approve {
                    reviewer: "uw-kim".to_string(),
                    alternative_quote: Some(alternative()),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(quoted.status(), SpecialQuoteStatus::Quoted);

        let stored = harness
            .service
            .get_special_request(tenant, request.id())
            .await
            .unwrap();
        assert_eq!(stored.status(), SpecialQuoteStatus::Quoted);
        assert_eq!(stored.alternative_quote(), Some(&alternative()));
    }

    /// Rejected actions leave the stored request unchanged
    #[tokio::test]
    async fn test_rejected_action_not_persisted() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();
        let request = expect_special_request(
            harness
                .service
                .request_quote(tenant, TestQuoteRequestBuilder::new(&product).with_make("Ferrari").build())
                .await
                .unwrap(),
        );

        let result = harness
            .service
            .review_special_request(
                tenant,
                request.id(),
                ReviewAction::Decline {
                    reviewer: "uw-kim".to_string(),
                    reason: Some("exotic".to_string()),
                    notes: None,
                },
            )
            .await;
        assert!(matches!(result, Err(QuoteError::InvalidStateTransition { .. })));

        let stored = harness
            .service
            .get_special_request(tenant, request.id())
            .await
            .unwrap();
        assert_eq!(stored.status(), SpecialQuoteStatus::Pending);
    }

    /// Listing filters on the status as seen by the service clock
    #[tokio::test]
    async fn test_list_filters_by_effective_status() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();

        let first = expect_special_request(
            harness
                .service
                .request_quote(tenant, TestQuoteRequestBuilder::new(&product).with_mileage(170_000).build())
                .await
                .unwrap(),
        );
        harness.clock.advance(Duration::days(20));
        let second = expect_special_request(
            harness
                .service
                .request_quote(tenant, TestQuoteRequestBuilder::new(&product).with_mileage(175_000).build())
                .await
                .unwrap(),
        );

        let pending = harness
            .service
            .list_special_requests(tenant, Some(EffectiveStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id(), second.id(), "newest first");

        harness.clock.advance(Duration::days(11));
        let expired = harness
            .service
            .list_special_requests(tenant, Some(EffectiveStatus::Expired))
            .await
            .unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id(), first.id());

        let result = harness
            .service
            .review_special_request(
                tenant,
                first.id(),
                ReviewAction::OpenReview {
                    reviewer: "uw-kim".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(QuoteError::RequestExpired(_))));
    }
}

// ============================================================================
// CONCURRENT REVIEW TESTS
// ============================================================================

mod concurrent_review_tests {
    use super::*;
    use async_trait::async_trait;
    use core_kernel::{
        DomainPort, FixedClock, HealthCheckResult, HealthCheckable, PortError, SpecialQuoteRequestId,
    };
    use domain_quote::{
        InMemoryCatalogAdapter, InMemoryQuoteRepository, InMemorySpecialRequestRepository,
        QuoteService, SpecialQuoteRequest, SpecialQuoteRequestRepository, SpecialRequestQuery,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_utils::TemporalFixtures;
    use tokio::sync::Barrier;

    /// Once armed, holds the next two reads until both have arrived, so two
    /// reviewers decide on the same stored copy
    struct LockstepRequests {
        inner: InMemorySpecialRequestRepository,
        held_reads: AtomicUsize,
        barrier: Barrier,
    }

    impl LockstepRequests {
        fn new() -> Self {
            Self {
                inner: InMemorySpecialRequestRepository::new(),
                held_reads: AtomicUsize::new(0),
                barrier: Barrier::new(2),
            }
        }

        fn arm(&self) {
            self.held_reads.store(2, Ordering::SeqCst);
        }
    }

    impl DomainPort for LockstepRequests {}

    #[async_trait]
    impl HealthCheckable for LockstepRequests {
        async fn health_check(&self) -> HealthCheckResult {
            self.inner.health_check().await
        }
    }

    #[async_trait]
    impl SpecialQuoteRequestRepository for LockstepRequests {
        async fn insert_request(&self, request: SpecialQuoteRequest) -> Result<(), PortError> {
            self.inner.insert_request(request).await
        }

        async fn get_request(
            &self,
            tenant_id: TenantId,
            id: SpecialQuoteRequestId,
        ) -> Result<SpecialQuoteRequest, PortError> {
            let request = self.inner.get_request(tenant_id, id).await;
            let held = self
                .held_reads
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if held {
                self.barrier.wait().await;
            }
            request
        }

        async fn update_request(
            &self,
            request: SpecialQuoteRequest,
            expected: SpecialQuoteStatus,
        ) -> Result<(), PortError> {
            self.inner.update_request(request, expected).await
        }

        async fn list_requests(
            &self,
            tenant_id: TenantId,
            query: SpecialRequestQuery,
        ) -> Result<Vec<SpecialQuoteRequest>, PortError> {
            self.inner.list_requests(tenant_id, query).await
        }
    }

    /// Approve and decline racing on one request: exactly one decision lands
    #[tokio::test]
    async fn test_racing_decisions_keep_the_first() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let requests = Arc::new(LockstepRequests::new());
        let service = QuoteService::new(
            Arc::new(InMemoryCatalogAdapter::new([product.clone()])),
            Arc::new(InMemoryQuoteRepository::new()),
            requests.clone(),
            Arc::new(FixedClock::new(TemporalFixtures::now())),
        );

        let request = expect_special_request(
            service
                .request_quote(tenant, TestQuoteRequestBuilder::new(&product).with_mileage(180_000).build())
                .await
                .unwrap(),
        );
        service
            .review_special_request(
                tenant,
                request.id(),
                ReviewAction::OpenReview {
                    reviewer: "uw-kim".to_string(),
                },
            )
            .await
            .unwrap();

        requests.arm();
        let (approved, declined) = tokio::join!(
            service.review_special_request(
                tenant,
                request.id(),
                ReviewAction::Approve {
                    reviewer: "uw-kim".to_string(),
                    alternative_quote: Some(alternative()),
                    notes: None,
                },
            ),
            service.review_special_request(
                tenant,
                request.id(),
                ReviewAction::Decline {
                    reviewer: "uw-lee".to_string(),
                    reason: Some("salvage title".to_string()),
                    notes: None,
                },
            ),
        );

        assert_eq!(
            approved.is_ok() as u8 + declined.is_ok() as u8,
            1,
            "exactly one reviewer must win"
        );
        let stored = service.get_special_request(tenant, request.id()).await.unwrap();
        match (approved, declined) {
            (Ok(winner), Err(loser)) => {
                assert!(matches!(loser, QuoteError::InvalidStateTransition { .. }));
                assert_eq!(stored, winner);
                assert_eq!(stored.decline_reason(), None);
            }
            (Err(loser), Ok(winner)) => {
                assert!(matches!(loser, QuoteError::InvalidStateTransition { .. }));
                assert_eq!(stored, winner);
                assert_eq!(stored.alternative_quote(), None);
            }
            _ => unreachable!(),
        }
        assert!(stored.status().is_terminal());
    }

    /// A decision computed from a stale copy is refused by the repository
    #[tokio::test]
    async fn test_stale_write_conflicts() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new().with_product(product.clone()).build();
        let request = expect_special_request(
            harness
                .service
                .request_quote(tenant, TestQuoteRequestBuilder::new(&product).with_mileage(180_000).build())
                .await
                .unwrap(),
        );

        let mut stale = request.clone();
        harness
            .service
            .review_special_request(
                tenant,
                request.id(),
                ReviewAction::OpenReview {
                    reviewer: "uw-kim".to_string(),
                },
            )
            .await
            .unwrap();

        stale
            .apply_review(
                ReviewAction::OpenReview {
                    reviewer: "uw-lee".to_string(),
                },
                harness.clock.now(),
            )
            .unwrap();
        let err = harness
            .requests
            .update_request(stale, SpecialQuoteStatus::Pending)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let stored = harness
            .service
            .get_special_request(tenant, request.id())
            .await
            .unwrap();
        assert_eq!(stored.reviewed_by(), Some("uw-kim"));
    }
}

// ============================================================================
// NUMBERING TESTS
// ============================================================================

mod numbering_tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hands out the same number `repeats` times before changing
    struct StickyNumbers {
        calls: AtomicUsize,
        repeats: usize,
    }

    impl NumberGenerator for StickyNumbers {
        fn next(&self, prefix: &str, now: DateTime<Utc>) -> String {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) / self.repeats;
            format!("{}-{}-{:06X}", prefix, now.timestamp_millis(), n)
        }
    }

    /// A duplicate number triggers another draw
    #[tokio::test]
    async fn test_retries_on_duplicate_number() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new()
            .with_product(product.clone())
            .with_number_generator(Arc::new(StickyNumbers {
                calls: AtomicUsize::new(0),
                repeats: 2,
            }))
            .build();

        let first = expect_quoted(
            harness
                .service
                .request_quote(tenant, TestQuoteRequestBuilder::new(&product).build())
                .await
                .unwrap(),
        );
        let second = expect_quoted(
            harness
                .service
                .request_quote(tenant, TestQuoteRequestBuilder::new(&product).build())
                .await
                .unwrap(),
        );
        assert_ne!(first.quote_number(), second.quote_number());
        assert_eq!(harness.quotes.len().await, 2);
    }

    /// Gives up after the configured number of draws
    #[tokio::test]
    async fn test_exhausted_attempts() {
        let tenant = TenantId::new();
        let product = TestProductBuilder::new(tenant).build();
        let harness = TestQuoteServiceBuilder::new()
            .with_product(product.clone())
            .with_number_attempts(2)
            .with_number_generator(Arc::new(StickyNumbers {
                calls: AtomicUsize::new(0),
                repeats: usize::MAX,
            }))
            .build();

        harness
            .service
            .request_quote(tenant, TestQuoteRequestBuilder::new(&product).build())
            .await
            .unwrap();
        let result = harness
            .service
            .request_quote(tenant, TestQuoteRequestBuilder::new(&product).build())
            .await;
        assert!(matches!(result, Err(QuoteError::NumberGenerationExhausted(2))));
    }
}
