//! Test Data Builders
//!
//! Builders with sensible defaults so a test only spells out the fields it
//! is about.

use chrono::{DateTime, Utc};
use core_kernel::{FixedClock, TenantId};
use rust_decimal::Decimal;
use std::sync::Arc;

use domain_quote::{
    CoverageSelections, CustomerContact, EligibilityConstraints, FeeConfig, InMemoryCatalogAdapter,
    InMemoryQuoteRepository, InMemorySpecialRequestRepository, Jurisdiction, NumberGenerator,
    Product, QuoteRequest, QuoteService, QuoteServiceSettings, RateTable, TaxSchedule,
    VehicleClass, VehicleData,
};

use crate::fixtures::{ProductFixtures, TemporalFixtures, VehicleFixtures};

/// Builder for test products
pub struct TestProductBuilder {
    product: Product,
}

impl TestProductBuilder {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            product: ProductFixtures::auto_product(tenant_id),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.product.code = code.into();
        self
    }

    pub fn with_max_age(mut self, years: u32) -> Self {
        self.product.eligibility.max_vehicle_age_years = years;
        self
    }

    pub fn with_max_mileage(mut self, miles: u32) -> Self {
        self.product.eligibility.max_mileage = miles;
        self
    }

    pub fn with_constraints(mut self, constraints: EligibilityConstraints) -> Self {
        self.product.eligibility = constraints;
        self
    }

    pub fn with_fees(mut self, fees: FeeConfig) -> Self {
        self.product.fees = fees;
        self
    }

    pub fn with_rate_table(mut self, table: RateTable) -> Self {
        self.product.rate_table = table;
        self
    }

    pub fn with_validity_days(mut self, days: u32) -> Self {
        self.product.quote_validity_days = days;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.product.active = false;
        self
    }

    pub fn build(self) -> Product {
        self.product
    }
}

/// Builder for quote requests against a product
pub struct TestQuoteRequestBuilder {
    request: QuoteRequest,
}

impl TestQuoteRequestBuilder {
    /// Eligible vehicle, Gold/48/A, customer attached
    pub fn new(product: &Product) -> Self {
        Self {
            request: QuoteRequest::new(
                product.id,
                VehicleFixtures::eligible_vehicle(),
                VehicleFixtures::gold_48_a(),
            )
            .with_customer(VehicleFixtures::customer()),
        }
    }

    pub fn with_vehicle(mut self, vehicle: VehicleData) -> Self {
        self.request.vehicle = vehicle;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.request.vehicle.year = year;
        self
    }

    pub fn with_mileage(mut self, mileage: u32) -> Self {
        self.request.vehicle.mileage = mileage;
        self
    }

    pub fn with_make(mut self, make: impl Into<String>) -> Self {
        self.request.vehicle.make = make.into();
        self
    }

    pub fn with_selections(mut self, selections: CoverageSelections) -> Self {
        self.request.selections = selections;
        self
    }

    pub fn with_class(mut self, class: VehicleClass) -> Self {
        self.request.selections.vehicle_class = class;
        self
    }

    pub fn with_customer(mut self, customer: CustomerContact) -> Self {
        self.request.customer = Some(customer);
        self
    }

    pub fn without_customer(mut self) -> Self {
        self.request.customer = None;
        self
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.request.jurisdiction = Some(jurisdiction);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.request.request_reason = Some(reason.into());
        self
    }

    pub fn build(self) -> QuoteRequest {
        self.request
    }
}

/// A `QuoteService` over in-memory adapters and a fixed clock
pub struct TestQuoteService {
    pub service: QuoteService,
    pub clock: Arc<FixedClock>,
    pub catalog: InMemoryCatalogAdapter,
    pub quotes: InMemoryQuoteRepository,
    pub requests: InMemorySpecialRequestRepository,
}

/// Builder for [`TestQuoteService`]
pub struct TestQuoteServiceBuilder {
    products: Vec<Product>,
    now: DateTime<Utc>,
    tax: TaxSchedule,
    number_attempts: u32,
    numbers: Option<Arc<dyn NumberGenerator>>,
}

impl Default for TestQuoteServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestQuoteServiceBuilder {
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
            now: TemporalFixtures::now(),
            tax: ProductFixtures::tax_schedule(),
            number_attempts: QuoteServiceSettings::default().number_attempts,
            numbers: None,
        }
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_flat_tax(mut self, percent: Decimal) -> Self {
        self.tax = TaxSchedule::flat(percent);
        self
    }

    pub fn with_tax(mut self, tax: TaxSchedule) -> Self {
        self.tax = tax;
        self
    }

    pub fn with_number_generator(mut self, numbers: Arc<dyn NumberGenerator>) -> Self {
        self.numbers = Some(numbers);
        self
    }

    pub fn with_number_attempts(mut self, attempts: u32) -> Self {
        self.number_attempts = attempts;
        self
    }

    pub fn build(self) -> TestQuoteService {
        let clock = Arc::new(FixedClock::new(self.now));
        let catalog = InMemoryCatalogAdapter::new(self.products);
        let quotes = InMemoryQuoteRepository::new();
        let requests = InMemorySpecialRequestRepository::new();

        let mut service = QuoteService::new(
            Arc::new(catalog.clone()),
            Arc::new(quotes.clone()),
            Arc::new(requests.clone()),
            clock.clone(),
        )
        .with_settings(QuoteServiceSettings {
            tax: self.tax,
            number_attempts: self.number_attempts,
        });
        if let Some(numbers) = self.numbers {
            service = service.with_number_generator(numbers);
        }

        TestQuoteService {
            service,
            clock,
            catalog,
            quotes,
            requests,
        }
    }
}
