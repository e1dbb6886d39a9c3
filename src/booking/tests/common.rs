use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::booking::domain::{
    BoatProfile, BookingRequest, GuestContact, RentalPeriod, SlipId, SlipSnapshot, UserClass,
};
use crate::booking::memory::InMemoryBookingStore;
use crate::booking::payments::{PaymentError, PaymentGateway, PaymentIntent, SandboxGateway};
use crate::booking::repository::{Notice, NotificationError, NotificationPublisher};
use crate::booking::service::BookingService;
use crate::config::PaymentConfig;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2025, 6, 1)
}

pub(super) fn slip() -> SlipSnapshot {
    SlipSnapshot {
        id: SlipId("slip-a1".to_string()),
        name: "Slip A1".to_string(),
        max_length_ft: 30,
        width_ft: 12,
        depth_ft: 6,
        nightly_rate: Decimal::from(60),
        amenities: vec!["Water".to_string(), "Power".to_string()],
        description: "Protected slip near the fuel dock".to_string(),
        etiquette: Some("Quiet hours after 10 PM.".to_string()),
        image_keys: Vec::new(),
    }
}

pub(super) fn payment_config() -> PaymentConfig {
    PaymentConfig {
        currency: "usd".to_string(),
        minimum_charge_minor: 50,
        dependency_timeout: Duration::from_secs(5),
        retry_backoff: Duration::from_millis(1),
    }
}

pub(super) fn guest() -> GuestContact {
    GuestContact {
        name: "Sam Harbor".to_string(),
        email: "sam@example.com".to_string(),
        phone: Some("941-555-0101".to_string()),
    }
}

pub(super) fn boat() -> BoatProfile {
    BoatProfile {
        length_ft: 24,
        make_model: "Boston Whaler 240".to_string(),
    }
}

pub(super) fn renter_request(check_in: NaiveDate, check_out: NaiveDate) -> BookingRequest {
    BookingRequest {
        slip_id: SlipId("slip-a1".to_string()),
        user_id: Some("user-renter".to_string()),
        guest: guest(),
        boat: boat(),
        user_class: UserClass::Renter,
        check_in,
        check_out,
        rental_period: None,
        requires_review: false,
    }
}

pub(super) fn renter_request_with_period(
    check_in: NaiveDate,
    check_out: NaiveDate,
    period: RentalPeriod,
) -> BookingRequest {
    BookingRequest {
        rental_period: Some(period),
        ..renter_request(check_in, check_out)
    }
}

pub(super) fn homeowner_request(check_in: NaiveDate, check_out: NaiveDate) -> BookingRequest {
    BookingRequest {
        user_id: Some("user-owner".to_string()),
        user_class: UserClass::Homeowner,
        ..renter_request(check_in, check_out)
    }
}

/// Captures outbound notices so tests can assert side effects.
#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<Notice> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifier {
    fn send(&self, notice: Notice) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

/// Fails the first `failures` attempts with a transient error, then behaves
/// like the sandbox gateway.
pub(super) struct FlakyGateway {
    failures: Mutex<u32>,
    inner: SandboxGateway,
}

impl FlakyGateway {
    pub(super) fn failing(failures: u32) -> Self {
        Self {
            failures: Mutex::new(failures),
            inner: SandboxGateway::new(),
        }
    }
}

impl PaymentGateway for FlakyGateway {
    fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: BTreeMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut failures = self.failures.lock().expect("gateway mutex poisoned");
        if *failures > 0 {
            *failures -= 1;
            return Err(PaymentError::Unreachable("connection reset".to_string()));
        }
        self.inner.create_intent(amount_minor, currency, metadata)
    }
}

pub(super) type TestService = BookingService<InMemoryBookingStore, SandboxGateway, MemoryNotifier>;

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) store: Arc<InMemoryBookingStore>,
    pub(super) notifier: Arc<MemoryNotifier>,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryBookingStore::with_slips([slip()]));
    let gateway = Arc::new(SandboxGateway::new());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = Arc::new(BookingService::new(
        store.clone(),
        gateway,
        notifier.clone(),
        payment_config(),
    ));
    Harness {
        service,
        store,
        notifier,
    }
}
