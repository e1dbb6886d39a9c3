use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info, warn};

use super::availability;
use super::cancellation::{self, Settlement};
use super::domain::{
    BookingId, BookingRequest, BookingStatus, PaymentMethod, PaymentReference, PaymentStatus,
    SlipId, SlipSnapshot, StayRange, UserClass,
};
use super::eligibility::{self, EligibilityError};
use super::lifecycle::{BookingRecord, BookingStatusView, InvalidStateTransition};
use super::payments::{retry_once, PaymentError, PaymentGateway};
use super::pricing::{self, Quote};
use super::repository::{
    BookingRepository, Notice, NoticeKind, NotificationPublisher, RepositoryError,
};
use crate::config::PaymentConfig;

/// Service composing the eligibility validator, availability checker, pricing
/// calculator, cancellation policy, and payment coordinator around the
/// booking lifecycle.
pub struct BookingService<R, G, N> {
    repository: Arc<R>,
    gateway: Arc<G>,
    notifier: Arc<N>,
    payment: PaymentConfig,
}

static BOOKING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_booking_id() -> BookingId {
    let id = BOOKING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BookingId(format!("bk-{id:06}"))
}

/// Response to a successful reservation submission.
#[derive(Debug, Clone, Serialize)]
pub struct BookingCreated {
    pub booking: BookingStatusView,
    pub quote: Quote,
    /// Present for renter bookings: the processor secret the client uses to
    /// complete the charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Response to a cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    pub booking: BookingStatusView,
    pub refund_amount: Decimal,
    pub cancellation_fee: Decimal,
    pub payment_status: &'static str,
}

impl<R, G, N> BookingService<R, G, N>
where
    R: BookingRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, gateway: Arc<G>, notifier: Arc<N>, payment: PaymentConfig) -> Self {
        Self {
            repository,
            gateway,
            notifier,
            payment,
        }
    }

    /// Whether the slip is free for the candidate range. Read-only.
    pub fn check_availability(
        &self,
        slip_id: &SlipId,
        range: &StayRange,
    ) -> Result<bool, BookingServiceError> {
        self.require_slip(slip_id)?;
        let confirmed = self.repository.confirmed_for_slip(slip_id)?;
        Ok(availability::is_available(confirmed.iter(), slip_id, range))
    }

    /// Run the full eligibility/availability/pricing pipeline without
    /// creating anything. Prices are always computed here, server-side;
    /// client-supplied numbers are advisory display only.
    pub fn validate_and_price(
        &self,
        request: &BookingRequest,
        today: NaiveDate,
    ) -> Result<Quote, BookingServiceError> {
        let slip = self.require_slip(&request.slip_id)?;
        eligibility::validate(request, today, &slip)?;

        let confirmed = self.repository.confirmed_for_slip(&request.slip_id)?;
        if !availability::is_available(confirmed.iter(), &request.slip_id, &request.stay()) {
            return Err(BookingServiceError::Conflict);
        }

        Ok(self.quote_for(request, &slip))
    }

    /// Submit a reservation. Homeowners are auto-confirmed (or parked pending
    /// manual review); renters get a payment intent and stay pending until
    /// reconciliation confirms the charge.
    pub fn create_booking(
        &self,
        request: BookingRequest,
        today: NaiveDate,
    ) -> Result<BookingCreated, BookingServiceError> {
        let slip = self.require_slip(&request.slip_id)?;
        eligibility::validate(&request, today, &slip)?;

        let confirmed = self.repository.confirmed_for_slip(&request.slip_id)?;
        if !availability::is_available(confirmed.iter(), &request.slip_id, &request.stay()) {
            return Err(BookingServiceError::Conflict);
        }

        let quote = self.quote_for(&request, &slip);

        match request.user_class {
            UserClass::Homeowner => self.create_homeowner_booking(request, &slip, quote),
            UserClass::Renter => self.create_renter_booking(request, &slip, quote),
        }
    }

    fn create_homeowner_booking(
        &self,
        request: BookingRequest,
        slip: &SlipSnapshot,
        quote: Quote,
    ) -> Result<BookingCreated, BookingServiceError> {
        let requires_review = request.requires_review;
        let status = if requires_review {
            BookingStatus::Pending
        } else {
            BookingStatus::Confirmed
        };

        let record = self.build_record(request, &quote, status, PaymentStatus::Exempt, PaymentMethod::Complimentary, None);

        let stored = if requires_review {
            self.repository.insert(record)?
        } else {
            self.repository
                .insert_confirmed_if_available(record)
                .map_err(conflict_or_repository)?
        };

        info!(booking = %stored.id.0, slip = %stored.slip_id.0, status = stored.status.label(), "homeowner booking created");

        if stored.status == BookingStatus::Confirmed {
            self.send_etiquette_notice(&stored, slip);
        }

        Ok(BookingCreated {
            booking: stored.status_view(),
            quote: quote.rounded(),
            client_secret: None,
        })
    }

    fn create_renter_booking(
        &self,
        request: BookingRequest,
        slip: &SlipSnapshot,
        quote: Quote,
    ) -> Result<BookingCreated, BookingServiceError> {
        let amount_minor = to_minor_units(quote.final_total);
        if amount_minor <= 0 {
            return Err(BookingServiceError::Payment(PaymentError::NonPositiveAmount));
        }
        if amount_minor < self.payment.minimum_charge_minor {
            return Err(BookingServiceError::Payment(PaymentError::BelowMinimumCharge {
                amount_minor,
                minimum_minor: self.payment.minimum_charge_minor,
            }));
        }

        let metadata = intent_metadata(&request, slip, &quote);
        let budget = self.payment.dependency_timeout;
        let backoff = self.payment.retry_backoff;
        let gateway = Arc::clone(&self.gateway);
        let currency = self.payment.currency.clone();
        let intent = retry_once(budget, backoff, PaymentError::is_transient, || {
            gateway.create_intent(amount_minor, &currency, metadata.clone())
        })?;

        let record = self.build_record(
            request,
            &quote,
            BookingStatus::Pending,
            PaymentStatus::Scheduled,
            PaymentMethod::Card,
            Some(intent.reference.clone()),
        );
        let stored = self.repository.insert(record)?;

        info!(booking = %stored.id.0, slip = %stored.slip_id.0, reference = %intent.reference.0, "renter booking pending payment");

        Ok(BookingCreated {
            booking: stored.status_view(),
            quote: quote.rounded(),
            client_secret: Some(intent.client_secret),
        })
    }

    /// Reconcile a processor confirmation with its booking. Idempotent: a
    /// reference that has already settled returns the confirmed record with
    /// no repeated side effects. A confirmation with no matching booking is
    /// an operator-visible inconsistency, never a silent success.
    pub fn confirm_payment(
        &self,
        reference: &PaymentReference,
        payment_date: NaiveDate,
    ) -> Result<BookingStatusView, BookingServiceError> {
        let budget = self.payment.dependency_timeout;
        let backoff = self.payment.retry_backoff;
        let repository = Arc::clone(&self.repository);
        let outcome = retry_once(budget, backoff, RepositoryError::is_transient, || {
            repository.confirm_paid(reference, payment_date)
        });

        let confirmation = match outcome {
            Ok(confirmation) => confirmation,
            Err(RepositoryError::NotFound) => {
                error!(reference = %reference.0, "payment confirmed but no booking matches");
                self.queue_operator_review(
                    reference,
                    format!(
                        "Payment {} was confirmed by the processor but no booking references it. \
                         Manual reconciliation required.",
                        reference.0
                    ),
                );
                return Err(BookingServiceError::ReconciliationInconsistency {
                    reference: reference.0.clone(),
                });
            }
            Err(RepositoryError::Conflict) => {
                // The guest has been charged for a stay the slip can no longer
                // host; a refund or rebooking needs a human.
                error!(reference = %reference.0, "payment settled but the slip was booked first");
                self.queue_operator_review(
                    reference,
                    format!(
                        "Payment {} settled at the processor but an overlapping booking was \
                         confirmed first. The charge needs a manual refund or rebooking.",
                        reference.0
                    ),
                );
                return Err(BookingServiceError::Conflict);
            }
            Err(other) => return Err(BookingServiceError::Repository(other)),
        };

        if confirmation.already_settled {
            info!(reference = %reference.0, booking = %confirmation.record.id.0, "duplicate payment confirmation ignored");
            return Ok(confirmation.record.status_view());
        }

        info!(reference = %reference.0, booking = %confirmation.record.id.0, "payment reconciled, booking confirmed");

        if let Ok(Some(slip)) = self.repository.slip(&confirmation.record.slip_id) {
            self.send_etiquette_notice(&confirmation.record, &slip);
        }

        Ok(confirmation.record.status_view())
    }

    /// Cancel a pending or confirmed booking under the tiered refund
    /// schedule. Cancelling an already-cancelled booking is rejected and
    /// changes nothing.
    pub fn cancel_booking(
        &self,
        id: &BookingId,
        cancelled_on: NaiveDate,
        reason: &str,
    ) -> Result<CancellationOutcome, BookingServiceError> {
        if reason.trim().is_empty() {
            return Err(BookingServiceError::MissingCancellationReason);
        }

        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let settlement = cancellation::settle(
            record.user_class,
            record.final_total,
            cancellation::days_until_check_in(record.stay.check_in, cancelled_on),
        );

        let expected_version = record.version;
        record.cancel(cancelled_on, reason.trim().to_string(), &settlement)?;
        let stored = self.repository.update(record, expected_version)?;

        info!(
            booking = %stored.id.0,
            refund = %settlement.refund_amount.round_dp(2),
            fee = %settlement.cancellation_fee.round_dp(2),
            "booking cancelled"
        );

        self.send_cancellation_notice(&stored, &settlement, reason.trim());

        Ok(CancellationOutcome {
            booking: stored.status_view(),
            refund_amount: settlement.refund_amount.round_dp(2),
            cancellation_fee: settlement.cancellation_fee.round_dp(2),
            payment_status: settlement.payment_status.label(),
        })
    }

    /// Administrator approval of a pending (homeowner-reviewed) booking.
    /// Confirmation triggers the etiquette notice.
    pub fn approve_booking(&self, id: &BookingId) -> Result<BookingStatusView, BookingServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let stored = match self.repository.approve(id, record.version) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(BookingServiceError::Conflict),
            Err(RepositoryError::IllegalState) => {
                return Err(BookingServiceError::InvalidState(InvalidStateTransition {
                    from: record.status,
                    to: BookingStatus::Confirmed,
                }))
            }
            Err(other) => return Err(BookingServiceError::Repository(other)),
        };

        info!(booking = %stored.id.0, "booking approved");

        if let Ok(Some(slip)) = self.repository.slip(&stored.slip_id) {
            self.send_etiquette_notice(&stored, &slip);
        }

        Ok(stored.status_view())
    }

    fn require_slip(&self, slip_id: &SlipId) -> Result<SlipSnapshot, BookingServiceError> {
        self.repository
            .slip(slip_id)?
            .ok_or(BookingServiceError::Repository(RepositoryError::NotFound))
    }

    fn quote_for(&self, request: &BookingRequest, slip: &SlipSnapshot) -> Quote {
        match request.user_class {
            UserClass::Homeowner => Quote::complimentary(request.stay().nights()),
            UserClass::Renter => {
                pricing::quote(&request.stay(), slip.nightly_rate, request.user_class)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_record(
        &self,
        request: BookingRequest,
        quote: &Quote,
        status: BookingStatus,
        payment_status: PaymentStatus,
        payment_method: PaymentMethod,
        payment_reference: Option<PaymentReference>,
    ) -> BookingRecord {
        BookingRecord {
            id: next_booking_id(),
            slip_id: request.slip_id,
            user_id: request.user_id,
            guest: request.guest,
            boat: request.boat,
            user_class: request.user_class,
            stay: StayRange::new(request.check_in, request.check_out),
            nights: quote.nights,
            base_total: quote.base_total.round_dp(2),
            discount: quote.discount.round_dp(2),
            final_total: quote.final_total.round_dp(2),
            status,
            payment_status,
            payment_method,
            payment_reference,
            payment_date: None,
            cancellation: None,
            version: 0,
        }
    }

    fn send_etiquette_notice(&self, record: &BookingRecord, slip: &SlipSnapshot) {
        let mut details = BTreeMap::new();
        details.insert("booking_id".to_string(), record.id.0.clone());
        details.insert("slip_name".to_string(), slip.name.clone());
        details.insert("check_in".to_string(), record.stay.check_in.to_string());
        details.insert("check_out".to_string(), record.stay.check_out.to_string());

        let notice = Notice {
            kind: NoticeKind::DockEtiquette,
            recipient: record.guest.email.clone(),
            subject: format!("Dock Slip Booking Confirmed - {}", slip.name),
            body: slip.etiquette_text().to_string(),
            details,
        };

        if let Err(err) = self.notifier.send(notice) {
            warn!(booking = %record.id.0, "etiquette notice failed: {err}");
        }
    }

    fn send_cancellation_notice(&self, record: &BookingRecord, settlement: &Settlement, reason: &str) {
        let mut details = BTreeMap::new();
        details.insert("booking_id".to_string(), record.id.0.clone());
        details.insert("reason".to_string(), reason.to_string());
        details.insert(
            "refund_amount".to_string(),
            settlement.refund_amount.round_dp(2).to_string(),
        );

        let notice = Notice {
            kind: NoticeKind::CancellationNotice,
            recipient: record.guest.email.clone(),
            subject: "Booking Cancelled".to_string(),
            body: format!(
                "{} has cancelled the booking for {} to {}. Reason: {}. Refund: ${}",
                record.guest.name,
                record.stay.check_in,
                record.stay.check_out,
                reason,
                settlement.refund_amount.round_dp(2)
            ),
            details,
        };

        if let Err(err) = self.notifier.send(notice) {
            warn!(booking = %record.id.0, "cancellation notice failed: {err}");
        }
    }

    fn queue_operator_review(&self, reference: &PaymentReference, body: String) {
        let mut details = BTreeMap::new();
        details.insert("payment_reference".to_string(), reference.0.clone());

        let notice = Notice {
            kind: NoticeKind::OperatorReview,
            recipient: "operations".to_string(),
            subject: "Payment reconciliation needs manual review".to_string(),
            body,
            details,
        };

        if let Err(err) = self.notifier.send(notice) {
            // The service error already carries the inconsistency; the notice
            // is the operator-facing duplicate of that signal.
            error!(reference = %reference.0, "operator review notice failed: {err}");
        }
    }
}

fn to_minor_units(amount: Decimal) -> i64 {
    (amount * Decimal::from(100)).round_dp(0).to_i64().unwrap_or(0)
}

fn conflict_or_repository(err: RepositoryError) -> BookingServiceError {
    match err {
        RepositoryError::Conflict => BookingServiceError::Conflict,
        other => BookingServiceError::Repository(other),
    }
}

fn intent_metadata(
    request: &BookingRequest,
    slip: &SlipSnapshot,
    quote: &Quote,
) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert("slip_id".to_string(), request.slip_id.0.clone());
    metadata.insert("slip_name".to_string(), slip.name.clone());
    metadata.insert("guest_name".to_string(), request.guest.name.clone());
    metadata.insert("guest_email".to_string(), request.guest.email.clone());
    if let Some(phone) = &request.guest.phone {
        metadata.insert("guest_phone".to_string(), phone.clone());
    }
    metadata.insert("check_in".to_string(), request.check_in.to_string());
    metadata.insert("check_out".to_string(), request.check_out.to_string());
    metadata.insert("boat_length".to_string(), request.boat.length_ft.to_string());
    metadata.insert("boat_make_model".to_string(), request.boat.make_model.clone());
    metadata.insert("user_type".to_string(), request.user_class.label().to_string());
    metadata.insert("nights".to_string(), quote.nights.to_string());
    if let Some(period) = &request.rental_period {
        metadata.insert("rental_start_date".to_string(), period.start.to_string());
        metadata.insert("rental_end_date".to_string(), period.end.to_string());
    }
    metadata
}

/// Error raised by the booking service.
#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error(transparent)]
    Validation(#[from] EligibilityError),
    #[error("slip is not available for the requested dates")]
    Conflict,
    #[error("a cancellation reason is required")]
    MissingCancellationReason,
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error("payment {reference} was confirmed but no matching booking exists")]
    ReconciliationInconsistency { reference: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
