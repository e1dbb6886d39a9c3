use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::{BookingId, PaymentReference, SlipId, SlipSnapshot};
use super::lifecycle::BookingRecord;

/// Storage abstraction over the relational datastore's slip and booking
/// tables.
///
/// The confirm operations are where the availability race is closed: each one
/// must atomically re-check confirmed-booking overlap and flip the status
/// under the store's own exclusion mechanism (a mutex for the in-memory
/// store, an exclusion constraint for SQL). Plain `update` carries an
/// expected version so concurrent admin/guest mutations surface as
/// [`RepositoryError::VersionConflict`] instead of lost updates.
pub trait BookingRepository: Send + Sync {
    fn slip(&self, id: &SlipId) -> Result<Option<SlipSnapshot>, RepositoryError>;

    /// Insert a new booking in whatever state the service constructed.
    /// Pending bookings never block other reservations, so no overlap check
    /// happens here.
    fn insert(&self, record: BookingRecord) -> Result<BookingRecord, RepositoryError>;

    /// Insert a booking directly in the confirmed state (homeowner
    /// auto-confirmation), failing with [`RepositoryError::Conflict`] if a
    /// confirmed booking already overlaps the range.
    fn insert_confirmed_if_available(
        &self,
        record: BookingRecord,
    ) -> Result<BookingRecord, RepositoryError>;

    fn fetch(&self, id: &BookingId) -> Result<Option<BookingRecord>, RepositoryError>;

    fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<BookingRecord>, RepositoryError>;

    /// All confirmed bookings for a slip; the availability checker's input.
    fn confirmed_for_slip(&self, slip_id: &SlipId) -> Result<Vec<BookingRecord>, RepositoryError>;

    /// Settle a payment against the booking holding `reference`.
    ///
    /// Must be idempotent: a booking already confirmed and paid under this
    /// reference is returned unchanged with `already_settled` set. Otherwise
    /// the stay is re-checked against confirmed bookings and, when still free,
    /// the booking moves to confirmed/paid with the payment date stamped.
    fn confirm_paid(
        &self,
        reference: &PaymentReference,
        payment_date: NaiveDate,
    ) -> Result<PaymentConfirmation, RepositoryError>;

    /// Administrator approval: `pending -> confirmed` with the same atomic
    /// availability re-check and an optimistic version guard.
    fn approve(
        &self,
        id: &BookingId,
        expected_version: u64,
    ) -> Result<BookingRecord, RepositoryError>;

    /// Replace a booking row, guarded by the version the caller read.
    fn update(
        &self,
        record: BookingRecord,
        expected_version: u64,
    ) -> Result<BookingRecord, RepositoryError>;
}

/// Result of [`BookingRepository::confirm_paid`].
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub record: BookingRecord,
    /// Set when the reference had already been settled; the caller must not
    /// repeat side effects.
    pub already_settled: bool,
}

/// Error enumeration for datastore failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("slip is already booked for an overlapping date range")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record was modified concurrently")]
    VersionConflict,
    #[error("booking is not in a state this operation accepts")]
    IllegalState,
    #[error("datastore unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Transient failures are retried once with backoff before surfacing.
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_))
    }
}

/// Kinds of outbound notices the booking engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    DockEtiquette,
    CancellationNotice,
    OperatorReview,
}

impl NoticeKind {
    pub const fn label(self) -> &'static str {
        match self {
            NoticeKind::DockEtiquette => "dock_etiquette",
            NoticeKind::CancellationNotice => "cancellation_notice",
            NoticeKind::OperatorReview => "operator_review",
        }
    }
}

/// Payload handed to the external notification service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub details: BTreeMap<String, String>,
}

/// Fire-and-forget notification hook. Delivery failures are logged by the
/// service and never block a booking's progress.
pub trait NotificationPublisher: Send + Sync {
    fn send(&self, notice: Notice) -> Result<(), NotificationError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
