//! Booking lifecycle, availability, and pricing engine.
//!
//! A reservation request flows eligibility validation, availability checking,
//! and pricing before it touches storage; renter bookings then wait on the
//! payment coordinator while homeowner bookings confirm directly. A
//! cancellation flows the lifecycle state machine and the tiered refund
//! schedule. The datastore is the single source of truth for conflict
//! checks; nothing in this module caches bookings authoritatively.

pub mod availability;
pub mod cancellation;
pub mod domain;
pub mod eligibility;
pub mod lifecycle;
pub mod memory;
pub mod payments;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use cancellation::Settlement;
pub use domain::{
    BoatProfile, BookingId, BookingRequest, BookingStatus, CancellationRecord, GuestContact,
    PaymentMethod, PaymentReference, PaymentStatus, RentalPeriod, SlipId, SlipSnapshot, StayRange,
    UserClass,
};
pub use eligibility::EligibilityError;
pub use lifecycle::{BookingRecord, BookingStatusView, InvalidStateTransition};
pub use memory::InMemoryBookingStore;
pub use payments::{PaymentError, PaymentGateway, PaymentIntent, SandboxGateway};
pub use pricing::Quote;
pub use repository::{
    BookingRepository, Notice, NoticeKind, NotificationError, NotificationPublisher,
    PaymentConfirmation, RepositoryError,
};
pub use router::booking_router;
pub use service::{BookingCreated, BookingService, BookingServiceError, CancellationOutcome};
