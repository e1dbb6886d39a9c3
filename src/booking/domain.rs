use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for rentable dock slips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlipId(pub String);

/// Identifier wrapper for bookings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

/// External payment-processor reference attached to a renter booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentReference(pub String);

/// Who is reserving the slip. Renters pay per night; homeowners have
/// complimentary access and are exempt from cancellation fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserClass {
    Renter,
    Homeowner,
}

impl UserClass {
    pub const fn label(self) -> &'static str {
        match self {
            UserClass::Renter => "renter",
            UserClass::Homeowner => "homeowner",
        }
    }
}

/// Canonical booking lifecycle states. Payment progress is tracked separately
/// in [`PaymentStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// Payment progress, parallel to the lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Scheduled,
    Paid,
    Exempt,
    Refunded,
    PartiallyRefunded,
    NonRefundable,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Scheduled => "scheduled",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Exempt => "exempt",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
            PaymentStatus::NonRefundable => "non_refundable",
        }
    }
}

/// How a booking is (or is not) paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Complimentary,
}

/// Half-open stay interval `[check_in, check_out)`. The check-out day is
/// exclusive, so a departure and an arrival may share a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    pub const fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// Whole nights between check-in and check-out. Negative when the range is
    /// inverted; the eligibility validator rejects that before pricing runs.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Strict half-open overlap. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }
}

/// Contact details captured with every reservation, whether or not the guest
/// has an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// The vessel occupying the slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoatProfile {
    pub length_ft: u16,
    pub make_model: String,
}

/// The renter's underlying property-lease window. Supplied by the owner with
/// renter requests and used only to bound dock-booking timing; never persisted
/// by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Fallback etiquette text used when a slip carries none of its own.
pub const DEFAULT_ETIQUETTE: &str = "Dock Slip Rental Rules\n\n\
1. Be courteous to our neighborhood. Respect fellow boaters and the dock community.\n\
2. Mind the tides when tying up. Leave enough slack for extreme water level changes.\n\
3. Pack it in, pack it out. Take everything you brought with you when you leave.\n\
4. Clean up after yourself. Leave shared facilities ready for the next person.\n\
5. Use only your assigned slip.";

/// Slip attributes the booking core needs. The authoritative slip table lives
/// in the datastore; this is the projection handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipSnapshot {
    pub id: SlipId,
    pub name: String,
    pub max_length_ft: u16,
    pub width_ft: u16,
    pub depth_ft: u16,
    pub nightly_rate: Decimal,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etiquette: Option<String>,
    #[serde(default)]
    pub image_keys: Vec<String>,
}

impl SlipSnapshot {
    pub fn fits(&self, boat_length_ft: u16) -> bool {
        boat_length_ft <= self.max_length_ft
    }

    pub fn etiquette_text(&self) -> &str {
        self.etiquette.as_deref().unwrap_or(DEFAULT_ETIQUETTE)
    }
}

/// A reservation request as submitted by the client application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub slip_id: SlipId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub guest: GuestContact,
    pub boat: BoatProfile,
    pub user_class: UserClass,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_period: Option<RentalPeriod>,
    /// Homeowner submissions flagged for manual review enter the lifecycle as
    /// `pending` and require administrator approval.
    #[serde(default)]
    pub requires_review: bool,
}

impl BookingRequest {
    pub fn stay(&self) -> StayRange {
        StayRange::new(self.check_in, self.check_out)
    }
}

/// Recorded when a booking is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub date: NaiveDate,
    pub reason: String,
    pub refund_amount: Decimal,
    pub cancellation_fee: Decimal,
}
