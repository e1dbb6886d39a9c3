use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cancellation::Settlement;
use super::domain::{
    BoatProfile, BookingId, BookingStatus, CancellationRecord, GuestContact, PaymentMethod,
    PaymentReference, PaymentStatus, SlipId, StayRange, UserClass,
};

/// Rejected lifecycle transition. Nothing leaves `cancelled`, and a state
/// never transitions to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move booking from {} to {}", from.label(), to.label())]
pub struct InvalidStateTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

/// The single place transition legality is decided. Call sites never compare
/// status strings themselves.
pub fn transition(
    from: BookingStatus,
    to: BookingStatus,
) -> Result<BookingStatus, InvalidStateTransition> {
    use BookingStatus::{Cancelled, Confirmed, Pending};

    match (from, to) {
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) => Ok(to),
        _ => Err(InvalidStateTransition { from, to }),
    }
}

/// Canonical persisted form of a booking. The version counter backs the
/// optimistic-concurrency check on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: BookingId,
    pub slip_id: SlipId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub guest: GuestContact,
    pub boat: BoatProfile,
    pub user_class: UserClass,
    pub stay: StayRange,
    pub nights: i64,
    pub base_total: Decimal,
    pub discount: Decimal,
    pub final_total: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<PaymentReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationRecord>,
    pub version: u64,
}

impl BookingRecord {
    /// Apply a successful payment reconciliation: `pending -> confirmed`,
    /// payment marked paid and stamped.
    pub fn mark_paid(&mut self, payment_date: NaiveDate) -> Result<(), InvalidStateTransition> {
        self.status = transition(self.status, BookingStatus::Confirmed)?;
        self.payment_status = PaymentStatus::Paid;
        self.payment_date = Some(payment_date);
        Ok(())
    }

    /// Administrator approval of a pending submission.
    pub fn approve(&mut self) -> Result<(), InvalidStateTransition> {
        self.status = transition(self.status, BookingStatus::Confirmed)?;
        Ok(())
    }

    /// Apply a cancellation settlement and record its metadata.
    pub fn cancel(
        &mut self,
        date: NaiveDate,
        reason: String,
        settlement: &Settlement,
    ) -> Result<(), InvalidStateTransition> {
        self.status = transition(self.status, BookingStatus::Cancelled)?;
        self.payment_status = settlement.payment_status;
        self.cancellation = Some(CancellationRecord {
            date,
            reason,
            refund_amount: settlement.refund_amount.round_dp(2),
            cancellation_fee: settlement.cancellation_fee.round_dp(2),
        });
        Ok(())
    }

    pub fn status_view(&self) -> BookingStatusView {
        BookingStatusView {
            booking_id: self.id.clone(),
            slip_id: self.slip_id.clone(),
            status: self.status.label(),
            payment_status: self.payment_status.label(),
            check_in: self.stay.check_in,
            check_out: self.stay.check_out,
            nights: self.nights,
            final_total: self.final_total.round_dp(2),
            refund_amount: self
                .cancellation
                .as_ref()
                .map(|record| record.refund_amount),
        }
    }
}

/// Sanitized booking representation returned to the client application.
#[derive(Debug, Clone, Serialize)]
pub struct BookingStatusView {
    pub booking_id: BookingId,
    pub slip_id: SlipId,
    pub status: &'static str,
    pub payment_status: &'static str,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub final_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<Decimal>,
}
