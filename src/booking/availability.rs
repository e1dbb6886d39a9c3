use super::domain::{SlipId, StayRange};
use super::lifecycle::BookingRecord;
use crate::booking::domain::BookingStatus;

/// Whether an existing booking blocks the candidate range on the given slip.
///
/// Only confirmed bookings occupy a slip; pending and cancelled bookings never
/// block. Overlap is strict half-open interval overlap, so back-to-back stays
/// (one check-out on another's check-in) are allowed.
pub fn conflicts(existing: &BookingRecord, slip_id: &SlipId, range: &StayRange) -> bool {
    existing.slip_id == *slip_id
        && existing.status == BookingStatus::Confirmed
        && existing.stay.overlaps(range)
}

/// `true` iff no confirmed booking in `bookings` conflicts with the candidate
/// range. Pure; safe to call repeatedly.
pub fn is_available<'a, I>(bookings: I, slip_id: &SlipId, range: &StayRange) -> bool
where
    I: IntoIterator<Item = &'a BookingRecord>,
{
    bookings
        .into_iter()
        .all(|booking| !conflicts(booking, slip_id, range))
}
