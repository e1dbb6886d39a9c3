use chrono::{Duration, NaiveDate};

use super::domain::{BookingRequest, RentalPeriod, SlipSnapshot, UserClass};

/// Longest stay a renter may book in one reservation.
pub const RENTER_MAX_NIGHTS: i64 = 30;

/// How many days before the rental-property arrival a renter may start a dock
/// stay.
pub const RENTAL_WINDOW_LEAD_DAYS: i64 = 7;

/// A rejected reservation request. Each variant carries the user-facing
/// message shown to the guest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("check-in date cannot be in the past")]
    CheckInPast,
    #[error("check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,
    #[error("renters can only book up to {RENTER_MAX_NIGHTS} nights at a time (requested {nights})")]
    StayTooLong { nights: i64 },
    #[error(
        "dock slips can only be reserved within {RENTAL_WINDOW_LEAD_DAYS} days prior to the rental arrival date {rental_start}; earliest allowed check-in is {earliest}"
    )]
    OutsideRentalWindow {
        rental_start: NaiveDate,
        earliest: NaiveDate,
    },
    #[error("a dock stay beginning before the rental period cannot extend past its end date {rental_end}")]
    ExtendsPastRentalEnd { rental_end: NaiveDate },
    #[error("boat length cannot exceed {max_length_ft} feet for this dock slip")]
    BoatTooLong {
        boat_length_ft: u16,
        max_length_ft: u16,
    },
}

/// Validate a reservation request against date sanity, stay-length, rental
/// window, and slip fit rules. Evaluation is fail-fast: the first broken rule
/// wins and later rules are not consulted.
pub fn validate(
    request: &BookingRequest,
    today: NaiveDate,
    slip: &SlipSnapshot,
) -> Result<(), EligibilityError> {
    let stay = request.stay();

    if stay.check_in < today {
        return Err(EligibilityError::CheckInPast);
    }

    if stay.check_out <= stay.check_in {
        return Err(EligibilityError::CheckOutNotAfterCheckIn);
    }

    if request.user_class == UserClass::Renter && stay.nights() > RENTER_MAX_NIGHTS {
        return Err(EligibilityError::StayTooLong {
            nights: stay.nights(),
        });
    }

    if request.user_class == UserClass::Renter {
        if let Some(period) = &request.rental_period {
            check_rental_window(stay.check_in, stay.check_out, period)?;
        }
    }

    if !slip.fits(request.boat.length_ft) {
        return Err(EligibilityError::BoatTooLong {
            boat_length_ft: request.boat.length_ft,
            max_length_ft: slip.max_length_ft,
        });
    }

    Ok(())
}

fn check_rental_window(
    check_in: NaiveDate,
    check_out: NaiveDate,
    period: &RentalPeriod,
) -> Result<(), EligibilityError> {
    let earliest = period.start - Duration::days(RENTAL_WINDOW_LEAD_DAYS);

    if check_in < earliest {
        return Err(EligibilityError::OutsideRentalWindow {
            rental_start: period.start,
            earliest,
        });
    }

    // A stay that begins during the lead window must still end with the lease.
    if check_in < period.start && check_out > period.end {
        return Err(EligibilityError::ExtendsPastRentalEnd {
            rental_end: period.end,
        });
    }

    Ok(())
}
