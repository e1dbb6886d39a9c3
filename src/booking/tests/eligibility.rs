use super::common::*;
use crate::booking::domain::{BoatProfile, RentalPeriod};
use crate::booking::eligibility::{validate, EligibilityError};

#[test]
fn rejects_past_check_in() {
    let request = renter_request(date(2025, 5, 30), date(2025, 6, 3));
    assert_eq!(
        validate(&request, today(), &slip()),
        Err(EligibilityError::CheckInPast)
    );
}

#[test]
fn rejects_check_out_not_after_check_in() {
    let request = renter_request(date(2025, 6, 10), date(2025, 6, 10));
    assert_eq!(
        validate(&request, today(), &slip()),
        Err(EligibilityError::CheckOutNotAfterCheckIn)
    );

    let inverted = renter_request(date(2025, 6, 10), date(2025, 6, 8));
    assert_eq!(
        validate(&inverted, today(), &slip()),
        Err(EligibilityError::CheckOutNotAfterCheckIn)
    );
}

#[test]
fn rejects_renter_stay_over_thirty_nights() {
    let request = renter_request(date(2025, 6, 1), date(2025, 7, 2));
    assert_eq!(
        validate(&request, today(), &slip()),
        Err(EligibilityError::StayTooLong { nights: 31 })
    );
}

#[test]
fn allows_exactly_thirty_nights_for_renter() {
    let request = renter_request(date(2025, 6, 1), date(2025, 7, 1));
    assert_eq!(validate(&request, today(), &slip()), Ok(()));
}

#[test]
fn homeowner_is_exempt_from_stay_cap() {
    let request = homeowner_request(date(2025, 6, 1), date(2025, 8, 1));
    assert_eq!(validate(&request, today(), &slip()), Ok(()));
}

#[test]
fn rejects_check_in_more_than_seven_days_before_lease() {
    let period = RentalPeriod {
        start: date(2025, 6, 20),
        end: date(2025, 6, 30),
    };
    // June 12 is eight days ahead of the lease start; June 13 is the earliest
    // allowed check-in.
    let request = renter_request_with_period(date(2025, 6, 12), date(2025, 6, 22), period);
    assert_eq!(
        validate(&request, today(), &slip()),
        Err(EligibilityError::OutsideRentalWindow {
            rental_start: date(2025, 6, 20),
            earliest: date(2025, 6, 13),
        })
    );
}

#[test]
fn allows_check_in_exactly_seven_days_before_lease() {
    let period = RentalPeriod {
        start: date(2025, 6, 20),
        end: date(2025, 6, 30),
    };
    let request = renter_request_with_period(date(2025, 6, 13), date(2025, 6, 22), period);
    assert_eq!(validate(&request, today(), &slip()), Ok(()));
}

#[test]
fn early_start_must_not_extend_past_lease_end() {
    let period = RentalPeriod {
        start: date(2025, 6, 20),
        end: date(2025, 6, 30),
    };
    let request = renter_request_with_period(date(2025, 6, 15), date(2025, 7, 2), period);
    assert_eq!(
        validate(&request, today(), &slip()),
        Err(EligibilityError::ExtendsPastRentalEnd {
            rental_end: date(2025, 6, 30),
        })
    );
}

#[test]
fn stay_starting_with_lease_may_run_past_its_end() {
    let period = RentalPeriod {
        start: date(2025, 6, 20),
        end: date(2025, 6, 30),
    };
    let request = renter_request_with_period(date(2025, 6, 20), date(2025, 7, 2), period);
    assert_eq!(validate(&request, today(), &slip()), Ok(()));
}

#[test]
fn rejects_boat_longer_than_slip() {
    let mut request = renter_request(date(2025, 6, 10), date(2025, 6, 12));
    request.boat = BoatProfile {
        length_ft: 32,
        make_model: "Sea Ray 320".to_string(),
    };
    assert_eq!(
        validate(&request, today(), &slip()),
        Err(EligibilityError::BoatTooLong {
            boat_length_ft: 32,
            max_length_ft: 30,
        })
    );
}

#[test]
fn first_broken_rule_wins() {
    // Past check-in and an oversized boat together: the date rule fires first.
    let mut request = renter_request(date(2025, 5, 30), date(2025, 6, 3));
    request.boat = BoatProfile {
        length_ft: 40,
        make_model: "Viking 40".to_string(),
    };
    assert_eq!(
        validate(&request, today(), &slip()),
        Err(EligibilityError::CheckInPast)
    );
}
