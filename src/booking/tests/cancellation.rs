use super::common::*;
use crate::booking::cancellation::{days_until_check_in, settle};
use crate::booking::domain::{PaymentStatus, UserClass};
use rust_decimal::{dec, Decimal};

const TOTAL: Decimal = Decimal::from_parts(120, 0, 0, false, 0);

#[test]
fn seven_or_more_days_out_refunds_in_full() {
    let settlement = settle(UserClass::Renter, TOTAL, 7);
    assert_eq!(settlement.refund_amount, Decimal::from(120));
    assert_eq!(settlement.cancellation_fee, Decimal::ZERO);
    assert_eq!(settlement.payment_status, PaymentStatus::Refunded);

    let far_out = settle(UserClass::Renter, TOTAL, 45);
    assert_eq!(far_out.payment_status, PaymentStatus::Refunded);
}

#[test]
fn six_days_out_refunds_half() {
    let settlement = settle(UserClass::Renter, TOTAL, 6);
    assert_eq!(settlement.refund_amount, Decimal::from(60));
    assert_eq!(settlement.cancellation_fee, Decimal::from(60));
    assert_eq!(settlement.payment_status, PaymentStatus::PartiallyRefunded);

    let three_days = settle(UserClass::Renter, TOTAL, 3);
    assert_eq!(three_days.refund_amount, Decimal::from(60));
}

#[test]
fn one_to_two_days_out_refunds_a_quarter() {
    let two_days = settle(UserClass::Renter, TOTAL, 2);
    assert_eq!(two_days.refund_amount, Decimal::from(30));
    assert_eq!(two_days.cancellation_fee, Decimal::from(90));
    assert_eq!(two_days.payment_status, PaymentStatus::PartiallyRefunded);

    let one_day = settle(UserClass::Renter, TOTAL, 1);
    assert_eq!(one_day.refund_amount, Decimal::from(30));
}

#[test]
fn same_day_or_later_refunds_nothing() {
    let same_day = settle(UserClass::Renter, TOTAL, 0);
    assert_eq!(same_day.refund_amount, Decimal::ZERO);
    assert_eq!(same_day.cancellation_fee, Decimal::from(120));
    assert_eq!(same_day.payment_status, PaymentStatus::NonRefundable);

    let mid_stay = settle(UserClass::Renter, TOTAL, -2);
    assert_eq!(mid_stay.refund_amount, Decimal::ZERO);
    assert_eq!(mid_stay.payment_status, PaymentStatus::NonRefundable);
}

#[test]
fn homeowner_cancellation_is_always_exempt() {
    for days in [-3, 0, 2, 5, 10] {
        let settlement = settle(UserClass::Homeowner, Decimal::ZERO, days);
        assert_eq!(settlement.refund_amount, Decimal::ZERO);
        assert_eq!(settlement.cancellation_fee, Decimal::ZERO);
        assert_eq!(settlement.payment_status, PaymentStatus::Exempt);
    }
}

#[test]
fn fractional_totals_settle_exactly() {
    let settlement = settle(UserClass::Renter, dec!(99.90), 4);
    assert_eq!(settlement.refund_amount, dec!(49.950));
    assert_eq!(settlement.cancellation_fee, dec!(49.950));
}

#[test]
fn days_until_check_in_is_whole_day_difference() {
    assert_eq!(days_until_check_in(date(2025, 6, 20), date(2025, 6, 15)), 5);
    assert_eq!(days_until_check_in(date(2025, 6, 20), date(2025, 6, 20)), 0);
    assert_eq!(days_until_check_in(date(2025, 6, 20), date(2025, 6, 22)), -2);
}
