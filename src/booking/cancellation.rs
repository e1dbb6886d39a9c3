use chrono::NaiveDate;
use rust_decimal::{dec, Decimal};
use serde::{Deserialize, Serialize};

use super::domain::{PaymentStatus, UserClass};

/// Outcome of running a cancellation through the refund schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub refund_amount: Decimal,
    pub cancellation_fee: Decimal,
    pub payment_status: PaymentStatus,
}

/// Whole days between the cancellation date and check-in. Negative when the
/// stay has already begun.
pub fn days_until_check_in(check_in: NaiveDate, cancelled_on: NaiveDate) -> i64 {
    (check_in - cancelled_on).num_days()
}

/// Tiered refund schedule.
///
/// Homeowners were never charged, so cancellation is always free and the
/// payment record moves to `exempt`. Renters refund on a sliding scale:
/// seven or more days out is a full refund, three to six days is half, one to
/// two days is a quarter, and same-day (or later) forfeits the total.
pub fn settle(user_class: UserClass, total_cost: Decimal, days_until: i64) -> Settlement {
    if user_class == UserClass::Homeowner {
        return Settlement {
            refund_amount: Decimal::ZERO,
            cancellation_fee: Decimal::ZERO,
            payment_status: PaymentStatus::Exempt,
        };
    }

    let refund_fraction = match days_until {
        d if d >= 7 => dec!(1.00),
        3..=6 => dec!(0.50),
        1..=2 => dec!(0.25),
        _ => Decimal::ZERO,
    };

    let refund_amount = total_cost * refund_fraction;
    let cancellation_fee = total_cost - refund_amount;

    let payment_status = if refund_amount == total_cost {
        PaymentStatus::Refunded
    } else if refund_amount > Decimal::ZERO {
        PaymentStatus::PartiallyRefunded
    } else {
        PaymentStatus::NonRefundable
    };

    Settlement {
        refund_amount,
        cancellation_fee,
        payment_status,
    }
}
