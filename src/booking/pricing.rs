use rust_decimal::{dec, Decimal};
use serde::{Deserialize, Serialize};

use super::domain::{StayRange, UserClass};

/// Night count that triggers the long-stay discount for renters.
pub const LONG_STAY_NIGHTS: i64 = 30;

/// Cost breakdown for a candidate stay. Values are exact decimals; rounding
/// to two places happens only at display and persistence boundaries via
/// [`Quote::rounded`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub nights: i64,
    pub base_total: Decimal,
    pub discount: Decimal,
    pub final_total: Decimal,
}

impl Quote {
    /// Zero-cost quote used when the service routes a homeowner stay, which
    /// is complimentary regardless of length.
    pub fn complimentary(nights: i64) -> Self {
        Self {
            nights,
            base_total: Decimal::ZERO,
            discount: Decimal::ZERO,
            final_total: Decimal::ZERO,
        }
    }

    /// Two-place rounding for wire and storage representations.
    pub fn rounded(&self) -> Self {
        Self {
            nights: self.nights,
            base_total: self.base_total.round_dp(2),
            discount: self.discount.round_dp(2),
            final_total: self.final_total.round_dp(2),
        }
    }

    pub fn has_discount(&self) -> bool {
        self.discount > Decimal::ZERO
    }
}

/// Price a renter stay. `base_total = nights * rate`; a renter booking exactly
/// thirty nights earns a 40% discount, any other night count earns none.
///
/// Homeowner zero-charging is caller routing, not a pricing rule, so this
/// calculator stays pure for renters.
pub fn quote(range: &StayRange, nightly_rate: Decimal, user_class: UserClass) -> Quote {
    let nights = range.nights();
    let base_total = Decimal::from(nights) * nightly_rate;

    let discount = if user_class == UserClass::Renter && nights == LONG_STAY_NIGHTS {
        base_total * dec!(0.40)
    } else {
        Decimal::ZERO
    };

    Quote {
        nights,
        base_total,
        discount,
        final_total: base_total - discount,
    }
}
