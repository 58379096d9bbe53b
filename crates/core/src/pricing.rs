//! Pricing rules: bulk discount tiers and EMI amortization.
//!
//! This module is the single source of truth for discount math. The cart
//! summary, the product-detail EMI figures, and the bulk-quote invoice all
//! derive their numbers from here, so the three surfaces cannot drift apart.
//!
//! Everything is a pure function over decimals; no state, no I/O.

use std::sync::LazyLock;

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A quantity range mapped to a fixed discount percentage.
///
/// Tiers are contiguous and non-overlapping: exactly one tier (or none,
/// below the lowest minimum) applies to any quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Lowest quantity (inclusive) at which this tier applies.
    pub min_quantity: u32,
    /// Highest quantity (inclusive); `None` means unbounded.
    pub max_quantity: Option<u32>,
    /// Discount percentage for quantities in this tier.
    pub percent_off: Decimal,
}

impl PriceTier {
    /// Whether `quantity` falls inside this tier's range.
    #[must_use]
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min_quantity && self.max_quantity.is_none_or(|max| quantity <= max)
    }
}

/// Default bulk discount ladder: 3-4 units 5%, 5-9 units 7.5%, 10+ units 10%.
pub static BULK_TIERS: LazyLock<[PriceTier; 3]> = LazyLock::new(|| {
    [
        PriceTier {
            min_quantity: 3,
            max_quantity: Some(4),
            percent_off: Decimal::new(5, 0),
        },
        PriceTier {
            min_quantity: 5,
            max_quantity: Some(9),
            percent_off: Decimal::new(75, 1),
        },
        PriceTier {
            min_quantity: 10,
            max_quantity: None,
            percent_off: Decimal::new(10, 0),
        },
    ]
});

/// Discount percentage for an aggregate quantity.
///
/// Returns zero below the lowest tier minimum. Any quantity, including 0,
/// is valid input.
#[must_use]
pub fn discount_percent_for(quantity: u32) -> Decimal {
    BULK_TIERS
        .iter()
        .find(|tier| tier.contains(quantity))
        .map_or(Decimal::ZERO, |tier| tier.percent_off)
}

/// A computed bulk discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDiscount {
    /// Applied percentage.
    pub percent: Decimal,
    /// Discount amount, rounded half-up to the nearest whole rupee.
    pub amount: Decimal,
}

/// Discount percentage and amount for a subtotal at an aggregate quantity.
///
/// The amount is rounded half-up to the nearest whole currency unit and is
/// clamped so it never exceeds the subtotal.
#[must_use]
pub fn discount_amount_for(subtotal: Decimal, quantity: u32) -> BulkDiscount {
    let percent = discount_percent_for(quantity);
    let amount = (subtotal * percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .min(subtotal);
    BulkDiscount { percent, amount }
}

/// Progress toward the next discount tier, for cart/quote messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTier {
    /// Additional units needed to reach the next tier.
    pub quantity_needed: u32,
    /// Percentage unlocked at the next tier.
    pub percent: Decimal,
}

/// How many more units unlock the next discount percentage.
///
/// Returns `None` once the top tier is reached.
#[must_use]
pub fn next_tier_info(quantity: u32) -> Option<NextTier> {
    BULK_TIERS
        .iter()
        .find(|tier| tier.min_quantity > quantity)
        .map(|tier| NextTier {
            quantity_needed: tier.min_quantity - quantity,
            percent: tier.percent_off,
        })
}

/// EMI tenures offered on product pages, with their standard annual rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmiTenure {
    Months3,
    Months6,
    Months9,
    Months12,
}

impl EmiTenure {
    /// All offered tenures, shortest first.
    pub const ALL: [Self; 4] = [Self::Months3, Self::Months6, Self::Months9, Self::Months12];

    /// Tenure length in months.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Months3 => 3,
            Self::Months6 => 6,
            Self::Months9 => 9,
            Self::Months12 => 12,
        }
    }

    /// Standard annual interest rate for this tenure, in percent.
    #[must_use]
    pub const fn annual_rate_percent(self) -> u32 {
        match self {
            Self::Months3 => 12,
            Self::Months6 => 13,
            Self::Months9 => 14,
            Self::Months12 => 15,
        }
    }
}

/// Minimum order value for EMI eligibility, in rupees.
pub static EMI_MIN_PRINCIPAL: LazyLock<Decimal> = LazyLock::new(|| Decimal::new(15_000, 0));

/// Whether an order value qualifies for EMI.
#[must_use]
pub fn emi_eligible(principal: Decimal) -> bool {
    principal >= *EMI_MIN_PRINCIPAL
}

/// A computed EMI schedule summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmiQuote {
    /// Fixed monthly installment, rounded to paise.
    pub monthly: Decimal,
    /// Total interest paid over the tenure.
    pub total_interest: Decimal,
    /// Principal plus total interest.
    pub total_payable: Decimal,
}

/// Errors from precondition violations in pricing computations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PricingError {
    /// EMI principal must be positive.
    #[error("EMI principal must be positive, got {0}")]
    NonPositivePrincipal(Decimal),
    /// EMI tenure must be at least one month.
    #[error("EMI tenure must be at least one month")]
    ZeroTenure,
    /// Interest rates below zero are not a thing we finance.
    #[error("annual rate must not be negative, got {0}")]
    NegativeRate(Decimal),
}

/// Reducing-balance EMI: `monthly = P*r*(1+r)^n / ((1+r)^n - 1)` with
/// `r = annual_rate_percent / 12 / 100` and `n = tenure_months`.
///
/// A zero rate degenerates to straight division `P / n`.
///
/// # Errors
///
/// Returns [`PricingError`] for non-positive principal, zero tenure, or a
/// negative rate.
pub fn monthly_installment(
    principal: Decimal,
    tenure_months: u32,
    annual_rate_percent: Decimal,
) -> Result<EmiQuote, PricingError> {
    if principal <= Decimal::ZERO {
        return Err(PricingError::NonPositivePrincipal(principal));
    }
    if tenure_months == 0 {
        return Err(PricingError::ZeroTenure);
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(PricingError::NegativeRate(annual_rate_percent));
    }

    let p = principal.to_f64().unwrap_or_default();
    let n = f64::from(tenure_months);
    let r = annual_rate_percent.to_f64().unwrap_or_default() / 12.0 / 100.0;

    let raw_monthly = if r == 0.0 {
        p / n
    } else {
        let growth = (1.0 + r).powf(n);
        p * r * growth / (growth - 1.0)
    };

    // The installment is what gets charged, so the schedule is derived from
    // the rounded installment, not the other way around.
    let monthly = Decimal::from_f64(raw_monthly)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let total_payable = monthly * Decimal::from(tenure_months);
    Ok(EmiQuote {
        monthly,
        total_interest: total_payable - principal,
        total_payable,
    })
}

/// EMI summary for a tenure from the standard rate table.
///
/// # Errors
///
/// Returns [`PricingError`] for a non-positive principal.
pub fn installment_for_tenure(
    principal: Decimal,
    tenure: EmiTenure,
) -> Result<EmiQuote, PricingError> {
    monthly_installment(
        principal,
        tenure.months(),
        Decimal::from(tenure.annual_rate_percent()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(discount_percent_for(0), Decimal::ZERO);
        assert_eq!(discount_percent_for(2), Decimal::ZERO);
        assert_eq!(discount_percent_for(3), dec(5));
        assert_eq!(discount_percent_for(4), dec(5));
        assert_eq!(discount_percent_for(5), Decimal::new(75, 1));
        assert_eq!(discount_percent_for(9), Decimal::new(75, 1));
        assert_eq!(discount_percent_for(10), dec(10));
        assert_eq!(discount_percent_for(100), dec(10));
    }

    #[test]
    fn test_percent_is_monotonic_in_quantity() {
        let mut last = Decimal::ZERO;
        for quantity in 0..50 {
            let percent = discount_percent_for(quantity);
            assert!(percent >= last, "tier percent dropped at qty {quantity}");
            last = percent;
        }
    }

    #[test]
    fn test_discount_amount_rounds_half_up() {
        // 5% of 12345 = 617.25 -> 617
        let d = discount_amount_for(dec(12_345), 3);
        assert_eq!(d.amount, dec(617));
        // 7.5% of 10010 = 750.75 -> 751
        let d = discount_amount_for(dec(10_010), 5);
        assert_eq!(d.amount, dec(751));
        // half-up at exactly .5: 5% of 12350 = 617.5 -> 618
        let d = discount_amount_for(dec(12_350), 4);
        assert_eq!(d.amount, dec(618));
    }

    #[test]
    fn test_discount_amount_never_exceeds_subtotal() {
        for (subtotal, quantity) in [(dec(0), 0), (dec(1), 10), (dec(5), 100), (dec(99_999), 7)] {
            let d = discount_amount_for(subtotal, quantity);
            assert!(d.amount >= Decimal::ZERO);
            assert!(d.amount <= subtotal);
        }
    }

    #[test]
    fn test_next_tier_progress() {
        let next = next_tier_info(1).unwrap();
        assert_eq!(next.quantity_needed, 2);
        assert_eq!(next.percent, dec(5));

        let next = next_tier_info(4).unwrap();
        assert_eq!(next.quantity_needed, 1);
        assert_eq!(next.percent, Decimal::new(75, 1));

        let next = next_tier_info(7).unwrap();
        assert_eq!(next.quantity_needed, 3);
        assert_eq!(next.percent, dec(10));

        assert!(next_tier_info(10).is_none());
        assert!(next_tier_info(25).is_none());
    }

    #[test]
    fn test_emi_reducing_balance() {
        // 20000 over 6 months at 13% annual: r = 13/12/100
        let quote = monthly_installment(dec(20_000), 6, dec(13)).unwrap();
        assert!(quote.monthly > dec(3_460) && quote.monthly < dec(3_462));
        assert_eq!(
            quote.total_payable,
            quote.total_interest + dec(20_000),
            "payable must equal principal plus interest"
        );
        assert_eq!(quote.total_payable, quote.monthly * dec(6));
    }

    #[test]
    fn test_emi_zero_rate_is_straight_division() {
        let quote = monthly_installment(dec(12_000), 6, Decimal::ZERO).unwrap();
        assert_eq!(quote.monthly, dec(2_000));
        assert_eq!(quote.total_interest, Decimal::ZERO);
        assert_eq!(quote.total_payable, dec(12_000));
    }

    #[test]
    fn test_emi_preconditions() {
        assert_eq!(
            monthly_installment(Decimal::ZERO, 6, dec(13)),
            Err(PricingError::NonPositivePrincipal(Decimal::ZERO))
        );
        assert_eq!(
            monthly_installment(dec(-5), 6, dec(13)),
            Err(PricingError::NonPositivePrincipal(dec(-5)))
        );
        assert_eq!(
            monthly_installment(dec(20_000), 0, dec(13)),
            Err(PricingError::ZeroTenure)
        );
        assert_eq!(
            monthly_installment(dec(20_000), 6, dec(-1)),
            Err(PricingError::NegativeRate(dec(-1)))
        );
    }

    #[test]
    fn test_emi_rate_table() {
        assert_eq!(EmiTenure::Months3.annual_rate_percent(), 12);
        assert_eq!(EmiTenure::Months6.annual_rate_percent(), 13);
        assert_eq!(EmiTenure::Months9.annual_rate_percent(), 14);
        assert_eq!(EmiTenure::Months12.annual_rate_percent(), 15);
    }

    #[test]
    fn test_emi_eligibility_threshold() {
        assert!(!emi_eligible(dec(14_999)));
        assert!(emi_eligible(dec(15_000)));
        assert!(emi_eligible(dec(42_999)));
    }
}
