//! End-to-end checks of the pricing rules as consumed by the storefront:
//! the discount ladder, progress messaging, and EMI plans.

use rust_decimal::Decimal;

use renewly_core::pricing::{
    self, EmiTenure, discount_amount_for, discount_percent_for, next_tier_info,
};

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

// =============================================================================
// Discount ladder
// =============================================================================

#[test]
fn test_ladder_percentages() {
    assert_eq!(discount_percent_for(2), Decimal::ZERO);
    assert_eq!(discount_percent_for(3), dec(5));
    assert_eq!(discount_percent_for(5), Decimal::new(75, 1));
    assert_eq!(discount_percent_for(10), dec(10));
    assert_eq!(discount_percent_for(100), dec(10));
}

#[test]
fn test_percent_never_decreases_with_quantity() {
    let mut previous = Decimal::ZERO;
    for quantity in 0..=120 {
        let percent = discount_percent_for(quantity);
        assert!(
            percent >= previous,
            "percent dropped from {previous} to {percent} at quantity {quantity}"
        );
        previous = percent;
    }
}

#[test]
fn test_discount_amount_bounded_by_subtotal() {
    let subtotals = [dec(0), dec(1), dec(999), dec(42_999), dec(10_00_000)];
    let quantities = [0u32, 1, 3, 5, 10, 50];
    for subtotal in subtotals {
        for quantity in quantities {
            let discount = discount_amount_for(subtotal, quantity);
            assert!(discount.amount >= Decimal::ZERO);
            assert!(
                discount.amount <= subtotal,
                "discount {} exceeded subtotal {subtotal} at qty {quantity}",
                discount.amount
            );
        }
    }
}

#[test]
fn test_next_tier_messaging_counts_down() {
    // Two units short of the first tier
    let next = next_tier_info(1).expect("below top tier");
    assert_eq!((next.quantity_needed, next.percent), (2, dec(5)));

    // One unit from the 7.5% tier
    let next = next_tier_info(4).expect("below top tier");
    assert_eq!((next.quantity_needed, next.percent), (1, Decimal::new(75, 1)));

    // Top tier reached: no further messaging
    assert!(next_tier_info(10).is_none());
}

// =============================================================================
// EMI plans
// =============================================================================

#[test]
fn test_emi_plan_for_a_midrange_laptop() {
    // 20000 over 6 months at the standard 13% rate
    let quote = pricing::monthly_installment(dec(20_000), 6, dec(13)).expect("valid inputs");

    // monthly = P*r*(1+r)^n / ((1+r)^n - 1), r = 13/12/100
    assert!(quote.monthly > dec(3_400) && quote.monthly < dec(3_500));
    assert_eq!(quote.total_payable, dec(20_000) + quote.total_interest);

    // The schedule is the rounded installment repeated n times, exactly.
    assert_eq!(quote.total_payable, quote.monthly * dec(6));
}

#[test]
fn test_emi_rate_table_drives_tenure_plans() {
    let principal = dec(42_999);
    let mut last_total = Decimal::ZERO;
    for tenure in EmiTenure::ALL {
        let quote = pricing::installment_for_tenure(principal, tenure).expect("valid inputs");
        // Longer tenures at higher rates always cost more in total
        assert!(quote.total_payable > last_total);
        last_total = quote.total_payable;
    }
}

#[test]
fn test_emi_eligibility_uses_order_value() {
    assert!(!pricing::emi_eligible(dec(14_999)));
    assert!(pricing::emi_eligible(*pricing::EMI_MIN_PRINCIPAL));
}

#[test]
fn test_emi_rejects_bad_preconditions() {
    assert!(pricing::monthly_installment(dec(0), 6, dec(13)).is_err());
    assert!(pricing::monthly_installment(dec(20_000), 0, dec(13)).is_err());
    assert!(pricing::monthly_installment(dec(20_000), 6, dec(-2)).is_err());
}
