//! Order totals. Every amount is a [`BigDecimal`] carried at two decimal
//! places, rounded half-up at the currency boundary. The business constants
//! are fixed: 5% tax and a flat 5.00 delivery fee waived above 50.00.

use bigdecimal::{BigDecimal, RoundingMode, Zero};

const MONEY_SCALE: i64 = 2;

/// Flat tax rate applied to the subtotal (5%).
pub fn tax_rate() -> BigDecimal {
    BigDecimal::new(5.into(), 2)
}

/// Delivery charge for orders at or below the free-delivery threshold.
pub fn standard_delivery_fee() -> BigDecimal {
    BigDecimal::new(500.into(), 2)
}

/// Orders with a subtotal strictly above this amount ship free.
pub fn free_delivery_threshold() -> BigDecimal {
    BigDecimal::new(5000.into(), 2)
}

/// The four derived monetary fields of an order. Always internally
/// consistent: `total == subtotal + tax + delivery_fee`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
}

/// Price of one line: unit price times quantity, at currency scale.
pub fn line_total(unit_price: &BigDecimal, quantity: i32) -> BigDecimal {
    (unit_price * BigDecimal::from(quantity)).with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

/// Computes subtotal, tax, delivery fee and total from the line totals of an
/// order. Pure and idempotent: the same lines always produce the same
/// amounts, no state accumulates between calls.
pub fn compute_totals<I>(line_totals: I) -> OrderTotals
where
    I: IntoIterator<Item = BigDecimal>,
{
    let subtotal = line_totals
        .into_iter()
        .fold(BigDecimal::zero(), |acc, t| acc + t)
        .with_scale_round(MONEY_SCALE, RoundingMode::HalfUp);

    let tax = (&subtotal * tax_rate()).with_scale_round(MONEY_SCALE, RoundingMode::HalfUp);

    let delivery_fee = if subtotal > free_delivery_threshold() {
        BigDecimal::zero().with_scale(MONEY_SCALE)
    } else {
        standard_delivery_fee()
    };

    let total = (&subtotal + &tax + &delivery_fee).with_scale(MONEY_SCALE);

    OrderTotals {
        subtotal,
        tax,
        delivery_fee,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn line_total_multiplies_at_currency_scale() {
        assert_eq!(line_total(&dec("10.00"), 2), dec("20.00"));
        assert_eq!(line_total(&dec("9.99"), 3), dec("29.97"));
    }

    #[test]
    fn line_total_rounds_half_up() {
        // A third-decimal unit price must not leak sub-cent amounts.
        assert_eq!(line_total(&dec("1.335"), 1), dec("1.34"));
        assert_eq!(line_total(&dec("1.333"), 3), dec("4.00"));
    }

    #[test]
    fn two_line_scenario() {
        // 10.00 x 2 + 5.00 x 1 => 25.00 subtotal, 1.25 tax, 5.00 delivery.
        let totals = compute_totals(vec![dec("20.00"), dec("5.00")]);
        assert_eq!(totals.subtotal, dec("25.00"));
        assert_eq!(totals.tax, dec("1.25"));
        assert_eq!(totals.delivery_fee, dec("5.00"));
        assert_eq!(totals.total, dec("31.25"));
    }

    #[test]
    fn tax_is_exactly_five_percent() {
        let totals = compute_totals(vec![dec("100.00")]);
        assert_eq!(totals.tax, dec("5.00"));
    }

    #[test]
    fn tax_rounds_half_up_at_the_cent() {
        // 10.30 * 0.05 = 0.515 -> 0.52
        let totals = compute_totals(vec![dec("10.30")]);
        assert_eq!(totals.tax, dec("0.52"));
    }

    #[test]
    fn delivery_fee_boundary_at_threshold() {
        let at = compute_totals(vec![dec("50.00")]);
        assert_eq!(at.delivery_fee, dec("5.00"));

        let above = compute_totals(vec![dec("50.01")]);
        assert_eq!(above.delivery_fee, dec("0.00"));
    }

    #[test]
    fn total_is_sum_of_parts() {
        let totals = compute_totals(vec![dec("12.34"), dec("7.66"), dec("41.00")]);
        assert_eq!(
            totals.total,
            &totals.subtotal + &totals.tax + &totals.delivery_fee
        );
    }

    #[test]
    fn recomputation_is_idempotent() {
        let lines = vec![dec("20.00"), dec("5.00")];
        let first = compute_totals(lines.clone());
        let second = compute_totals(lines);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_line_set_yields_base_fee_only() {
        let totals = compute_totals(Vec::new());
        assert_eq!(totals.subtotal, dec("0.00"));
        assert_eq!(totals.tax, dec("0.00"));
        assert_eq!(totals.delivery_fee, dec("5.00"));
        assert_eq!(totals.total, dec("5.00"));
    }
}
