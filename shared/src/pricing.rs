//! Price derivation between markup and sale price
//!
//! Markup and sale price are two views of the same value over the row's final
//! cost (`cost + additional cost`). Editing one re-derives the other.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::LaunchRow;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to cents, half away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn final_cost(cost: Decimal, additional_cost: Decimal) -> Decimal {
    cost.saturating_add(additional_cost)
}

/// `finalCost * (1 + markup/100)`, only defined for a positive final cost.
/// `None` as well when the result does not fit in a `Decimal`.
pub fn sale_price_from_markup(final_cost: Decimal, markup: Decimal) -> Option<Decimal> {
    if final_cost <= Decimal::ZERO {
        return None;
    }
    let factor = Decimal::ONE.checked_add(markup.checked_div(HUNDRED)?)?;
    final_cost.checked_mul(factor).map(round2)
}

/// `(salePrice / finalCost - 1) * 100`, defined when both are positive and
/// the result fits in a `Decimal`
pub fn markup_from_sale_price(final_cost: Decimal, sale_price: Decimal) -> Option<Decimal> {
    if final_cost <= Decimal::ZERO || sale_price <= Decimal::ZERO {
        return None;
    }
    sale_price
        .checked_div(final_cost)?
        .checked_sub(Decimal::ONE)?
        .checked_mul(HUNDRED)
        .map(round2)
}

impl LaunchRow {
    pub fn final_cost(&self) -> Decimal {
        final_cost(self.cost, self.additional_cost)
    }

    /// Set the markup and re-derive the sale price when the cost allows it
    pub fn set_markup(&mut self, markup: Option<Decimal>) {
        self.markup = markup;
        if let Some(price) = markup.and_then(|m| sale_price_from_markup(self.final_cost(), m)) {
            self.sale_price = Some(price);
        }
        self.refresh_sale_price_flag();
    }

    /// Set the sale price and re-derive the markup; the markup is cleared
    /// when it cannot be computed
    pub fn set_sale_price(&mut self, sale_price: Option<Decimal>) {
        self.sale_price = sale_price;
        self.markup = sale_price.and_then(|price| markup_from_sale_price(self.final_cost(), price));
        self.refresh_sale_price_flag();
    }

    pub fn set_cost(&mut self, cost: Decimal) {
        self.cost = cost;
        self.rederive_after_cost_change();
    }

    pub fn set_additional_cost(&mut self, additional_cost: Decimal) {
        self.additional_cost = additional_cost;
        self.rederive_after_cost_change();
    }

    // Markup drives the price when present; otherwise the price is kept and
    // the markup follows it.
    fn rederive_after_cost_change(&mut self) {
        match self.markup {
            Some(markup) if self.final_cost() > Decimal::ZERO => {
                self.sale_price = sale_price_from_markup(self.final_cost(), markup);
            }
            _ => {
                self.markup = self
                    .sale_price
                    .and_then(|price| markup_from_sale_price(self.final_cost(), price));
            }
        }
        self.refresh_sale_price_flag();
    }

    // Edit time only clears the marker; setting it is the submitter's job.
    fn refresh_sale_price_flag(&mut self) {
        if self.flags.sale_price && self.has_sale_price() {
            self.flags.sale_price = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(cost: &str, additional: &str) -> LaunchRow {
        LaunchRow {
            cost: dec(cost),
            additional_cost: dec(additional),
            quantity: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_markup_sets_sale_price() {
        let mut r = row("100", "0");
        r.set_markup(Some(dec("25")));
        assert_eq!(r.sale_price, Some(dec("125.00")));
    }

    #[test]
    fn test_sale_price_sets_markup() {
        let mut r = row("100", "0");
        r.set_sale_price(Some(dec("150")));
        assert_eq!(r.markup, Some(dec("50.00")));
    }

    #[test]
    fn test_additional_cost_is_part_of_final_cost() {
        let mut r = row("90", "10");
        r.set_markup(Some(dec("10")));
        assert_eq!(r.sale_price, Some(dec("110.00")));
    }

    #[test]
    fn test_markup_without_cost_leaves_price() {
        let mut r = row("0", "0");
        r.sale_price = Some(dec("80"));
        r.set_markup(Some(dec("30")));
        assert_eq!(r.markup, Some(dec("30")));
        assert_eq!(r.sale_price, Some(dec("80")));
    }

    #[test]
    fn test_zero_sale_price_clears_markup() {
        let mut r = row("100", "0");
        r.set_markup(Some(dec("20")));
        r.set_sale_price(Some(Decimal::ZERO));
        assert_eq!(r.markup, None);
        r.set_sale_price(None);
        assert_eq!(r.markup, None);
    }

    #[test]
    fn test_rounding_to_cents() {
        assert_eq!(sale_price_from_markup(dec("33.33"), dec("33.333")), Some(dec("44.44")));
        assert_eq!(markup_from_sale_price(dec("3"), dec("4")), Some(dec("33.33")));
        assert_eq!(round2(dec("1.005")), dec("1.01"));
    }

    #[test]
    fn test_out_of_range_values_are_not_derived() {
        assert_eq!(
            markup_from_sale_price(dec("0.0000000001"), dec("100000000000000000000")),
            None
        );
        assert_eq!(sale_price_from_markup(Decimal::MAX, dec("100")), None);
        assert_eq!(sale_price_from_markup(dec("1000"), Decimal::MAX), None);

        let mut r = row("0.0000000001", "0");
        r.set_sale_price(Some(dec("100000000000000000000")));
        assert_eq!(r.sale_price, Some(dec("100000000000000000000")));
        assert_eq!(r.markup, None);

        let mut r = row("1000", "0");
        r.set_markup(Some(Decimal::MAX));
        assert_eq!(r.markup, Some(Decimal::MAX));
        assert_eq!(r.sale_price, None);
    }

    #[test]
    fn test_cost_change_follows_markup() {
        let mut r = row("100", "0");
        r.set_markup(Some(dec("50")));
        r.set_cost(dec("200"));
        assert_eq!(r.sale_price, Some(dec("300.00")));
    }

    #[test]
    fn test_cost_change_without_markup_rederives_markup() {
        let mut r = row("0", "0");
        r.set_sale_price(Some(dec("120")));
        assert_eq!(r.markup, None);
        r.set_cost(dec("100"));
        assert_eq!(r.sale_price, Some(dec("120")));
        assert_eq!(r.markup, Some(dec("20.00")));
    }

    #[test]
    fn test_valid_price_clears_flag() {
        let mut r = row("100", "0");
        r.flags.sale_price = true;
        r.set_sale_price(Some(Decimal::ZERO));
        assert!(r.flags.sale_price);
        r.set_sale_price(Some(dec("130")));
        assert!(!r.flags.sale_price);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_derivation_never_panics(
            cost in any::<i64>(),
            cost_scale in 0u32..=28,
            value in any::<i64>(),
            value_scale in 0u32..=28,
        ) {
            let cost = Decimal::new(cost, cost_scale);
            let value = Decimal::new(value, value_scale);
            let _ = sale_price_from_markup(cost, value);
            let _ = markup_from_sale_price(cost, value);

            let mut r = row("0", "0");
            r.set_cost(cost);
            r.set_markup(Some(value));
            r.set_sale_price(Some(value));
            r.set_additional_cost(value);
        }
    }
}
