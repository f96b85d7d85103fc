use crate::preference::error::{PreferenceError, PreferenceResult};
use crate::shop::Cart;
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedTotal {
    pub discount: Decimal,
    pub amount_with_round: Decimal,
}

pub trait TotalsCalculator: Send + Sync {
    fn corrected_total(&self, cart: &Cart) -> PreferenceResult<CorrectedTotal>;
}

/// Totals straight from the cart lines and rules, rounded to cents.
#[derive(Debug, Clone, Default)]
pub struct CartTotals;

impl TotalsCalculator for CartTotals {
    fn corrected_total(&self, cart: &Cart) -> PreferenceResult<CorrectedTotal> {
        if let Some(rule) = cart.cart_rules.iter().find(|r| {
            r.reduction_percent < Decimal::ZERO
                || r.reduction_percent > Decimal::ONE_HUNDRED
                || r.reduction_amount < Decimal::ZERO
        }) {
            return Err(PreferenceError::Totals {
                message: format!("cart {} rule {} has an invalid reduction", cart.id, rule.id),
            });
        }
        let products: Decimal = cart.products.iter().map(|p| p.subtotal()).sum();
        let discount: Decimal = cart
            .cart_rules
            .iter()
            .map(|rule| {
                rule.reduction_amount + products * rule.reduction_percent / Decimal::ONE_HUNDRED
            })
            .sum::<Decimal>()
            .min(products);
        let discount = round_cents(discount);

        Ok(CorrectedTotal {
            discount,
            amount_with_round: round_cents(products - discount),
        })
    }
}

pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::{CartProduct, CartRule};
    use rust_decimal_macros::dec;

    fn cart(rules: Vec<CartRule>) -> Cart {
        Cart {
            id: 1,
            id_address_invoice: 1,
            id_address_delivery: 1,
            products: vec![CartProduct {
                id_product: 10,
                reference: None,
                name: "Yerba".to_string(),
                quantity: 3,
                price_wt: dec!(33.33),
            }],
            cart_rules: rules,
        }
    }

    #[test]
    fn no_rules_means_no_discount() {
        let total = CartTotals
            .corrected_total(&cart(vec![]))
            .expect("totals");
        assert_eq!(total.discount, dec!(0));
        assert_eq!(total.amount_with_round, dec!(99.99));
    }

    #[test]
    fn percent_and_amount_rules_are_combined() {
        let rules = vec![
            CartRule {
                id: 1,
                name: "Lista 1".to_string(),
                reduction_percent: dec!(10),
                reduction_amount: dec!(0),
            },
            CartRule {
                id: 2,
                name: "Cupón".to_string(),
                reduction_percent: dec!(0),
                reduction_amount: dec!(5),
            },
        ];
        let total = CartTotals
            .corrected_total(&cart(rules))
            .expect("totals");
        assert_eq!(total.discount, dec!(15.00));
        assert_eq!(total.amount_with_round, dec!(84.99));
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let mut empty = cart(vec![]);
        empty.products.clear();
        let total = CartTotals.corrected_total(&empty).expect("totals");
        assert_eq!(total.discount, Decimal::ZERO);
        assert_eq!(total.amount_with_round, Decimal::ZERO);
    }

    #[test]
    fn out_of_range_rule_is_rejected() {
        let rules = vec![CartRule {
            id: 3,
            name: "Roto".to_string(),
            reduction_percent: dec!(120),
            reduction_amount: dec!(0),
        }];
        assert!(matches!(
            CartTotals.corrected_total(&cart(rules)),
            Err(PreferenceError::Totals { .. })
        ));
    }
}
