//! Price-list ("lista N") business rules for card payments.
//!
//! Customers in list 1 may pay by credit card unless a cart rule gives them
//! more than [`MAX_DISCOUNT_FOR_CREDIT_CARD`] percent off. Lists 2 and up never
//! pay by credit card. Guests and customers outside any list are unrestricted.

use crate::preference::settings::parse_leading_int;
use crate::preference::types::{IdRef, CREDIT_CARD_TYPE};
use crate::shop::{Cart, Group};
use rust_decimal::Decimal;

pub const MAX_DISCOUNT_FOR_CREDIT_CARD: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

const LIST_MARKER: &str = "lista";
const LIST_PREFIX: &str = "lista ";

/// Price list encoded in a group display name, `0` when the name carries none.
pub fn tier_from_group_name(name: &str) -> i64 {
    let name = name.trim().to_lowercase();
    if !name.contains(LIST_MARKER) {
        return 0;
    }
    parse_leading_int(&name.replace(LIST_PREFIX, ""))
}

pub fn tier_from_group(group: &Group, id_lang: u32) -> i64 {
    group.name_in(id_lang).map(tier_from_group_name).unwrap_or(0)
}

/// True when any rule's percentage reduction is strictly above `threshold`.
pub fn cart_has_discount_more_than(cart: &Cart, threshold: Decimal) -> bool {
    cart.cart_rules
        .iter()
        .any(|rule| rule.reduction_percent > threshold)
}

pub fn excluded_payment_types(tier: i64, cart: &Cart) -> Vec<IdRef> {
    let over_limit =
        tier == 1 && cart_has_discount_more_than(cart, MAX_DISCOUNT_FOR_CREDIT_CARD);
    if over_limit || tier >= 2 {
        return vec![IdRef::new(CREDIT_CARD_TYPE)];
    }
    Vec::new()
}
