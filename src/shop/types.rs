use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub id: u64,
    pub id_address_invoice: u64,
    pub id_address_delivery: u64,
    #[serde(default)]
    pub products: Vec<CartProduct>,
    #[serde(default)]
    pub cart_rules: Vec<CartRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartProduct {
    pub id_product: u64,
    #[serde(default)]
    pub reference: Option<String>,
    pub name: String,
    pub quantity: u32,
    /// Unit price, tax included.
    pub price_wt: Decimal,
}

impl CartProduct {
    pub fn subtotal(&self) -> Decimal {
        self.price_wt * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartRule {
    pub id: u64,
    pub name: String,
    /// Percentage units: `5` is 5%.
    #[serde(default)]
    pub reduction_percent: Decimal,
    #[serde(default)]
    pub reduction_amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub id: u64,
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    pub postcode: String,
    pub city: String,
    /// Country display name.
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

impl Address {
    /// `address1 - address2 - city - country`, the layout Mercado Pago shows
    /// as street name.
    pub fn street_line(&self) -> String {
        format!(
            "{} - {} - {} - {}",
            self.address1, self.address2, self.city, self.country
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: u64,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    pub email: String,
    pub date_add: DateTime<FixedOffset>,
    pub id_default_group: u64,
    #[serde(default)]
    pub is_logged: bool,
}

impl Customer {
    pub fn has_name(&self) -> bool {
        !(self.firstname.is_empty() && self.lastname.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: u64,
    /// Display name per language id.
    pub name: HashMap<u32, String>,
}

impl Group {
    pub fn name_in(&self, id_lang: u32) -> Option<&str> {
        self.name.get(&id_lang).map(String::as_str)
    }
}

/// Everything the storefront knows about the shopper for one request.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    pub cart: Cart,
    pub customer: Option<Customer>,
    pub id_lang: u32,
}

impl CheckoutContext {
    pub fn new(cart: Cart, customer: Option<Customer>, id_lang: u32) -> Self {
        Self {
            cart,
            customer,
            id_lang,
        }
    }

    pub fn logged_customer(&self) -> Option<&Customer> {
        self.customer.as_ref().filter(|c| c.is_logged)
    }
}
