//! Wire shapes of the Mercado Pago "create preference" request. Field names
//! are fixed by the API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DISCOUNT_ITEM_ID: &str = "discount";
pub const DIFFERENCE_ITEM_ID: &str = "difference";
pub const QR_PAYMENT_METHOD: &str = "wallet_qr";
pub const ACCOUNT_MONEY_METHOD: &str = "account_money";
pub const CREDIT_CARD_TYPE: &str = "credit_card";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub category_id: Option<String>,
    pub description: String,
}

impl PreferenceItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// `{"id": ...}` entries used by the exclusion lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRef {
    pub id: String,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Phone,
    pub identification: Identification,
    pub address: PayerAddress,
    pub date_created: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Phone {
    pub area_code: String,
    pub number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Identification {
    #[serde(rename = "type")]
    pub kind: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayerAddress {
    pub zip_code: String,
    pub street_name: String,
    pub street_number: String,
    pub city: String,
    pub federal_unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub receiver_address: ReceiverAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiverAddress {
    pub zip_code: String,
    pub street_name: String,
    pub street_number: String,
    pub apartment: String,
    pub floor: String,
    pub city_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackUrlStatus {
    Success,
    Failure,
    Pending,
}

impl BackUrlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackUrlStatus::Success => "success",
            BackUrlStatus::Failure => "failure",
            BackUrlStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentOptions {
    pub installments: i64,
    pub excluded_payment_types: Vec<IdRef>,
    pub excluded_payment_methods: Vec<IdRef>,
}

impl PaymentOptions {
    pub fn excludes_method(&self, id: &str) -> bool {
        self.excluded_payment_methods.iter().any(|m| m.id == id)
    }

    pub fn excludes_type(&self, id: &str) -> bool {
        self.excluded_payment_types.iter().any(|t| t.id == id)
    }
}

/// The keys this crate contributes on top of the base preference.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceFields {
    pub items: Vec<PreferenceItem>,
    pub payer: Option<Payer>,
    pub shipments: Shipment,
    pub back_urls: BackUrls,
    pub payment_methods: PaymentOptions,
    pub auto_return: Option<String>,
    pub binary_mode: bool,
    pub expires: bool,
    pub expiration_date_to: Option<String>,
}
