//! Typed snapshot of the module settings rows.

use crate::preference::error::{PreferenceError, PreferenceResult};
use crate::shop::ConfigurationStore;

pub const INSTALLMENTS: &str = "MERCADOPAGO_INSTALLMENTS";
pub const AUTO_RETURN: &str = "MERCADOPAGO_AUTO_RETURN";
pub const BINARY_MODE: &str = "MERCADOPAGO_STANDARD_BINARY_MODE";
pub const EXPIRATION: &str = "MERCADOPAGO_EXPIRATION";
pub const EXPIRATION_DATE_TO: &str = "MERCADOPAGO_EXPIRATION_DATE_TO";
pub const STORE_CATEGORY: &str = "MERCADOPAGO_STORE_CATEGORY";
pub const INVOICE_NAME: &str = "MERCADOPAGO_INVOICE_NAME";
pub const PAYMENT_ACCOUNT_MONEY: &str = "MERCADOPAGO_PAYMENT_ACCOUNT_MONEY";

pub const FLAG_ON: &str = "on";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceSettings {
    pub installments: i64,
    pub auto_return: bool,
    pub binary_mode: bool,
    /// Hours until the preference expires. `None` when the row is blank.
    pub expiration_hours: Option<i64>,
}

impl PreferenceSettings {
    pub fn load(store: &dyn ConfigurationStore) -> PreferenceResult<Self> {
        let expiration_hours = match store.get(EXPIRATION_DATE_TO) {
            Some(raw) if !raw.trim().is_empty() => {
                if !raw.trim().starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(PreferenceError::InvalidSetting {
                        key: EXPIRATION_DATE_TO.to_string(),
                        value: raw,
                    });
                }
                Some(parse_leading_int(&raw))
            }
            _ => None,
        };

        Ok(Self {
            installments: store
                .get(INSTALLMENTS)
                .map(|v| parse_leading_int(&v))
                .unwrap_or(0),
            auto_return: is_one(store.get(AUTO_RETURN).as_deref()),
            binary_mode: is_one(store.get(BINARY_MODE).as_deref()),
            expiration_hours,
        })
    }
}

/// Integer value of the leading digits, `0` when there are none. Mirrors how
/// the storefront casts numeric settings and group names.
pub fn parse_leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let value = digits
        .chars()
        .take_while(char::is_ascii_digit)
        .fold(0_i64, |acc, c| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(c as u8 - b'0'))
        });
    if negative {
        -value
    } else {
        value
    }
}

fn is_one(raw: Option<&str>) -> bool {
    raw.map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .is_some_and(|v| v == 1.0)
}
