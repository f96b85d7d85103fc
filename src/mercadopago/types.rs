use serde::{Deserialize, Serialize};

/// Entry of `GET /v1/payment_methods`. Only the fields the checkout reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentMethodInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub payment_type_id: String,
    #[serde(default)]
    pub status: String,
}

impl PaymentMethodInfo {
    /// `MERCADOPAGO_PAYMENT_<ID>`, the settings row that toggles this method.
    pub fn settings_key(&self) -> String {
        format!("MERCADOPAGO_PAYMENT_{}", self.id.to_uppercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub id: String,
    #[serde(default)]
    pub init_point: Option<String>,
    #[serde(default)]
    pub sandbox_init_point: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_key_is_uppercased() {
        let method = PaymentMethodInfo {
            id: "debvisa".to_string(),
            name: "Visa Débito".to_string(),
            payment_type_id: "debit_card".to_string(),
            status: "active".to_string(),
        };
        assert_eq!(method.settings_key(), "MERCADOPAGO_PAYMENT_DEBVISA");
    }

    #[test]
    fn payment_method_deserializes_with_extra_fields() {
        let parsed: PaymentMethodInfo = serde_json::from_value(serde_json::json!({
            "id": "visa",
            "name": "Visa",
            "payment_type_id": "credit_card",
            "status": "active",
            "secure_thumbnail": "https://example.com/visa.gif",
            "min_allowed_amount": 0.5
        }))
        .expect("deserialization should succeed");
        assert_eq!(parsed.payment_type_id, "credit_card");
    }
}
