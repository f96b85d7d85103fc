use crate::mercadopago::error::MercadoPagoResult;
use crate::mercadopago::types::PaymentMethodInfo;
use async_trait::async_trait;

/// Where the checkout learns which payment methods exist for the account.
#[async_trait]
pub trait PaymentMethodSource: Send + Sync {
    async fn payment_methods(&self) -> MercadoPagoResult<Vec<PaymentMethodInfo>>;
}

/// Fixed list, for stores that cache the catalogue or for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPaymentMethods {
    methods: Vec<PaymentMethodInfo>,
}

impl StaticPaymentMethods {
    pub fn new(methods: Vec<PaymentMethodInfo>) -> Self {
        Self { methods }
    }

    pub fn from_ids(ids: &[&str]) -> Self {
        Self::new(
            ids.iter()
                .map(|id| PaymentMethodInfo {
                    id: id.to_string(),
                    name: id.to_string(),
                    payment_type_id: String::new(),
                    status: "active".to_string(),
                })
                .collect(),
        )
    }
}

#[async_trait]
impl PaymentMethodSource for StaticPaymentMethods {
    async fn payment_methods(&self) -> MercadoPagoResult<Vec<PaymentMethodInfo>> {
        Ok(self.methods.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_can_be_used_as_trait_object() {
        let source: Box<dyn PaymentMethodSource> =
            Box::new(StaticPaymentMethods::from_ids(&["visa", "account_money"]));
        let methods = source
            .payment_methods()
            .await
            .expect("static source never fails");
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[1].id, "account_money");
    }
}
