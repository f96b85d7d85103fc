use crate::config::StoreConfig;
use crate::preference::error::PreferenceResult;
use crate::preference::settings::{INVOICE_NAME, STORE_CATEGORY};
use crate::preference::totals::round_cents;
use crate::preference::types::{BackUrlStatus, PreferenceItem};
use crate::shop::{Cart, ConfigurationStore};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::Arc;

/// Fields every preference shares, whatever the checkout flow.
pub trait BasePreference: Send + Sync {
    fn cart_items(&self, cart: &Cart) -> PreferenceResult<Vec<PreferenceItem>>;

    fn common_preference(&self, cart: &Cart) -> PreferenceResult<JsonMap<String, JsonValue>>;

    fn return_url(&self, cart: &Cart, status: BackUrlStatus) -> String;
}

/// Store category and invoice name are read from `configuration` on every
/// call, so they always agree with what the builder reads for the same build.
#[derive(Clone)]
pub struct StoreBasePreference {
    shop_base_url: String,
    notification_url: Option<String>,
    configuration: Arc<dyn ConfigurationStore>,
}

impl StoreBasePreference {
    pub fn new(store: &StoreConfig, configuration: Arc<dyn ConfigurationStore>) -> Self {
        Self {
            shop_base_url: store.shop_base_url.trim_end_matches('/').to_string(),
            notification_url: store.notification_url.clone(),
            configuration,
        }
    }

    fn statement_descriptor(&self) -> Option<String> {
        self.configuration
            .get(INVOICE_NAME)
            .filter(|v| !v.is_empty())
    }
}

impl BasePreference for StoreBasePreference {
    fn cart_items(&self, cart: &Cart) -> PreferenceResult<Vec<PreferenceItem>> {
        let category_id = self.configuration.get(STORE_CATEGORY);
        Ok(cart
            .products
            .iter()
            .map(|product| PreferenceItem {
                id: product
                    .reference
                    .clone()
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| product.id_product.to_string()),
                title: product.name.clone(),
                quantity: product.quantity,
                unit_price: round_cents(product.price_wt),
                category_id: category_id.clone(),
                description: product.name.clone(),
            })
            .collect())
    }

    fn common_preference(&self, cart: &Cart) -> PreferenceResult<JsonMap<String, JsonValue>> {
        let mut common = JsonMap::new();
        common.insert(
            "external_reference".to_string(),
            JsonValue::String(cart.id.to_string()),
        );
        if let Some(url) = &self.notification_url {
            common.insert(
                "notification_url".to_string(),
                JsonValue::String(format!("{}?source_news=webhooks", url)),
            );
        }
        if let Some(descriptor) = self.statement_descriptor() {
            common.insert(
                "statement_descriptor".to_string(),
                JsonValue::String(descriptor),
            );
        }
        common.insert(
            "metadata".to_string(),
            serde_json::json!({
                "cart_id": cart.id,
                "checkout": "standard",
                "module_version": env!("CARGO_PKG_VERSION"),
            }),
        );
        Ok(common)
    }

    fn return_url(&self, cart: &Cart, status: BackUrlStatus) -> String {
        format!(
            "{}/index.php?fc=module&module=mercadopago&controller=standardvalidation&typeReturn={}&cart_id={}",
            self.shop_base_url,
            status.as_str(),
            cart.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::{CartProduct, MemoryConfiguration};
    use rust_decimal_macros::dec;
    use std::sync::RwLock;

    fn store() -> StoreConfig {
        StoreConfig {
            shop_base_url: "https://tienda.example.com/".to_string(),
            notification_url: Some("https://tienda.example.com/mp/notify".to_string()),
        }
    }

    fn base() -> StoreBasePreference {
        let configuration = MemoryConfiguration::from([
            (STORE_CATEGORY, "others"),
            (INVOICE_NAME, "TIENDA"),
        ]);
        StoreBasePreference::new(&store(), Arc::new(configuration))
    }

    fn cart() -> Cart {
        Cart {
            id: 55,
            id_address_invoice: 1,
            id_address_delivery: 1,
            products: vec![
                CartProduct {
                    id_product: 9,
                    reference: Some("YER-1KG".to_string()),
                    name: "Yerba 1kg".to_string(),
                    quantity: 2,
                    price_wt: dec!(10.005),
                },
                CartProduct {
                    id_product: 12,
                    reference: Some(String::new()),
                    name: "Bombilla".to_string(),
                    quantity: 1,
                    price_wt: dec!(4),
                },
            ],
            cart_rules: vec![],
        }
    }

    #[test]
    fn items_fall_back_to_product_id() {
        let items = base().cart_items(&cart()).expect("items");
        assert_eq!(items[0].id, "YER-1KG");
        assert_eq!(items[0].unit_price, dec!(10.01));
        assert_eq!(items[1].id, "12");
        assert_eq!(items[1].category_id.as_deref(), Some("others"));
    }

    #[test]
    fn return_url_carries_status_and_cart() {
        let url = base().return_url(&cart(), BackUrlStatus::Pending);
        assert_eq!(
            url,
            "https://tienda.example.com/index.php?fc=module&module=mercadopago&controller=standardvalidation&typeReturn=pending&cart_id=55"
        );
    }

    #[test]
    fn common_preference_references_cart() {
        let common = base().common_preference(&cart()).expect("common");
        assert_eq!(common["external_reference"], "55");
        assert_eq!(common["statement_descriptor"], "TIENDA");
        assert_eq!(
            common["notification_url"],
            "https://tienda.example.com/mp/notify?source_news=webhooks"
        );
    }

    #[test]
    fn category_change_applies_to_next_build() {
        let configuration = Arc::new(RwLock::new(MemoryConfiguration::from([(
            STORE_CATEGORY,
            "others",
        )])));
        let base = StoreBasePreference::new(&store(), configuration.clone());
        assert_eq!(
            base.cart_items(&cart()).expect("items")[0].category_id.as_deref(),
            Some("others")
        );

        configuration
            .write()
            .expect("configuration lock")
            .update_value(STORE_CATEGORY, "home");
        assert_eq!(
            base.cart_items(&cart()).expect("items")[0].category_id.as_deref(),
            Some("home")
        );
        assert!(!base
            .common_preference(&cart())
            .expect("common")
            .contains_key("statement_descriptor"));
    }
}
