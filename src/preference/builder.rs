use crate::mercadopago::PaymentMethodSource;
use crate::preference::base::BasePreference;
use crate::preference::error::{PreferenceError, PreferenceResult};
use crate::preference::rules;
use crate::preference::settings::{
    PreferenceSettings, BINARY_MODE, EXPIRATION, FLAG_ON, PAYMENT_ACCOUNT_MONEY, STORE_CATEGORY,
};
use crate::preference::totals::{CartTotals, TotalsCalculator};
use crate::preference::types::{
    BackUrlStatus, BackUrls, IdRef, Identification, Payer, PayerAddress, PaymentOptions, Phone,
    PreferenceFields, PreferenceItem, ReceiverAddress, Shipment, ACCOUNT_MONEY_METHOD,
    DIFFERENCE_ITEM_ID, DISCOUNT_ITEM_ID, QR_PAYMENT_METHOD,
};
use crate::shop::{Cart, CheckoutContext, ConfigurationStore, ShopRepository};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, TimeDelta};
use rust_decimal::Decimal;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info, warn};

const AUTO_RETURN_APPROVED: &str = "approved";
const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000%z";

pub type Clock = fn() -> DateTime<FixedOffset>;

fn local_now() -> DateTime<FixedOffset> {
    Local::now().into()
}

/// Builds the standard checkout preference for a cart.
///
/// Scalar settings come from the snapshot taken when the builder was created.
/// Per-method enable flags and the store category are read from the
/// configuration store on every call. No method writes configuration except
/// [`StandardPreference::persist_derived_settings`].
pub struct StandardPreference {
    settings: PreferenceSettings,
    configuration: Arc<dyn ConfigurationStore>,
    shop: Arc<dyn ShopRepository>,
    base: Arc<dyn BasePreference>,
    payment_methods: Arc<dyn PaymentMethodSource>,
    totals: Arc<dyn TotalsCalculator>,
    clock: Clock,
}

impl StandardPreference {
    pub fn new(
        settings: PreferenceSettings,
        configuration: Arc<dyn ConfigurationStore>,
        shop: Arc<dyn ShopRepository>,
        base: Arc<dyn BasePreference>,
        payment_methods: Arc<dyn PaymentMethodSource>,
    ) -> Self {
        Self {
            settings,
            configuration,
            shop,
            base,
            payment_methods,
            totals: Arc::new(CartTotals),
            clock: local_now,
        }
    }

    pub fn with_totals(mut self, totals: Arc<dyn TotalsCalculator>) -> Self {
        self.totals = totals;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &PreferenceSettings {
        &self.settings
    }

    /// Full request body: the base preference fields with this builder's
    /// fields layered on top.
    pub async fn build_preference_payload(
        &self,
        ctx: &CheckoutContext,
        discount: Decimal,
    ) -> PreferenceResult<JsonMap<String, JsonValue>> {
        let mut payload = self.base.common_preference(&ctx.cart)?;
        let fields = self.preference_fields(ctx, discount).await?;
        if let JsonValue::Object(fields) = serde_json::to_value(&fields)? {
            payload.extend(fields);
        }

        info!(
            cart_id = ctx.cart.id,
            items = item_count(&payload),
            "preference payload built"
        );
        Ok(payload)
    }

    pub async fn preference_fields(
        &self,
        ctx: &CheckoutContext,
        discount: Decimal,
    ) -> PreferenceResult<PreferenceFields> {
        let cart = &ctx.cart;
        let mut items = self.base.cart_items(cart)?;
        if !discount.is_zero() {
            self.append_discount_items(cart, &mut items)?;
        }

        Ok(PreferenceFields {
            items,
            payer: self.customer_data(ctx)?,
            shipments: self.shipment(cart)?,
            back_urls: self.back_urls(cart),
            payment_methods: self.payment_options(ctx).await?,
            auto_return: self.auto_return(),
            binary_mode: self.binary_mode(),
            expires: self.expires(),
            expiration_date_to: self.expiration_date_to((self.clock)()),
        })
    }

    /// Adds the store discount as a negative line, then a line that absorbs
    /// whatever rounding gap is left against the corrected total.
    fn append_discount_items(
        &self,
        cart: &Cart,
        items: &mut Vec<PreferenceItem>,
    ) -> PreferenceResult<()> {
        let total = self.totals.corrected_total(cart)?;
        let category_id = self.configuration.get(STORE_CATEGORY);

        items.push(PreferenceItem {
            id: DISCOUNT_ITEM_ID.to_string(),
            title: "Discount".to_string(),
            quantity: 1,
            unit_price: -total.discount,
            category_id: category_id.clone(),
            description: "Discount provided by store".to_string(),
        });

        let items_amount: Decimal = items.iter().map(PreferenceItem::subtotal).sum();
        let difference = total.amount_with_round - items_amount;
        debug!(
            cart_id = cart.id,
            discount = %total.discount,
            difference = %difference,
            "discount items appended"
        );

        items.push(PreferenceItem {
            id: DIFFERENCE_ITEM_ID.to_string(),
            title: "Difference".to_string(),
            quantity: 1,
            unit_price: difference,
            category_id,
            description: "Difference provided by store".to_string(),
        });
        Ok(())
    }

    /// `None` when the customer has neither first nor last name.
    pub fn customer_data(&self, ctx: &CheckoutContext) -> PreferenceResult<Option<Payer>> {
        let customer = match ctx.customer.as_ref().filter(|c| c.has_name()) {
            Some(customer) => customer,
            None => return Ok(None),
        };
        let invoice = self.shop.address(ctx.cart.id_address_invoice)?;

        Ok(Some(Payer {
            email: customer.email.clone(),
            first_name: customer.firstname.clone(),
            last_name: customer.lastname.clone(),
            phone: Phone {
                area_code: String::new(),
                number: invoice.phone.clone(),
            },
            identification: Identification::default(),
            address: PayerAddress {
                zip_code: invoice.postcode.clone(),
                street_name: invoice.street_line(),
                street_number: String::new(),
                city: invoice.city.clone(),
                federal_unit: String::new(),
            },
            date_created: customer
                .date_add
                .to_rfc3339_opts(SecondsFormat::Secs, false),
        }))
    }

    pub async fn payment_options(&self, ctx: &CheckoutContext) -> PreferenceResult<PaymentOptions> {
        let mut excluded_methods = vec![IdRef::new(QR_PAYMENT_METHOD)];

        for method in self.payment_methods.payment_methods().await? {
            let id = method.id.to_lowercase();
            if id == ACCOUNT_MONEY_METHOD {
                continue;
            }
            let flag = self.configuration.get(&method.settings_key());
            let enabled = flag.as_deref() == Some(FLAG_ON);
            if !enabled && !excluded_methods.iter().any(|m| m.id == id) {
                excluded_methods.push(IdRef::new(id));
            }
        }

        Ok(PaymentOptions {
            installments: self.settings.installments,
            excluded_payment_types: self.excluded_payment_types(ctx)?,
            excluded_payment_methods: excluded_methods,
        })
    }

    pub fn excluded_payment_types(&self, ctx: &CheckoutContext) -> PreferenceResult<Vec<IdRef>> {
        let tier = self.customer_tier(ctx)?;
        let excluded = rules::excluded_payment_types(tier, &ctx.cart);
        debug!(
            cart_id = ctx.cart.id,
            tier,
            credit_card_excluded = !excluded.is_empty(),
            "payment types evaluated"
        );
        Ok(excluded)
    }

    pub fn cart_has_discount_more_than(&self, ctx: &CheckoutContext, threshold: Decimal) -> bool {
        rules::cart_has_discount_more_than(&ctx.cart, threshold)
    }

    /// Price list of the logged-in customer; `0` for guests, for groups
    /// whose name carries no list and for default groups the shop no longer
    /// has.
    pub fn customer_tier(&self, ctx: &CheckoutContext) -> PreferenceResult<i64> {
        let customer = match ctx.logged_customer() {
            Some(customer) => customer,
            None => return Ok(0),
        };
        match self.shop.group(customer.id_default_group) {
            Ok(group) => Ok(rules::tier_from_group(&group, ctx.id_lang)),
            Err(PreferenceError::GroupNotFound { id }) => {
                warn!(
                    customer_id = customer.id,
                    group_id = id,
                    "default customer group not found, using no price list"
                );
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    pub fn shipment(&self, cart: &Cart) -> PreferenceResult<Shipment> {
        let address = self.shop.address(cart.id_address_delivery)?;

        Ok(Shipment {
            receiver_address: ReceiverAddress {
                zip_code: address.postcode.clone(),
                street_name: address.street_line(),
                street_number: "-".to_string(),
                apartment: "-".to_string(),
                floor: "-".to_string(),
                city_name: address.city,
            },
        })
    }

    pub fn back_urls(&self, cart: &Cart) -> BackUrls {
        BackUrls {
            success: self.base.return_url(cart, BackUrlStatus::Success),
            failure: self.base.return_url(cart, BackUrlStatus::Failure),
            pending: self.base.return_url(cart, BackUrlStatus::Pending),
        }
    }

    pub fn auto_return(&self) -> Option<String> {
        self.settings
            .auto_return
            .then(|| AUTO_RETURN_APPROVED.to_string())
    }

    pub fn binary_mode(&self) -> bool {
        self.settings.binary_mode
    }

    pub fn expires(&self) -> bool {
        self.settings.expiration_hours.is_some()
    }

    /// `now` plus the configured hours. A blank setting gives `None`, which
    /// goes on the wire as `null`, not as the empty setting text; `expires`
    /// is `false` in that case.
    pub fn expiration_date_to(&self, now: DateTime<FixedOffset>) -> Option<String> {
        let hours = self.settings.expiration_hours?;
        let expires_at = now.checked_add_signed(TimeDelta::try_hours(hours)?)?;
        Some(expires_at.format(EXPIRATION_FORMAT).to_string())
    }

    /// Writes back the values the checkout derives from the settings:
    /// account money is switched on, binary mode and the expiration flag are
    /// stored normalized.
    pub fn persist_derived_settings(&self, store: &mut dyn ConfigurationStore) {
        store.update_value(PAYMENT_ACCOUNT_MONEY, FLAG_ON);
        store.update_value(BINARY_MODE, bool_flag(self.binary_mode()));
        store.update_value(EXPIRATION, bool_flag(self.expires()));
        info!("derived checkout settings persisted");
    }
}

fn bool_flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn item_count(payload: &JsonMap<String, JsonValue>) -> usize {
    payload
        .get("items")
        .and_then(JsonValue::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}
