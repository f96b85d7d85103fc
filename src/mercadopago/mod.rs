//! Mercado Pago REST access: payment method catalogue and preference creation.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::{MercadoPagoClient, MercadoPagoConfig};
pub use error::{MercadoPagoError, MercadoPagoResult};
pub use provider::{PaymentMethodSource, StaticPaymentMethods};
pub use types::{PaymentMethodInfo, PreferenceResponse};
