//! Mercado Pago checkout preference builder for storefronts, plus a
//! file-backed mutex for guarding cross-process critical sections.

pub mod config;
pub mod error;
pub mod logging;
pub mod mercadopago;
pub mod mutex;
pub mod preference;
pub mod shop;

pub use error::{Error, Result};
pub use mutex::FileMutex;
pub use preference::StandardPreference;
