//! Checkout preference assembly.

pub mod base;
pub mod builder;
pub mod error;
pub mod rules;
pub mod settings;
pub mod totals;
pub mod types;

pub use base::{BasePreference, StoreBasePreference};
pub use builder::StandardPreference;
pub use error::{PreferenceError, PreferenceResult};
pub use settings::PreferenceSettings;
pub use totals::{CartTotals, CorrectedTotal, TotalsCalculator};
pub use types::{PaymentOptions, PreferenceFields, PreferenceItem};
