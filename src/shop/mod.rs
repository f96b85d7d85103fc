//! Storefront domain objects and the lookups the preference builder needs.

pub mod configuration;
pub mod repository;
pub mod types;

pub use configuration::{ConfigurationStore, MemoryConfiguration};
pub use repository::{MemoryShop, ShopRepository};
pub use types::{Address, Cart, CartProduct, CartRule, CheckoutContext, Customer, Group};
