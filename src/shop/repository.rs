use crate::preference::error::{PreferenceError, PreferenceResult};
use crate::shop::types::{Address, Group};
use std::collections::HashMap;

/// Lookups the storefront answers while a preference is assembled.
pub trait ShopRepository: Send + Sync {
    fn address(&self, id: u64) -> PreferenceResult<Address>;

    fn group(&self, id: u64) -> PreferenceResult<Group>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryShop {
    addresses: HashMap<u64, Address>,
    groups: HashMap<u64, Group>,
}

impl MemoryShop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.addresses.insert(address.id, address);
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.insert(group.id, group);
        self
    }
}

impl ShopRepository for MemoryShop {
    fn address(&self, id: u64) -> PreferenceResult<Address> {
        self.addresses
            .get(&id)
            .cloned()
            .ok_or(PreferenceError::AddressNotFound { id })
    }

    fn group(&self, id: u64) -> PreferenceResult<Group> {
        self.groups
            .get(&id)
            .cloned()
            .ok_or(PreferenceError::GroupNotFound { id })
    }
}
