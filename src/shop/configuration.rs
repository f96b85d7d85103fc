use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Key/value settings rows owned by the storefront.
pub trait ConfigurationStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn update_value(&mut self, key: &str, value: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConfiguration {
    values: HashMap<String, String>,
}

impl MemoryConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.update_value(key, value);
        self
    }
}

impl ConfigurationStore for MemoryConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn update_value(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Lets a store be shared behind an `Arc` and still take writes.
impl<T: ConfigurationStore> ConfigurationStore for RwLock<T> {
    fn get(&self, key: &str) -> Option<String> {
        self.read().unwrap_or_else(PoisonError::into_inner).get(key)
    }

    fn update_value(&mut self, key: &str, value: &str) {
        self.get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .update_value(key, value);
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MemoryConfiguration {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |store, (k, v)| store.with(k, v))
    }
}
