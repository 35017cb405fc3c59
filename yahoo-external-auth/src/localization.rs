//! Locale string resources

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;

/// Host localization service
///
/// Resource names are case-insensitive.
#[async_trait]
pub trait LocalizationService: Send + Sync {
    /// Add resources, overwriting existing values
    async fn add_or_update_locale_resources(&self, resources: HashMap<String, String>)
        -> Result<()>;

    /// Delete every resource whose name starts with `prefix`
    async fn delete_locale_resources(&self, prefix: &str) -> Result<()>;

    /// Localized value of a resource, or the resource name when missing
    async fn get_resource(&self, name: &str) -> Result<String>;
}

/// In-memory localization store for a single language
#[derive(Debug, Default)]
pub struct InMemoryLocalizationService {
    resources: DashMap<String, String>,
}

impl InMemoryLocalizationService {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of stored resources starting with `prefix`, lower-cased
    pub fn resource_names_with_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let mut names: Vec<String> = self
            .resources
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl LocalizationService for InMemoryLocalizationService {
    async fn add_or_update_locale_resources(
        &self,
        resources: HashMap<String, String>,
    ) -> Result<()> {
        let count = resources.len();
        for (name, value) in resources {
            self.resources.insert(name.to_lowercase(), value);
        }
        tracing::debug!(count, "Locale resources added");
        Ok(())
    }

    async fn delete_locale_resources(&self, prefix: &str) -> Result<()> {
        let prefix = prefix.to_lowercase();
        self.resources.retain(|name, _| !name.starts_with(&prefix));
        tracing::debug!(%prefix, "Locale resources deleted");
        Ok(())
    }

    async fn get_resource(&self, name: &str) -> Result<String> {
        Ok(self
            .resources
            .get(&name.to_lowercase())
            .map(|v| v.value().clone())
            .unwrap_or_else(|| name.to_string()))
    }
}
