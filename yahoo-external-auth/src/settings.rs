//! Plugin settings and the key-value settings store they live in
//!
//! Settings types are flattened into one store entry per field, keyed by the
//! lower-cased type name and field name (`yahooexternalauthsettings.clientsecret`).
//! Values are stored JSON-encoded so any serde type round-trips.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Error, Result};

/// A group of settings persisted together under its type name
pub trait Settings: Serialize + DeserializeOwned + Default + Send + Sync {
    /// Type name the store keys are derived from
    const NAME: &'static str;

    /// Prefix of every store key belonging to this settings type
    fn key_prefix() -> String {
        format!("{}.", Self::NAME.to_lowercase())
    }
}

/// Settings of the Yahoo authentication method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooExternalAuthSettings {
    /// OAuth2 client identifier
    #[serde(rename = "clientkeyidentifier")]
    pub client_key_identifier: String,

    /// OAuth2 client secret
    #[serde(rename = "clientsecret")]
    pub client_secret: String,
}

impl Settings for YahooExternalAuthSettings {
    const NAME: &'static str = "YahooExternalAuthSettings";
}

impl YahooExternalAuthSettings {
    /// Both credentials are present
    pub fn is_configured(&self) -> bool {
        !self.client_key_identifier.is_empty() && !self.client_secret.is_empty()
    }
}

/// Host key-value settings store
#[async_trait]
pub trait SettingService: Send + Sync {
    /// Get a raw setting value
    async fn get_setting(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a raw setting value
    async fn set_setting(&self, key: &str, value: String) -> Result<()>;

    /// Delete a setting; deleting a missing key is not an error
    async fn delete_setting(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Typed access to [`Settings`] on top of any [`SettingService`]
#[async_trait]
pub trait SettingServiceExt: SettingService {
    /// Load a settings type, falling back to defaults for missing fields
    async fn load_setting<T: Settings + 'static>(&self) -> Result<T> {
        let prefix = T::key_prefix();
        let mut fields = serde_json::Map::new();

        for key in self.keys_with_prefix(&prefix).await? {
            let Some(field) = key.to_lowercase().strip_prefix(&prefix).map(str::to_string) else {
                continue;
            };
            let Some(raw) = self.get_setting(&key).await? else {
                continue;
            };
            let value = serde_json::from_str(&raw).map_err(|e| {
                Error::Storage(format!("Setting '{}' holds invalid JSON: {}", key, e))
            })?;
            fields.insert(field, value);
        }

        serde_json::from_value(serde_json::Value::Object(fields)).map_err(|e| {
            Error::Storage(format!("Failed to deserialize {}: {}", T::NAME, e))
        })
    }

    /// Persist every field of a settings type
    async fn save_setting<T: Settings + 'static>(&self, settings: &T) -> Result<()> {
        let value = serde_json::to_value(settings)
            .map_err(|e| Error::Storage(format!("Failed to serialize {}: {}", T::NAME, e)))?;

        let serde_json::Value::Object(fields) = value else {
            return Err(Error::Storage(format!("{} must serialize to an object", T::NAME)));
        };

        let prefix = T::key_prefix();
        for (field, value) in fields {
            self.set_setting(&format!("{}{}", prefix, field), value.to_string())
                .await?;
        }

        tracing::debug!(settings = T::NAME, "Settings saved");
        Ok(())
    }

    /// Delete every stored field of a settings type
    async fn delete_setting_group<T: Settings + 'static>(&self) -> Result<()> {
        for key in self.keys_with_prefix(&T::key_prefix()).await? {
            self.delete_setting(&key).await?;
        }

        tracing::debug!(settings = T::NAME, "Settings deleted");
        Ok(())
    }
}

impl<S: SettingService + ?Sized> SettingServiceExt for S {}

/// In-memory settings store
///
/// Keys are case-insensitive.
#[derive(Debug, Default)]
pub struct InMemorySettingService {
    values: DashMap<String, String>,
}

impl InMemorySettingService {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl SettingService for InMemorySettingService {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .get(&key.to_lowercase())
            .map(|v| v.value().clone()))
    }

    async fn set_setting(&self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_lowercase(), value);
        Ok(())
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        self.values.remove(&key.to_lowercase());
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.to_lowercase();
        let mut keys: Vec<String> = self
            .values
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that hands keys back in their original casing, plus extras the
    /// prefix filter should have dropped
    struct LooseKeyStore(Vec<(&'static str, &'static str)>);

    #[async_trait]
    impl SettingService for LooseKeyStore {
        async fn get_setting(&self, key: &str) -> Result<Option<String>> {
            Ok(self
                .0
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string()))
        }

        async fn set_setting(&self, _key: &str, _value: String) -> Result<()> {
            Ok(())
        }

        async fn delete_setting(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|(k, _)| k.to_string()).collect())
        }
    }

    #[tokio::test]
    async fn test_load_tolerates_key_casing_and_foreign_keys() {
        let store = LooseKeyStore(vec![
            ("YahooExternalAuthSettings.ClientKeyIdentifier", "\"client\""),
            ("YAHOOEXTERNALAUTHSETTINGS.CLIENTSECRET", "\"secret\""),
            ("x", "\"short\""),
            ("yahoo.clientsecret", "\"other\""),
        ]);

        let settings: YahooExternalAuthSettings = store.load_setting().await.unwrap();

        assert_eq!(settings.client_key_identifier, "client");
        assert_eq!(settings.client_secret, "secret");
    }

    #[tokio::test]
    async fn test_save_uses_type_derived_keys() {
        let store = InMemorySettingService::new();
        let settings = YahooExternalAuthSettings {
            client_key_identifier: "client".to_string(),
            client_secret: "secret".to_string(),
        };

        store.save_setting(&settings).await.unwrap();

        assert_eq!(
            store
                .get_setting("yahooexternalauthsettings.clientkeyidentifier")
                .await
                .unwrap(),
            Some("\"client\"".to_string())
        );
        assert_eq!(
            store
                .get_setting("YahooExternalAuthSettings.ClientSecret")
                .await
                .unwrap(),
            Some("\"secret\"".to_string())
        );
    }

    #[tokio::test]
    async fn test_load_missing_returns_defaults() {
        let store = InMemorySettingService::new();
        let settings: YahooExternalAuthSettings = store.load_setting().await.unwrap();
        assert_eq!(settings, YahooExternalAuthSettings::default());
        assert!(!settings.is_configured());
    }

    #[tokio::test]
    async fn test_load_after_save() {
        let store = InMemorySettingService::new();
        let settings = YahooExternalAuthSettings {
            client_key_identifier: "id".to_string(),
            client_secret: "s3cr3t".to_string(),
        };
        store.save_setting(&settings).await.unwrap();

        let loaded: YahooExternalAuthSettings = store.load_setting().await.unwrap();
        assert_eq!(loaded, settings);
        assert!(loaded.is_configured());
    }

    #[tokio::test]
    async fn test_delete_group_leaves_other_keys() {
        let store = InMemorySettingService::new();
        store
            .set_setting("storeinformationsettings.name", "\"Shop\"".to_string())
            .await
            .unwrap();
        store
            .save_setting(&YahooExternalAuthSettings::default())
            .await
            .unwrap();
        assert_eq!(store.len(), 3);

        store
            .delete_setting_group::<YahooExternalAuthSettings>()
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store
            .keys_with_prefix("yahooexternalauthsettings.")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_storage_error() {
        let store = InMemorySettingService::new();
        store
            .set_setting("yahooexternalauthsettings.clientsecret", "not json".to_string())
            .await
            .unwrap();

        let result = store.load_setting::<YahooExternalAuthSettings>().await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
