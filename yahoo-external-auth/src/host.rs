//! Contracts the host storefront fulfils for the plugin
//!
//! The plugin never reaches for ambient state: the current customer, the
//! current store, plugin activation and permissions all come through these
//! traits, injected as `Arc<dyn ...>` in [`HostServices`].

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::Result;
use crate::external::ExternalAuthenticationService;
use crate::localization::LocalizationService;
use crate::settings::SettingService;

/// Customer making the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier
    pub id: i64,

    /// Whether the customer is a guest (not registered)
    pub is_guest: bool,
}

/// Store serving the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    /// Store identifier
    pub id: i64,

    /// Store name
    pub name: String,
}

/// Permissions checked by the plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardPermission {
    /// Manage external authentication methods in the admin area
    ManageExternalAuthenticationMethods,
}

impl StandardPermission {
    /// System name of the permission record
    pub fn system_name(&self) -> &'static str {
        match self {
            Self::ManageExternalAuthenticationMethods => "ManageExternalAuthenticationMethods",
        }
    }
}

/// Resolves the customer of the current request
#[async_trait]
pub trait WorkContext: Send + Sync {
    /// Current customer, resolved from the request session
    async fn current_customer(&self, session: &Session) -> Result<Customer>;
}

/// Resolves the store of the current request
#[async_trait]
pub trait StoreContext: Send + Sync {
    /// Current store, resolved from the request headers (host name)
    async fn current_store(&self, headers: &HeaderMap) -> Result<Store>;
}

/// Host registry of external authentication plugins
#[async_trait]
pub trait AuthenticationPluginManager: Send + Sync {
    /// Whether the plugin is installed and enabled for this customer and store
    async fn is_plugin_active(
        &self,
        system_name: &str,
        customer: &Customer,
        store_id: i64,
    ) -> Result<bool>;
}

/// Host permission checks
#[async_trait]
pub trait PermissionService: Send + Sync {
    /// Whether the customer holds the permission
    async fn authorize(&self, permission: StandardPermission, customer: &Customer)
        -> Result<bool>;
}

/// Every host collaborator the plugin uses
#[derive(Clone)]
pub struct HostServices {
    /// Key-value settings store
    pub settings: Arc<dyn SettingService>,
    /// Locale resources
    pub localization: Arc<dyn LocalizationService>,
    /// Current customer resolution
    pub work_context: Arc<dyn WorkContext>,
    /// Current store resolution
    pub store_context: Arc<dyn StoreContext>,
    /// Plugin activation checks
    pub plugins: Arc<dyn AuthenticationPluginManager>,
    /// Permission checks
    pub permissions: Arc<dyn PermissionService>,
    /// Account linking, creation and sign-in
    pub external_authentication: Arc<dyn ExternalAuthenticationService>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_system_name() {
        assert_eq!(
            StandardPermission::ManageExternalAuthenticationMethods.system_name(),
            "ManageExternalAuthenticationMethods"
        );
    }
}
