//! Plugin lifecycle and the external authentication method descriptor

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::defaults;
use crate::error::Result;
use crate::localization::LocalizationService;
use crate::settings::{SettingService, SettingServiceExt, YahooExternalAuthSettings};

/// Capabilities every plugin offers the host
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique system name
    fn system_name(&self) -> &'static str;

    /// Absolute URL of the admin configuration page
    fn configuration_page_url(&self) -> String;

    /// Create settings and locale resources
    async fn install(&self) -> Result<()>;

    /// Remove everything `install` created
    async fn uninstall(&self) -> Result<()>;
}

/// Plugin offering a way to sign in with an external account
pub trait ExternalAuthenticationMethod: Plugin {
    /// Name of the view component rendering the login button
    fn public_view_component_name(&self) -> &'static str;
}

/// Locale resources installed with the plugin
pub fn locale_resources() -> HashMap<String, String> {
    let prefix = defaults::LOCALE_RESOURCE_PREFIX;
    [
        ("ClientKeyIdentifier", "Client Id"),
        (
            "ClientKeyIdentifier.Hint",
            "Enter your app ID/API key here. You can find it on your Yahoo application page.",
        ),
        ("ClientSecret", "Client secret"),
        (
            "ClientSecret.Hint",
            "Enter your app secret here. You can find it on your Yahoo application page.",
        ),
        (
            "Instructions",
            concat!(
                "<p>To configure authentication with Yahoo, please follow these steps:<br/><br/><ol>",
                "<li>Navigate to the <a href=\"https://developer.yahoo.com/apps/\" target=\"_blank\">Yahoo for Developers</a> page and sign in. ",
                "If you don't already have a Yahoo account, use the <b>Create an account</b> link on the login page to create one.</li>",
                "<li>Tap the <b>Create an App</b> in the upper right corner to create a new App ID.</li>",
                "<li>Enter \"{0:s}YahooAuthentication/LoginCallback\" into the <b>Redirect URI(s)</b> field.</li>",
                "<li>Click on the <b>Create App</b>.</li>",
                "<li>You are now presented your apps information.</li>",
                "<li>Copy your Client ID and Client Secret below.</li></ol><br/><br/></p>",
            ),
        ),
    ]
    .into_iter()
    .map(|(name, value)| (format!("{}.{}", prefix, name), value.to_string()))
    .collect()
}

/// "Login with Yahoo" authentication method
#[derive(Clone)]
pub struct YahooAuthenticationMethod {
    settings: Arc<dyn SettingService>,
    localization: Arc<dyn LocalizationService>,
    store_location: String,
}

impl YahooAuthenticationMethod {
    /// Create the plugin
    ///
    /// `store_location` must end with `/`.
    pub fn new(
        settings: Arc<dyn SettingService>,
        localization: Arc<dyn LocalizationService>,
        store_location: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            localization,
            store_location: store_location.into(),
        }
    }
}

#[async_trait]
impl Plugin for YahooAuthenticationMethod {
    fn system_name(&self) -> &'static str {
        defaults::SYSTEM_NAME
    }

    fn configuration_page_url(&self) -> String {
        format!(
            "{}{}",
            self.store_location,
            defaults::CONFIGURE_PATH.trim_start_matches('/')
        )
    }

    async fn install(&self) -> Result<()> {
        self.settings
            .save_setting(&YahooExternalAuthSettings::default())
            .await?;
        self.localization
            .add_or_update_locale_resources(locale_resources())
            .await?;

        tracing::info!(plugin = defaults::SYSTEM_NAME, "Plugin installed");
        Ok(())
    }

    async fn uninstall(&self) -> Result<()> {
        self.settings
            .delete_setting_group::<YahooExternalAuthSettings>()
            .await?;
        self.localization
            .delete_locale_resources(defaults::LOCALE_RESOURCE_PREFIX)
            .await?;

        tracing::info!(plugin = defaults::SYSTEM_NAME, "Plugin uninstalled");
        Ok(())
    }
}

impl ExternalAuthenticationMethod for YahooAuthenticationMethod {
    fn public_view_component_name(&self) -> &'static str {
        defaults::VIEW_COMPONENT_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::InMemoryLocalizationService;
    use crate::settings::InMemorySettingService;

    fn plugin(
        settings: Arc<InMemorySettingService>,
        localization: Arc<InMemoryLocalizationService>,
    ) -> YahooAuthenticationMethod {
        YahooAuthenticationMethod::new(settings, localization, "https://shop.example.com/")
    }

    #[test]
    fn test_descriptor() {
        let plugin = plugin(
            Arc::new(InMemorySettingService::new()),
            Arc::new(InMemoryLocalizationService::new()),
        );
        assert_eq!(plugin.system_name(), "ExternalAuth.Yahoo");
        assert_eq!(plugin.public_view_component_name(), "YahooAuthentication");
        assert_eq!(
            plugin.configuration_page_url(),
            "https://shop.example.com/Admin/YahooAuthentication/Configure"
        );
    }

    #[tokio::test]
    async fn test_install_creates_settings_and_resources() {
        let settings = Arc::new(InMemorySettingService::new());
        let localization = Arc::new(InMemoryLocalizationService::new());
        plugin(settings.clone(), localization.clone())
            .install()
            .await
            .unwrap();

        assert_eq!(settings.len(), 2);
        assert_eq!(
            localization
                .resource_names_with_prefix(defaults::LOCALE_RESOURCE_PREFIX)
                .len(),
            5
        );
        assert_eq!(
            localization
                .get_resource("Plugins.ExternalAuth.Yahoo.ClientSecret")
                .await
                .unwrap(),
            "Client secret"
        );
    }

    #[tokio::test]
    async fn test_uninstall_leaves_other_entries() {
        let settings = Arc::new(InMemorySettingService::new());
        let localization = Arc::new(InMemoryLocalizationService::new());
        settings
            .set_setting("storeinformationsettings.storeclosed", "false".to_string())
            .await
            .unwrap();
        localization
            .add_or_update_locale_resources(HashMap::from([(
                "Admin.Plugins.Saved".to_string(),
                "The plugin has been saved".to_string(),
            )]))
            .await
            .unwrap();

        let plugin = plugin(settings.clone(), localization.clone());
        plugin.install().await.unwrap();
        plugin.uninstall().await.unwrap();

        assert_eq!(settings.len(), 1);
        assert!(localization
            .resource_names_with_prefix(defaults::LOCALE_RESOURCE_PREFIX)
            .is_empty());
        assert_eq!(
            localization.get_resource("Admin.Plugins.Saved").await.unwrap(),
            "The plugin has been saved"
        );
    }
}
