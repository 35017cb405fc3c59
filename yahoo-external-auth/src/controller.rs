//! Yahoo authentication actions
//!
//! - `configure` / `configure_post`: admin settings page
//! - `login`: start the Yahoo sign-in
//! - `login_callback`: hand the signed-in identity to the host

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::antiforgery::AntiforgeryToken;
use crate::authentication::{AuthenticationProperties, AuthenticationSchemes};
use crate::defaults;
use crate::error::{Error, Result};
use crate::external::ExternalAuthenticationParameters;
use crate::host::{Customer, HostServices, StandardPermission};
use crate::models::{ConfigurationModel, FieldError};
use crate::notifications::{Notification, Notifications};
use crate::settings::{SettingServiceExt, YahooExternalAuthSettings};
use crate::views::{AccessDeniedView, ConfigureView, HtmlTemplate};

/// Actions of the Yahoo authentication plugin
#[derive(Clone)]
pub struct YahooAuthenticationController {
    host: HostServices,
    schemes: AuthenticationSchemes,
    store_location: String,
    login_path: String,
}

/// Append `?returnUrl=` to a path when a return URL is given
fn with_return_url(path: &str, return_url: Option<&str>) -> String {
    match return_url.filter(|u| !u.is_empty()) {
        Some(return_url) => {
            let encoded: String =
                url::form_urlencoded::byte_serialize(return_url.as_bytes()).collect();
            format!("{}?returnUrl={}", path, encoded)
        }
        None => path.to_string(),
    }
}

impl YahooAuthenticationController {
    /// Create the controller
    ///
    /// `login_path` is the host login page users return to after a failed sign-in.
    pub fn new(
        host: HostServices,
        schemes: AuthenticationSchemes,
        store_location: impl Into<String>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            host,
            schemes,
            store_location: store_location.into(),
            login_path: login_path.into(),
        }
    }

    async fn can_manage(&self, session: &Session) -> Result<bool> {
        let customer = self.host.work_context.current_customer(session).await?;
        self.host
            .permissions
            .authorize(
                StandardPermission::ManageExternalAuthenticationMethods,
                &customer,
            )
            .await
    }

    fn access_denied() -> Response {
        HtmlTemplate::new(AccessDeniedView)
            .with_status(StatusCode::FORBIDDEN)
            .into_response()
    }

    async fn resource(&self, name: &str) -> Result<String> {
        self.host.localization.get_resource(name).await
    }

    async fn render_configure(
        &self,
        session: &Session,
        model: ConfigurationModel,
        errors: &[FieldError],
    ) -> Result<Response> {
        let prefix = defaults::LOCALE_RESOURCE_PREFIX;
        let instructions = self
            .resource(&format!("{}.Instructions", prefix))
            .await?
            .replace("{0:s}", &self.store_location);

        let token = AntiforgeryToken::get_or_create(session).await?;

        let view = ConfigureView {
            action: defaults::CONFIGURE_PATH.to_string(),
            model,
            notifications: Notifications::take(session).await?,
            instructions,
            antiforgery_field: token.field_name(),
            antiforgery_token: token.token().to_string(),
            client_id_label: self
                .resource(&format!("{}.ClientKeyIdentifier", prefix))
                .await?,
            client_id_hint: self
                .resource(&format!("{}.ClientKeyIdentifier.Hint", prefix))
                .await?,
            client_secret_label: self.resource(&format!("{}.ClientSecret", prefix)).await?,
            client_secret_hint: self
                .resource(&format!("{}.ClientSecret.Hint", prefix))
                .await?,
            save_label: self.resource("Admin.Common.Save").await?,
            client_id_error: None,
            client_secret_error: None,
        }
        .with_errors(errors);

        Ok(HtmlTemplate::new(view).into_response())
    }

    /// Show the settings page
    pub async fn configure(&self, session: &Session) -> Result<Response> {
        if !self.can_manage(session).await? {
            return Ok(Self::access_denied());
        }

        let settings = self
            .host
            .settings
            .load_setting::<YahooExternalAuthSettings>()
            .await?;

        self.render_configure(session, ConfigurationModel::from_settings(&settings), &[])
            .await
    }

    /// Save the settings page
    ///
    /// The page is rendered again whether or not the values were saved.
    pub async fn configure_post(
        &self,
        session: &Session,
        model: ConfigurationModel,
    ) -> Result<Response> {
        if !self.can_manage(session).await? {
            return Ok(Self::access_denied());
        }

        AntiforgeryToken::validate(session, model.antiforgery_token.as_deref()).await?;

        let model = model.trimmed();
        let errors = model.field_errors();
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "Yahoo settings rejected");
            return self.render_configure(session, model, &errors).await;
        }

        let mut settings = self
            .host
            .settings
            .load_setting::<YahooExternalAuthSettings>()
            .await?;
        model.apply_to(&mut settings);
        self.host.settings.save_setting(&settings).await?;

        tracing::info!("Yahoo authentication settings saved");

        let saved = self.resource(defaults::SAVED_RESOURCE).await?;
        Notifications::push(session, Notification::success(saved)).await?;

        self.configure(session).await
    }

    async fn is_method_available(&self, session: &Session, headers: &HeaderMap) -> Result<bool> {
        let customer: Customer = self.host.work_context.current_customer(session).await?;
        let store = self.host.store_context.current_store(headers).await?;
        self.host
            .plugins
            .is_plugin_active(defaults::SYSTEM_NAME, &customer, store.id)
            .await
    }

    /// Redirect to Yahoo
    pub async fn login(
        &self,
        session: &Session,
        headers: &HeaderMap,
        return_url: Option<String>,
    ) -> Result<Response> {
        if !self.is_method_available(session, headers).await? {
            return Err(Error::Plugin(
                "Yahoo authentication module cannot be loaded".to_string(),
            ));
        }

        let settings = self
            .host
            .settings
            .load_setting::<YahooExternalAuthSettings>()
            .await?;
        if !settings.is_configured() {
            return Err(Error::Plugin(
                "Yahoo authentication module not configured".to_string(),
            ));
        }

        let mut properties = AuthenticationProperties::with_redirect_uri(with_return_url(
            defaults::CALLBACK_PATH,
            return_url.as_deref(),
        ));
        properties.set_string(
            defaults::ERROR_CALLBACK,
            Some(with_return_url(&self.login_path, return_url.as_deref())),
        );

        self.schemes
            .challenge(session, defaults::AUTHENTICATION_SCHEME, properties)
            .await
    }

    /// Submit the Yahoo identity to the host
    pub async fn login_callback(
        &self,
        session: &Session,
        return_url: Option<String>,
    ) -> Result<Response> {
        let result = self
            .schemes
            .authenticate(session, defaults::AUTHENTICATION_SCHEME)
            .await?;

        let Some(principal) = result.principal().filter(|p| p.has_claims()) else {
            tracing::debug!("No Yahoo identity on callback, back to login");
            return Ok(Redirect::to(&self.login_path).into_response());
        };

        let access_token = self
            .schemes
            .get_token(session, defaults::AUTHENTICATION_SCHEME, defaults::ACCESS_TOKEN)
            .await?;

        let parameters = ExternalAuthenticationParameters::from_principal(
            defaults::SYSTEM_NAME,
            access_token,
            principal,
        );

        self.host
            .external_authentication
            .authenticate(parameters, return_url, session)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_return_url() {
        assert_eq!(with_return_url("/login", None), "/login");
        assert_eq!(with_return_url("/login", Some("")), "/login");
        assert_eq!(
            with_return_url("/login", Some("/cart?x=1")),
            "/login?returnUrl=%2Fcart%3Fx%3D1"
        );
    }
}
