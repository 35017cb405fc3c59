//! Registration of the Yahoo OAuth scheme
//!
//! Options are rebuilt from the stored settings whenever the handler needs
//! them, so credentials saved on the admin page apply to the next login
//! without re-registering the scheme. Nothing is validated here: missing
//! credentials surface when the challenge is issued.

use std::sync::Arc;

use async_trait::async_trait;
use axum::response::{IntoResponse, Redirect};

use crate::authentication::{
    AuthenticationBuilder, ClaimAction, ClaimKind, ConfigureOAuthOptions, OAuthEvents,
    OAuthHandler, OAuthOptions, RemoteFailureContext, RemoteFailureHook,
};
use crate::defaults;
use crate::error::Result;
use crate::settings::{SettingService, SettingServiceExt, YahooExternalAuthSettings};

/// Fields of the Yahoo OpenID user-information document turned into claims
pub const YAHOO_CLAIM_ACTIONS: [ClaimAction; 10] = [
    ClaimAction::kind("sub", ClaimKind::NameIdentifier),
    ClaimAction::kind("name", ClaimKind::Name),
    ClaimAction::kind("given_name", ClaimKind::GivenName),
    ClaimAction::kind("family_name", ClaimKind::Surname),
    ClaimAction::kind("email", ClaimKind::Email),
    ClaimAction::kind("locale", ClaimKind::Locale),
    ClaimAction::kind("picture", ClaimKind::Picture),
    ClaimAction::kind("gender", ClaimKind::Gender),
    ClaimAction::kind("birthdate", ClaimKind::DateOfBirth),
    ClaimAction::custom("nickname", "urn:yahoo:nickname"),
];

/// Provider endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YahooEndpoints {
    /// Authorization endpoint
    pub authorization: String,
    /// Token endpoint
    pub token: String,
    /// User information endpoint
    pub user_information: String,
}

impl Default for YahooEndpoints {
    fn default() -> Self {
        Self {
            authorization: defaults::AUTHORIZATION_ENDPOINT.to_string(),
            token: defaults::TOKEN_ENDPOINT.to_string(),
            user_information: defaults::USER_INFORMATION_ENDPOINT.to_string(),
        }
    }
}

/// Registers the Yahoo scheme with the host authentication builder
#[derive(Clone)]
pub struct YahooAuthenticationRegistrar {
    settings: Arc<dyn SettingService>,
    store_location: String,
    endpoints: YahooEndpoints,
}

impl YahooAuthenticationRegistrar {
    /// Create a registrar reading credentials from `settings`
    pub fn new(settings: Arc<dyn SettingService>, store_location: impl Into<String>) -> Self {
        Self {
            settings,
            store_location: store_location.into(),
            endpoints: YahooEndpoints::default(),
        }
    }

    /// Talk to other endpoints than Yahoo's
    pub fn with_endpoints(mut self, endpoints: YahooEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Register the scheme
    pub fn configure(&self, builder: &mut AuthenticationBuilder) -> Result<()> {
        let handler = OAuthHandler::new(
            defaults::AUTHENTICATION_SCHEME,
            self.store_location.clone(),
            Arc::new(self.clone()),
        )?;
        builder.add_scheme(Arc::new(handler));

        tracing::info!(
            scheme = defaults::AUTHENTICATION_SCHEME,
            callback_path = defaults::CALLBACK_PATH,
            "Yahoo authentication scheme registered"
        );
        Ok(())
    }
}

/// Redirect to the error URL stashed at login, when there is one
fn redirect_to_error_callback() -> RemoteFailureHook {
    Arc::new(|context: &RemoteFailureContext| {
        let error_url = context
            .properties
            .as_ref()?
            .get_string(defaults::ERROR_CALLBACK)?;
        Some(Redirect::to(error_url).into_response())
    })
}

#[async_trait]
impl ConfigureOAuthOptions for YahooAuthenticationRegistrar {
    async fn configure(&self, options: &mut OAuthOptions) -> Result<()> {
        let settings = self
            .settings
            .load_setting::<YahooExternalAuthSettings>()
            .await?;

        options.client_id = settings.client_key_identifier;
        options.client_secret = settings.client_secret;
        options.scopes = defaults::SCOPES.iter().map(|s| s.to_string()).collect();
        options.callback_path = defaults::CALLBACK_PATH.to_string();
        options.save_tokens = true;
        options.authorization_endpoint = self.endpoints.authorization.clone();
        options.token_endpoint = self.endpoints.token.clone();
        options.user_information_endpoint = self.endpoints.user_information.clone();
        options.claim_actions = YAHOO_CLAIM_ACTIONS.to_vec();
        options.events = OAuthEvents {
            on_remote_failure: Some(redirect_to_error_callback()),
        };

        Ok(())
    }
}
