//! OAuth2 authorization-code handler
//!
//! The protocol work (authorization URL, PKCE, code exchange) is done by the
//! `oauth2` crate; this handler drives it from the session: `challenge` stashes
//! a [`Correlation`] and redirects to the provider, the remote callback consumes
//! it, exchanges the code, fetches user information and stores an
//! [`AuthenticationTicket`] for the scheme.

use std::sync::Arc;

use async_trait::async_trait;
use axum::response::{IntoResponse, Redirect, Response};
use oauth2::{
    basic::BasicErrorResponse, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret,
    CsrfToken, EmptyExtraTokenFields, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
    StandardRevocableToken, StandardTokenIntrospectionResponse, StandardTokenResponse,
    TokenResponse, TokenUrl,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tower_sessions::Session;

use super::claims::{Claim, ClaimKind, ClaimsPrincipal};
use super::scheme::AuthenticationHandler;
use super::state::{generate_state, Correlation};
use super::ticket::{AuthenticationProperties, AuthenticationTicket, AuthenticationToken};
use crate::error::{Error, Result};

/// Type alias for our configured OAuth client
type ConfiguredClient = Client<
    BasicErrorResponse,
    StandardTokenResponse<EmptyExtraTokenFields, oauth2::basic::BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, oauth2::basic::BasicTokenType>,
    StandardRevocableToken,
    BasicErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

/// Target claim of a user-information field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimTarget {
    /// Well-known claim kind
    Kind(ClaimKind),
    /// Provider-specific claim type
    Custom(&'static str),
}

/// Maps one user-information JSON field to a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimAction {
    /// Top-level field of the user-information document
    pub json_key: &'static str,
    /// Claim produced from the field
    pub target: ClaimTarget,
}

impl ClaimAction {
    /// Map a field to a well-known claim kind
    pub const fn kind(json_key: &'static str, kind: ClaimKind) -> Self {
        Self {
            json_key,
            target: ClaimTarget::Kind(kind),
        }
    }

    /// Map a field to a provider-specific claim type
    pub const fn custom(json_key: &'static str, claim_type: &'static str) -> Self {
        Self {
            json_key,
            target: ClaimTarget::Custom(claim_type),
        }
    }

    fn claim(&self, value: String, issuer: &str) -> Claim {
        match self.target {
            ClaimTarget::Kind(kind) => Claim::new(kind, value, issuer),
            ClaimTarget::Custom(claim_type) => Claim::custom(claim_type, value, issuer),
        }
    }
}

/// Failure raised while completing the remote step
#[derive(Debug, Clone)]
pub struct RemoteFailureContext {
    /// Scheme that failed
    pub scheme: String,
    /// Failure description
    pub failure: String,
    /// Round-trip properties, when the pending correlation could be recovered
    pub properties: Option<AuthenticationProperties>,
}

/// Hook deciding the response to a remote failure
///
/// Returning `Some` marks the failure handled; `None` falls back to the
/// default 401 response.
pub type RemoteFailureHook = Arc<dyn Fn(&RemoteFailureContext) -> Option<Response> + Send + Sync>;

/// Event hooks of the OAuth handler
#[derive(Clone, Default)]
pub struct OAuthEvents {
    /// Invoked when the remote step fails
    pub on_remote_failure: Option<RemoteFailureHook>,
}

/// Default lifetime of a pending correlation (10 minutes)
pub const DEFAULT_CORRELATION_TTL_SECS: u64 = 600;

/// Options of an OAuth2 scheme
#[derive(Clone)]
pub struct OAuthOptions {
    /// OAuth2 client identifier
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Path the provider redirects back to, relative to the store location
    pub callback_path: String,
    /// Scopes requested at challenge time
    pub scopes: Vec<String>,
    /// Keep access / refresh tokens in the ticket properties
    pub save_tokens: bool,
    /// Provider authorization endpoint
    pub authorization_endpoint: String,
    /// Provider token endpoint
    pub token_endpoint: String,
    /// Provider user-information endpoint
    pub user_information_endpoint: String,
    /// User-information fields turned into claims
    pub claim_actions: Vec<ClaimAction>,
    /// How long a challenge may stay pending before its callback is refused
    pub correlation_ttl_secs: u64,
    /// Event hooks
    pub events: OAuthEvents,
}

impl Default for OAuthOptions {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            callback_path: String::new(),
            scopes: Vec::new(),
            save_tokens: false,
            authorization_endpoint: String::new(),
            token_endpoint: String::new(),
            user_information_endpoint: String::new(),
            claim_actions: Vec::new(),
            correlation_ttl_secs: DEFAULT_CORRELATION_TTL_SECS,
            events: OAuthEvents::default(),
        }
    }
}

impl std::fmt::Debug for OAuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthOptions")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_path", &self.callback_path)
            .field("scopes", &self.scopes)
            .field("save_tokens", &self.save_tokens)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("user_information_endpoint", &self.user_information_endpoint)
            .field("correlation_ttl_secs", &self.correlation_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl OAuthOptions {
    fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::Plugin("The 'ClientId' option must be provided".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(Error::Plugin(
                "The 'ClientSecret' option must be provided".to_string(),
            ));
        }
        if self.callback_path.is_empty() {
            return Err(Error::Plugin(
                "The 'CallbackPath' option must be provided".to_string(),
            ));
        }
        Ok(())
    }
}

/// Produces the options of a scheme each time the handler needs them
///
/// Options are resolved lazily so that settings saved at runtime take effect
/// on the next challenge.
#[async_trait]
pub trait ConfigureOAuthOptions: Send + Sync {
    /// Fill in the options
    async fn configure(&self, options: &mut OAuthOptions) -> Result<()>;
}

/// Query parameters the provider sends to the callback path
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteCallback {
    /// Authorization code
    pub code: Option<String>,
    /// State value echoed by the provider
    pub state: Option<String>,
    /// Error code, when the user or provider aborted
    pub error: Option<String>,
    /// Human readable error description
    pub error_description: Option<String>,
}

impl RemoteCallback {
    /// Whether the request is a provider redirect this handler must complete
    pub fn is_remote_response(&self) -> bool {
        self.state.is_some() || self.error.is_some()
    }
}

struct RemoteFailure {
    message: String,
    properties: Option<AuthenticationProperties>,
}

impl RemoteFailure {
    fn new(message: impl Into<String>, properties: Option<AuthenticationProperties>) -> Self {
        Self {
            message: message.into(),
            properties,
        }
    }
}

/// OAuth2 authorization-code handler for one scheme
pub struct OAuthHandler {
    scheme: String,
    store_location: String,
    configure: Arc<dyn ConfigureOAuthOptions>,
    http_client: HttpClient,
}

impl OAuthHandler {
    /// Create a handler
    ///
    /// `store_location` is the public base URL the callback path is appended to.
    pub fn new(
        scheme: impl Into<String>,
        store_location: impl Into<String>,
        configure: Arc<dyn ConfigureOAuthOptions>,
    ) -> Result<Self> {
        let http_client = HttpClient::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent("yahoo-external-auth")
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            scheme: scheme.into(),
            store_location: store_location.into(),
            configure,
            http_client,
        })
    }

    /// Resolve the current options
    pub async fn options(&self) -> Result<OAuthOptions> {
        let mut options = OAuthOptions::default();
        self.configure.configure(&mut options).await?;
        Ok(options)
    }

    fn redirect_uri(&self, options: &OAuthOptions) -> String {
        format!(
            "{}{}",
            self.store_location.trim_end_matches('/'),
            options.callback_path
        )
    }

    fn client(&self, options: &OAuthOptions) -> Result<ConfiguredClient> {
        options.validate()?;

        let client = Client::new(ClientId::new(options.client_id.clone()))
            .set_client_secret(ClientSecret::new(options.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(options.authorization_endpoint.clone())
                    .map_err(|e| Error::Plugin(format!("Invalid authorization endpoint: {}", e)))?,
            )
            .set_token_uri(
                TokenUrl::new(options.token_endpoint.clone())
                    .map_err(|e| Error::Plugin(format!("Invalid token endpoint: {}", e)))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri(options))
                    .map_err(|e| Error::Plugin(format!("Invalid redirect URI: {}", e)))?,
            );

        Ok(client)
    }

    async fn complete(
        &self,
        session: &Session,
        callback: RemoteCallback,
    ) -> std::result::Result<Response, RemoteFailure> {
        let correlation = Correlation::peek(session, &self.scheme)
            .await
            .map_err(|e| RemoteFailure::new(e.to_string(), None))?
            .ok_or_else(|| RemoteFailure::new("The oauth state was missing or invalid.", None))?;

        // A mismatched state leaves the pending correlation for the real callback
        if callback.state.as_deref() != Some(correlation.state.as_str()) {
            return Err(RemoteFailure::new(
                "The oauth state was missing or invalid.",
                Some(correlation.properties),
            ));
        }

        let properties = correlation.properties;
        let fail = |e: Error| RemoteFailure::new(e.to_string(), Some(properties.clone()));

        Correlation::take(session, &self.scheme).await.map_err(fail)?;
        let options = self.options().await.map_err(fail)?;

        if Correlation::is_expired(
            correlation.created_at,
            options.correlation_ttl_secs,
            chrono::Utc::now().timestamp(),
        ) {
            return Err(RemoteFailure::new(
                "The oauth state has expired.",
                Some(properties),
            ));
        }

        if let Some(error) = callback.error {
            let message = match callback.error_description {
                Some(description) => format!("{} ({})", error, description),
                None => error,
            };
            return Err(RemoteFailure::new(message, Some(properties)));
        }

        let Some(code) = callback.code.filter(|c| !c.is_empty()) else {
            return Err(RemoteFailure::new("Code was not found.", Some(properties)));
        };

        let client = self.client(&options).map_err(fail)?;

        let token_result = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(correlation.pkce_verifier))
            .request_async(&self.http_client)
            .await
            .map_err(|e| fail(Error::External(format!("Token exchange failed: {}", e))))?;

        let access_token = token_result.access_token().secret().clone();
        let user_info = self
            .fetch_user_info(&options, &access_token)
            .await
            .map_err(fail)?;

        let principal = ClaimsPrincipal::new(
            self.scheme.clone(),
            map_claims(&options.claim_actions, &user_info, &self.scheme),
        );

        let mut properties = properties;
        if options.save_tokens {
            let mut tokens = vec![AuthenticationToken {
                name: "access_token".to_string(),
                value: access_token,
            }];
            if let Some(refresh) = token_result.refresh_token() {
                tokens.push(AuthenticationToken {
                    name: "refresh_token".to_string(),
                    value: refresh.secret().clone(),
                });
            }
            tokens.push(AuthenticationToken {
                name: "token_type".to_string(),
                value: token_result.token_type().as_ref().to_string(),
            });
            if let Some(expires_at) = token_result
                .expires_in()
                .and_then(|expires_in| token_expiry(chrono::Utc::now(), expires_in))
            {
                tokens.push(AuthenticationToken {
                    name: "expires_at".to_string(),
                    value: expires_at.to_rfc3339(),
                });
            }
            properties.store_tokens(tokens);
        }

        let redirect_to = properties
            .redirect_uri
            .clone()
            .unwrap_or_else(|| "/".to_string());

        let ticket = AuthenticationTicket {
            scheme: self.scheme.clone(),
            principal,
            properties,
        };
        ticket
            .store(session)
            .await
            .map_err(|e| RemoteFailure::new(e.to_string(), Some(ticket.properties.clone())))?;

        tracing::info!(
            scheme = %self.scheme,
            claims = ticket.principal.claims.len(),
            "Remote sign-in completed"
        );

        Ok(Redirect::to(&redirect_to).into_response())
    }

    async fn fetch_user_info(
        &self,
        options: &OAuthOptions,
        access_token: &str,
    ) -> Result<serde_json::Value> {
        let response = self
            .http_client
            .get(&options.user_information_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::External(format!("Failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "User info request failed: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::External(format!("Failed to parse user info: {}", e)))
    }

    async fn remote_failure(&self, failure: RemoteFailure) -> Response {
        tracing::warn!(scheme = %self.scheme, failure = %failure.message, "Remote authentication failed");

        let context = RemoteFailureContext {
            scheme: self.scheme.clone(),
            failure: failure.message,
            properties: failure.properties,
        };

        if let Ok(options) = self.options().await {
            if let Some(hook) = &options.events.on_remote_failure {
                if let Some(response) = hook(&context) {
                    return response;
                }
            }
        }

        Error::Unauthorized(format!(
            "An error was encountered while handling the remote login: {}",
            context.failure
        ))
        .into_response()
    }
}

/// Absolute expiry of a token issued at `now`
///
/// `None` when the provider's lifetime does not fit a timestamp.
fn token_expiry(
    now: chrono::DateTime<chrono::Utc>,
    expires_in: std::time::Duration,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let secs = i64::try_from(expires_in.as_secs()).ok()?;
    now.checked_add_signed(chrono::Duration::try_seconds(secs)?)
}

/// Turn a user-information document into claims
///
/// Missing and null fields are skipped; scalars are stringified; nested
/// objects and arrays are ignored.
pub fn map_claims(actions: &[ClaimAction], user_info: &serde_json::Value, issuer: &str) -> Vec<Claim> {
    actions
        .iter()
        .filter_map(|action| {
            let value = match user_info.get(action.json_key)? {
                serde_json::Value::String(s) if !s.is_empty() => s.clone(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some(action.claim(value, issuer))
        })
        .collect()
}

#[async_trait]
impl AuthenticationHandler for OAuthHandler {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn challenge(
        &self,
        session: &Session,
        properties: AuthenticationProperties,
    ) -> Result<Response> {
        let options = self.options().await?;
        let client = self.client(&options)?;

        let state = generate_state();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client.authorize_url(|| CsrfToken::new(state.clone()));
        for scope in &options.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }
        let (url, _) = auth_request.set_pkce_challenge(pkce_challenge).url();

        Correlation {
            state,
            pkce_verifier: pkce_verifier.secret().clone(),
            properties,
            created_at: chrono::Utc::now().timestamp(),
        }
        .store(session, &self.scheme)
        .await?;

        tracing::info!(scheme = %self.scheme, "Issuing OAuth challenge");

        Ok(Redirect::to(url.as_str()).into_response())
    }

    async fn handle_remote_callback(&self, session: &Session, callback: RemoteCallback) -> Response {
        match self.complete(session, callback).await {
            Ok(response) => response,
            Err(failure) => self.remote_failure(failure).await,
        }
    }
}
