//! Authentication scheme registry
//!
//! Handlers are registered by name on an [`AuthenticationBuilder`] and frozen
//! into a cheaply cloneable [`AuthenticationSchemes`] that request handlers
//! use to challenge, authenticate and read back saved tokens.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use tower_sessions::Session;

use super::oauth::RemoteCallback;
use super::ticket::{AuthenticateResult, AuthenticationProperties, AuthenticationTicket};
use crate::error::{Error, Result};

/// Handler behind a named scheme
#[async_trait]
pub trait AuthenticationHandler: Send + Sync {
    /// Scheme name
    fn scheme(&self) -> &str;

    /// Start the remote sign-in
    async fn challenge(
        &self,
        session: &Session,
        properties: AuthenticationProperties,
    ) -> Result<Response>;

    /// Complete the remote sign-in from the provider redirect
    async fn handle_remote_callback(&self, session: &Session, callback: RemoteCallback)
        -> Response;
}

/// Collects scheme handlers before the application starts
#[derive(Default)]
pub struct AuthenticationBuilder {
    handlers: HashMap<String, Arc<dyn AuthenticationHandler>>,
}

impl AuthenticationBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its scheme name
    ///
    /// A later registration for the same name replaces the earlier one.
    pub fn add_scheme(&mut self, handler: Arc<dyn AuthenticationHandler>) -> &mut Self {
        let scheme = handler.scheme().to_string();
        if self.handlers.insert(scheme.clone(), handler).is_some() {
            tracing::warn!(scheme = %scheme, "Authentication scheme registered twice");
        }
        self
    }

    /// Whether a scheme is registered
    pub fn contains(&self, scheme: &str) -> bool {
        self.handlers.contains_key(scheme)
    }

    /// Freeze the registrations
    pub fn build(self) -> AuthenticationSchemes {
        AuthenticationSchemes {
            handlers: Arc::new(self.handlers),
        }
    }
}

/// Registered schemes
#[derive(Clone, Default)]
pub struct AuthenticationSchemes {
    handlers: Arc<HashMap<String, Arc<dyn AuthenticationHandler>>>,
}

impl std::fmt::Debug for AuthenticationSchemes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("AuthenticationSchemes")
            .field("schemes", &names)
            .finish()
    }
}

impl AuthenticationSchemes {
    /// Handler for a scheme
    pub fn handler(&self, scheme: &str) -> Result<&Arc<dyn AuthenticationHandler>> {
        self.handlers
            .get(scheme)
            .ok_or_else(|| Error::UnknownScheme(scheme.to_string()))
    }

    /// Whether a scheme is registered
    pub fn contains(&self, scheme: &str) -> bool {
        self.handlers.contains_key(scheme)
    }

    /// Challenge the user with a scheme
    pub async fn challenge(
        &self,
        session: &Session,
        scheme: &str,
        properties: AuthenticationProperties,
    ) -> Result<Response> {
        self.handler(scheme)?.challenge(session, properties).await
    }

    /// Authenticate the current request against a scheme
    pub async fn authenticate(&self, session: &Session, scheme: &str) -> Result<AuthenticateResult> {
        self.handler(scheme)?;

        Ok(match AuthenticationTicket::load(session, scheme).await? {
            Some(ticket) => AuthenticateResult::Success(Box::new(ticket)),
            None => AuthenticateResult::NoResult,
        })
    }

    /// Token saved for a scheme by its last sign-in
    pub async fn get_token(
        &self,
        session: &Session,
        scheme: &str,
        token_name: &str,
    ) -> Result<Option<String>> {
        let result = self.authenticate(session, scheme).await?;
        Ok(result
            .properties()
            .and_then(|p| p.get_token_value(token_name))
            .map(str::to_string))
    }

    /// Forward a provider redirect to the scheme handler
    pub async fn handle_remote_callback(
        &self,
        session: &Session,
        scheme: &str,
        callback: RemoteCallback,
    ) -> Result<Response> {
        Ok(self
            .handler(scheme)?
            .handle_remote_callback(session, callback)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::claims::{Claim, ClaimKind, ClaimsPrincipal};
    use crate::authentication::ticket::AuthenticationToken;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tower_sessions_memory_store::MemoryStore;

    struct NoopHandler;

    #[async_trait]
    impl AuthenticationHandler for NoopHandler {
        fn scheme(&self) -> &str {
            "Noop"
        }

        async fn challenge(
            &self,
            _session: &Session,
            _properties: AuthenticationProperties,
        ) -> Result<Response> {
            Ok(StatusCode::FOUND.into_response())
        }

        async fn handle_remote_callback(
            &self,
            _session: &Session,
            _callback: RemoteCallback,
        ) -> Response {
            StatusCode::NO_CONTENT.into_response()
        }
    }

    fn schemes() -> AuthenticationSchemes {
        let mut builder = AuthenticationBuilder::new();
        builder.add_scheme(Arc::new(NoopHandler));
        builder.build()
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_rejected() {
        let result = schemes()
            .challenge(&session(), "Yahoo", AuthenticationProperties::default())
            .await;
        assert!(matches!(result, Err(Error::UnknownScheme(s)) if s == "Yahoo"));
    }

    #[tokio::test]
    async fn test_authenticate_without_ticket_is_no_result() {
        let result = schemes().authenticate(&session(), "Noop").await.unwrap();
        assert_eq!(result, AuthenticateResult::NoResult);
    }

    #[tokio::test]
    async fn test_get_token_reads_ticket_properties() {
        let session = session();
        let mut properties = AuthenticationProperties::default();
        properties.store_tokens(vec![AuthenticationToken {
            name: "access_token".to_string(),
            value: "tok".to_string(),
        }]);
        AuthenticationTicket {
            scheme: "Noop".to_string(),
            principal: ClaimsPrincipal::new(
                "Noop",
                vec![Claim::new(ClaimKind::Email, "a@b.com", "Noop")],
            ),
            properties,
        }
        .store(&session)
        .await
        .unwrap();

        let schemes = schemes();
        assert!(schemes.authenticate(&session, "Noop").await.unwrap().succeeded());
        assert_eq!(
            schemes.get_token(&session, "Noop", "access_token").await.unwrap(),
            Some("tok".to_string())
        );
        assert_eq!(
            schemes.get_token(&session, "Noop", "refresh_token").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_remote_callback_is_forwarded() {
        let response = schemes()
            .handle_remote_callback(&session(), "Noop", RemoteCallback::default())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
