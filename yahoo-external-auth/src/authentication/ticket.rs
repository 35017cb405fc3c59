//! Authentication properties, tickets and their session persistence

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::claims::ClaimsPrincipal;
use crate::error::Result;

const TICKET_KEY_PREFIX: &str = "_auth_ticket.";

/// Named token saved from the OAuth token response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationToken {
    /// Token name (`access_token`, `refresh_token`, `token_type`, `expires_at`)
    pub name: String,
    /// Token value
    pub value: String,
}

/// State carried through an authentication round trip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationProperties {
    /// Where to send the user once the remote step succeeds
    pub redirect_uri: Option<String>,

    /// Free-form items
    #[serde(default)]
    pub items: BTreeMap<String, String>,

    /// Tokens saved from the provider
    #[serde(default)]
    pub tokens: Vec<AuthenticationToken>,
}

impl AuthenticationProperties {
    /// Properties redirecting to `redirect_uri` on success
    pub fn with_redirect_uri(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: Some(redirect_uri.into()),
            ..Self::default()
        }
    }

    /// Set an item; `None` removes it
    pub fn set_string(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.items.insert(key, value);
            }
            None => {
                self.items.remove(&key);
            }
        }
    }

    /// Get an item
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Replace the saved tokens
    pub fn store_tokens(&mut self, tokens: Vec<AuthenticationToken>) {
        self.tokens = tokens;
    }

    /// Value of a saved token
    pub fn get_token_value(&self, name: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }
}

/// Outcome of a remote sign-in, persisted for the scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationTicket {
    /// Scheme that produced the ticket
    pub scheme: String,
    /// Authenticated identity
    pub principal: ClaimsPrincipal,
    /// Round-trip properties, including saved tokens
    pub properties: AuthenticationProperties,
}

impl AuthenticationTicket {
    fn session_key(scheme: &str) -> String {
        format!("{}{}", TICKET_KEY_PREFIX, scheme)
    }

    /// Persist the ticket in the session, replacing any previous ticket for the scheme
    pub async fn store(&self, session: &Session) -> Result<()> {
        session
            .insert(&Self::session_key(&self.scheme), self)
            .await?;
        Ok(())
    }

    /// Load the ticket stored for a scheme
    pub async fn load(session: &Session, scheme: &str) -> Result<Option<Self>> {
        Ok(session.get(&Self::session_key(scheme)).await?)
    }

    /// Remove the ticket stored for a scheme
    pub async fn remove(session: &Session, scheme: &str) -> Result<Option<Self>> {
        Ok(session.remove(&Self::session_key(scheme)).await?)
    }
}

/// Result of authenticating against a scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticateResult {
    /// A ticket was found
    Success(Box<AuthenticationTicket>),
    /// Nothing to authenticate with
    NoResult,
    /// Authentication was attempted and failed
    Fail(String),
}

impl AuthenticateResult {
    /// Whether authentication succeeded
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Authenticated principal, on success
    pub fn principal(&self) -> Option<&ClaimsPrincipal> {
        match self {
            Self::Success(ticket) => Some(&ticket.principal),
            _ => None,
        }
    }

    /// Ticket properties, on success
    pub fn properties(&self) -> Option<&AuthenticationProperties> {
        match self {
            Self::Success(ticket) => Some(&ticket.properties),
            _ => None,
        }
    }
}
