//! OAuth state management for CSRF protection
//!
//! A pending authorization is stashed in the session under the scheme name
//! together with its random `state` value and PKCE verifier. The callback
//! consumes it exactly once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::ticket::AuthenticationProperties;
use crate::error::Result;

const CORRELATION_KEY_PREFIX: &str = "_oauth_correlation.";

/// Data stored while the user is away at the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correlation {
    /// State value sent to the provider
    pub state: String,

    /// PKCE code verifier matching the challenge sent to the provider
    pub pkce_verifier: String,

    /// Round-trip properties
    pub properties: AuthenticationProperties,

    /// When the challenge was issued (Unix timestamp)
    pub created_at: i64,
}

impl Correlation {
    fn session_key(scheme: &str) -> String {
        format!("{}{}", CORRELATION_KEY_PREFIX, scheme)
    }

    /// Stash the correlation, replacing any pending one for the scheme
    pub async fn store(&self, session: &Session, scheme: &str) -> Result<()> {
        session.insert(&Self::session_key(scheme), self).await?;
        Ok(())
    }

    /// Pending correlation for the scheme, left in place
    pub async fn peek(session: &Session, scheme: &str) -> Result<Option<Self>> {
        Ok(session.get(&Self::session_key(scheme)).await?)
    }

    /// Whether a correlation issued at `created_at` is older than `ttl_secs` at `now`
    pub fn is_expired(created_at: i64, ttl_secs: u64, now: i64) -> bool {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        now.saturating_sub(created_at) > ttl
    }

    /// Remove and return the pending correlation for the scheme
    pub async fn take(session: &Session, scheme: &str) -> Result<Option<Self>> {
        Ok(session.remove(&Self::session_key(scheme)).await?)
    }
}

/// Generate a cryptographically secure random state value
pub fn generate_state() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::rng().random();
    base64_url_encode(&bytes)
}

/// Base64 URL-safe encoding without padding
fn base64_url_encode(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions_memory_store::MemoryStore;

    #[test]
    fn test_generate_state_uniqueness() {
        let state1 = generate_state();
        let state2 = generate_state();
        assert_ne!(state1, state2);
        // Base64 URL-safe encoding of 32 bytes = 43 chars (without padding)
        assert_eq!(state1.len(), 43);
    }

    #[tokio::test]
    async fn test_correlation_is_consumed_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let correlation = Correlation {
            state: generate_state(),
            pkce_verifier: "verifier".to_string(),
            properties: AuthenticationProperties::with_redirect_uri("/cb"),
            created_at: 1_700_000_000,
        };

        correlation.store(&session, "Yahoo").await.unwrap();

        let taken = Correlation::take(&session, "Yahoo").await.unwrap().unwrap();
        assert_eq!(taken.state, correlation.state);
        assert_eq!(taken.properties.redirect_uri.as_deref(), Some("/cb"));

        assert!(Correlation::take(&session, "Yahoo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_peek_leaves_correlation_pending() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let correlation = Correlation {
            state: generate_state(),
            pkce_verifier: "verifier".to_string(),
            properties: AuthenticationProperties::default(),
            created_at: 1_700_000_000,
        };
        correlation.store(&session, "Yahoo").await.unwrap();

        let peeked = Correlation::peek(&session, "Yahoo").await.unwrap().unwrap();
        assert_eq!(peeked.state, correlation.state);
        assert!(Correlation::take(&session, "Yahoo").await.unwrap().is_some());
    }

    #[test]
    fn test_expiry() {
        let issued = 1_700_000_000;
        assert!(!Correlation::is_expired(issued, 600, issued + 600));
        assert!(Correlation::is_expired(issued, 600, issued + 601));
        assert!(!Correlation::is_expired(issued, u64::MAX, i64::MAX));
        assert!(!Correlation::is_expired(issued, 600, i64::MIN));
    }
}
