//! Antiforgery tokens for the admin configuration form
//!
//! A random token is kept in the session and rendered into the form as a
//! hidden field. A POST is accepted only when the field matches the session
//! token.

use rand::Rng;
use tower_sessions::Session;

use crate::error::{Error, Result};

const ANTIFORGERY_SESSION_KEY: &str = "_antiforgery_token";

/// Name of the hidden form field carrying the token
pub const ANTIFORGERY_FIELD: &str = "__RequestVerificationToken";

const TOKEN_LENGTH: usize = 32;

/// Antiforgery token bound to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntiforgeryToken(String);

impl AntiforgeryToken {
    /// Raw token string
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Name of the form field the token is posted in
    pub fn field_name(&self) -> &'static str {
        ANTIFORGERY_FIELD
    }

    fn generate() -> Self {
        let token: String = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Token stored in the session, created on first use
    pub async fn get_or_create(session: &Session) -> Result<Self> {
        if let Some(token) = session
            .get::<String>(ANTIFORGERY_SESSION_KEY)
            .await
            .map_err(|e| Error::Session(format!("Failed to read antiforgery token: {e}")))?
        {
            return Ok(Self(token));
        }

        let token = Self::generate();
        session
            .insert(ANTIFORGERY_SESSION_KEY, &token.0)
            .await
            .map_err(|e| Error::Session(format!("Failed to store antiforgery token: {e}")))?;

        Ok(token)
    }

    /// Check a posted token against the session token
    pub async fn validate(session: &Session, provided: Option<&str>) -> Result<()> {
        let expected: Option<String> = session
            .get(ANTIFORGERY_SESSION_KEY)
            .await
            .map_err(|e| Error::Session(format!("Failed to read antiforgery token: {e}")))?;

        let Some(expected) = expected else {
            tracing::warn!("Antiforgery validation failed: no token in session");
            return Err(Error::BadRequest(
                "The antiforgery token could not be decrypted".to_string(),
            ));
        };

        match provided {
            Some(provided) if constant_time_compare(&expected, provided) => Ok(()),
            Some(_) => {
                tracing::warn!("Antiforgery validation failed: token mismatch");
                Err(Error::BadRequest("The antiforgery token is invalid".to_string()))
            }
            None => {
                tracing::warn!("Antiforgery validation failed: no token provided");
                Err(Error::BadRequest(format!(
                    "The required antiforgery form field \"{}\" is not present",
                    ANTIFORGERY_FIELD
                )))
            }
        }
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions_memory_store::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_token_is_stable_within_session() {
        let session = session();
        let first = AntiforgeryToken::get_or_create(&session).await.unwrap();
        let second = AntiforgeryToken::get_or_create(&session).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.token().len(), 32);
    }

    #[tokio::test]
    async fn test_validate() {
        let session = session();
        let token = AntiforgeryToken::get_or_create(&session).await.unwrap();

        assert!(AntiforgeryToken::validate(&session, Some(token.token()))
            .await
            .is_ok());
        assert!(matches!(
            AntiforgeryToken::validate(&session, Some("forged")).await,
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            AntiforgeryToken::validate(&session, None).await,
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_validate_without_session_token() {
        assert!(AntiforgeryToken::validate(&session(), Some("x"))
            .await
            .is_err());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
    }
}
