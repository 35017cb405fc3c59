//! External authentication record and the host service that consumes it

use async_trait::async_trait;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::authentication::{ClaimKind, ClaimsPrincipal};
use crate::error::Result;

/// Claim handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAuthenticationClaim {
    /// Claim type
    pub claim_type: String,
    /// Claim value
    pub value: String,
}

impl ExternalAuthenticationClaim {
    /// Create a claim
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Result of a successful external sign-in, submitted to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAuthenticationParameters {
    /// System name of the plugin that authenticated the user
    pub provider_system_name: String,
    /// Provider access token
    pub access_token: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Unique identifier at the provider
    pub external_identifier: Option<String>,
    /// Display name at the provider
    pub external_display_identifier: Option<String>,
    /// Every claim of the principal
    pub claims: Vec<ExternalAuthenticationClaim>,
}

impl ExternalAuthenticationParameters {
    /// Build the record from an authenticated principal
    ///
    /// Record fields are filled from the first claim of their kind.
    pub fn from_principal(
        provider_system_name: impl Into<String>,
        access_token: Option<String>,
        principal: &ClaimsPrincipal,
    ) -> Self {
        let mut parameters = Self {
            provider_system_name: provider_system_name.into(),
            access_token,
            claims: principal
                .claims
                .iter()
                .map(|c| ExternalAuthenticationClaim::new(&c.claim_type, &c.value))
                .collect(),
            ..Self::default()
        };

        for claim in &principal.claims {
            let Some(kind) = claim.kind() else {
                continue;
            };
            let field = match kind {
                ClaimKind::Email => &mut parameters.email,
                ClaimKind::NameIdentifier => &mut parameters.external_identifier,
                ClaimKind::Name => &mut parameters.external_display_identifier,
                ClaimKind::GivenName
                | ClaimKind::Surname
                | ClaimKind::Locale
                | ClaimKind::Picture
                | ClaimKind::Gender
                | ClaimKind::DateOfBirth => continue,
            };
            if field.is_none() {
                *field = Some(claim.value.clone());
            }
        }

        parameters
    }
}

/// Host account linking, creation and sign-in
#[async_trait]
pub trait ExternalAuthenticationService: Send + Sync {
    /// Sign the user in (or register / link them) and produce the response
    async fn authenticate(
        &self,
        parameters: ExternalAuthenticationParameters,
        return_url: Option<String>,
        session: &Session,
    ) -> Result<Response>;
}
