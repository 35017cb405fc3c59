//! Claims and the identity they describe

use serde::{Deserialize, Serialize};

/// Well-known claim kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimKind {
    /// Unique identifier of the user at the provider
    NameIdentifier,
    /// Display name
    Name,
    /// Given name
    GivenName,
    /// Family name
    Surname,
    /// Email address
    Email,
    /// Preferred locale
    Locale,
    /// Profile picture URL
    Picture,
    /// Gender
    Gender,
    /// Date of birth
    DateOfBirth,
}

impl ClaimKind {
    /// Every known kind
    pub const ALL: [ClaimKind; 9] = [
        ClaimKind::NameIdentifier,
        ClaimKind::Name,
        ClaimKind::GivenName,
        ClaimKind::Surname,
        ClaimKind::Email,
        ClaimKind::Locale,
        ClaimKind::Picture,
        ClaimKind::Gender,
        ClaimKind::DateOfBirth,
    ];

    /// Claim type string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameIdentifier => "nameidentifier",
            Self::Name => "name",
            Self::GivenName => "givenname",
            Self::Surname => "surname",
            Self::Email => "email",
            Self::Locale => "locale",
            Self::Picture => "picture",
            Self::Gender => "gender",
            Self::DateOfBirth => "dateofbirth",
        }
    }

    /// Parse a claim type string
    pub fn from_claim_type(claim_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == claim_type)
    }
}

impl std::fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed key/value assertion about an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type
    pub claim_type: String,
    /// Claim value
    pub value: String,
    /// Authority that issued the claim
    pub issuer: String,
}

impl Claim {
    /// Create a claim of a well-known kind
    pub fn new(kind: ClaimKind, value: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            claim_type: kind.as_str().to_string(),
            value: value.into(),
            issuer: issuer.into(),
        }
    }

    /// Create a claim with an arbitrary type
    pub fn custom(
        claim_type: impl Into<String>,
        value: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            issuer: issuer.into(),
        }
    }

    /// Well-known kind of this claim, if any
    pub fn kind(&self) -> Option<ClaimKind> {
        ClaimKind::from_claim_type(&self.claim_type)
    }
}

/// Authenticated identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsPrincipal {
    /// Scheme that authenticated the identity
    pub authentication_type: Option<String>,
    /// Claims about the identity
    pub claims: Vec<Claim>,
}

impl ClaimsPrincipal {
    /// Create a principal authenticated by `authentication_type`
    pub fn new(authentication_type: impl Into<String>, claims: Vec<Claim>) -> Self {
        Self {
            authentication_type: Some(authentication_type.into()),
            claims,
        }
    }

    /// First claim of the given kind
    pub fn find_first(&self, kind: ClaimKind) -> Option<&Claim> {
        self.claims.iter().find(|c| c.kind() == Some(kind))
    }

    /// Value of the first claim of the given kind
    pub fn find_first_value(&self, kind: ClaimKind) -> Option<&str> {
        self.find_first(kind).map(|c| c.value.as_str())
    }

    /// Whether the principal carries any claim
    pub fn has_claims(&self) -> bool {
        !self.claims.is_empty()
    }
}
