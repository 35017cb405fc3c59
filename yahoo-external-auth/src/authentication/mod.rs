//! Remote authentication building blocks
//!
//! - [`claims`]: claim kinds and the authenticated principal
//! - [`ticket`]: round-trip properties and the session-persisted ticket
//! - [`state`]: the pending correlation checked on callback
//! - [`oauth`]: the OAuth2 authorization-code handler
//! - [`scheme`]: named scheme registry
//! - [`middleware`]: completion of provider redirects on the callback route

pub mod claims;
pub mod middleware;
pub mod oauth;
pub mod scheme;
pub mod state;
pub mod ticket;

pub use claims::{Claim, ClaimKind, ClaimsPrincipal};
pub use middleware::{remote_authentication, RemoteAuthenticationState};
pub use oauth::{
    ClaimAction, ConfigureOAuthOptions, OAuthEvents, OAuthHandler, OAuthOptions, RemoteCallback,
    RemoteFailureContext, RemoteFailureHook,
};
pub use scheme::{AuthenticationBuilder, AuthenticationHandler, AuthenticationSchemes};
pub use ticket::{
    AuthenticateResult, AuthenticationProperties, AuthenticationTicket, AuthenticationToken,
};
