//! # yahoo-external-auth
//!
//! "Login with Yahoo" external authentication plugin for axum storefronts.
//!
//! ## Features
//!
//! - **OAuth2 sign-in**: authorization-code flow with PKCE against Yahoo, user
//!   information mapped to claims
//! - **Admin page**: permission-gated settings form with antiforgery protection
//! - **Host hand-off**: the signed-in identity is submitted to the host's
//!   [`ExternalAuthenticationService`](external::ExternalAuthenticationService),
//!   which owns account linking and sign-in
//! - **Lifecycle**: install / uninstall of settings and locale resources
//!
//! ## Example
//!
//! ```rust,no_run
//! use yahoo_external_auth::prelude::*;
//!
//! # async fn run(host: HostServices) -> Result<()> {
//! let config = Config::load()?;
//! init_tracing(&config)?;
//!
//! let plugin = YahooAuthenticationMethod::new(
//!     host.settings.clone(),
//!     host.localization.clone(),
//!     config.service.store_location(),
//! );
//! plugin.install().await?;
//!
//! let app = build_router(&config, host)?;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod antiforgery;
pub mod authentication;
pub mod component;
pub mod config;
pub mod controller;
pub mod defaults;
pub mod error;
pub mod external;
pub mod host;
pub mod localization;
pub mod models;
pub mod notifications;
pub mod observability;
pub mod plugin;
pub mod registrar;
pub mod routes;
pub mod session;
pub mod settings;
pub mod views;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::authentication::{
        AuthenticateResult, AuthenticationBuilder, AuthenticationProperties,
        AuthenticationSchemes, Claim, ClaimKind, ClaimsPrincipal,
    };
    pub use crate::component::{ViewComponent, YahooAuthenticationViewComponent};
    pub use crate::config::Config;
    pub use crate::controller::YahooAuthenticationController;
    pub use crate::error::{Error, Result};
    pub use crate::external::{
        ExternalAuthenticationClaim, ExternalAuthenticationParameters,
        ExternalAuthenticationService,
    };
    pub use crate::host::{
        AuthenticationPluginManager, Customer, HostServices, PermissionService,
        StandardPermission, Store, StoreContext, WorkContext,
    };
    pub use crate::localization::{InMemoryLocalizationService, LocalizationService};
    pub use crate::observability::init_tracing;
    pub use crate::plugin::{ExternalAuthenticationMethod, Plugin, YahooAuthenticationMethod};
    pub use crate::registrar::{YahooAuthenticationRegistrar, YahooEndpoints};
    pub use crate::routes::{build_router, build_router_with_endpoints};
    pub use crate::settings::{
        InMemorySettingService, SettingService, SettingServiceExt, YahooExternalAuthSettings,
    };
}
