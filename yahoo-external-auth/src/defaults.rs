//! Plugin constants

/// Name of the view component that displays the login button
pub const VIEW_COMPONENT_NAME: &str = "YahooAuthentication";

/// Plugin system name
pub const SYSTEM_NAME: &str = "ExternalAuth.Yahoo";

/// Authentication scheme the OAuth handler is registered under
pub const AUTHENTICATION_SCHEME: &str = "Yahoo";

/// Properties item holding the URL to land on when the OAuth round trip fails
pub const ERROR_CALLBACK: &str = "ErrorCallback";

/// Path Yahoo redirects back to after a login attempt
pub const CALLBACK_PATH: &str = "/YahooAuthentication/LoginCallback";

/// Path of the public login action
pub const LOGIN_PATH: &str = "/YahooAuthentication/Login";

/// Path of the admin configuration page
pub const CONFIGURE_PATH: &str = "/Admin/YahooAuthentication/Configure";

/// Scopes requested from the Yahoo OAuth provider
pub const SCOPES: [&str; 3] = ["profile", "openid", "email"];

/// Yahoo authorization endpoint
pub const AUTHORIZATION_ENDPOINT: &str = "https://api.login.yahoo.com/oauth2/request_auth";

/// Yahoo token endpoint
pub const TOKEN_ENDPOINT: &str = "https://api.login.yahoo.com/oauth2/get_token";

/// Yahoo OpenID user information endpoint
pub const USER_INFORMATION_ENDPOINT: &str = "https://api.login.yahoo.com/openid/v1/userinfo";

/// Prefix shared by every locale resource the plugin installs
pub const LOCALE_RESOURCE_PREFIX: &str = "Plugins.ExternalAuth.Yahoo";

/// Host resource announcing saved plugin settings
pub const SAVED_RESOURCE: &str = "Admin.Plugins.Saved";

/// Name of the token saved for later calls to Yahoo APIs
pub const ACCESS_TOKEN: &str = "access_token";
