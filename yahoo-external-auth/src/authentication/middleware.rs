//! Remote authentication middleware
//!
//! Layered on a scheme's callback route. Provider redirects (requests whose
//! query carries `state` or `error`) are completed by the scheme handler and
//! never reach the route; anything else passes through untouched.

use axum::{
    body::Body,
    extract::{Query, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::oauth::RemoteCallback;
use super::scheme::AuthenticationSchemes;

/// State for [`remote_authentication`]
#[derive(Debug, Clone)]
pub struct RemoteAuthenticationState {
    /// Registered schemes
    pub schemes: AuthenticationSchemes,
    /// Scheme completing redirects on this route
    pub scheme: String,
}

impl RemoteAuthenticationState {
    /// Create state for a scheme
    pub fn new(schemes: AuthenticationSchemes, scheme: impl Into<String>) -> Self {
        Self {
            schemes,
            scheme: scheme.into(),
        }
    }
}

/// Complete provider redirects before they reach the callback route
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn remote_authentication(
    State(state): State<RemoteAuthenticationState>,
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Response {
    let callback = match Query::<RemoteCallback>::try_from_uri(request.uri()) {
        Ok(Query(callback)) => callback,
        Err(e) => {
            tracing::debug!(error = %e, "Callback query could not be parsed");
            return next.run(request).await;
        }
    };

    if !callback.is_remote_response() {
        return next.run(request).await;
    }

    tracing::debug!(scheme = %state.scheme, "Handling remote authentication callback");

    match state
        .schemes
        .handle_remote_callback(&session, &state.scheme, callback)
        .await
    {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
