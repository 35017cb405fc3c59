//! HTTP routes of the plugin

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    middleware,
    response::Response,
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_sessions::Session;

use crate::authentication::{
    remote_authentication, AuthenticationBuilder, RemoteAuthenticationState,
};
use crate::config::Config;
use crate::controller::YahooAuthenticationController;
use crate::defaults;
use crate::error::Result;
use crate::host::HostServices;
use crate::models::ConfigurationModel;
use crate::registrar::{YahooAuthenticationRegistrar, YahooEndpoints};
use crate::session::create_memory_session_layer;

/// Shared state of the plugin routes
#[derive(Clone)]
pub struct AppState {
    /// Plugin actions
    pub controller: Arc<YahooAuthenticationController>,
}

/// `returnUrl` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct ReturnUrlQuery {
    /// Where the host sends the user once signed in
    #[serde(rename = "returnUrl")]
    pub return_url: Option<String>,
}

async fn configure(State(state): State<AppState>, session: Session) -> Result<Response> {
    state.controller.configure(&session).await
}

async fn configure_post(
    State(state): State<AppState>,
    session: Session,
    Form(model): Form<ConfigurationModel>,
) -> Result<Response> {
    state.controller.configure_post(&session, model).await
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Query(query): Query<ReturnUrlQuery>,
) -> Result<Response> {
    state
        .controller
        .login(&session, &headers, query.return_url)
        .await
}

async fn login_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReturnUrlQuery>,
) -> Result<Response> {
    state
        .controller
        .login_callback(&session, query.return_url)
        .await
}

/// Build the plugin router talking to Yahoo
pub fn build_router(config: &Config, host: HostServices) -> Result<Router> {
    build_router_with_endpoints(config, host, YahooEndpoints::default())
}

/// Build the plugin router talking to the given OAuth endpoints
///
/// The router carries its own session and trace layers.
pub fn build_router_with_endpoints(
    config: &Config,
    host: HostServices,
    endpoints: YahooEndpoints,
) -> Result<Router> {
    let store_location = config.service.store_location();

    let mut builder = AuthenticationBuilder::new();
    YahooAuthenticationRegistrar::new(host.settings.clone(), store_location.clone())
        .with_endpoints(endpoints)
        .configure(&mut builder)?;
    let schemes = builder.build();

    let remote = RemoteAuthenticationState::new(schemes.clone(), defaults::AUTHENTICATION_SCHEME);
    let controller = YahooAuthenticationController::new(
        host,
        schemes,
        store_location,
        config.routes.login_path.clone(),
    );
    let state = AppState {
        controller: Arc::new(controller),
    };

    let router = Router::new()
        .route(defaults::CONFIGURE_PATH, get(configure).post(configure_post))
        .route(defaults::LOGIN_PATH, get(login))
        .route(
            defaults::CALLBACK_PATH,
            get(login_callback)
                .route_layer(middleware::from_fn_with_state(remote, remote_authentication)),
        )
        .with_state(state)
        .layer(create_memory_session_layer(&config.session))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        );

    tracing::info!(
        configure = defaults::CONFIGURE_PATH,
        login = defaults::LOGIN_PATH,
        callback = defaults::CALLBACK_PATH,
        "Yahoo authentication routes built"
    );

    Ok(router)
}
