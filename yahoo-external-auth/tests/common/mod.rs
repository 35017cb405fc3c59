// Shared fixtures for the router-level tests
//
// The host collaborators are hand-written fakes; the router is driven with
// tower::ServiceExt::oneshot and the session cookie is carried by hand
// between requests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, Response};
use axum::response::{IntoResponse, Redirect};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_sessions::Session;

use yahoo_external_auth::prelude::*;

pub struct FakeWorkContext;

#[async_trait]
impl WorkContext for FakeWorkContext {
    async fn current_customer(&self, _session: &Session) -> Result<Customer> {
        Ok(Customer {
            id: 1,
            is_guest: false,
        })
    }
}

pub struct FakeStoreContext;

#[async_trait]
impl StoreContext for FakeStoreContext {
    async fn current_store(&self, _headers: &HeaderMap) -> Result<Store> {
        Ok(Store {
            id: 1,
            name: "Test store".to_string(),
        })
    }
}

pub struct FakePluginManager {
    pub active: AtomicBool,
}

#[async_trait]
impl AuthenticationPluginManager for FakePluginManager {
    async fn is_plugin_active(
        &self,
        system_name: &str,
        _customer: &Customer,
        _store_id: i64,
    ) -> Result<bool> {
        Ok(system_name == "ExternalAuth.Yahoo" && self.active.load(Ordering::SeqCst))
    }
}

pub struct FakePermissions {
    pub allowed: AtomicBool,
}

#[async_trait]
impl PermissionService for FakePermissions {
    async fn authorize(&self, _permission: StandardPermission, _customer: &Customer) -> Result<bool> {
        Ok(self.allowed.load(Ordering::SeqCst))
    }
}

/// Records every submission and redirects to the return URL
#[derive(Default)]
pub struct RecordingExternalAuth {
    pub submissions: Mutex<Vec<(ExternalAuthenticationParameters, Option<String>)>>,
}

#[async_trait]
impl ExternalAuthenticationService for RecordingExternalAuth {
    async fn authenticate(
        &self,
        parameters: ExternalAuthenticationParameters,
        return_url: Option<String>,
        _session: &Session,
    ) -> Result<axum::response::Response> {
        let target = return_url.clone().unwrap_or_else(|| "/".to_string());
        self.submissions.lock().unwrap().push((parameters, return_url));
        Ok(Redirect::to(&target).into_response())
    }
}

pub struct TestHost {
    pub settings: Arc<InMemorySettingService>,
    pub localization: Arc<InMemoryLocalizationService>,
    pub plugins: Arc<FakePluginManager>,
    pub permissions: Arc<FakePermissions>,
    pub external: Arc<RecordingExternalAuth>,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            settings: Arc::new(InMemorySettingService::new()),
            localization: Arc::new(InMemoryLocalizationService::new()),
            plugins: Arc::new(FakePluginManager {
                active: AtomicBool::new(true),
            }),
            permissions: Arc::new(FakePermissions {
                allowed: AtomicBool::new(true),
            }),
            external: Arc::new(RecordingExternalAuth::default()),
        }
    }

    pub fn services(&self) -> HostServices {
        HostServices {
            settings: self.settings.clone(),
            localization: self.localization.clone(),
            work_context: Arc::new(FakeWorkContext),
            store_context: Arc::new(FakeStoreContext),
            plugins: self.plugins.clone(),
            permissions: self.permissions.clone(),
            external_authentication: self.external.clone(),
        }
    }

    pub async fn configure_credentials(&self, client_id: &str, client_secret: &str) {
        self.settings
            .save_setting(&YahooExternalAuthSettings {
                client_key_identifier: client_id.to_string(),
                client_secret: client_secret.to_string(),
            })
            .await
            .unwrap();
    }

    pub async fn stored_settings(&self) -> YahooExternalAuthSettings {
        self.settings.load_setting().await.unwrap()
    }

    pub fn submissions(&self) -> Vec<(ExternalAuthenticationParameters, Option<String>)> {
        self.external.submissions.lock().unwrap().clone()
    }

    pub fn router(&self) -> Router {
        build_router(&Config::default(), self.services()).unwrap()
    }

    pub fn router_with(&self, endpoints: YahooEndpoints) -> Router {
        build_router_with_endpoints(&Config::default(), self.services(), endpoints).unwrap()
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// `name=value` of the session cookie set by a response
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Value of the hidden antiforgery field in a rendered form
pub fn antiforgery_token(html: &str) -> String {
    let marker = "name=\"__RequestVerificationToken\" value=\"";
    let start = html.find(marker).unwrap() + marker.len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}
