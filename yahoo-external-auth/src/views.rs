//! Askama views and their HTML responses

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::models::{ConfigurationModel, FieldError};
use crate::notifications::Notification;

/// Admin configuration page
#[derive(Template)]
#[template(path = "configure.html")]
pub struct ConfigureView {
    /// Form action
    pub action: String,
    /// Values shown in the form
    pub model: ConfigurationModel,
    /// Notifications queued since the last page
    pub notifications: Vec<Notification>,
    /// Setup instructions (trusted HTML from locale resources)
    pub instructions: String,
    /// Hidden antiforgery field name
    pub antiforgery_field: &'static str,
    /// Hidden antiforgery field value
    pub antiforgery_token: String,
    /// Client id label
    pub client_id_label: String,
    /// Client id hint
    pub client_id_hint: String,
    /// Client secret label
    pub client_secret_label: String,
    /// Client secret hint
    pub client_secret_hint: String,
    /// Submit button text
    pub save_label: String,
    /// Validation error of the client id
    pub client_id_error: Option<String>,
    /// Validation error of the client secret
    pub client_secret_error: Option<String>,
}

impl ConfigureView {
    /// Attach validation errors to their fields
    pub fn with_errors(mut self, errors: &[FieldError]) -> Self {
        for error in errors {
            let slot = match error.field.as_str() {
                "client_id" => &mut self.client_id_error,
                "client_secret" => &mut self.client_secret_error,
                _ => continue,
            };
            slot.get_or_insert_with(|| error.message.clone());
        }
        self
    }
}

/// Login button shown on the public login page
#[derive(Template)]
#[template(path = "public_info.html")]
pub struct PublicInfoView {
    /// Link starting the Yahoo login
    pub login_url: String,
}

/// Page shown when the admin lacks the required permission
#[derive(Template, Default)]
#[template(path = "access_denied.html")]
pub struct AccessDeniedView;

/// Template rendered as an HTML response
pub struct HtmlTemplate<T: Template> {
    template: T,
    status: StatusCode,
}

impl<T: Template> HtmlTemplate<T> {
    /// 200 response
    pub fn new(template: T) -> Self {
        Self {
            template,
            status: StatusCode::OK,
        }
    }

    /// Set the status code
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(err) => crate::error::Error::Template(err).into_response(),
        }
    }
}
