//! Login button view component

use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::defaults;
use crate::views::{HtmlTemplate, PublicInfoView};

/// Partial view rendered by the host into a widget zone
pub trait ViewComponent: Send + Sync {
    /// Name the host looks the component up by
    fn name(&self) -> &'static str;

    /// Render the component
    fn invoke(&self, widget_zone: &str, additional_data: Option<&Value>) -> Response;
}

/// Yahoo login button
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooAuthenticationViewComponent;

impl YahooAuthenticationViewComponent {
    /// Login link, keeping a `returnUrl` passed in the additional data
    pub fn login_url(additional_data: Option<&Value>) -> String {
        let return_url = additional_data
            .and_then(|data| data.get("returnUrl"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty());

        match return_url {
            Some(return_url) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(return_url.as_bytes()).collect();
                format!("{}?returnUrl={}", defaults::LOGIN_PATH, encoded)
            }
            None => defaults::LOGIN_PATH.to_string(),
        }
    }
}

impl ViewComponent for YahooAuthenticationViewComponent {
    fn name(&self) -> &'static str {
        defaults::VIEW_COMPONENT_NAME
    }

    fn invoke(&self, widget_zone: &str, additional_data: Option<&Value>) -> Response {
        tracing::trace!(widget_zone, "Rendering Yahoo login button");

        HtmlTemplate::new(PublicInfoView {
            login_url: Self::login_url(additional_data),
        })
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_component_name() {
        assert_eq!(YahooAuthenticationViewComponent.name(), "YahooAuthentication");
    }

    #[test]
    fn test_login_url_keeps_return_url() {
        assert_eq!(
            YahooAuthenticationViewComponent::login_url(None),
            "/YahooAuthentication/Login"
        );
        let data = serde_json::json!({ "returnUrl": "/cart" });
        assert_eq!(
            YahooAuthenticationViewComponent::login_url(Some(&data)),
            "/YahooAuthentication/Login?returnUrl=%2Fcart"
        );
    }

    #[test]
    fn test_invoke_renders_html() {
        let response = YahooAuthenticationViewComponent.invoke("login_page", None);
        assert_eq!(response.status(), StatusCode::OK);
    }
}
