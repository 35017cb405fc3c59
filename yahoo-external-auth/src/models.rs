//! Admin configuration form model

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::settings::YahooExternalAuthSettings;

/// Configuration form posted from the admin page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ConfigurationModel {
    /// OAuth2 client identifier
    #[serde(rename = "ClientId", default)]
    #[validate(length(min = 1, message = "Client Id is required"))]
    pub client_id: String,

    /// OAuth2 client secret
    #[serde(rename = "ClientSecret", default)]
    #[validate(length(min = 1, message = "Client secret is required"))]
    pub client_secret: String,

    /// Antiforgery token from the hidden form field
    #[serde(rename = "__RequestVerificationToken", default, skip_serializing)]
    pub antiforgery_token: Option<String>,
}

/// Validation message attached to a form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Model field name
    pub field: String,
    /// Message shown next to the field
    pub message: String,
}

impl ConfigurationModel {
    /// Model populated from the stored settings
    pub fn from_settings(settings: &YahooExternalAuthSettings) -> Self {
        Self {
            client_id: settings.client_key_identifier.clone(),
            client_secret: settings.client_secret.clone(),
            antiforgery_token: None,
        }
    }

    /// Copy of the model with surrounding whitespace removed
    pub fn trimmed(&self) -> Self {
        Self {
            client_id: self.client_id.trim().to_string(),
            client_secret: self.client_secret.trim().to_string(),
            antiforgery_token: self.antiforgery_token.clone(),
        }
    }

    /// Validate, returning field errors ordered by field name
    pub fn field_errors(&self) -> Vec<FieldError> {
        let Err(errors) = self.validate() else {
            return Vec::new();
        };

        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string()),
                })
            })
            .collect();

        field_errors.sort_by(|a, b| a.field.cmp(&b.field));
        field_errors
    }

    /// Write the posted credentials into `settings`
    pub fn apply_to(&self, settings: &mut YahooExternalAuthSettings) {
        settings.client_key_identifier = self.client_id.clone();
        settings.client_secret = self.client_secret.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(client_id: &str, client_secret: &str) -> ConfigurationModel {
        ConfigurationModel {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            antiforgery_token: None,
        }
    }

    #[test]
    fn test_valid_model() {
        assert!(model("id", "secret").validate().is_ok());
        assert!(model("id", "secret").field_errors().is_empty());
    }

    #[test]
    fn test_blank_client_id_after_trim() {
        let errors = model("   ", "secret").trimmed().field_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "client_id");
        assert_eq!(errors[0].message, "Client Id is required");
    }

    #[test]
    fn test_both_fields_blank() {
        let errors = model("", "").field_errors();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["client_id", "client_secret"]);
    }

    #[test]
    fn test_form_field_names() {
        let model: ConfigurationModel = serde_json::from_value(serde_json::json!({
            "ClientId": "id",
            "ClientSecret": "secret",
            "__RequestVerificationToken": "tok"
        }))
        .unwrap();
        assert_eq!(model.client_id, "id");
        assert_eq!(model.antiforgery_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_apply_to_overwrites_credentials() {
        let mut settings = YahooExternalAuthSettings::default();
        model("id", "secret").apply_to(&mut settings);
        assert_eq!(settings.client_key_identifier, "id");
        assert_eq!(settings.client_secret, "secret");
    }
}
