//! Client error types

use crate::client::token_store::TokenStoreError;
use crate::types::FieldErrors;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was received, or its body could not be read
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The request was rejected with field-level detail
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The credential is missing, invalid or expired
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Any other error status, or an error body of unexpected shape
    #[error("Server error {status}: {message}")]
    General { status: u16, message: String },

    /// A success response whose body did not match the expected type
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// The token store could not persist or remove the credential
    #[error("Token storage failed: {0}")]
    Storage(#[from] TokenStoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl ClientError {
    /// Create error from an HTTP status code and the raw response body
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let code = status.as_u16();
        let json = serde_json::from_str::<JsonValue>(body).ok();
        let message = json
            .as_ref()
            .and_then(single_message)
            .map(str::to_string)
            .or_else(|| non_empty(body))
            .unwrap_or_else(|| status.to_string());

        if code == 401 {
            return Self::Unauthorized(message);
        }

        if status.is_client_error() {
            let is_plain_message = json.as_ref().and_then(single_message).is_some();
            if !is_plain_message
                && let Some(errors) = json.as_ref().and_then(FieldErrors::from_json)
            {
                return Self::Validation(errors);
            }
        }

        Self::General {
            status: code,
            message,
        }
    }

    /// True when the stored credential should be discarded
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Field errors, if this is a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Text suitable for a banner above a form
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not reach the server. Please try again later.".to_string(),
            Self::Validation(errors) => {
                let general = errors.general();
                if general.is_empty() {
                    "Please correct the highlighted fields.".to_string()
                } else {
                    general.join(" ")
                }
            }
            Self::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            Self::General { message, .. } => message.clone(),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
            Self::Storage(_) => "Could not save your session in this browser.".to_string(),
            Self::Configuration(message) => message.clone(),
        }
    }
}

/// `{"error": "..."}` or `{"detail": "..."}` bodies carry one message
fn single_message(body: &JsonValue) -> Option<&str> {
    let object = body.as_object()?;
    if object.len() != 1 {
        return None;
    }
    ["error", "detail"]
        .iter()
        .find_map(|key| object.get(*key))
        .and_then(JsonValue::as_str)
}

fn non_empty(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn unauthorized_uses_detail_message() {
        let error = ClientError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Invalid token."}"#,
        );
        assert!(error.is_unauthorized());
        assert_eq!(error.to_string(), "Authentication failed: Invalid token.");
    }

    #[test]
    fn login_error_body_is_general() {
        let error = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Invalid username or password"}"#,
        );
        match error {
            ClientError::General { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid username or password");
            }
            other => panic!("expected general error, got {other:?}"),
        }
    }

    #[test]
    fn field_map_is_validation() {
        let error = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"username": ["Username must be at least 3 characters long."]}"#,
        );
        let errors = error.field_errors().expect("validation error");
        assert_eq!(errors.get("username").len(), 1);
    }

    #[test]
    fn server_errors_are_general_even_with_fields() {
        let error =
            ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"username": "x"}"#);
        assert!(matches!(error, ClientError::General { status: 500, .. }));
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let error = ClientError::from_status(StatusCode::FORBIDDEN, "Forbidden here");
        assert!(matches!(
            error,
            ClientError::General { status: 403, ref message } if message == "Forbidden here"
        ));
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let error = ClientError::from_status(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(
            error,
            ClientError::General { status: 502, ref message } if message.contains("502")
        ));
    }

    #[test]
    fn validation_banner_prefers_general_messages() {
        let mut errors = FieldErrors::new();
        errors.add("username", "taken");
        assert_eq!(
            ClientError::Validation(errors.clone()).user_message(),
            "Please correct the highlighted fields."
        );

        errors.add("non_field_errors", "Try again later.");
        assert_eq!(
            ClientError::Validation(errors).user_message(),
            "Try again later."
        );
    }
}
