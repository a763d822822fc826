//! Wire types exchanged with the member portal API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Key the API uses for errors that belong to no single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Username and password sent to the register and login endpoints
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Minimal user record returned alongside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

/// Successful register or login payload
///
/// Registration answers with a flat `{id, username, token}` object while
/// login nests the user under `user`. Both decode into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AuthPayload")]
pub struct AuthSession {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Deserialize)]
struct AuthPayload {
    token: String,
    #[serde(default)]
    user: Option<UserSummary>,
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    username: Option<String>,
}

impl TryFrom<AuthPayload> for AuthSession {
    type Error = String;

    fn try_from(payload: AuthPayload) -> Result<Self, Self::Error> {
        let user = match (payload.user, payload.id, payload.username) {
            (Some(user), _, _) => user,
            (None, Some(id), Some(username)) => UserSummary { id, username },
            _ => return Err("auth response carries no user details".to_string()),
        };

        // Stores treat an empty token as absent
        if payload.token.trim().is_empty() {
            return Err("auth response carries an empty token".to_string());
        }

        Ok(Self {
            token: payload.token,
            user,
        })
    }
}

/// Profile of the signed-in member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// First and last name joined, if either is set
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Editable profile fields; unset fields are left out of the request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl ProfileChanges {
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Surrounding whitespace removed from every set field
    pub fn trimmed(self) -> Self {
        let trim = |value: Option<String>| value.map(|value| value.trim().to_string());
        Self {
            username: trim(self.username),
            email: trim(self.email),
            first_name: trim(self.first_name),
            last_name: trim(self.last_name),
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}

/// Validation messages keyed by field name
///
/// The API reports a field either as a single string or as a list of
/// strings; both normalize to a list here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message under `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Messages recorded for `field`, empty if none
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Vec<String>> {
        self.0.remove(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Messages that belong to no single field
    pub fn general(&self) -> Vec<&str> {
        [NON_FIELD_ERRORS, "detail", "error"]
            .iter()
            .flat_map(|key| self.get(key))
            .map(String::as_str)
            .collect()
    }

    /// Every message joined into one line, `field: a, b; other: c`
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Read a field-error mapping out of an error response body
    ///
    /// Returns `None` when the body is not an object or carries no
    /// messages.
    pub fn from_json(body: &JsonValue) -> Option<Self> {
        let object = body.as_object()?;
        let mut errors = Self::new();

        for (field, value) in object {
            match value {
                JsonValue::String(message) => errors.add(field.clone(), message.clone()),
                JsonValue::Array(items) => {
                    for item in items {
                        match item {
                            JsonValue::String(message) => {
                                errors.add(field.clone(), message.clone());
                            }
                            JsonValue::Null => {}
                            other => errors.add(field.clone(), other.to_string()),
                        }
                    }
                }
                _ => {}
            }
        }

        if errors.is_empty() { None } else { Some(errors) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_payload_is_flat() {
        let session: AuthSession =
            serde_json::from_value(json!({"id": 7, "username": "alice", "token": "t1"})).unwrap();
        assert_eq!(session.token, "t1");
        assert_eq!(session.user.id, 7);
        assert_eq!(session.user.username, "alice");
    }

    #[test]
    fn login_payload_nests_user() {
        let session: AuthSession = serde_json::from_value(json!({
            "token": "t2",
            "user": {"id": 3, "username": "bob"}
        }))
        .unwrap();
        assert_eq!(session.token, "t2");
        assert_eq!(session.user.username, "bob");
    }

    #[test]
    fn auth_payload_without_user_is_rejected() {
        let result = serde_json::from_value::<AuthSession>(json!({"token": "t3"}));
        assert!(result.is_err());
    }

    #[test]
    fn profile_optional_fields_default_to_none() {
        let profile: UserProfile =
            serde_json::from_value(json!({"id": 1, "username": "carol"})).unwrap();
        assert_eq!(profile.email, None);
        assert_eq!(profile.created_at, None);
        assert_eq!(profile.full_name(), None);
    }

    #[test]
    fn profile_full_name_joins_present_parts() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 1,
            "username": "carol",
            "first_name": "Carol",
            "last_name": "",
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(profile.full_name().as_deref(), Some("Carol"));
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn auth_payload_with_blank_token_is_rejected() {
        let result = serde_json::from_value::<AuthSession>(json!({
            "token": "",
            "user": {"id": 1, "username": "bob"}
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<AuthSession>(
            json!({"token": "  ", "id": 1, "username": "bob"}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn profile_changes_trim_set_fields() {
        let changes = ProfileChanges::default()
            .with_email("  alice@example.com ")
            .with_first_name("Alice\n")
            .trimmed();
        assert_eq!(changes.email.as_deref(), Some("alice@example.com"));
        assert_eq!(changes.first_name.as_deref(), Some("Alice"));
        assert_eq!(changes.username, None);
    }

    #[test]
    fn profile_changes_skip_unset_fields() {
        let changes = ProfileChanges::default().with_username("dave");
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({"username": "dave"}));
        assert!(ProfileChanges::default().is_empty());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("alice", "hunter22"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn field_errors_accept_strings_and_lists() {
        let errors = FieldErrors::from_json(&json!({
            "username": ["A user with this username already exists."],
            "password": "Password must be at least 8 characters long."
        }))
        .unwrap();

        assert_eq!(
            errors.get("username"),
            ["A user with this username already exists.".to_string()]
        );
        assert_eq!(errors.get("password").len(), 1);
        assert!(errors.get("email").is_empty());
    }

    #[test]
    fn field_errors_ignore_non_objects_and_empty_maps() {
        assert!(FieldErrors::from_json(&json!("oops")).is_none());
        assert!(FieldErrors::from_json(&json!({})).is_none());
        assert!(FieldErrors::from_json(&json!({"username": []})).is_none());
    }

    #[test]
    fn field_errors_summary_and_general() {
        let mut errors = FieldErrors::new();
        errors.add("username", "too short");
        errors.add("username", "taken");
        errors.add(NON_FIELD_ERRORS, "try again");

        assert_eq!(errors.general(), vec!["try again"]);
        assert_eq!(
            errors.summary(),
            "non_field_errors: try again; username: too short, taken"
        );
    }
}
