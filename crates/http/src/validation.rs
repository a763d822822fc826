//! Client-side checks run before a request leaves the client
//!
//! These mirror the rules the API enforces so that obviously invalid input
//! is reported next to the offending field without a round trip.

use crate::types::{Credentials, FieldErrors, NON_FIELD_ERRORS, ProfileChanges};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const NAME_MAX_LEN: usize = 150;

/// Common validation helpers
pub mod validators {
    use super::{FieldErrors, NAME_MAX_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN};

    /// Record an error if the value is blank
    pub fn require(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            errors.add(field, "This field may not be blank.");
            return false;
        }
        true
    }

    /// Username length, counted in characters
    pub fn username(errors: &mut FieldErrors, field: &str, value: &str) {
        if !require(errors, field, value) {
            return;
        }
        let len = value.chars().count();
        if len < USERNAME_MIN_LEN {
            errors.add(
                field,
                format!("Username must be at least {USERNAME_MIN_LEN} characters long."),
            );
        } else if len > USERNAME_MAX_LEN {
            errors.add(
                field,
                format!("Username must be at most {USERNAME_MAX_LEN} characters long."),
            );
        }
    }

    pub fn max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            errors.add(
                field,
                format!("Ensure this field has no more than {max} characters."),
            );
        }
    }

    pub fn name(errors: &mut FieldErrors, field: &str, value: &str) {
        max_len(errors, field, value, NAME_MAX_LEN);
    }

    /// Basic email shape: one `@` with something on either side
    pub fn email(errors: &mut FieldErrors, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let mut parts = value.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !valid {
            errors.add(field, "Enter a valid email address.");
        }
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Rules for a new account
pub fn validate_registration(credentials: &Credentials) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    validators::username(&mut errors, "username", &credentials.username);
    if validators::require(&mut errors, "password", &credentials.password)
        && credentials.password.chars().count() < PASSWORD_MIN_LEN
    {
        errors.add(
            "password",
            format!("Password must be at least {PASSWORD_MIN_LEN} characters long."),
        );
    }

    finish(errors)
}

/// Login only needs both fields present
pub fn validate_login(credentials: &Credentials) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    validators::require(&mut errors, "username", &credentials.username);
    validators::require(&mut errors, "password", &credentials.password);
    finish(errors)
}

/// Rules for a profile update; at least one field must be set
pub fn validate_profile_changes(changes: &ProfileChanges) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if changes.is_empty() {
        errors.add(NON_FIELD_ERRORS, "No profile fields to update.");
        return Err(errors);
    }

    if let Some(username) = &changes.username {
        validators::username(&mut errors, "username", username);
    }
    if let Some(email) = &changes.email {
        validators::email(&mut errors, "email", email);
    }
    if let Some(first_name) = &changes.first_name {
        validators::name(&mut errors, "first_name", first_name);
    }
    if let Some(last_name) = &changes.last_name {
        validators::name(&mut errors, "last_name", last_name);
    }

    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_username_is_rejected() {
        let errors = validate_registration(&Credentials::new("ab", "longenough1")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("username")[0].contains("at least 3"));
    }

    #[test]
    fn long_username_is_rejected() {
        let username = "x".repeat(USERNAME_MAX_LEN + 1);
        let errors = validate_registration(&Credentials::new(username, "longenough1")).unwrap_err();
        assert!(errors.get("username")[0].contains("at most 150"));
    }

    #[test]
    fn username_length_counts_characters() {
        assert!(validate_registration(&Credentials::new("äöü", "longenough1")).is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let errors = validate_registration(&Credentials::new("alice", "short")).unwrap_err();
        assert!(errors.get("password")[0].contains("at least 8"));
        assert!(!errors.contains("username"));
    }

    #[test]
    fn blank_fields_are_required() {
        let errors = validate_registration(&Credentials::new("  ", "")).unwrap_err();
        assert_eq!(errors.get("username"), ["This field may not be blank.".to_string()]);
        assert_eq!(errors.get("password"), ["This field may not be blank.".to_string()]);
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration(&Credentials::new("alice", "longenough1")).is_ok());
    }

    #[test]
    fn login_requires_both_fields_only() {
        assert!(validate_login(&Credentials::new("al", "x")).is_ok());
        let errors = validate_login(&Credentials::new("", "")).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn empty_profile_changes_are_rejected() {
        let errors = validate_profile_changes(&ProfileChanges::default()).unwrap_err();
        assert_eq!(errors.general().len(), 1);
    }

    #[test]
    fn profile_changes_check_each_field() {
        let changes = ProfileChanges::default()
            .with_username("ab")
            .with_email("not-an-email")
            .with_first_name("x".repeat(NAME_MAX_LEN + 1))
            .with_last_name("Smith");

        let errors = validate_profile_changes(&changes).unwrap_err();
        assert!(errors.contains("username"));
        assert!(errors.contains("email"));
        assert!(errors.contains("first_name"));
        assert!(!errors.contains("last_name"));
    }

    #[test]
    fn empty_email_clears_the_address() {
        let changes = ProfileChanges::default().with_email("");
        assert!(validate_profile_changes(&changes).is_ok());
    }

    #[test]
    fn email_needs_a_single_at_sign() {
        for bad in ["a@b@c", "@example.com", "alice@"] {
            let changes = ProfileChanges::default().with_email(bad);
            assert!(validate_profile_changes(&changes).is_err(), "{bad} accepted");
        }
        let changes = ProfileChanges::default().with_email("alice@example.com");
        assert!(validate_profile_changes(&changes).is_ok());
    }
}
