//! Form objects for the admin screens
//!
//! Static shape checks come from the `validator` derive; checks that
//! depend on configuration (password length) or only apply when a field
//! is present live in the `validate_with` methods. Uniqueness is the
//! store's job and comes back as a field-level conflict.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use arkiv_core::error::ValidationErrors;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

/// HTML checkboxes post "on" when ticked and nothing otherwise
fn de_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(value.as_deref(), Some("on" | "true" | "1")))
}

/// Group create/update form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GroupForm {
    #[validate(length(min = 1, message = "is required"))]
    #[validate(length(max = 150, message = "is too long (150 characters max)"))]
    pub name: String,
}

impl GroupForm {
    pub fn validated(&self) -> Result<(), ValidationErrors> {
        into_field_errors(self.validate())
    }
}

/// User create form; the password field is required here
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreateForm {
    #[validate(length(min = 1, message = "is required"))]
    #[validate(length(max = 150, message = "is too long (150 characters max)"))]
    #[validate(regex(
        path = "USERNAME_RE",
        message = "may only contain letters, digits and @ . + - _"
    ))]
    pub username: String,

    #[serde(default)]
    pub email: String,

    pub password: String,

    #[serde(default, deserialize_with = "de_checkbox")]
    pub is_superuser: bool,
}

impl UserCreateForm {
    pub fn validated(&self, password_min_length: usize) -> Result<(), ValidationErrors> {
        let mut errors = match into_field_errors(self.validate()) {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        if self.password.len() < password_min_length {
            errors.add(
                "password",
                format!("must be at least {} characters", password_min_length),
            );
        }
        validate_optional_email(&self.email, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// User update form; a blank password leaves the stored one unchanged
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserUpdateForm {
    #[validate(length(min = 1, message = "is required"))]
    #[validate(length(max = 150, message = "is too long (150 characters max)"))]
    #[validate(regex(
        path = "USERNAME_RE",
        message = "may only contain letters, digits and @ . + - _"
    ))]
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    #[serde(default, deserialize_with = "de_checkbox")]
    pub is_superuser: bool,

    #[serde(default, deserialize_with = "de_checkbox")]
    pub is_active: bool,
}

impl UserUpdateForm {
    pub fn validated(&self, password_min_length: usize) -> Result<(), ValidationErrors> {
        let mut errors = match into_field_errors(self.validate()) {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        if !self.password.is_empty() && self.password.len() < password_min_length {
            errors.add(
                "password",
                format!("must be at least {} characters", password_min_length),
            );
        }
        validate_optional_email(&self.email, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The password change requested by the form, if any
    pub fn new_password(&self) -> Option<&str> {
        if self.password.is_empty() {
            None
        } else {
            Some(&self.password)
        }
    }
}

/// Login form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

fn validate_optional_email(email: &str, errors: &mut ValidationErrors) {
    if !email.is_empty() && !validator::validate_email(email) {
        errors.add("email", "is not a valid email address");
    }
}

/// Flatten `validator` derive output into the field-keyed shape the
/// form redisplay context uses
fn into_field_errors(
    result: Result<(), validator::ValidationErrors>,
) -> Result<(), ValidationErrors> {
    let source = match result {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    let mut errors = ValidationErrors::new();
    for (field, field_errors) in source.field_errors() {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            errors.add(field, message);
        }
    }
    Err(errors)
}
