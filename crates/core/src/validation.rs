//! Form validation applied before anything is submitted to the remote API.
//!
//! Each validator collects every failing field instead of stopping at the
//! first one, so a re-rendered form can show all messages at once. Messages
//! are user-facing and rendered verbatim next to the field.

use std::sync::LazyLock;

use regex::Regex;

use crate::Email;

/// Egyptian mobile numbers: `01` followed by an operator digit and 8 digits.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^01[0125][0-9]{8}$").unwrap_or_else(|e| unreachable!("phone pattern: {e}"))
});

/// Passwords accepted by the remote API: 6 to 10 ASCII letters or digits.
static PASSWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{6,10}$").unwrap_or_else(|e| unreachable!("password pattern: {e}"))
});

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 10;

/// A single failing form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name, matching the HTML `name` attribute.
    pub field: &'static str,
    /// Message shown next to the field.
    pub message: &'static str,
}

/// Every failing field of one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Record a failure for `field`.
    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    /// Record `result` under `field` if it carries a message.
    fn check(&mut self, field: &'static str, result: Option<&'static str>) {
        if let Some(message) = result {
            self.push(field, message);
        }
    }

    /// `true` when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    /// Iterate over all failures in form order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validate a display name.
#[must_use]
pub fn name(value: &str) -> Option<&'static str> {
    let count = value.trim().chars().count();
    if count == 0 {
        Some("Name is required")
    } else if count < NAME_MIN_CHARS {
        Some("min length is 3 characters")
    } else if count > NAME_MAX_CHARS {
        Some("max length is 10")
    } else {
        None
    }
}

/// Validate an email address.
#[must_use]
pub fn email(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some("Email is required")
    } else if Email::parse(value).is_err() {
        Some("Invalid Email")
    } else {
        None
    }
}

/// Validate a mobile phone number.
#[must_use]
pub fn phone(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        Some("Phone is required")
    } else if !PHONE_PATTERN.is_match(value) {
        Some("Invalid Phone Number")
    } else {
        None
    }
}

/// Validate a password.
#[must_use]
pub fn password(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some("Password is required")
    } else if !PASSWORD_PATTERN.is_match(value) {
        Some("Password must be between 6 and 10 alphanumeric characters long. Example: abcABC12")
    } else {
        None
    }
}

/// Validate the replacement password of the reset flow.
#[must_use]
pub fn new_password(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some("New Password is required")
    } else if !PASSWORD_PATTERN.is_match(value) {
        Some(
            "New Password must be between 6 and 10 alphanumeric characters long. Example: abcABC12",
        )
    } else {
        None
    }
}

/// Validate a password confirmation against the password.
#[must_use]
pub fn re_password(value: &str, password: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some("RePassword is required")
    } else if value != password {
        Some("RePassword must match Password")
    } else {
        None
    }
}

/// Validate an emailed reset code.
#[must_use]
pub fn reset_code(value: &str) -> Option<&'static str> {
    value.trim().is_empty().then_some("Reset Code is required")
}

/// Validate a shipping city.
#[must_use]
pub fn city(value: &str) -> Option<&'static str> {
    value.trim().is_empty().then_some("City Name is required")
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validate the sign-in form.
///
/// # Errors
///
/// Returns every failing field.
pub fn sign_in(email_value: &str, password_value: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check("email", email(email_value));
    errors.check("password", password(password_value));
    errors.into_result()
}

/// Validate the sign-up form.
///
/// # Errors
///
/// Returns every failing field.
pub fn sign_up(
    name_value: &str,
    email_value: &str,
    password_value: &str,
    re_password_value: &str,
    phone_value: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check("name", name(name_value));
    errors.check("email", email(email_value));
    errors.check("password", password(password_value));
    errors.check("rePassword", re_password(re_password_value, password_value));
    errors.check("phone", phone(phone_value));
    errors.into_result()
}

/// Validate the forgot-password form.
///
/// # Errors
///
/// Returns every failing field.
pub fn forgot_password(email_value: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check("email", email(email_value));
    errors.into_result()
}

/// Validate the reset-code form.
///
/// # Errors
///
/// Returns every failing field.
pub fn verify_reset_code(code: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check("resetCode", reset_code(code));
    errors.into_result()
}

/// Validate the reset-password form.
///
/// # Errors
///
/// Returns every failing field.
pub fn reset_password(email_value: &str, new_password_value: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check("email", email(email_value));
    errors.check("newPassword", new_password(new_password_value));
    errors.into_result()
}

/// Validate the checkout shipping address. Street details are optional.
///
/// # Errors
///
/// Returns every failing field.
pub fn shipping_address(city_value: &str, phone_value: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check("city", city(city_value));
    errors.check("phone", phone(phone_value));
    errors.into_result()
}
