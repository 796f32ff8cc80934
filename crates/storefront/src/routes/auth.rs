//! Authentication route handlers.
//!
//! Handles login, registration, logout and the three-step password reset
//! (request code, verify code, set new password) against the remote API.
//! Form validation failures and server rejections re-render the form; the
//! server's own message is shown as-is.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use fresh_cart_core::validation::ValidationErrors;
use serde::Deserialize;
use tower_sessions::Session;

use super::Layout;
use crate::api::SignUpRequest;
use crate::filters;
use crate::middleware::{LOGIN_PATH, OptionalSession};
use crate::state::AppState;
use crate::stores::{Notices, SessionStore, StoreError};

const HOME_PATH: &str = "/";
const RESET_CODE_PATH: &str = "/resetcode";
const RESET_PASSWORD_PATH: &str = "/resetpassword";
const SIGNED_OUT: &str = "You have been logged out.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub re_password: String,
    #[serde(default)]
    pub phone: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
}

/// Reset code form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCodeForm {
    #[serde(default)]
    pub reset_code: String,
}

/// New password form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub new_password: String,
}

/// Outcome of the last submission of a form, for re-rendering it.
#[derive(Debug, Default)]
pub struct FormState {
    /// Message from the server (or a fallback) shown above the form.
    pub error: Option<String>,
    /// Per-field validation messages.
    pub errors: ValidationErrors,
}

impl FormState {
    fn from_error(err: StoreError, fallback: &str) -> Self {
        match err {
            StoreError::Invalid(errors) => Self {
                error: None,
                errors,
            },
            other => {
                tracing::warn!(error = %other, "{fallback}");
                Self {
                    error: Some(
                        other
                            .server_message()
                            .map_or_else(|| other.user_message(fallback), String::from),
                    ),
                    errors: ValidationErrors::default(),
                }
            }
        }
    }

    /// Message for a failing field, empty when it passed.
    #[must_use]
    pub fn field_error(&self, field: &str) -> &'static str {
        self.errors.get(field).unwrap_or_default()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub form: FormState,
    pub email: String,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignUpTemplate {
    pub layout: Layout,
    pub form: FormState,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub layout: Layout,
    pub form: FormState,
    pub email: String,
}

/// Reset code page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_code.html")]
pub struct ResetCodeTemplate {
    pub layout: Layout,
    pub form: FormState,
}

/// New password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub layout: Layout,
    pub form: FormState,
    pub email: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in visitors go home instead.
pub async fn login_page(session: Session, OptionalSession(user): OptionalSession) -> Response {
    if user.is_some() {
        return Redirect::to(HOME_PATH).into_response();
    }

    LoginTemplate {
        layout: Layout::load(&session, None).await,
        form: FormState::default(),
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// On failure nothing is stored and the form is shown again with the
/// server's message.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let store = SessionStore::new(state.api(), &session);

    match store.sign_in(&form.email, &form.password).await {
        Ok(user) => {
            Notices::new(&session)
                .success(format!("Welcome back, {}", user.name))
                .await;
            Redirect::to(HOME_PATH).into_response()
        }
        Err(e) => LoginTemplate {
            form: FormState::from_error(e, "Failed to sign in."),
            layout: Layout::load(&session, None).await,
            email: form.email,
        }
        .into_response(),
    }
}

/// Sign out and return to the login page.
///
/// Notices queued before signing out are dropped with the old session; the
/// confirmation is queued on the fresh one.
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    if let Err(e) = SessionStore::new(state.api(), &session).sign_out().await {
        tracing::error!(error = %e, "Failed to sign out");
    }
    Notices::new(&session).info(SIGNED_OUT).await;
    Redirect::to(LOGIN_PATH)
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page. Signed-in visitors go home instead.
pub async fn signup_page(session: Session, OptionalSession(user): OptionalSession) -> Response {
    if user.is_some() {
        return Redirect::to(HOME_PATH).into_response();
    }

    SignUpTemplate {
        layout: Layout::load(&session, None).await,
        form: FormState::default(),
        name: String::new(),
        email: String::new(),
        phone: String::new(),
    }
    .into_response()
}

/// Handle registration form submission. A new account is signed in at once.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Response {
    let store = SessionStore::new(state.api(), &session);
    let request = SignUpRequest {
        name: &form.name,
        email: &form.email,
        password: &form.password,
        re_password: &form.re_password,
        phone: &form.phone,
    };

    match store.sign_up(&request).await {
        Ok(user) => {
            Notices::new(&session)
                .success(format!("Welcome, {}", user.name))
                .await;
            Redirect::to(HOME_PATH).into_response()
        }
        Err(e) => SignUpTemplate {
            form: FormState::from_error(e, "Failed to create your account."),
            layout: Layout::load(&session, None).await,
            name: form.name,
            email: form.email,
            phone: form.phone,
        }
        .into_response(),
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(session: Session) -> impl IntoResponse {
    ForgotPasswordTemplate {
        layout: Layout::load(&session, None).await,
        form: FormState::default(),
        email: String::new(),
    }
}

/// Ask the server to email a reset code.
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let store = SessionStore::new(state.api(), &session);

    match store.request_password_reset(&form.email).await {
        Ok(message) => {
            Notices::new(&session).success(message).await;
            Redirect::to(RESET_CODE_PATH).into_response()
        }
        Err(e) => ForgotPasswordTemplate {
            form: FormState::from_error(e, "Failed to send password reset email."),
            layout: Layout::load(&session, None).await,
            email: form.email,
        }
        .into_response(),
    }
}

/// Display the reset code page.
pub async fn reset_code_page(session: Session) -> impl IntoResponse {
    ResetCodeTemplate {
        layout: Layout::load(&session, None).await,
        form: FormState::default(),
    }
}

/// Check the emailed reset code.
pub async fn reset_code(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetCodeForm>,
) -> Response {
    let store = SessionStore::new(state.api(), &session);

    match store.verify_reset_code(&form.reset_code).await {
        Ok(()) => {
            Notices::new(&session)
                .success("The Reset Code Entered Successfully")
                .await;
            Redirect::to(RESET_PASSWORD_PATH).into_response()
        }
        Err(e) => ResetCodeTemplate {
            form: FormState::from_error(e, "Failed to verify the reset code."),
            layout: Layout::load(&session, None).await,
        }
        .into_response(),
    }
}

/// Display the new password page, prefilled with the account being reset.
pub async fn reset_password_page(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let email = SessionStore::new(state.api(), &session)
        .pending_reset_email()
        .await
        .unwrap_or_default();

    ResetPasswordTemplate {
        layout: Layout::load(&session, None).await,
        form: FormState::default(),
        email,
    }
}

/// Set the new password, then send the user to sign in with it.
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let store = SessionStore::new(state.api(), &session);

    match store.reset_password(&form.email, &form.new_password).await {
        Ok(()) => {
            Notices::new(&session)
                .success("The New Password has been set successfully")
                .await;
            Redirect::to(LOGIN_PATH).into_response()
        }
        Err(e) => ResetPasswordTemplate {
            form: FormState::from_error(e, "Failed to reset your password."),
            layout: Layout::load(&session, None).await,
            email: form.email,
        }
        .into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[test]
    fn test_rejection_shows_server_message() {
        let state = FormState::from_error(
            StoreError::Api(ApiError::Unauthenticated("Incorrect email or password".into())),
            "Failed to sign in.",
        );
        assert_eq!(state.error.as_deref(), Some("Incorrect email or password"));
        assert!(state.errors.is_empty());
    }

    #[test]
    fn test_validation_failure_stays_on_fields() {
        let errors = fresh_cart_core::validation::sign_in("", "").unwrap_err();
        let state = FormState::from_error(StoreError::Invalid(errors), "Failed to sign in.");
        assert!(state.error.is_none());
        assert_eq!(state.field_error("email"), "Email is required");
        assert_eq!(state.field_error("rePassword"), "");
    }
}
