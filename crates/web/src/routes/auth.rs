//! Login, logout and the role landing route.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use detailer_core::{AuthState, Email, Landing, landing_for, paths, session};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::backend::BackendError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalUser, SessionHandle};
use crate::state::AppState;
use crate::tenant::CurrentTenant;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Query parameters of the landing route.
#[derive(Debug, Deserialize)]
pub struct LandingQuery {
    /// Where anonymous and unknown-role users go.
    #[serde(rename = "padrao")]
    pub default_path: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub tenant_name: Option<String>,
    pub error: Option<&'static str>,
}

/// Shown while the session state is unknown.
#[derive(Template, WebTemplate)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    /// Seconds before the browser asks again.
    pub refresh_seconds: u8,
}

/// Human message for a login error code.
fn login_error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "E-mail ou senha incorretos.",
        "email" => "Informe um e-mail válido.",
        "unavailable" => "Serviço indisponível. Tente novamente em instantes.",
        _ => "Não foi possível entrar. Tente novamente.",
    }
}

fn login_error(code: &str) -> Response {
    Redirect::to(&format!("{}?error={code}", paths::LOGIN)).into_response()
}

/// Turn a role-router decision into a response.
fn landing_response(landing: Landing) -> Response {
    match landing {
        Landing::Pending => LoadingTemplate { refresh_seconds: 1 }.into_response(),
        Landing::Redirect(path) => Redirect::to(&path).into_response(),
    }
}

/// Accept only same-site absolute paths as redirect targets.
fn safe_default_path(candidate: Option<&str>) -> &str {
    match candidate {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => paths::ROOT,
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Display the login page, or send a signed-in user to their area.
pub async fn login_page(
    CurrentTenant(tenant): CurrentTenant,
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> Response {
    if let Some(user) = &user {
        return landing_response(landing_for(AuthState::Authenticated(user), paths::ROOT));
    }

    LoginTemplate {
        tenant_name: tenant.tenant_name().map(str::to_owned),
        error: query.error.as_deref().map(login_error_message),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Credentials go to the backend with the resolved tenant id; on success the
/// token and user are stored in the session and the user lands in their
/// role's area.
pub async fn login(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    handle: SessionHandle,
    Form(form): Form<LoginForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return login_error("email");
    };
    let password = SecretString::from(form.password);

    let response = match state
        .backend()
        .login(tenant.tenant_id(), &email, &password)
        .await
    {
        Ok(response) => response,
        Err(BackendError::Unauthorized) => {
            tracing::info!(tenant_id = %tenant.tenant_id(), "Login rejected");
            return login_error("credentials");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            return login_error("unavailable");
        }
    };

    if let Err(e) = handle.cycle_id().await {
        tracing::error!(error = %e, "Failed to rotate session id");
        return login_error("session");
    }
    if let Err(e) =
        session::store_login(&handle, response.token.expose_secret(), &response.user).await
    {
        tracing::error!(error = %e, "Failed to store login in session");
        return login_error("session");
    }

    let user = response.user;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, role = %user.role, "User signed in");

    landing_response(landing_for(AuthState::Authenticated(&user), paths::ROOT))
}

/// Handle logout: forget the user, token and cached tenant.
pub async fn logout(handle: SessionHandle) -> Response {
    if let Err(e) = session::clear(&handle).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to(paths::ROOT).into_response()
}

/// Role landing: redirect the session to the area its role belongs to.
pub async fn landing(
    OptionalUser(user): OptionalUser,
    Query(query): Query<LandingQuery>,
) -> Response {
    let default_path = safe_default_path(query.default_path.as_deref());
    landing_response(landing_for(AuthState::from_user(user.as_ref()), default_path))
}
