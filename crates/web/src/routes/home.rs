//! Tenant home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use detailer_core::{AuthState, Landing, landing_for, paths};

use crate::middleware::OptionalUser;
use crate::tenant::CurrentTenant;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Known only on the request that resolved the tenant.
    pub tenant_name: Option<String>,
    pub user_name: Option<String>,
    /// Where the "continue" button points for a signed-in user.
    pub landing_path: Option<String>,
}

/// Display the tenant home page.
pub async fn home(
    CurrentTenant(tenant): CurrentTenant,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    let landing_path = user.as_ref().and_then(|u| {
        match landing_for(AuthState::Authenticated(u), paths::ROOT) {
            Landing::Redirect(path) if path != paths::ROOT => Some(path),
            _ => None,
        }
    });

    HomeTemplate {
        tenant_name: tenant.tenant_name().map(str::to_owned),
        user_name: user.map(|u| u.name),
        landing_path,
    }
}
