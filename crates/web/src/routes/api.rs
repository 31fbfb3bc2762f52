//! JSON API routes.

use axum::{Json, response::IntoResponse};
use detailer_core::{AuthState, Landing, SessionUser, TenantIdentity, landing_for, paths};
use serde::Serialize;

use crate::middleware::OptionalUser;
use crate::tenant::CurrentTenant;

/// Response of `GET /api/session`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub tenant: TenantIdentity,
    /// Display name; a placeholder when the tenant came from the session.
    pub tenant_name: String,
    pub user: Option<SessionUser>,
    /// Where the role router sends this session.
    pub landing: String,
}

/// Describe the current session: tenant, user and landing route.
pub async fn session(
    CurrentTenant(tenant): CurrentTenant,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    let landing = match landing_for(AuthState::from_user(user.as_ref()), paths::ROOT) {
        Landing::Redirect(path) => path,
        Landing::Pending => paths::ROOT.to_owned(),
    };

    Json(SessionInfo {
        tenant_name: tenant.display_name().to_owned(),
        tenant,
        user,
        landing,
    })
}
