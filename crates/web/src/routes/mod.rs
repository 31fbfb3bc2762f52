//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//!
//! # Tenant-scoped (behind tenant resolution)
//! GET  /                       - Tenant home page
//! GET  /inicio                 - Role landing (redirects by role)
//! GET  /entrar                 - Login page
//! POST /entrar                 - Login action (rate limited)
//! GET  /admin/dashboard        - Admin area
//! GET  /painel/dashboard       - Staff area
//! GET  /agendar/servicos       - Booking area
//! GET  /api/session            - Tenant, user and landing as JSON
//!
//! # Session
//! POST /sair                   - Logout action
//! ```

pub mod api;
pub mod areas;
pub mod auth;
pub mod home;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use detailer_core::paths;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;
use crate::tenant::tenant_middleware;

/// Create the application routes.
///
/// The session layer is applied by the caller; tenant resolution wraps every
/// tenant-scoped route here.
pub fn routes(state: &AppState) -> Router<AppState> {
    let login = Router::new().route(
        paths::LOGIN,
        get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
    );

    let tenant_scoped = Router::new()
        .route(paths::ROOT, get(home::home))
        .route("/inicio", get(auth::landing))
        .route(paths::ADMIN_DASHBOARD, get(areas::admin_dashboard))
        .route(paths::STAFF_DASHBOARD, get(areas::staff_dashboard))
        .route(paths::BOOKING_SERVICES, get(areas::booking_services))
        .route("/api/session", get(api::session))
        .merge(login)
        .route_layer(from_fn_with_state(state.clone(), tenant_middleware));

    Router::new()
        .route("/sair", post(auth::logout))
        .merge(tenant_scoped)
}
