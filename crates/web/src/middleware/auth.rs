//! Authentication extractors and area gating.
//!
//! The signed-in user lives in the session under the `user` key (see
//! [`detailer_core::session`]). Route handlers pick one of:
//!
//! - [`OptionalUser`] when anonymous visitors are welcome,
//! - [`RequireArea`] when the route belongs to a role area.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use detailer_core::{Area, AuthState, Landing, SessionUser, landing_for, paths, session};

use super::session::SessionHandle;

/// Extractor that optionally gets the signed-in user.
///
/// A malformed session entry is discarded and reads as anonymous.
pub struct OptionalUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(handle) = SessionHandle::from_request_parts(parts, state).await else {
            return Ok(Self(None));
        };

        let user = session::load_user(&handle).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read session user");
            None
        });

        Ok(Self(user))
    }
}

/// Marker for a role area used with [`RequireArea`].
pub trait AreaGate: Send + Sync + 'static {
    const AREA: Area;
}

/// Tenant administration (`/admin`).
pub struct AdminArea;

/// Staff panel (`/painel`).
pub struct StaffArea;

/// Customer booking (`/agendar`).
pub struct BookingArea;

impl AreaGate for AdminArea {
    const AREA: Area = Area::Admin;
}

impl AreaGate for StaffArea {
    const AREA: Area = Area::Staff;
}

impl AreaGate for BookingArea {
    const AREA: Area = Area::Booking;
}

/// Extractor that requires a user whose role belongs to area `G`.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireArea(user, _): RequireArea<AdminArea>) -> impl IntoResponse {
///     format!("Olá, {}!", user.name)
/// }
/// ```
pub struct RequireArea<G: AreaGate>(pub SessionUser, pub PhantomData<G>);

/// Error returned when a request may not enter an area.
#[derive(Debug, PartialEq, Eq)]
pub enum AreaRejection {
    /// Nobody is signed in (HTML requests).
    RedirectToLogin,
    /// Nobody is signed in (API requests).
    Unauthorized,
    /// Signed in, but the role lives elsewhere; send the user home.
    RedirectToLanding(String),
    /// Signed in, wrong area, API request.
    Forbidden,
}

impl IntoResponse for AreaRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(paths::LOGIN).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::RedirectToLanding(path) => Redirect::to(&path).into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// Decide whether `user` may enter `area` from `path`.
fn check_area(
    area: Area,
    user: Option<SessionUser>,
    path: &str,
) -> Result<SessionUser, AreaRejection> {
    let is_api = path.starts_with("/api/");

    let Some(user) = user else {
        return Err(if is_api {
            AreaRejection::Unauthorized
        } else {
            AreaRejection::RedirectToLogin
        });
    };

    if area.admits(user.role) {
        return Ok(user);
    }

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        area = ?area,
        "Role not admitted to area"
    );

    if is_api {
        return Err(AreaRejection::Forbidden);
    }
    match landing_for(AuthState::Authenticated(&user), paths::ROOT) {
        Landing::Redirect(target) => Err(AreaRejection::RedirectToLanding(target)),
        Landing::Pending => Err(AreaRejection::RedirectToLanding(paths::ROOT.to_owned())),
    }
}

impl<S, G> FromRequestParts<S> for RequireArea<G>
where
    S: Send + Sync,
    G: AreaGate,
{
    type Rejection = AreaRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(OptionalUser(user)) = OptionalUser::from_request_parts(parts, state).await;
        check_area(G::AREA, user, parts.uri.path()).map(|user| Self(user, PhantomData))
    }
}
