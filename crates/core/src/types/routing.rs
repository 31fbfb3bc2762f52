//! Role-based landing routes and area gating.

use super::role::Role;
use super::session::SessionUser;

/// Canonical paths of the role areas.
pub mod paths {
    /// Site root, the fallback for anonymous and unknown users.
    pub const ROOT: &str = "/";
    /// Login page.
    pub const LOGIN: &str = "/entrar";
    /// Landing page of the admin area.
    pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
    /// Landing page of the staff area.
    pub const STAFF_DASHBOARD: &str = "/painel/dashboard";
    /// Landing page of the booking area.
    pub const BOOKING_SERVICES: &str = "/agendar/servicos";
}

/// What is known about the session's authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState<'a> {
    /// The session has not been read yet.
    Loading,
    /// No user is signed in.
    Anonymous,
    Authenticated(&'a SessionUser),
}

impl<'a> AuthState<'a> {
    /// Build the state from a finished session read.
    #[must_use]
    pub const fn from_user(user: Option<&'a SessionUser>) -> Self {
        match user {
            Some(user) => Self::Authenticated(user),
            None => Self::Anonymous,
        }
    }
}

/// Outcome of [`landing_for`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    /// Session state is still unknown; show a loading indicator.
    Pending,
    /// Navigate to this path.
    Redirect(String),
}

/// Pick the landing route for a session.
///
/// Anonymous sessions and unknown roles go to `default_path` (or `/` when it
/// is blank). Both admin roles share the admin dashboard.
#[must_use]
pub fn landing_for(auth: AuthState<'_>, default_path: &str) -> Landing {
    let default_path = if default_path.trim().is_empty() {
        paths::ROOT
    } else {
        default_path
    };

    let path = match auth {
        AuthState::Loading => return Landing::Pending,
        AuthState::Anonymous => default_path,
        AuthState::Authenticated(user) => match Area::for_role(user.role) {
            Some(area) => area.landing_path(),
            None => default_path,
        },
    };
    Landing::Redirect(path.to_owned())
}

/// A role-gated section of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// Tenant administration (`/admin`).
    Admin,
    /// Staff panel (`/painel`).
    Staff,
    /// Customer booking (`/agendar`).
    Booking,
}

impl Area {
    /// The area a role lands in, if any.
    #[must_use]
    pub const fn for_role(role: Role) -> Option<Self> {
        match role {
            Role::SuperAdmin | Role::TenantAdmin => Some(Self::Admin),
            Role::Employee => Some(Self::Staff),
            Role::Client => Some(Self::Booking),
            Role::Unknown => None,
        }
    }

    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        match self {
            Self::Admin => paths::ADMIN_DASHBOARD,
            Self::Staff => paths::STAFF_DASHBOARD,
            Self::Booking => paths::BOOKING_SERVICES,
        }
    }

    /// Whether users with `role` may enter this area.
    #[must_use]
    pub fn admits(self, role: Role) -> bool {
        Self::for_role(role) == Some(self)
    }
}
