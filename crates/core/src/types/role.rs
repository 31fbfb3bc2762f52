//! User roles.

use serde::{Deserialize, Serialize};

/// Authorization class of a signed-in user.
///
/// Wire values are `SCREAMING_SNAKE_CASE`. Values this build does not know
/// about deserialize to [`Role::Unknown`] instead of failing, so a newer
/// backend cannot lock users out of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform operator with access to every tenant.
    SuperAdmin,
    /// Owner or manager of a single tenant.
    TenantAdmin,
    /// Staff member of a tenant.
    Employee,
    /// End customer booking services.
    Client,
    /// Any role string not listed above.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Whether this role administers a tenant.
    ///
    /// Both admin roles share the admin area; finer permission checks belong
    /// to the backend.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::TenantAdmin)
    }

    /// The wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::TenantAdmin => "TENANT_ADMIN",
            Self::Employee => "EMPLOYEE",
            Self::Client => "CLIENT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    /// Parse a wire role name. Unrecognized names map to [`Role::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "SUPER_ADMIN" => Self::SuperAdmin,
            "TENANT_ADMIN" => Self::TenantAdmin,
            "EMPLOYEE" => Self::Employee,
            "CLIENT" => Self::Client,
            _ => Self::Unknown,
        })
    }
}
