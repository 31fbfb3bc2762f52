//! Wire types of the backend API.

use detailer_core::{SessionUser, TenantId};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Response of `GET /public/tenant-by-subdomain`.
///
/// The backend sends more fields (branding, contact data); only the ones the
/// site uses are decoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    pub tenant_id: TenantId,
    pub tenant_name: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Opaque credential for later backend calls.
    pub token: SecretString,
    pub user: SessionUser,
}
