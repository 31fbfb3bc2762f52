//! Session data and the session-store capability.
//!
//! The tenant resolver and role router never reach for ambient global state.
//! They receive a [`SessionStore`] and read or write a handful of string
//! entries through it. The web crate adapts `tower-sessions` to this trait;
//! [`MemorySession`] backs tests and one-shot tools.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{TenantId, UserId};
use super::role::Role;

/// Keys under which session entries are stored.
pub mod session_keys {
    /// Opaque auth credential issued by the backend at login.
    pub const TOKEN: &str = "token";

    /// JSON-encoded [`SessionUser`](super::SessionUser).
    pub const USER: &str = "user";

    /// Tenant id cached after the first successful resolution.
    pub const TENANT_ID: &str = "x-tenant-id";
}

/// The signed-in user as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
}

/// String key/value storage scoped to one browser session.
pub trait SessionStore: Send + Sync {
    /// Error raised by the underlying storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read an entry.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Write an entry, replacing any previous value.
    fn insert(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Delete an entry. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Read the cached tenant id, if any.
///
/// A blank or otherwise invalid cached value is treated as absent.
///
/// # Errors
///
/// Returns the store's error if the entry cannot be read.
pub async fn cached_tenant_id<S: SessionStore>(store: &S) -> Result<Option<TenantId>, S::Error> {
    let raw = store.get(session_keys::TENANT_ID).await?;
    Ok(raw.and_then(|value| TenantId::parse(value).ok()))
}

/// Cache a tenant id unless the session already holds one.
///
/// Returns `true` when the value was written.
///
/// # Errors
///
/// Returns the store's error if the entry cannot be read or written.
pub async fn cache_tenant_id<S: SessionStore>(
    store: &S,
    tenant_id: &TenantId,
) -> Result<bool, S::Error> {
    if cached_tenant_id(store).await?.is_some() {
        return Ok(false);
    }
    store
        .insert(session_keys::TENANT_ID, tenant_id.as_str().to_owned())
        .await?;
    Ok(true)
}

/// Load the signed-in user.
///
/// A `user` entry that does not decode is cleared together with the token,
/// and the session is treated as anonymous.
///
/// # Errors
///
/// Returns the store's error if the entries cannot be read or cleared.
pub async fn load_user<S: SessionStore>(store: &S) -> Result<Option<SessionUser>, S::Error> {
    let Some(raw) = store.get(session_keys::USER).await? else {
        return Ok(None);
    };

    match serde_json::from_str::<SessionUser>(&raw) {
        Ok(user) => Ok(Some(user)),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed session user");
            store.remove(session_keys::USER).await?;
            store.remove(session_keys::TOKEN).await?;
            Ok(None)
        }
    }
}

/// Store the token and user returned by a successful login.
///
/// # Errors
///
/// Returns the store's error if an entry cannot be written.
pub async fn store_login<S: SessionStore>(
    store: &S,
    token: &str,
    user: &SessionUser,
) -> Result<(), S::Error> {
    // SessionUser has only string-like fields, so encoding cannot fail.
    let encoded = serde_json::to_string(user).unwrap_or_default();
    store.insert(session_keys::TOKEN, token.to_owned()).await?;
    store.insert(session_keys::USER, encoded).await
}

/// Remove every entry this application writes (logout).
///
/// # Errors
///
/// Returns the store's error if an entry cannot be removed.
pub async fn clear<S: SessionStore>(store: &S) -> Result<(), S::Error> {
    store.remove(session_keys::TOKEN).await?;
    store.remove(session_keys::USER).await?;
    store.remove(session_keys::TENANT_ID).await
}

/// In-memory [`SessionStore`].
///
/// Lives only as long as the value itself; used by tests and by tools that
/// resolve a tenant once.
#[derive(Debug, Default)]
pub struct MemorySession {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session pre-populated with entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Synchronous read, for assertions.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SessionStore for MemorySession {
    type Error = Infallible;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.peek(key))
    }

    async fn insert(&self, key: &str, value: String) -> Result<(), Self::Error> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
