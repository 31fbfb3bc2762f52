//! Session middleware configuration.
//!
//! Sessions live in process memory via tower-sessions, held in a bounded
//! `moka` cache that drops each record when its expiry date passes;
//! everything durable is owned by the backend. [`SessionHandle`] exposes a
//! request's session to the tenant resolver and the role router through
//! [`detailer_core::SessionStore`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use detailer_core::SessionStore;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::{Expiry, Session, SessionManagerLayer, session_store};

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "dt_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Most sessions held at once; the least used are evicted beyond this.
const MAX_SESSIONS: u64 = 100_000;

/// In-memory session records, bounded in count and expired by date.
#[derive(Clone, Debug)]
pub struct CachedSessionStore {
    records: Cache<Id, Record>,
}

impl CachedSessionStore {
    #[must_use]
    pub fn new(max_sessions: u64) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .expire_after(RecordExpiry)
                .build(),
        }
    }
}

impl Default for CachedSessionStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS)
    }
}

#[async_trait]
impl tower_sessions::SessionStore for CachedSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .get(session_id)
            .await
            .filter(|record| time_left(record) > Duration::ZERO))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Expires each cache entry at its record's expiry date.
struct RecordExpiry;

impl moka::Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(&self, _id: &Id, record: &Record, _at: Instant) -> Option<Duration> {
        Some(time_left(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(time_left(record))
    }
}

fn time_left(record: &Record) -> Duration {
    Duration::try_from(record.expiry_date - OffsetDateTime::now_utc()).unwrap_or(Duration::ZERO)
}

/// Create the session layer over a [`CachedSessionStore`].
#[must_use]
pub fn create_session_layer(config: &WebConfig) -> SessionManagerLayer<CachedSessionStore> {
    SessionManagerLayer::new(CachedSessionStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// A request's tower-sessions session seen as a [`SessionStore`].
///
/// Each value is stored as a JSON string.
#[derive(Clone, Debug)]
pub struct SessionHandle(Session);

impl SessionHandle {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Issue a new session id, keeping the data (call on sign-in).
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded.
    pub async fn cycle_id(&self) -> Result<(), tower_sessions::session::Error> {
        self.0.cycle_id().await
    }
}

impl SessionStore for SessionHandle {
    type Error = tower_sessions::session::Error;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        self.0.get::<String>(key).await
    }

    async fn insert(&self, key: &str, value: String) -> Result<(), Self::Error> {
        self.0.insert(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.0.remove::<String>(key).await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}
