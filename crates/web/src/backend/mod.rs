//! Client for the Detailer backend API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`
//! - The backend owns all persistent data; this site keeps none
//! - Tenant lookups are cached in memory via `moka` (60 second TTL) so a
//!   burst of new sessions on one subdomain costs a single round trip
//!
//! # Example
//!
//! ```rust,ignore
//! use detailer_web::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//! let tenant = client.tenant_by_subdomain(&Subdomain::parse("foo")?).await?;
//! ```

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use detailer_core::{Email, Subdomain, TenantId};
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

pub use types::{LoginResponse, TenantRecord};
use types::LoginRequest;

/// Header carrying the tenant id on tenant-scoped backend calls.
pub const TENANT_HEADER: &str = "x-tenant-id";

const TENANT_CACHE_TTL: Duration = Duration::from_secs(60);
const TENANT_CACHE_CAPACITY: u64 = 1_000;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The backend does not know the requested resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend answered with an unexpected status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not decode.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the backend API.
///
/// Cheap to clone; clones share the HTTP connection pool and the tenant
/// cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    tenants: Cache<Subdomain, TenantRecord>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let tenants = Cache::builder()
            .max_capacity(TENANT_CACHE_CAPACITY)
            .time_to_live(TENANT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                tenants,
            }),
        })
    }

    /// Look up the tenant addressed by `subdomain`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the backend answers 404, or another
    /// variant if the request fails or the body does not decode.
    #[instrument(skip_all, fields(subdomain = %subdomain))]
    pub async fn tenant_by_subdomain(
        &self,
        subdomain: &Subdomain,
    ) -> Result<TenantRecord, BackendError> {
        if let Some(record) = self.inner.tenants.get(subdomain).await {
            debug!("Cache hit for tenant lookup");
            return Ok(record);
        }

        let mut url = self.endpoint("public/tenant-by-subdomain")?;
        url.query_pairs_mut()
            .append_pair("subdomain", subdomain.as_str());

        let response = self.inner.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(format!(
                "tenant for subdomain {subdomain}"
            )));
        }

        let record: TenantRecord = read_json(response).await?;

        self.inner
            .tenants
            .insert(subdomain.clone(), record.clone())
            .await;

        Ok(record)
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` if the backend answers 401 or 403,
    /// or another variant if the request fails or the body does not decode.
    #[instrument(skip_all, fields(tenant_id = %tenant_id, email = %email))]
    pub async fn login(
        &self,
        tenant_id: &TenantId,
        email: &Email,
        password: &SecretString,
    ) -> Result<LoginResponse, BackendError> {
        let url = self.endpoint("auth/login")?;
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let response = self
            .inner
            .client
            .post(url)
            .header(TENANT_HEADER, tenant_id.as_str())
            .json(&body)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(BackendError::Unauthorized);
        }

        read_json(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }
}

/// Decode a successful JSON response, turning other statuses into errors.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();

    // Get response body as text first for better error diagnostics
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(BackendError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use detailer_core::Role;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> BackendClient {
        let config = BackendConfig::new(&server.uri()).unwrap();
        BackendClient::new(&config).unwrap()
    }

    fn subdomain(s: &str) -> Subdomain {
        Subdomain::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_tenant_lookup_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/tenant-by-subdomain"))
            .and(query_param("subdomain", "foo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tenantId": "t-123",
                "tenantName": "Foo Detailing",
                "logoUrl": "https://cdn.example/logo.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server)
            .tenant_by_subdomain(&subdomain("foo"))
            .await
            .unwrap();
        assert_eq!(record.tenant_id.as_str(), "t-123");
        assert_eq!(record.tenant_name, "Foo Detailing");
    }

    #[tokio::test]
    async fn test_tenant_lookup_is_cached_per_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/tenant-by-subdomain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tenantId": "t-1",
                "tenantName": "One"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.tenant_by_subdomain(&subdomain("one")).await.unwrap();
        client.tenant_by_subdomain(&subdomain("one")).await.unwrap();
    }

    #[tokio::test]
    async fn test_tenant_lookup_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/tenant-by-subdomain"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .tenant_by_subdomain(&subdomain("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_tenant_lookup_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/tenant-by-subdomain"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .tenant_by_subdomain(&subdomain("foo"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_tenant_lookup_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/tenant-by-subdomain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tenantName": "No id"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .tenant_by_subdomain(&subdomain("foo"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[tokio::test]
    async fn test_base_path_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/public/tenant-by-subdomain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tenantId": "t-1",
                "tenantName": "One"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = BackendConfig::new(&format!("{}/api", server.uri())).unwrap();
        let client = BackendClient::new(&config).unwrap();
        client.tenant_by_subdomain(&subdomain("one")).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_sends_tenant_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header(TENANT_HEADER, "t-1"))
            .and(body_json(serde_json::json!({
                "email": "ana@example.com",
                "password": "hunter2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "jwt-abc",
                "user": {
                    "id": "u-1",
                    "email": "ana@example.com",
                    "name": "Ana",
                    "role": "TENANT_ADMIN",
                    "tenantId": "t-1"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .login(
                &TenantId::parse("t-1").unwrap(),
                &Email::parse("ana@example.com").unwrap(),
                &SecretString::from("hunter2"),
            )
            .await
            .unwrap();
        assert_eq!(response.token.expose_secret(), "jwt-abc");
        assert_eq!(response.user.role, Role::TenantAdmin);
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(
                &TenantId::parse("t-1").unwrap(),
                &Email::parse("ana@example.com").unwrap(),
                &SecretString::from("wrong"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized));
    }
}
