//! Integration tests for Detailer.
//!
//! The full web router runs in-process against a `wiremock` backend; requests
//! go through `tower::ServiceExt::oneshot`, so no ports or external services
//! are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p detailer-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `tenant_resolution` - Host classification, lookup and session caching
//! - `role_routing` - Login, landing routes and area gating

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{HeaderMap, Request, Response, StatusCode, header},
};
use detailer_web::{config::WebConfig, state::AppState};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Host of the tenant most tests use.
pub const FOO_HOST: &str = "foo.meusaas.com.br";

/// Tenant id the mock backend returns for `foo`.
pub const FOO_TENANT_ID: &str = "t-foo";

/// Tenant name the mock backend returns for `foo`.
pub const FOO_TENANT_NAME: &str = "Foo Estética Automotiva";

/// Client IP sent on every request (the login limiter keys on it).
const CLIENT_IP: &str = "203.0.113.10";

/// Peer address of requests sent without proxy headers.
const PEER_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 51000);

/// A response with its body read.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// The web app wired to a mock backend, with one browser's cookie jar.
pub struct TestApp {
    pub backend: MockServer,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Start a mock backend and build the app against it.
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;
        let backend_url = backend.uri();
        let config = WebConfig::from_lookup(|key| match key {
            "BACKEND_URL" => Some(backend_url.clone()),
            _ => None,
        })
        .unwrap();
        let state = AppState::new(config).unwrap();

        Self {
            backend,
            router: detailer_web::app(state),
            cookie: None,
        }
    }

    /// Serve `tenantId`/`tenantName` for `subdomain`, expecting `times` lookups.
    pub async fn mount_tenant(&self, subdomain: &str, tenant_id: &str, name: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path("/public/tenant-by-subdomain"))
            .and(query_param("subdomain", subdomain))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tenantId": tenant_id,
                "tenantName": name,
            })))
            .expect(times)
            .mount(&self.backend)
            .await;
    }

    /// Answer tenant lookups for `subdomain` with `status`.
    pub async fn mount_tenant_status(&self, subdomain: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/public/tenant-by-subdomain"))
            .and(query_param("subdomain", subdomain))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.backend)
            .await;
    }

    /// Accept any login for the `foo` tenant and return a user with `role`.
    pub async fn mount_login(&self, role: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(wiremock::matchers::header("x-tenant-id", FOO_TENANT_ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "jwt-test",
                "user": {
                    "id": "u-1",
                    "email": "ana@example.com",
                    "name": "Ana",
                    "role": role,
                    "tenantId": FOO_TENANT_ID,
                }
            })))
            .mount(&self.backend)
            .await;
    }

    /// Reject every login.
    pub async fn mount_login_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.backend)
            .await;
    }

    /// `GET uri` as if addressed to `host`.
    pub async fn get(&mut self, host: &str, uri: &str) -> TestResponse {
        let request = self.request(host, uri).method("GET").body(Body::empty());
        self.send(request.unwrap()).await
    }

    /// `POST uri` with a form body as if addressed to `host`.
    pub async fn post_form(&mut self, host: &str, uri: &str, form: &str) -> TestResponse {
        let request = self
            .request(host, uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()));
        self.send(request.unwrap()).await
    }

    /// `POST uri` with a form body straight from the client, as in local
    /// development: no proxy headers, only the peer address the server sees.
    pub async fn post_form_direct(&mut self, host: &str, uri: &str, form: &str) -> TestResponse {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::HOST, host)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let mut request = builder.body(Body::from(form.to_owned())).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(PEER_ADDR)));
        self.send(request).await
    }

    /// Forget the session cookie, like a new browser.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    fn request(&self, host: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder()
            .uri(uri)
            .header(header::HOST, host)
            .header("x-forwarded-for", CLIENT_IP);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response: Response<Body> = self.router.clone().oneshot(request).await.unwrap();

        if let Some(pair) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(pair.trim().to_owned());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
