//! Integration tests for tenant resolution through the full router.

use axum::http::StatusCode;
use detailer_integration_tests::{FOO_HOST, FOO_TENANT_ID, FOO_TENANT_NAME, TestApp};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_health_needs_no_tenant() {
    let mut app = TestApp::spawn().await;

    let resp = app.get("www.meusaas.com.br", "/health").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn test_tenant_host_renders_home() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;

    let resp = app.get(FOO_HOST, "/").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(FOO_TENANT_NAME));
}

#[tokio::test]
async fn test_upper_case_host_is_lower_cased() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;

    let resp = app.get("FOO.MeuSaaS.com.br:443", "/").await;

    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_cache_skips_lookup_and_host() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;
    Mock::given(method("GET"))
        .and(path("/public/tenant-by-subdomain"))
        .and(query_param("subdomain", "ghost"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&app.backend)
        .await;

    let first = app.get(FOO_HOST, "/api/session").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.json()["tenant"]["status"], "resolved");
    assert_eq!(first.json()["tenantName"], FOO_TENANT_NAME);

    // Same session on another host: the cached id wins without a lookup.
    let second = app.get("ghost.meusaas.com.br", "/api/session").await;
    assert_eq!(second.status, StatusCode::OK);
    let body = second.json();
    assert_eq!(body["tenant"]["status"], "cached");
    assert_eq!(body["tenant"]["tenantId"], FOO_TENANT_ID);
    assert_eq!(body["tenantName"], "Carregando...");
}

#[tokio::test]
async fn test_reserved_label_is_configuration_error() {
    let mut app = TestApp::spawn().await;

    for host in ["www.meusaas.com.br", "app.meusaas.com.br"] {
        let resp = app.get(host, "/").await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{host}");
        assert!(resp.body.contains("Endereço inválido"));
    }
}

#[tokio::test]
async fn test_two_label_host_is_configuration_error() {
    let mut app = TestApp::spawn().await;

    let resp = app.get("meusaas.com", "/").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_localhost_requires_subdomain_param() {
    let mut app = TestApp::spawn().await;

    let resp = app.get("localhost:3000", "/").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body.contains("?subdomain="));
}

#[tokio::test]
async fn test_localhost_with_subdomain_param() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;

    let resp = app.get("localhost:3000", "/?subdomain=foo").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(FOO_TENANT_NAME));
}

#[tokio::test]
async fn test_unknown_tenant_is_not_found() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant_status("ghost", 404).await;

    let resp = app.get("ghost.meusaas.com.br", "/").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.contains("Empresa não encontrada"));
}

#[tokio::test]
async fn test_backend_failure_is_bad_gateway_and_not_cached() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant_status("foo", 500).await;

    let resp = app.get(FOO_HOST, "/").await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);

    // Nothing was written, so the next request looks the tenant up again.
    app.backend.reset().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;
    let resp = app.get(FOO_HOST, "/api/session").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["tenant"]["status"], "resolved");
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let mut app = TestApp::spawn().await;

    let resp = app.get("www.meusaas.com.br", "/").await;

    assert!(resp.headers.contains_key("x-request-id"));
    assert_eq!(resp.headers["x-frame-options"], "DENY");
    assert_eq!(resp.headers["x-content-type-options"], "nosniff");
}
