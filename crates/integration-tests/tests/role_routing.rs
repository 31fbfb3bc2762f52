//! Integration tests for login, role landing routes and area gating.

use axum::http::StatusCode;
use detailer_integration_tests::{FOO_HOST, FOO_TENANT_ID, FOO_TENANT_NAME, TestApp};

const LOGIN_FORM: &str = "email=ana%40example.com&password=hunter2";

/// App with the `foo` tenant and a backend that signs in a user with `role`.
async fn signed_in(role: &str) -> TestApp {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;
    app.mount_login(role).await;

    let resp = app.post_form(FOO_HOST, "/entrar", LOGIN_FORM).await;
    assert!(resp.status.is_redirection(), "login status {}", resp.status);
    app
}

#[tokio::test]
async fn test_login_redirects_by_role() {
    let cases = [
        ("TENANT_ADMIN", "/admin/dashboard"),
        ("SUPER_ADMIN", "/admin/dashboard"),
        ("EMPLOYEE", "/painel/dashboard"),
        ("CLIENT", "/agendar/servicos"),
        ("MECHANIC", "/"),
    ];

    for (role, expected) in cases {
        let mut app = TestApp::spawn().await;
        app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;
        app.mount_login(role).await;

        let resp = app.post_form(FOO_HOST, "/entrar", LOGIN_FORM).await;

        assert!(resp.status.is_redirection(), "{role}");
        assert_eq!(resp.location(), Some(expected), "{role}");
    }
}

#[tokio::test]
async fn test_login_without_proxy_headers_on_localhost() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;
    app.mount_login("EMPLOYEE").await;

    let resp = app
        .post_form_direct("localhost:3000", "/entrar?subdomain=foo", LOGIN_FORM)
        .await;

    assert!(resp.status.is_redirection(), "login status {}", resp.status);
    assert_eq!(resp.location(), Some("/painel/dashboard"));
}

#[tokio::test]
async fn test_rejected_login_returns_to_form() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;
    app.mount_login_rejected().await;

    let resp = app.post_form(FOO_HOST, "/entrar", LOGIN_FORM).await;
    assert_eq!(resp.location(), Some("/entrar?error=credentials"));

    let page = app.get(FOO_HOST, "/entrar?error=credentials").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("E-mail ou senha incorretos."));
}

#[tokio::test]
async fn test_invalid_email_never_reaches_backend() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;

    let resp = app
        .post_form(FOO_HOST, "/entrar", "email=%20&password=x")
        .await;

    assert_eq!(resp.location(), Some("/entrar?error=email"));
}

#[tokio::test]
async fn test_anonymous_area_access_goes_to_login() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;

    for area in ["/admin/dashboard", "/painel/dashboard", "/agendar/servicos"] {
        let resp = app.get(FOO_HOST, area).await;
        assert_eq!(resp.location(), Some("/entrar"), "{area}");
    }
}

#[tokio::test]
async fn test_anonymous_landing_uses_default_path() {
    let mut app = TestApp::spawn().await;
    app.mount_tenant("foo", FOO_TENANT_ID, FOO_TENANT_NAME, 1).await;

    let resp = app.get(FOO_HOST, "/inicio").await;
    assert_eq!(resp.location(), Some("/"));

    let resp = app.get(FOO_HOST, "/inicio?padrao=/entrar").await;
    assert_eq!(resp.location(), Some("/entrar"));
}

#[tokio::test]
async fn test_employee_reaches_staff_area_only() {
    let mut app = signed_in("EMPLOYEE").await;

    let resp = app.get(FOO_HOST, "/painel/dashboard").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Ana"));

    let resp = app.get(FOO_HOST, "/admin/dashboard").await;
    assert_eq!(resp.location(), Some("/painel/dashboard"));

    let resp = app.get(FOO_HOST, "/agendar/servicos").await;
    assert_eq!(resp.location(), Some("/painel/dashboard"));

    let resp = app.get(FOO_HOST, "/inicio").await;
    assert_eq!(resp.location(), Some("/painel/dashboard"));
}

#[tokio::test]
async fn test_admin_roles_share_admin_area() {
    for role in ["TENANT_ADMIN", "SUPER_ADMIN"] {
        let mut app = signed_in(role).await;
        let resp = app.get(FOO_HOST, "/admin/dashboard").await;
        assert_eq!(resp.status, StatusCode::OK, "{role}");
    }
}

#[tokio::test]
async fn test_session_api_reports_user_and_landing() {
    let mut app = signed_in("CLIENT").await;

    let resp = app.get(FOO_HOST, "/api/session").await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["tenant"]["tenantId"], FOO_TENANT_ID);
    assert_eq!(body["user"]["role"], "CLIENT");
    assert_eq!(body["landing"], "/agendar/servicos");
}

#[tokio::test]
async fn test_signed_in_login_page_redirects_home() {
    let mut app = signed_in("CLIENT").await;

    let resp = app.get(FOO_HOST, "/entrar").await;

    assert_eq!(resp.location(), Some("/agendar/servicos"));
}

#[tokio::test]
async fn test_logout_clears_user_and_tenant() {
    let mut app = signed_in("EMPLOYEE").await;

    let resp = app.post_form(FOO_HOST, "/sair", "").await;
    assert_eq!(resp.location(), Some("/"));

    // The tenant id is gone too, so the next request resolves it again.
    let resp = app.get(FOO_HOST, "/api/session").await;
    let body = resp.json();
    assert_eq!(body["tenant"]["status"], "resolved");
    assert!(body["user"].is_null());
    assert_eq!(body["landing"], "/");
}

#[tokio::test]
async fn test_new_browser_is_anonymous() {
    let mut app = signed_in("EMPLOYEE").await;
    app.clear_cookies();

    let resp = app.get(FOO_HOST, "/painel/dashboard").await;

    assert_eq!(resp.location(), Some("/entrar"));
}
