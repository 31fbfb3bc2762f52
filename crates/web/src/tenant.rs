//! Tenant resolution for incoming requests.
//!
//! Every tenant-scoped route runs behind [`tenant_middleware`], which
//! produces a [`TenantIdentity`] before the handler starts:
//!
//! 1. A tenant id already cached in the session wins, with no backend call.
//! 2. Otherwise the request host is classified (see
//!    [`detailer_core::classify_host`]) into a candidate subdomain.
//! 3. The backend is asked for that subdomain's tenant and the returned id is
//!    cached in the session.
//!
//! Any failure ends the request with a full-page error; handlers never see a
//! partial tenant. Resolution is an ordinary future, so a dropped request
//! (client gone, timeout) also drops the lookup and the session write that
//! would follow it.

use std::future::Future;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, Uri, header::HOST, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use detailer_core::{
    HostError, SessionStore, Subdomain, TenantIdentity, TenantRequest, classify_host, session,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{BackendClient, BackendError, TenantRecord};
use crate::config::TenancyConfig;
use crate::middleware::SessionHandle;
use crate::state::AppState;

/// Header set by reverse proxies with the host the client asked for.
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Source of tenant records by subdomain.
pub trait TenantDirectory: Send + Sync {
    fn lookup(
        &self,
        subdomain: &Subdomain,
    ) -> impl Future<Output = Result<TenantRecord, BackendError>> + Send;
}

impl TenantDirectory for BackendClient {
    async fn lookup(&self, subdomain: &Subdomain) -> Result<TenantRecord, BackendError> {
        self.tenant_by_subdomain(subdomain).await
    }
}

/// Why a request could not be tied to a tenant.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The host (or development parameter) cannot name a tenant.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The backend has no tenant for the subdomain.
    #[error("no tenant for subdomain {0}")]
    UnknownTenant(Subdomain),

    /// The backend lookup failed.
    #[error("tenant lookup failed: {0}")]
    Lookup(#[source] BackendError),

    /// The session could not be read or written.
    #[error("session error: {0}")]
    Session(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ResolveError {
    fn session<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Session(Box::new(err))
    }

    /// HTTP status of the error page.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Host(_) => StatusCode::BAD_REQUEST,
            Self::UnknownTenant(_) => StatusCode::NOT_FOUND,
            Self::Lookup(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Host(HostError::MissingDevSubdomain { param }) => format!(
                "Ambiente de desenvolvimento: informe a empresa na URL com ?{param}=<subdominio>."
            ),
            Self::Host(_) => {
                "Endereço inválido. Acesse o sistema pelo endereço exclusivo da sua empresa."
                    .to_string()
            }
            Self::UnknownTenant(_) => {
                "Empresa não encontrada. Verifique o endereço ou entre em contato com o suporte."
                    .to_string()
            }
            Self::Lookup(_) => "Não foi possível carregar os dados da empresa. \
                                Verifique o endereço ou entre em contato com o suporte."
                .to_string(),
            Self::Session(_) => "Erro interno. Tente novamente em instantes.".to_string(),
        }
    }
}

/// Full-page error shown when resolution fails.
#[derive(Template, WebTemplate)]
#[template(path = "tenant_error.html")]
pub struct TenantErrorTemplate {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Lookup(_) | Self::Session(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Tenant resolution failed"
            );
        } else {
            warn!(error = %self, "Request does not name a tenant");
        }

        let status = self.status();
        let page = TenantErrorTemplate {
            status: status.as_u16(),
            message: self.user_message(),
        };
        (status, page).into_response()
    }
}

/// Resolves the tenant of a session.
pub struct TenantResolver<D> {
    directory: D,
    tenancy: TenancyConfig,
}

impl<D: TenantDirectory> TenantResolver<D> {
    pub const fn new(directory: D, tenancy: TenancyConfig) -> Self {
        Self { directory, tenancy }
    }

    #[must_use]
    pub const fn directory(&self) -> &D {
        &self.directory
    }

    /// Resolve the tenant for one request.
    ///
    /// `host` is the requested host (port allowed) and `query` the raw query
    /// string, which carries the subdomain on loopback hosts.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`]; none of them are retried.
    pub async fn resolve<S: SessionStore>(
        &self,
        store: &S,
        host: Option<&str>,
        query: Option<&str>,
    ) -> Result<TenantIdentity, ResolveError> {
        if let Some(tenant_id) = session::cached_tenant_id(store)
            .await
            .map_err(ResolveError::session)?
        {
            debug!(tenant_id = %tenant_id, "Tenant taken from session");
            return Ok(TenantIdentity::Cached { tenant_id });
        }

        let param = self.tenancy.dev_subdomain_param.as_str();
        let dev_subdomain = query.and_then(|q| query_value(q, param));
        let subdomain = classify_host(
            TenantRequest {
                host,
                dev_subdomain: dev_subdomain.as_deref(),
                dev_param: param,
            },
            &self.tenancy.reserved_subdomains,
        )?;

        let record = self
            .directory
            .lookup(&subdomain)
            .await
            .map_err(|e| match e {
                BackendError::NotFound(_) => ResolveError::UnknownTenant(subdomain.clone()),
                other => ResolveError::Lookup(other),
            })?;

        let written = session::cache_tenant_id(store, &record.tenant_id)
            .await
            .map_err(ResolveError::session)?;
        info!(
            subdomain = %subdomain,
            tenant_id = %record.tenant_id,
            cached = written,
            "Tenant resolved"
        );

        Ok(TenantIdentity::Resolved {
            tenant_id: record.tenant_id,
            tenant_name: record.tenant_name,
        })
    }
}

/// First value of `key` in a URL query string.
fn query_value(query: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// The host the client addressed, preferring the proxy-forwarded value.
fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(FORWARDED_HOST)
        .or_else(|| headers.get(HOST))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_owned())
        .or_else(|| uri.authority().map(|a| a.host().to_owned()))
}

/// Middleware that resolves the tenant and stores it in request extensions.
///
/// Must run inside the session layer.
pub async fn tenant_middleware(
    State(state): State<AppState>,
    handle: SessionHandle,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request_host(request.headers(), request.uri());
    let query = request.uri().query().map(str::to_owned);

    match state
        .tenants()
        .resolve(&handle, host.as_deref(), query.as_deref())
        .await
    {
        Ok(identity) => {
            sentry::configure_scope(|scope| {
                scope.set_tag("tenant_id", identity.tenant_id());
            });
            request.extensions_mut().insert(CurrentTenant(identity));
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// The tenant of the current request.
///
/// Only available on routes behind [`tenant_middleware`]; anywhere else the
/// extractor rejects with 500 and logs an error.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub TenantIdentity);

/// Rejection for [`CurrentTenant`] outside the tenant middleware.
#[derive(Debug)]
pub struct TenantNotResolved;

impl IntoResponse for TenantNotResolved {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Tenant requested on a route without tenant resolution",
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = TenantNotResolved;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            tracing::error!(
                path = %parts.uri.path(),
                "CurrentTenant extracted outside tenant middleware"
            );
            TenantNotResolved
        })
    }
}
