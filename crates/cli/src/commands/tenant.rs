//! Tenant resolution command.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Base URL of the backend API
//! - `DETAILER_RESERVED_SUBDOMAINS`, `DETAILER_DEV_SUBDOMAIN_PARAM` - as for
//!   the web app

use detailer_core::MemorySession;
use detailer_web::backend::BackendClient;
use detailer_web::config::WebConfig;
use detailer_web::tenant::TenantResolver;

/// Resolve the tenant of `host` through the backend.
///
/// Runs the same resolver as the web app against a fresh, empty session.
///
/// # Errors
///
/// Returns an error if configuration is missing, the host names no tenant or
/// the lookup fails.
pub async fn resolve(
    host: &str,
    subdomain: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = WebConfig::from_env()?;
    let backend = BackendClient::new(&config.backend)?;
    let query = subdomain.map(|s| dev_query(&config.tenancy.dev_subdomain_param, s));
    let resolver = TenantResolver::new(backend, config.tenancy);

    tracing::info!(backend = %config.backend.base_url, host, "Resolving tenant");
    let session = MemorySession::new();
    let identity = resolver
        .resolve(&session, Some(host), query.as_deref())
        .await?;

    tracing::info!(
        tenant_id = %identity.tenant_id(),
        tenant_name = identity.display_name(),
        "Tenant resolved"
    );
    Ok(())
}

/// Query string carrying `subdomain` under the development parameter.
fn dev_query(param: &str, subdomain: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair(param, subdomain)
        .finish()
}
