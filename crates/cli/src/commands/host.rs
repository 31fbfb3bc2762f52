//! Host classification command.

use detailer_core::{HostError, Subdomain, TenantRequest, classify_host};

/// Query parameter name shown in messages for loopback hosts.
const DEV_PARAM: &str = "subdomain";

/// Split a comma-separated reserved label list.
pub fn parse_reserved(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Classify `host` into a tenant subdomain.
///
/// # Errors
///
/// Returns the [`HostError`] when the host cannot name a tenant.
pub fn classify(host: &str, subdomain: Option<&str>, reserved: &str) -> Result<Subdomain, HostError> {
    let reserved = parse_reserved(reserved);
    let result = classify_host(
        TenantRequest {
            host: Some(host),
            dev_subdomain: subdomain,
            dev_param: DEV_PARAM,
        },
        &reserved,
    );

    match &result {
        Ok(label) => tracing::info!(host, subdomain = %label, "Host names a tenant"),
        Err(e) => tracing::warn!(host, error = %e, "Host does not name a tenant"),
    }
    result
}
