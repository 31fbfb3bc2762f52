//! Tenant identity and hostname classification.
//!
//! Every tenant is addressed by a DNS label in front of the platform domain,
//! e.g. `foo.meusaas.com.br`. During local development there is no such
//! label, so the subdomain arrives as a query parameter instead.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::id::TenantId;

/// Display name shown while only the cached tenant id is known.
pub const LOADING_TENANT_NAME: &str = "Carregando...";

/// Leading labels that belong to the marketing site, never to a tenant.
pub const DEFAULT_RESERVED_LABELS: &[&str] = &["www", "app"];

/// Minimum number of dot-separated labels in a tenant hostname.
const MIN_HOST_LABELS: usize = 3;

/// Maximum length of a DNS label.
const MAX_LABEL_LENGTH: usize = 63;

/// Errors that can occur when parsing a [`Subdomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubdomainError {
    #[error("subdomain cannot be empty")]
    Empty,
    #[error("subdomain must be at most 63 characters")]
    TooLong,
    #[error("subdomain may only contain letters, digits and inner hyphens")]
    InvalidCharacters,
}

/// A lower-cased DNS label naming a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subdomain(String);

impl Subdomain {
    /// Parse a subdomain label, normalizing it to lower case.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is empty, longer than 63 characters, or
    /// is not made of ASCII letters, digits and inner hyphens.
    pub fn parse(label: &str) -> Result<Self, SubdomainError> {
        let label = label.trim().to_ascii_lowercase();
        if label.is_empty() {
            return Err(SubdomainError::Empty);
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(SubdomainError::TooLong);
        }
        let valid_chars = label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid_chars || label.starts_with('-') || label.ends_with('-') {
            return Err(SubdomainError::InvalidCharacters);
        }
        Ok(Self(label))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Subdomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Subdomain {
    type Error = SubdomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Subdomain> for String {
    fn from(value: Subdomain) -> Self {
        value.0
    }
}

/// The tenant a session belongs to.
///
/// A cache hit only knows the id; consumers must not treat the placeholder
/// name of a [`TenantIdentity::Cached`] value as real tenant data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TenantIdentity {
    /// Taken from the session cache without a backend lookup.
    Cached { tenant_id: TenantId },
    /// Returned by the backend for the request's subdomain.
    Resolved {
        tenant_id: TenantId,
        tenant_name: String,
    },
}

impl TenantIdentity {
    #[must_use]
    pub const fn tenant_id(&self) -> &TenantId {
        match self {
            Self::Cached { tenant_id } | Self::Resolved { tenant_id, .. } => tenant_id,
        }
    }

    /// The tenant name, if the backend supplied one.
    #[must_use]
    pub fn tenant_name(&self) -> Option<&str> {
        match self {
            Self::Cached { .. } => None,
            Self::Resolved { tenant_name, .. } => Some(tenant_name),
        }
    }

    /// Name to render in page chrome; the placeholder for cached identities.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.tenant_name().unwrap_or(LOADING_TENANT_NAME)
    }

    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }
}

/// Reasons a request host cannot name a tenant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("request has no host")]
    MissingHost,
    #[error("local development host requires the `{param}` query parameter")]
    MissingDevSubdomain { param: String },
    #[error("invalid development subdomain: {0}")]
    InvalidDevSubdomain(SubdomainError),
    #[error("host `{host}` has fewer than 3 labels")]
    TooFewLabels { host: String },
    #[error("host label `{label}` is reserved")]
    ReservedLabel { label: String },
    #[error("host `{host}` does not start with a valid subdomain: {source}")]
    InvalidLabel {
        host: String,
        source: SubdomainError,
    },
}

/// Inputs to [`classify_host`] taken from one request.
#[derive(Debug, Clone, Copy)]
pub struct TenantRequest<'a> {
    /// Value of the `Host` header, port included if present.
    pub host: Option<&'a str>,
    /// Value of the development subdomain query parameter, if any.
    pub dev_subdomain: Option<&'a str>,
    /// Name of that query parameter, used in error messages.
    pub dev_param: &'a str,
}

/// Derive the candidate tenant subdomain from a request.
///
/// Loopback hosts take the subdomain from the development query parameter.
/// Any other host must have at least three labels and a leading label outside
/// `reserved` (compared case-insensitively).
///
/// # Errors
///
/// Returns a [`HostError`] describing why no subdomain could be derived.
/// All of them are configuration problems; retrying will not help.
pub fn classify_host<S: AsRef<str>>(
    request: TenantRequest<'_>,
    reserved: &[S],
) -> Result<Subdomain, HostError> {
    let host = request
        .host
        .map(strip_port)
        .filter(|h| !h.is_empty())
        .ok_or(HostError::MissingHost)?;

    if is_local_host(host) {
        let param = request
            .dev_subdomain
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| HostError::MissingDevSubdomain {
                param: request.dev_param.to_owned(),
            })?;
        return Subdomain::parse(param).map_err(HostError::InvalidDevSubdomain);
    }

    let host = host.trim_end_matches('.');
    let labels: Vec<&str> = host.split('.').collect();
    let Some(first) = labels.first().filter(|_| labels.len() >= MIN_HOST_LABELS) else {
        return Err(HostError::TooFewLabels {
            host: host.to_owned(),
        });
    };

    if reserved.iter().any(|r| r.as_ref().eq_ignore_ascii_case(first)) {
        return Err(HostError::ReservedLabel {
            label: first.to_ascii_lowercase(),
        });
    }

    Subdomain::parse(first).map_err(|source| HostError::InvalidLabel {
        host: host.to_owned(),
        source,
    })
}

/// Remove a trailing `:port` (and IPv6 brackets) from a `Host` value.
fn strip_port(host: &str) -> &str {
    let host = host.trim();
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(addr, _)| addr);
    }
    match host.rsplit_once(':') {
        // A second colon means a bare IPv6 address, not a port.
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

fn is_local_host(host: &str) -> bool {
    let lower = host.to_ascii_lowercase();
    if lower == "localhost" || lower.ends_with(".localhost") {
        return true;
    }
    lower
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback() || ip.is_unspecified())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(host: &str) -> TenantRequest<'_> {
        TenantRequest {
            host: Some(host),
            dev_subdomain: None,
            dev_param: "subdomain",
        }
    }

    fn classify(req: TenantRequest<'_>) -> Result<Subdomain, HostError> {
        classify_host(req, DEFAULT_RESERVED_LABELS)
    }

    #[test]
    fn test_production_host_yields_leading_label() {
        let sub = classify(request("foo.meusaas.com.br")).unwrap();
        assert_eq!(sub.as_str(), "foo");
    }

    #[test]
    fn test_leading_label_is_lowercased() {
        let sub = classify(request("FoO.meusaas.com.br:443")).unwrap();
        assert_eq!(sub.as_str(), "foo");
    }

    #[test]
    fn test_too_few_labels() {
        assert!(matches!(
            classify(request("meusaas.com")),
            Err(HostError::TooFewLabels { .. })
        ));
        assert!(matches!(
            classify(request("intranet")),
            Err(HostError::TooFewLabels { .. })
        ));
    }

    #[test]
    fn test_reserved_labels_rejected() {
        for host in ["www.meusaas.com.br", "app.meusaas.com.br", "WWW.meusaas.com"] {
            assert!(
                matches!(classify(request(host)), Err(HostError::ReservedLabel { .. })),
                "{host} should be reserved"
            );
        }
    }

    #[test]
    fn test_custom_reserved_labels() {
        let reserved = vec!["admin".to_string()];
        assert!(classify_host(request("www.meusaas.com.br"), &reserved).is_ok());
        assert!(classify_host(request("admin.meusaas.com.br"), &reserved).is_err());
    }

    #[test]
    fn test_loopback_requires_dev_param() {
        for host in ["localhost:3000", "127.0.0.1", "[::1]:8080", "0.0.0.0:3000"] {
            let err = classify(request(host)).unwrap_err();
            assert_eq!(
                err,
                HostError::MissingDevSubdomain {
                    param: "subdomain".to_string()
                },
                "{host}"
            );
        }
    }

    #[test]
    fn test_loopback_uses_dev_param() {
        let req = TenantRequest {
            dev_subdomain: Some("Brilho"),
            ..request("localhost:5173")
        };
        assert_eq!(classify(req).unwrap().as_str(), "brilho");
    }

    #[test]
    fn test_blank_dev_param_is_missing() {
        let req = TenantRequest {
            dev_subdomain: Some("  "),
            ..request("127.0.0.1:3000")
        };
        assert!(matches!(
            classify(req),
            Err(HostError::MissingDevSubdomain { .. })
        ));
    }

    #[test]
    fn test_missing_host() {
        let req = TenantRequest {
            host: None,
            ..request("")
        };
        assert_eq!(classify(req), Err(HostError::MissingHost));
    }

    #[test]
    fn test_invalid_leading_label() {
        assert!(matches!(
            classify(request("foo_bar.meusaas.com.br")),
            Err(HostError::InvalidLabel { .. })
        ));
    }

    #[test]
    fn test_subdomain_parse_rules() {
        assert!(Subdomain::parse("lava-jato-1").is_ok());
        assert_eq!(Subdomain::parse(""), Err(SubdomainError::Empty));
        assert_eq!(
            Subdomain::parse("-edge"),
            Err(SubdomainError::InvalidCharacters)
        );
        assert_eq!(
            Subdomain::parse(&"a".repeat(64)),
            Err(SubdomainError::TooLong)
        );
    }

    #[test]
    fn test_identity_display_name() {
        let tenant_id = TenantId::parse("t-1").unwrap();
        let cached = TenantIdentity::Cached {
            tenant_id: tenant_id.clone(),
        };
        assert!(cached.is_cached());
        assert_eq!(cached.display_name(), LOADING_TENANT_NAME);
        assert_eq!(cached.tenant_name(), None);

        let resolved = TenantIdentity::Resolved {
            tenant_id,
            tenant_name: "Brilho Estética Automotiva".to_string(),
        };
        assert_eq!(resolved.display_name(), "Brilho Estética Automotiva");
    }

    #[test]
    fn test_identity_serializes_tagged() {
        let cached = TenantIdentity::Cached {
            tenant_id: TenantId::parse("t-9").unwrap(),
        };
        let json = serde_json::to_value(&cached).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "cached", "tenantId": "t-9" })
        );
    }
}
