//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::WebConfig;
use crate::tenant::TenantResolver;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    backend: BackendClient,
    tenants: TenantResolver<BackendClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let tenants = TenantResolver::new(backend.clone(), config.tenancy.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                tenants,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the tenant resolver.
    #[must_use]
    pub fn tenants(&self) -> &TenantResolver<BackendClient> {
        &self.inner.tenants
    }
}
