//! Core types for Detailer.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the tenant resolver and the role router.

pub mod email;
pub mod id;
pub mod role;
pub mod routing;
pub mod session;
pub mod tenant;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::Role;
pub use routing::{Area, AuthState, Landing, landing_for, paths};
pub use session::{MemorySession, SessionStore, SessionUser, session_keys};
pub use tenant::{
    DEFAULT_RESERVED_LABELS, HostError, LOADING_TENANT_NAME, Subdomain, SubdomainError,
    TenantIdentity, TenantRequest, classify_host,
};
