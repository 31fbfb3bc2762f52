//! Detailer Core - Shared types library.
//!
//! This crate provides the types and decision logic shared by all Detailer
//! components:
//! - `web` - Tenant-aware booking site and dashboards
//! - `cli` - Diagnostics for tenant resolution and role routing
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no
//! network access and no concrete session backend. Anything that needs I/O
//! receives it through a trait such as [`SessionStore`].
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, roles, tenants, session data and routing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
