//! CLI command implementations.

pub mod host;
pub mod route;
pub mod tenant;
