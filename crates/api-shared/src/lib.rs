//! # API Shared
//!
//! Shared definitions for the CDSS server binaries.
//!
//! Contains:
//! - REST wire types (`wire` module), with OpenAPI schemas
//! - Shared services like `HealthService`

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
