//! # bootstrap-ports
//!
//! Boundary traits between the override core and the host process.
//! The only collaborator the core needs is a logger.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod logger;

pub use logger::*;
