//! # bootstrap-adapters
//!
//! Adapter implementations for the bootstrap ports.
//! This crate depends on `ports` and `shared`.

pub mod logger;

pub use logger::TracingLogger;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
