//! # bootstrap-shared
//!
//! Shared error envelope and redaction helpers for the bootstrap workspace.
//!
//! This crate has no workspace dependencies; every other crate converts its
//! module-level errors into [`ErrorEnvelope`] at the public boundary.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod redaction;

pub use errors::{ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use redaction::{REDACTED, is_secret_key, redact_if_secret};

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_types_are_reexported() {
        let error = ErrorEnvelope::expected(ErrorCode::invalid_input(), "invalid");
        let result: Result<()> = Err(error);
        assert!(matches!(result, Err(ErrorEnvelope { kind: ErrorKind::Expected, .. })));
        assert!(!shared_crate_version().is_empty());
    }
}
