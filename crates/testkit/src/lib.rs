//! # bootstrap-testkit
//!
//! Test doubles for the bootstrap ports.
//! This crate depends on `ports` only.

pub mod in_memory;

pub use in_memory::{NoopLogger, RecordingLogger};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootstrap_ports::ports_crate_version;

    #[test]
    fn testkit_can_use_ports() {
        assert!(!testkit_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
    }
}
