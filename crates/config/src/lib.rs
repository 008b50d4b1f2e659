//! # bootstrap-config
//!
//! Environment variable overrides for typed service configuration.
//! This crate depends on `ports` and `shared` only.
//!
//! A host loads its configuration (file, remote provider, defaults), captures
//! an [`EnvSnapshot`] once, and calls [`override_configuration`] to overlay
//! variables such as `SERVICE_PORT=9090` onto `Service.Port`.

/// Type-preserving coercion from raw strings.
pub mod coerce;
/// Override errors.
pub mod error;
/// Config directory, profile and file name resolvers.
pub mod locations;
/// The override pass and its log notification.
pub mod overlay;
/// Leaf path enumeration and case-insensitive matching.
pub mod paths;
/// Configuration and registry provider URLs.
pub mod provider;
/// Environment snapshot.
pub mod snapshot;
/// Boot timeout and retry interval.
pub mod startup;
/// Typed intermediate tree.
pub mod tree;

pub use coerce::{CoercionError, coerce};
pub use error::OverrideError;
pub use locations::{
    DEFAULT_CONF_DIR, ENV_CONF_DIR, ENV_CONFIG_FILE, ENV_PROFILE, ENV_V1_PROFILE,
    resolve_config_file_name, resolve_conf_dir, resolve_profile_dir,
};
pub use overlay::{ENV_OVERRIDE_EVENT, log_environment_override, override_configuration};
pub use paths::{PathCollision, PathIndex, enumerate_paths, env_name_to_path, is_all_upper_case};
pub use provider::{
    ENV_KEY_CONFIG_URL, ENV_KEY_REGISTRY_URL, ProviderInfo, ProviderUrlError,
    override_config_provider_info, registry_provider_url, use_registry,
};
pub use snapshot::EnvSnapshot;
pub use startup::{
    BOOT_RETRY_SECONDS_DEFAULT, BOOT_TIMEOUT_SECONDS_DEFAULT, ENV_KEY_STARTUP_DURATION,
    ENV_KEY_STARTUP_INTERVAL, ENV_V1_KEY_STARTUP_DURATION, ENV_V1_KEY_STARTUP_INTERVAL,
    StartupInfo, resolve_startup_info,
};
pub use tree::{ConfigTree, Scalar, TreeError};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootstrap_ports::ports_crate_version;
    use bootstrap_shared::shared_crate_version;

    #[test]
    fn config_can_use_ports_and_shared() {
        assert!(!config_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
