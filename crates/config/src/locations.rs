//! Config directory, profile and file name overrides.
//!
//! Each resolver takes the value the host obtained elsewhere (usually a
//! command-line flag) and lets the environment replace it.

use crate::overlay::log_environment_override;
use crate::snapshot::EnvSnapshot;
use bootstrap_ports::LoggerPort;

/// Config directory override.
pub const ENV_CONF_DIR: &str = "EDGEX_CONF_DIR";
/// Profile override.
pub const ENV_PROFILE: &str = "EDGEX_PROFILE";
/// Legacy profile override.
pub const ENV_V1_PROFILE: &str = "edgex_profile";
/// Config file name override.
pub const ENV_CONFIG_FILE: &str = "EDGEX_CONFIG_FILE";
/// Config directory used when nothing else is set.
pub const DEFAULT_CONF_DIR: &str = "./res";

const PROFILE_SEPARATOR: char = '/';

/// Config directory: the environment wins, then `configured`, then
/// [`DEFAULT_CONF_DIR`].
pub fn resolve_conf_dir(env: &EnvSnapshot, logger: &dyn LoggerPort, configured: &str) -> String {
    let dir = match env.value(ENV_CONF_DIR) {
        Some(value) => {
            log_environment_override(logger, "-c/-confdir", ENV_CONF_DIR, value);
            value
        },
        None => configured,
    };
    if dir.is_empty() {
        DEFAULT_CONF_DIR.to_owned()
    } else {
        dir.to_owned()
    }
}

/// Profile directory, with a trailing `/` when non-empty.
pub fn resolve_profile_dir(env: &EnvSnapshot, logger: &dyn LoggerPort, configured: &str) -> String {
    let profile = match env.first_value(&[ENV_PROFILE, ENV_V1_PROFILE]) {
        Some((key, value)) => {
            log_environment_override(logger, "-p/-profile", key, value);
            value
        },
        None => configured,
    };
    if profile.is_empty() {
        String::new()
    } else {
        format!("{profile}{PROFILE_SEPARATOR}")
    }
}

/// Config file name: the environment wins over `configured`.
pub fn resolve_config_file_name(env: &EnvSnapshot, logger: &dyn LoggerPort, configured: &str) -> String {
    match env.value(ENV_CONFIG_FILE) {
        Some(value) => {
            log_environment_override(logger, "-f/-file", ENV_CONFIG_FILE, value);
            value.to_owned()
        },
        None => configured.to_owned(),
    }
}
