//! Boot timeout and retry interval resolution.

use crate::overlay::log_environment_override;
use crate::snapshot::EnvSnapshot;
use bootstrap_ports::LoggerPort;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Canonical variable for the boot timeout, in seconds.
pub const ENV_KEY_STARTUP_DURATION: &str = "EDGEX_STARTUP_DURATION";
/// Legacy variable for the boot timeout.
pub const ENV_V1_KEY_STARTUP_DURATION: &str = "startup_duration";
/// Canonical variable for the retry interval, in seconds.
pub const ENV_KEY_STARTUP_INTERVAL: &str = "EDGEX_STARTUP_INTERVAL";
/// Legacy variable for the retry interval.
pub const ENV_V1_KEY_STARTUP_INTERVAL: &str = "startup_interval";

/// Default boot timeout in seconds.
pub const BOOT_TIMEOUT_SECONDS_DEFAULT: u64 = 60;
/// Default retry interval in seconds.
pub const BOOT_RETRY_SECONDS_DEFAULT: u64 = 1;

/// Startup timer parameters, in whole seconds. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartupInfo {
    /// Total time allowed for bootstrap.
    pub duration: u64,
    /// Wait between retries.
    pub interval: u64,
}

impl Default for StartupInfo {
    fn default() -> Self {
        Self {
            duration: BOOT_TIMEOUT_SECONDS_DEFAULT,
            interval: BOOT_RETRY_SECONDS_DEFAULT,
        }
    }
}

impl StartupInfo {
    /// Boot timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.duration)
    }

    /// Retry interval as a [`Duration`].
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

/// Resolve startup parameters from the environment.
///
/// Each field reads its canonical variable, falling back to the legacy one
/// when the canonical value is absent or empty. Values that are not positive
/// integers keep the corresponding field of `defaults`.
pub fn resolve_startup_info(
    env: &EnvSnapshot,
    logger: &dyn LoggerPort,
    defaults: StartupInfo,
) -> StartupInfo {
    StartupInfo {
        duration: resolve_seconds(
            env,
            logger,
            "Startup Duration",
            [ENV_KEY_STARTUP_DURATION, ENV_V1_KEY_STARTUP_DURATION],
            defaults.duration,
        ),
        interval: resolve_seconds(
            env,
            logger,
            "Startup Interval",
            [ENV_KEY_STARTUP_INTERVAL, ENV_V1_KEY_STARTUP_INTERVAL],
            defaults.interval,
        ),
    }
}

fn resolve_seconds(
    env: &EnvSnapshot,
    logger: &dyn LoggerPort,
    label: &str,
    keys: [&'static str; 2],
    default: u64,
) -> u64 {
    let Some((key, raw)) = env.first_value(&keys) else {
        return default;
    };
    log_environment_override(logger, label, key, raw);

    match raw.parse::<i64>() {
        Ok(seconds) if seconds > 0 => seconds.unsigned_abs(),
        Ok(seconds) => {
            tracing::warn!(key, seconds, default, "non-positive startup value ignored");
            default
        },
        Err(error) => {
            tracing::warn!(key, value = raw, %error, default, "unparseable startup value ignored");
            default
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootstrap_testkit::{NoopLogger, RecordingLogger};

    fn resolve(entries: &[(&str, &str)]) -> StartupInfo {
        let env: EnvSnapshot = entries.iter().copied().collect();
        resolve_startup_info(&env, &NoopLogger, StartupInfo::default())
    }

    #[test]
    fn defaults_apply_without_variables() {
        let info = resolve(&[]);
        assert_eq!(info, StartupInfo { duration: 60, interval: 1 });
        assert_eq!(info.timeout(), Duration::from_secs(60));
        assert_eq!(info.retry_interval(), Duration::from_secs(1));
    }

    #[test]
    fn non_positive_values_keep_defaults() {
        assert_eq!(resolve(&[("EDGEX_STARTUP_DURATION", "0")]).duration, 60);
        assert_eq!(resolve(&[("EDGEX_STARTUP_INTERVAL", "-5")]).interval, 1);
        assert_eq!(resolve(&[("EDGEX_STARTUP_DURATION", "soon")]).duration, 60);
    }

    #[test]
    fn legacy_keys_are_used_when_canonical_is_absent() {
        let info = resolve(&[("startup_duration", "30"), ("startup_interval", "5")]);
        assert_eq!(info, StartupInfo { duration: 30, interval: 5 });
    }

    #[test]
    fn canonical_keys_win_over_legacy_keys() {
        let info = resolve(&[("EDGEX_STARTUP_DURATION", "90"), ("startup_duration", "30")]);
        assert_eq!(info.duration, 90);
    }

    #[test]
    fn empty_canonical_value_falls_back_to_legacy() {
        let info = resolve(&[("EDGEX_STARTUP_DURATION", ""), ("startup_duration", "30")]);
        assert_eq!(info.duration, 30);
    }

    #[test]
    fn fields_are_resolved_independently() {
        let env: EnvSnapshot = [("EDGEX_STARTUP_INTERVAL", "3")].into_iter().collect();
        let defaults = StartupInfo { duration: 120, interval: 2 };
        let info = resolve_startup_info(&env, &NoopLogger, defaults);
        assert_eq!(info, StartupInfo { duration: 120, interval: 3 });
    }

    #[test]
    fn chosen_value_is_logged_before_validation() {
        let env: EnvSnapshot = [("startup_duration", "0")].into_iter().collect();
        let logger = RecordingLogger::new();

        let info = resolve_startup_info(&env, &logger, StartupInfo::default());

        assert_eq!(info.duration, 60);
        let events = logger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field_str("name"), Some("Startup Duration"));
        assert_eq!(events[0].field_str("envVar"), Some("startup_duration"));
        assert_eq!(events[0].field_str("value"), Some("0"));
    }
}
