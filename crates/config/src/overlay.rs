//! Environment overlay onto a typed configuration object.
//!
//! The object is serialized into a [`ConfigTree`], patched leaf by leaf from
//! the snapshot and deserialized back. Nothing is written to the caller's
//! object unless the whole pass succeeds.

use crate::coerce::coerce;
use crate::error::OverrideError;
use crate::paths::{PathIndex, enumerate_paths, env_name_to_path};
use crate::snapshot::EnvSnapshot;
use crate::tree::ConfigTree;
use bootstrap_ports::{LogEvent, LogLevel, LoggerPort};
use bootstrap_shared::redact_if_secret;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Event name emitted for every applied override.
pub const ENV_OVERRIDE_EVENT: &str = "config.env_override";

/// Overlay matching environment variables onto `config`.
///
/// Variables are visited in name order. A variable whose name (underscores
/// read as dots) does not resolve to a leaf path is ignored. Each override is
/// reported to `logger` as soon as its value coerces, so a pass that fails on
/// a later variable still logs the ones before it. Returns the number of
/// overrides applied.
///
/// # Errors
///
/// Fails on the first value that cannot be coerced to its field's type, on
/// fields without a coercion rule, and when the object cannot be serialized
/// or rebuilt. `config` is left untouched on every error.
pub fn override_configuration<T>(
    config: &mut T,
    env: &EnvSnapshot,
    logger: &dyn LoggerPort,
) -> Result<usize, OverrideError>
where
    T: Serialize + DeserializeOwned,
{
    let mut tree = ConfigTree::from_config(&*config).map_err(OverrideError::Serialize)?;
    let paths = enumerate_paths(&tree);
    let index = PathIndex::build(&paths);

    let mut applied = 0;
    for (var, raw) in env {
        let candidate = env_name_to_path(var);
        let Some(path) = index.resolve(&candidate) else {
            continue;
        };
        let Some(existing) = tree.get(path) else {
            continue;
        };
        let value = coerce(existing, raw)
            .map_err(|error| OverrideError::from_coercion(var, path, error))?;
        tree.set(path, value);
        applied += 1;
        log_environment_override(logger, path, var, raw);
    }

    *config = tree.into_config().map_err(OverrideError::Deserialize)?;

    tracing::debug!(
        overrides = applied,
        candidates = env.len(),
        leaves = paths.len(),
        "environment overlay complete"
    );
    Ok(applied)
}

/// Report one applied override to the logging collaborator.
///
/// `name` is what was overridden (a config path or a resolver label), `key`
/// the environment variable that supplied `value`.
pub fn log_environment_override(logger: &dyn LoggerPort, name: &str, key: &str, value: &str) {
    let shown = redact_if_secret(&[name, key], value);
    let message = format!("Variables override of '{name}' by environment variable: {key}={shown}");
    logger.log(
        LogEvent::new(ENV_OVERRIDE_EVENT, LogLevel::Info, message)
            .with_field("name", name)
            .with_field("envVar", key)
            .with_field("value", shown),
    );
}
