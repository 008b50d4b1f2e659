//! Configuration and registry provider URL overrides.

use crate::error::OverrideError;
use crate::overlay::log_environment_override;
use crate::snapshot::EnvSnapshot;
use bootstrap_ports::LoggerPort;
use bootstrap_shared::REDACTED;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration provider URL.
pub const ENV_KEY_CONFIG_URL: &str = "EDGEX_CONFIGURATION_PROVIDER";
/// Legacy registry URL, also accepted for the configuration provider.
pub const ENV_KEY_REGISTRY_URL: &str = "edgex_registry";

/// Protocol used when the scheme names only the provider type.
pub const DEFAULT_PROVIDER_PROTOCOL: &str = "http";

/// Provider URL parse failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderUrlError {
    /// Not a URL at all.
    #[error("malformed provider URL: {0}")]
    Malformed(#[from] url::ParseError),
    /// The scheme is not `<type>` or `<type>.<protocol>`.
    #[error("provider scheme '{0}' must be '<type>' or '<type>.<protocol>'")]
    InvalidScheme(String),
    /// No host component.
    #[error("provider URL has no host")]
    MissingHost,
    /// No port component.
    #[error("provider URL has no port")]
    MissingPort,
}

/// Where a configuration or registry provider lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderInfo {
    /// Provider kind, e.g. `consul`.
    #[serde(rename = "Type")]
    pub provider_type: String,
    /// Transport protocol.
    pub protocol: String,
    /// Host name or address.
    pub host: String,
    /// Port.
    pub port: u16,
}

impl ProviderInfo {
    /// Parse `<type>[.<protocol>]://<host>:<port>`.
    ///
    /// ```
    /// use bootstrap_config::ProviderInfo;
    ///
    /// let info = ProviderInfo::from_url("consul.http://localhost:8500")?;
    /// assert_eq!(info.provider_type, "consul");
    /// assert_eq!(info.protocol, "http");
    /// assert_eq!(info.port, 8500);
    /// # Ok::<(), bootstrap_config::ProviderUrlError>(())
    /// ```
    pub fn from_url(raw: &str) -> Result<Self, ProviderUrlError> {
        let mut info = Self::default();
        info.populate_from_url(raw)?;
        Ok(info)
    }

    /// Replace every field with the values parsed from `raw`.
    ///
    /// On error `self` is unchanged.
    pub fn populate_from_url(&mut self, raw: &str) -> Result<(), ProviderUrlError> {
        let url = Url::parse(raw)?;

        let mut segments = url.scheme().split('.');
        let (provider_type, protocol) = match (segments.next(), segments.next(), segments.next()) {
            (Some(kind), None, None) if !kind.is_empty() => (kind, DEFAULT_PROVIDER_PROTOCOL),
            (Some(kind), Some(protocol), None) if !kind.is_empty() && !protocol.is_empty() => (kind, protocol),
            _ => return Err(ProviderUrlError::InvalidScheme(url.scheme().to_owned())),
        };
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or(ProviderUrlError::MissingHost)?;
        let port = url.port_or_known_default().ok_or(ProviderUrlError::MissingPort)?;

        self.provider_type = provider_type.to_owned();
        self.protocol = protocol.to_owned();
        self.host = host.to_owned();
        self.port = port;
        Ok(())
    }
}

/// Apply the provider URL from the environment to `info`.
///
/// # Errors
///
/// Returns [`OverrideError::InvalidProviderUrl`] when the variable is set but
/// does not parse.
pub fn override_config_provider_info(
    env: &EnvSnapshot,
    logger: &dyn LoggerPort,
    mut info: ProviderInfo,
) -> Result<ProviderInfo, OverrideError> {
    let Some((key, raw)) = env.first_value(&[ENV_KEY_CONFIG_URL, ENV_KEY_REGISTRY_URL]) else {
        return Ok(info);
    };
    let shown = without_credentials(raw);
    log_environment_override(logger, "Configuration Provider Information", key, &shown);
    info.populate_from_url(raw)
        .map_err(|source| OverrideError::InvalidProviderUrl {
            var: key.to_owned(),
            value: shown,
            source,
        })?;
    Ok(info)
}

/// Legacy registry URL, empty when unset.
pub fn registry_provider_url(env: &EnvSnapshot, logger: &dyn LoggerPort) -> String {
    match env.value(ENV_KEY_REGISTRY_URL) {
        Some(url) => {
            let shown = without_credentials(url);
            log_environment_override(logger, "Registry Provider Information", ENV_KEY_REGISTRY_URL, &shown);
            url.to_owned()
        },
        None => String::new(),
    }
}

/// `raw` with any userinfo stripped, for logs and error reports.
///
/// Unparseable input that could still carry userinfo is redacted whole.
fn without_credentials(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return if raw.contains('@') { REDACTED.to_owned() } else { raw.to_owned() };
    };
    if url.username().is_empty() && url.password().is_none() {
        return raw.to_owned();
    }
    if url.set_username("").is_err() || url.set_password(None).is_err() {
        return REDACTED.to_owned();
    }
    url.to_string()
}

/// Whether the legacy registry variable is present, even if empty.
pub fn use_registry(env: &EnvSnapshot) -> bool {
    env.contains(ENV_KEY_REGISTRY_URL)
}
