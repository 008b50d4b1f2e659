//! Override errors and their envelope mapping.

use crate::coerce::CoercionError;
use crate::provider::ProviderUrlError;
use crate::tree::TreeError;
use bootstrap_shared::{ErrorCode, ErrorEnvelope, redact_if_secret};

/// Failure of an override operation.
///
/// Override values are already redacted when the variable name or the config
/// path looks secret. Provider URLs are stored with their userinfo stripped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverrideError {
    /// The configuration object cannot be represented as a tree.
    #[error("configuration cannot be serialized for overrides: {0}")]
    Serialize(#[source] TreeError),
    /// A raw value does not fit the target field's type.
    #[error("environment variable {var}={value:?} cannot override '{path}' ({kind}): {reason}")]
    Parse {
        /// Environment variable name.
        var: String,
        /// Canonical config path.
        path: String,
        /// Raw value (or the failing list element).
        value: String,
        /// Target type name.
        kind: &'static str,
        /// Parser message.
        reason: String,
    },
    /// The target field has no coercion rule.
    #[error("environment variable {var} cannot override '{path}': {type_name} values are not supported")]
    UnsupportedType {
        /// Environment variable name.
        var: String,
        /// Canonical config path.
        path: String,
        /// Node kind of the target field.
        type_name: &'static str,
    },
    /// The patched tree no longer fits the typed configuration.
    #[error("overridden configuration cannot be merged back: {0}")]
    Deserialize(#[source] TreeError),
    /// A provider URL from the environment is malformed.
    #[error("environment variable {var}={value:?} is not a valid provider URL: {source}")]
    InvalidProviderUrl {
        /// Environment variable name.
        var: String,
        /// Offending URL without userinfo.
        value: String,
        /// Parse failure.
        #[source]
        source: ProviderUrlError,
    },
}

impl OverrideError {
    /// Stable error code for this failure.
    pub fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::Serialize(_) => "serialize_failed",
            Self::Parse { .. } => "invalid_env_override",
            Self::UnsupportedType { .. } => "unsupported_override_type",
            Self::Deserialize(_) => "merge_failed",
            Self::InvalidProviderUrl { .. } => "invalid_provider_url",
        };
        ErrorCode::new("config", code)
    }

    /// Attach the variable and path to a coercion failure.
    ///
    /// List targets report the failing element rather than the whole value.
    pub fn from_coercion(var: &str, path: &str, error: CoercionError) -> Self {
        match error {
            CoercionError::Parse {
                kind,
                value,
                reason,
            } => Self::Parse {
                var: var.to_owned(),
                path: path.to_owned(),
                value: redact_if_secret(&[var, path], &value),
                kind,
                reason,
            },
            CoercionError::Unsupported { type_name } => Self::UnsupportedType {
                var: var.to_owned(),
                path: path.to_owned(),
                type_name,
            },
        }
    }
}

impl From<OverrideError> for ErrorEnvelope {
    fn from(error: OverrideError) -> Self {
        let code = error.error_code();
        let message = error.to_string();

        match error {
            OverrideError::Serialize(_) | OverrideError::Deserialize(_) => {
                Self::invariant(code, message)
            },
            OverrideError::Parse {
                var,
                path,
                value,
                kind,
                ..
            } => Self::expected(code, message)
                .with_metadata("env_var", var)
                .with_metadata("path", path)
                .with_metadata("value", value)
                .with_metadata("type", kind),
            OverrideError::UnsupportedType {
                var,
                path,
                type_name,
            } => Self::expected(code, message)
                .with_metadata("env_var", var)
                .with_metadata("path", path)
                .with_metadata("type", type_name),
            OverrideError::InvalidProviderUrl { var, value, .. } => Self::expected(code, message)
                .with_metadata("env_var", var)
                .with_metadata("value", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootstrap_shared::{ErrorKind, REDACTED};

    #[test]
    fn parse_errors_map_to_expected_envelopes() {
        let error = OverrideError::from_coercion(
            "SERVICE_PORT",
            "Service.Port",
            CoercionError::Parse {
                kind: "u16",
                value: "notanumber".to_owned(),
                reason: "invalid digit found in string".to_owned(),
            },
        );
        let envelope = ErrorEnvelope::from(error);

        assert_eq!(envelope.kind, ErrorKind::Expected);
        assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_override"));
        assert_eq!(envelope.metadata_value("env_var"), Some("SERVICE_PORT"));
        assert_eq!(envelope.metadata_value("path"), Some("Service.Port"));
        assert_eq!(envelope.metadata_value("value"), Some("notanumber"));
        assert_eq!(envelope.metadata_value("type"), Some("u16"));
    }

    #[test]
    fn list_element_failures_report_the_element() {
        let error = OverrideError::from_coercion(
            "SERVICE_PORTS",
            "Service.Ports",
            CoercionError::Parse {
                kind: "u16",
                value: "x".to_owned(),
                reason: "invalid digit found in string".to_owned(),
            },
        );
        assert!(matches!(error, OverrideError::Parse { ref value, .. } if value == "x"));
    }

    #[test]
    fn secret_list_elements_stay_redacted() {
        let error = OverrideError::from_coercion(
            "API_KEYS",
            "Api.Keys",
            CoercionError::Parse {
                kind: "u32",
                value: "abc".to_owned(),
                reason: "invalid digit found in string".to_owned(),
            },
        );
        assert!(matches!(error, OverrideError::Parse { ref value, .. } if value == REDACTED));
    }

    #[test]
    fn merge_failures_are_invariant_violations() {
        let envelope = ErrorEnvelope::from(OverrideError::Deserialize(TreeError::Mismatch(
            "invalid type".to_owned(),
        )));
        assert_eq!(envelope.kind, ErrorKind::Invariant);
        assert_eq!(envelope.code.code(), "merge_failed");
    }
}
