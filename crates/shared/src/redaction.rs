//! Secret detection and redaction.
//!
//! Environment overrides are echoed to logs and error metadata, so values
//! bound to secret-looking names are replaced before they leave the crate.

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

const SECRET_MARKERS: [&str; 6] = ["KEY", "TOKEN", "SECRET", "PASSWORD", "CREDENTIAL", "AUTH"];

const SEPARATORS: [char; 3] = ['_', '.', '-'];

/// Checks if a variable name or dotted config path likely refers to a secret.
///
/// The name is split into words at `_`, `.`, `-` and camel-case boundaries;
/// it is secret when a word (or its plural) is one of the markers, so
/// `ApiKeys` matches while `Keyspace` does not.
/// # Examples
///
/// ```
/// use bootstrap_shared::is_secret_key;
///
/// assert!(is_secret_key("DATABASE_PASSWORD"));
/// assert!(is_secret_key("SecretStore.Authentication.AuthToken"));
/// assert!(!is_secret_key("SERVICE_PORT"));
/// assert!(!is_secret_key("Cassandra.Keyspace"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    name_words(key).into_iter().any(|word| {
        let word = word.to_ascii_uppercase();
        let singular = word.strip_suffix('S').unwrap_or(&word);
        SECRET_MARKERS.contains(&word.as_str()) || SECRET_MARKERS.contains(&singular)
    })
}

fn name_words(name: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut previous: Option<char> = None;
    let mut chars = name.char_indices().peekable();
    while let Some((at, ch)) = chars.next() {
        if SEPARATORS.contains(&ch) {
            words.extend(name.get(start..at));
            start = at + ch.len_utf8();
            previous = None;
            continue;
        }
        let next_is_lower = chars.peek().is_some_and(|(_, next)| next.is_lowercase());
        let boundary = ch.is_uppercase() && previous.is_some_and(|prev| !prev.is_uppercase() || next_is_lower);
        if boundary {
            words.extend(name.get(start..at));
            start = at;
        }
        previous = Some(ch);
    }
    words.extend(name.get(start..));
    words
}

/// Returns [`REDACTED`] when any of `names` looks secret, otherwise the value.
///
/// # Examples
///
/// ```
/// use bootstrap_shared::{REDACTED, redact_if_secret};
///
/// assert_eq!(redact_if_secret(&["Writable.LogLevel", "WRITABLE_LOGLEVEL"], "DEBUG"), "DEBUG");
/// assert_eq!(redact_if_secret(&["Database.Password", "DATABASE_PASSWORD"], "hunter2"), REDACTED);
/// ```
pub fn redact_if_secret(names: &[&str], value: &str) -> String {
    if names.iter().any(|name| is_secret_key(name)) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_secret_patterns() {
        assert!(is_secret_key("API_KEY"));
        assert!(is_secret_key("api_key"));
        assert!(is_secret_key("ACCESS_TOKEN"));
        assert!(is_secret_key("Clients.Metadata.ClientSecret"));
        assert!(is_secret_key("DB_PASSWORD"));
        assert!(is_secret_key("AWS_CREDENTIAL"));
        assert!(is_secret_key("basic_auth"));
    }

    #[test]
    fn rejects_non_secret_patterns() {
        assert!(!is_secret_key("EDGEX_STARTUP_DURATION"));
        assert!(!is_secret_key("Service.Port"));
        assert!(!is_secret_key("REGISTRY_HOST"));
        assert!(!is_secret_key("EDGEX_CONF_DIR"));
    }

    #[test]
    fn markers_match_whole_words_only() {
        assert!(!is_secret_key("Service.Keyspace"));
        assert!(!is_secret_key("Writable.Author"));
        assert!(!is_secret_key("MONKEY_COUNT"));
        assert!(!is_secret_key("Tokenizer.Model"));
        assert!(is_secret_key("Service.ApiKey"));
        assert!(is_secret_key("Service.APIKey"));
        assert!(is_secret_key("Writable.PrivateKeys"));
        assert!(is_secret_key("SecretStore.AuthToken"));
        assert!(is_secret_key("accessToken"));
    }

    #[test]
    fn words_split_on_separators_and_case() {
        assert_eq!(name_words("Service.MaxResultCount"), ["Service", "Max", "Result", "Count"]);
        assert_eq!(name_words("SERVICE_APIKEY"), ["SERVICE", "APIKEY"]);
        assert_eq!(name_words("APIKey-v2"), ["API", "Key", "v2"]);
    }

    #[test]
    fn any_secret_name_redacts_the_value() {
        assert_eq!(redact_if_secret(&["Service.Host", "API_KEY"], "sk-1"), REDACTED);
        assert_eq!(redact_if_secret(&[], "plain"), "plain");
    }
}
