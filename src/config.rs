//! Typed connection configuration, buildable in code or parsed from TOML.
use serde::Deserialize;

use crate::errors::*;

/// Connection configuration recognized by `connect_for_sends`/`connect_for_receives`.
///
/// The same struct is built programmatically for the common case and can also
/// be deserialized out of a `toml::Value` document when an endpoint's
/// configuration lives alongside the rest of a process's settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub connection_string: Option<String>,
    pub connection_strings: Option<Vec<String>>,
    pub service_name: Option<String>,
}

impl Config {
    pub fn with_connection_string(connection_string: impl Into<String>) -> Self {
        Config {
            connection_string: Some(connection_string.into()),
            ..Default::default()
        }
    }

    pub fn with_connection_strings<I, S>(connection_strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Config {
            connection_strings: Some(connection_strings.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Config {
            service_name: Some(service_name.into()),
            ..Default::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).chain_err(|| "could not parse endpoint configuration")
    }

    /// All connection strings named by this config, in order: the singular
    /// field first (if set), then every entry of the plural field.
    pub fn connection_strings_iter(&self) -> impl Iterator<Item = &str> {
        self.connection_string
            .iter()
            .map(String::as_str)
            .chain(
                self.connection_strings
                    .iter()
                    .flatten()
                    .map(String::as_str),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_from_toml() {
        let cfg = Config::from_toml_str(
            r#"
            connection_string = "tcp://127.0.0.1:0"
            service_name = "data-logger"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.connection_string.as_deref(), Some("tcp://127.0.0.1:0"));
        assert_eq!(cfg.service_name.as_deref(), Some("data-logger"));
    }

    #[test]
    fn iterates_singular_then_plural() {
        let cfg = Config {
            connection_string: Some("tcp://a:1".into()),
            connection_strings: Some(vec!["tcp://b:2".into(), "tcp://c:3".into()]),
            service_name: None,
        };
        let all: Vec<_> = cfg.connection_strings_iter().collect();
        assert_eq!(all, vec!["tcp://a:1", "tcp://b:2", "tcp://c:3"]);
    }
}
