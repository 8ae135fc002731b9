//! Exception handling configuration and layered loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use faultkit_http::{ConverterChain, ConvertersConfig, ResponseClassifier};
use faultkit_problem::UnicodePolicy;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::ResponseStatusPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Error pipeline settings.
///
/// Every field has a default; an empty document yields the legacy behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExceptionHandlingConfig {
    pub response_status_policy: ResponseStatusPolicy,

    /// Deadline for the whole request inside the failure boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    pub unicode: UnicodePolicy,

    pub converters: ConvertersConfig,

    /// Cap on downstream error body bytes; the built-in default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_error_body_size: Option<usize>,
}

impl ExceptionHandlingConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn converter_chain(&self) -> ConverterChain {
        ConverterChain::from_config(&self.converters)
    }

    #[must_use]
    pub fn response_classifier(&self) -> ResponseClassifier {
        let classifier = ResponseClassifier::new(self.converter_chain());
        match self.max_error_body_size {
            Some(limit) => classifier.with_max_body_size(limit),
            None => classifier,
        }
    }
}

/// Load `T` from defaults, an optional YAML file and the environment.
///
/// Later layers win. Environment variables are read with `env_prefix`
/// stripped and `__` separating nested keys, so with the prefix
/// `FAULTKIT__` the variable `FAULTKIT__CONVERTERS__MESSAGE__ORDER=10`
/// sets `converters.message.order`.
///
/// # Errors
/// Returns [`ConfigError::MissingFile`] when `path` does not exist and
/// [`ConfigError::Invalid`] when the merged document does not deserialize.
pub fn load_config<T>(path: Option<&Path>, env_prefix: &str) -> Result<T, ConfigError>
where
    T: Default + Serialize + DeserializeOwned,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        figment = figment.merge(Yaml::file(path));
    }
    figment = figment.merge(Env::prefixed(env_prefix).split("__"));

    figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use faultkit_http::ViolationStyle;
    use faultkit_problem::UnicodeRange;
    use std::io::Write;

    const PREFIX: &str = "FKTEST__";

    fn yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        let cfg: ExceptionHandlingConfig = load_config(None, PREFIX).unwrap();
        assert_eq!(cfg, ExceptionHandlingConfig::default());
        assert_eq!(cfg.response_status_policy, ResponseStatusPolicy::Legacy);
        assert!(cfg.request_timeout().is_none());
        assert_eq!(
            cfg.converter_chain().names(),
            ["field_violations", "problem_details", "message"]
        );
    }

    #[test]
    fn yaml_overrides_defaults() {
        let file = yaml(
            "response_status_policy: passthrough\n\
             request_timeout_ms: 1500\n\
             unicode:\n  allow: [basic_latin, latin1_supplement]\n\
             converters:\n  message:\n    order: 50\n  problem_details:\n    enabled: false\n  violation_style: detail\n",
        );
        let cfg: ExceptionHandlingConfig = load_config(Some(file.path()), PREFIX).unwrap();

        assert_eq!(cfg.response_status_policy, ResponseStatusPolicy::Passthrough);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(
            cfg.unicode,
            UnicodePolicy::Allow(vec![UnicodeRange::BasicLatin, UnicodeRange::Latin1Supplement])
        );
        assert_eq!(cfg.converters.violation_style, ViolationStyle::Detail);
        assert_eq!(cfg.converter_chain().names(), ["message", "field_violations"]);
    }

    #[test]
    fn env_overrides_file() {
        let file = yaml("response_status_policy: passthrough\n");
        temp_env::with_vars(
            [
                ("FKTEST__RESPONSE_STATUS_POLICY", Some("legacy")),
                ("FKTEST__CONVERTERS__FIELD_VIOLATIONS__ENABLED", Some("false")),
            ],
            || {
                let cfg: ExceptionHandlingConfig =
                    load_config(Some(file.path()), PREFIX).unwrap();
                assert_eq!(cfg.response_status_policy, ResponseStatusPolicy::Legacy);
                assert!(!cfg.converters.field_violations.enabled);
            },
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config::<ExceptionHandlingConfig>(
            Some(Path::new("/definitely/not/here.yaml")),
            PREFIX,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = yaml("response_status_polcy: passthrough\n");
        let err =
            load_config::<ExceptionHandlingConfig>(Some(file.path()), PREFIX).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn utf8_policy_from_yaml() {
        let file = yaml("unicode: utf8\nmax_error_body_size: 4096\n");
        let cfg: ExceptionHandlingConfig = load_config(Some(file.path()), PREFIX).unwrap();
        assert_eq!(cfg.unicode, UnicodePolicy::Utf8);
        assert_eq!(cfg.max_error_body_size, Some(4096));
    }
}
