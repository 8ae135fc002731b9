use serde::{Deserialize, Serialize};

use crate::converters::ViolationStyle;

/// Default cap on the bytes read from a downstream response body.
pub const DEFAULT_MAX_ERROR_BODY_SIZE: usize = 1024 * 1024;

fn default_enabled() -> bool {
    true
}

/// Registration override for one built-in converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConverterSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Overrides the converter's built-in order when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            order: None,
        }
    }
}

/// Converter registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertersConfig {
    pub field_violations: ConverterSettings,
    pub problem_details: ConverterSettings,
    pub message: ConverterSettings,
    pub violation_style: ViolationStyle,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_config_enables_everything() {
        let cfg: ConvertersConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ConvertersConfig::default());
        assert!(cfg.field_violations.enabled);
        assert!(cfg.message.order.is_none());
    }

    #[test]
    fn partial_overrides() {
        let cfg: ConvertersConfig = serde_json::from_str(
            r#"{"message": {"order": 10}, "problem_details": {"enabled": false}, "violation_style": "detail"}"#,
        )
        .unwrap();
        assert_eq!(cfg.message.order, Some(10));
        assert!(cfg.message.enabled);
        assert!(!cfg.problem_details.enabled);
        assert_eq!(cfg.violation_style, ViolationStyle::Detail);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<ConvertersConfig>(r#"{"bogus": {}}"#).is_err());
    }
}
