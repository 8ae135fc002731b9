use std::fmt;
use std::sync::Arc;

use faultkit_problem::{Problem, texts};

use crate::config::ConvertersConfig;
use crate::converters::{
    FieldViolationConverter, MessageConverter, ProblemConverter, ProblemDetailsConverter,
};

/// Ordered set of enabled converters.
///
/// Built once at startup: disabled converters are dropped and the rest are
/// sorted by ascending `order`, ties keeping registration order. Immutable
/// afterwards and cheap to clone.
#[derive(Clone)]
pub struct ConverterChain {
    converters: Arc<[Arc<dyn ProblemConverter>]>,
}

impl ConverterChain {
    #[must_use]
    pub fn new<I>(converters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ProblemConverter>>,
    {
        let mut active: Vec<_> = converters
            .into_iter()
            .filter(|c| c.is_enabled())
            .collect();
        // sort_by_key is stable
        active.sort_by_key(|c| c.order());
        Self {
            converters: active.into(),
        }
    }

    /// Built-in converters with registration overrides applied.
    #[must_use]
    pub fn from_config(config: &ConvertersConfig) -> Self {
        let fv = &config.field_violations;
        let pd = &config.problem_details;
        let msg = &config.message;

        let converters: [Arc<dyn ProblemConverter>; 3] = [
            Arc::new(
                FieldViolationConverter::new()
                    .with_order(fv.order.unwrap_or(FieldViolationConverter::DEFAULT_ORDER))
                    .enabled(fv.enabled)
                    .with_style(config.violation_style),
            ),
            Arc::new(
                ProblemDetailsConverter::new()
                    .with_order(pd.order.unwrap_or(ProblemDetailsConverter::DEFAULT_ORDER))
                    .enabled(pd.enabled),
            ),
            Arc::new(
                MessageConverter::new()
                    .with_order(msg.order.unwrap_or(MessageConverter::DEFAULT_ORDER))
                    .enabled(msg.enabled),
            ),
        ];
        Self::new(converters)
    }

    /// Names of the active converters in the order they are tried.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// Run the converters; `None` when none produced a titled problem.
    #[must_use]
    pub fn try_convert(&self, payload: &[u8]) -> Option<Problem> {
        self.converters.iter().find_map(|c| {
            let problem = c.try_convert(payload).filter(Problem::has_title)?;
            tracing::debug!(converter = c.name(), "downstream error body converted");
            Some(problem)
        })
    }

    /// Convert `payload`, falling back to its text as the problem detail.
    pub fn convert(&self, payload: &[u8]) -> Problem {
        self.try_convert(payload).unwrap_or_else(|| {
            tracing::debug!(
                len = payload.len(),
                "no converter matched downstream error body"
            );
            Problem::titled(texts::RELATED_SERVICE)
                .with_detail(String::from_utf8_lossy(payload).into_owned())
        })
    }
}

impl Default for ConverterChain {
    fn default() -> Self {
        Self::from_config(&ConvertersConfig::default())
    }
}

impl fmt::Debug for ConverterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterChain")
            .field("converters", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::ConverterSettings;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        order: i32,
        enabled: bool,
        title: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, order: i32, title: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                order,
                enabled: true,
                title,
                calls: AtomicUsize::new(0),
            })
        }

        fn disabled(name: &'static str, order: i32) -> Arc<Self> {
            Arc::new(Self {
                name,
                order,
                enabled: false,
                title: Some("never"),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ProblemConverter for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }
        fn order(&self) -> i32 {
            self.order
        }
        fn is_enabled(&self) -> bool {
            self.enabled
        }
        fn try_convert(&self, payload: &[u8]) -> Option<Problem> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(payload, b"payload", "every converter sees the full payload");
            self.title.map(Problem::titled)
        }
    }

    #[test]
    fn default_order_is_ascending() {
        assert_eq!(
            ConverterChain::default().names(),
            ["field_violations", "problem_details", "message"]
        );
    }

    #[test]
    fn disabled_converters_are_never_invoked() {
        let off = Fixed::disabled("off", 0);
        let on = Fixed::new("on", 1, None);
        let chain = ConverterChain::new([
            off.clone() as Arc<dyn ProblemConverter>,
            on.clone() as Arc<dyn ProblemConverter>,
        ]);

        assert_eq!(chain.names(), ["on"]);
        let _ = chain.convert(b"payload");
        assert_eq!(off.calls.load(Ordering::SeqCst), 0);
        assert_eq!(on.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ties_keep_registration_order() {
        let chain = ConverterChain::new([
            Fixed::new("c", 5, None) as Arc<dyn ProblemConverter>,
            Fixed::new("a", 1, None) as Arc<dyn ProblemConverter>,
            Fixed::new("b", 5, None) as Arc<dyn ProblemConverter>,
        ]);
        assert_eq!(chain.names(), ["a", "c", "b"]);
    }

    #[test]
    fn first_titled_result_wins_and_blank_titles_continue() {
        let blank = Fixed::new("blank", 1, Some(" "));
        let hit = Fixed::new("hit", 2, Some("matched"));
        let late = Fixed::new("late", 3, Some("too late"));
        let chain = ConverterChain::new([
            late.clone() as Arc<dyn ProblemConverter>,
            hit.clone() as Arc<dyn ProblemConverter>,
            blank.clone() as Arc<dyn ProblemConverter>,
        ]);

        let p = chain.convert(b"payload");
        assert_eq!(p.title.as_deref(), Some("matched"));
        assert_eq!(blank.calls.load(Ordering::SeqCst), 1);
        assert_eq!(late.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unmatched_payload_falls_back_to_text() {
        let p = ConverterChain::default().convert(b"upstream exploded");
        assert_eq!(p.title.as_deref(), Some(texts::RELATED_SERVICE));
        assert_eq!(p.detail.as_deref(), Some("upstream exploded"));
    }

    #[test]
    fn empty_payload_falls_back_to_empty_detail() {
        let p = ConverterChain::default().convert(b"");
        assert_eq!(p.title.as_deref(), Some(texts::RELATED_SERVICE));
        assert_eq!(p.detail.as_deref(), Some(""));
    }

    #[test]
    fn config_can_disable_and_reorder() {
        let cfg = ConvertersConfig {
            field_violations: ConverterSettings {
                enabled: false,
                order: None,
            },
            message: ConverterSettings {
                enabled: true,
                order: Some(1),
            },
            ..ConvertersConfig::default()
        };
        assert_eq!(
            ConverterChain::from_config(&cfg).names(),
            ["message", "problem_details"]
        );
    }

    #[test]
    fn canonical_problem_beats_message_shape() {
        let p = ConverterChain::default()
            .convert(br#"{"title":"Conflict","message":"ignored by this path"}"#);
        assert_eq!(p.title.as_deref(), Some("Conflict"));
        assert_eq!(p.extensions.get("message").and_then(|v| v.as_str()), Some("ignored by this path"));
    }
}
