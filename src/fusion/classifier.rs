// =============================================================================
// Signal Fusion Classifier
// =============================================================================
//
// Fuses a fixed set of named indicator values into one discrete state via a
// validated, prioritized rule table.
//
// Evaluation contract:
//
//   1. Every declared indicator must have a value in the mapping; unknown
//      extra keys are ignored.
//   2. Each indicator's activity is computed from its declared kind. NaN
//      numeric values are inactive.
//   3. Rules are checked in ascending priority order; the first rule whose
//      required indicators are all active wins. The zero-requirement
//      fallback guarantees exactly one winner.
//
// The classifier holds no mutable state and performs no I/O: the result
// depends only on the configuration and the supplied values, so one instance
// can be shared across tasks without locking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fusion::error::{ConfigError, EvaluationError};
use crate::fusion::indicator::{IndicatorSpec, SignalValue};
use crate::fusion::rule::Rule;

// =============================================================================
// Configuration & output types
// =============================================================================

/// Construction input: indicator declarations (order fixes report order) and
/// the rule table (any order; sorted by priority during validation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub indicators: Vec<IndicatorSpec>,
    pub rules: Vec<Rule>,
}

/// The classifier's output for one evaluation.
///
/// `active_indicators` lists only the indicators that were active *and*
/// required by the winning rule, in declaration order — the explanation of
/// the result, not a dump of everything that happened to be active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub state: String,
    pub matched_rule: String,
    pub active_indicators: Vec<String>,
}

// =============================================================================
// FusionClassifier
// =============================================================================

/// Immutable rule-table classifier. Construct once with [`new`], then call
/// [`classify`] per observation snapshot.
///
/// [`new`]: FusionClassifier::new
/// [`classify`]: FusionClassifier::classify
#[derive(Debug, Clone)]
pub struct FusionClassifier {
    /// Indicator declarations in declaration order.
    indicators: Vec<IndicatorSpec>,

    /// Indicator name -> declaration index.
    index: HashMap<String, usize>,

    /// Rule table sorted by ascending priority; last entry is the fallback.
    rules: Vec<Rule>,
}

impl FusionClassifier {
    /// Validate `config` and build the classifier.
    ///
    /// Fails with [`ConfigError`] on duplicate indicator names, dangling
    /// rule references, duplicate priorities, a missing fallback, or a
    /// zero-requirement rule that does not sort last (it would shadow every
    /// rule below it).
    pub fn new(config: ClassifierConfig) -> Result<Self, ConfigError> {
        let ClassifierConfig { indicators, rules } = config;

        // --- Indicator names must be unique ----------------------------------
        let mut index = HashMap::with_capacity(indicators.len());
        for (i, spec) in indicators.iter().enumerate() {
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateIndicator(spec.name.clone()));
            }
        }

        // --- Every required indicator must be declared -----------------------
        for rule in &rules {
            for required in &rule.requires {
                if !index.contains_key(required) {
                    return Err(ConfigError::UnknownIndicator {
                        rule: rule.name.clone(),
                        indicator: required.clone(),
                    });
                }
            }
        }

        // --- Priorities must be unique (else precedence is ambiguous) --------
        let mut by_priority: HashMap<i32, &str> = HashMap::with_capacity(rules.len());
        for rule in &rules {
            if let Some(first) = by_priority.insert(rule.priority, &rule.name) {
                return Err(ConfigError::DuplicatePriority {
                    priority: rule.priority,
                    first: first.to_string(),
                    second: rule.name.clone(),
                });
            }
        }

        // --- Sort by priority; deterministic since priorities are unique -----
        let mut rules = rules;
        rules.sort_by_key(|r| r.priority);

        // --- Exactly one fallback, and it must sort last ---------------------
        match rules.iter().position(Rule::is_fallback) {
            None => return Err(ConfigError::MissingFallback),
            Some(pos) if pos + 1 != rules.len() => {
                return Err(ConfigError::FallbackNotLast {
                    rule: rules[pos].name.clone(),
                });
            }
            Some(_) => {}
        }

        Ok(Self {
            indicators,
            index,
            rules,
        })
    }

    /// Classify one snapshot of raw indicator values.
    ///
    /// `values` must contain an entry for every declared indicator; extra
    /// keys are ignored. Pure and side-effect free: identical configuration
    /// and identical values always produce an identical [`Classification`].
    pub fn classify(
        &self,
        values: &HashMap<String, SignalValue>,
    ) -> Result<Classification, EvaluationError> {
        // --- Evaluate every indicator's activity, in declaration order -------
        let mut active = Vec::with_capacity(self.indicators.len());
        for spec in &self.indicators {
            let value = values
                .get(&spec.name)
                .copied()
                .ok_or_else(|| EvaluationError::MissingIndicator(spec.name.clone()))?;
            active.push(spec.is_active(value)?);
        }

        // --- First firing rule in priority order wins ------------------------
        for rule in &self.rules {
            let fires = rule
                .requires
                .iter()
                .all(|name| self.index.get(name).is_some_and(|&i| active[i]));
            if !fires {
                continue;
            }

            // Report the active-and-required indicators in declaration order.
            let active_indicators = self
                .indicators
                .iter()
                .enumerate()
                .filter(|(i, spec)| active[*i] && rule.requires.contains(&spec.name))
                .map(|(_, spec)| spec.name.clone())
                .collect();

            return Ok(Classification {
                state: rule.state.clone(),
                matched_rule: rule.name.clone(),
                active_indicators,
            });
        }

        // A validated rule table always ends with the zero-requirement
        // fallback, which fires unconditionally.
        unreachable!("validated rule table has no firing rule")
    }

    /// The declared indicator specs, in declaration order.
    pub fn indicators(&self) -> &[IndicatorSpec] {
        &self.indicators
    }

    /// The rule table, sorted by ascending priority.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::indicator::Comparator;

    fn values(entries: &[(&str, SignalValue)]) -> HashMap<String, SignalValue> {
        entries
            .iter()
            .map(|(name, v)| (name.to_string(), *v))
            .collect()
    }

    fn num(v: f64) -> SignalValue {
        SignalValue::Number(v)
    }

    fn flag(v: bool) -> SignalValue {
        SignalValue::Bool(v)
    }

    /// The source system's indicator set and rule table.
    fn emotion_config() -> ClassifierConfig {
        ClassifierConfig {
            indicators: vec![
                IndicatorSpec::numeric("high_bpm", Comparator::GreaterThan, 100.0),
                IndicatorSpec::numeric("high_volume", Comparator::GreaterThan, 0.4),
                IndicatorSpec::boolean("repetition_alert"),
                IndicatorSpec::numeric("negative_sentiment", Comparator::LessThan, -0.3),
                IndicatorSpec::numeric("positive_sentiment", Comparator::GreaterThan, 0.3),
            ],
            rules: vec![
                Rule::new(
                    "Anxious",
                    vec![
                        "high_bpm".into(),
                        "high_volume".into(),
                        "repetition_alert".into(),
                        "negative_sentiment".into(),
                    ],
                    0,
                ),
                Rule::new("Sad", vec!["negative_sentiment".into()], 1),
                Rule::new("Happy", vec!["positive_sentiment".into()], 2),
                Rule::fallback("Neutral", 99),
            ],
        }
    }

    fn anxious_values() -> HashMap<String, SignalValue> {
        values(&[
            ("high_bpm", num(130.0)),
            ("high_volume", num(0.6)),
            ("repetition_alert", flag(true)),
            ("negative_sentiment", num(-0.8)),
            ("positive_sentiment", num(-0.8)),
        ])
    }

    // ---- End-to-end scenario --------------------------------------------

    #[test]
    fn anxious_scenario_all_indicators_firing() {
        let classifier = FusionClassifier::new(emotion_config()).unwrap();
        let result = classifier.classify(&anxious_values()).unwrap();

        assert_eq!(result.state, "Anxious");
        assert_eq!(result.matched_rule, "Anxious");
        assert_eq!(
            result.active_indicators,
            vec![
                "high_bpm",
                "high_volume",
                "repetition_alert",
                "negative_sentiment"
            ]
        );
    }

    #[test]
    fn sad_when_only_sentiment_is_negative() {
        let classifier = FusionClassifier::new(emotion_config()).unwrap();
        let result = classifier
            .classify(&values(&[
                ("high_bpm", num(72.0)),
                ("high_volume", num(0.2)),
                ("repetition_alert", flag(false)),
                ("negative_sentiment", num(-0.5)),
                ("positive_sentiment", num(-0.5)),
            ]))
            .unwrap();

        assert_eq!(result.state, "Sad");
        assert_eq!(result.active_indicators, vec!["negative_sentiment"]);
    }

    #[test]
    fn happy_on_positive_sentiment() {
        let classifier = FusionClassifier::new(emotion_config()).unwrap();
        let result = classifier
            .classify(&values(&[
                ("high_bpm", num(72.0)),
                ("high_volume", num(0.2)),
                ("repetition_alert", flag(false)),
                ("negative_sentiment", num(0.6)),
                ("positive_sentiment", num(0.6)),
            ]))
            .unwrap();

        assert_eq!(result.state, "Happy");
        assert_eq!(result.active_indicators, vec!["positive_sentiment"]);
    }

    // ---- Totality & fallback --------------------------------------------

    #[test]
    fn fallback_fires_with_empty_explanation() {
        let classifier = FusionClassifier::new(emotion_config()).unwrap();
        let result = classifier
            .classify(&values(&[
                ("high_bpm", num(72.0)),
                ("high_volume", num(0.2)),
                ("repetition_alert", flag(false)),
                ("negative_sentiment", num(0.1)),
                ("positive_sentiment", num(0.1)),
            ]))
            .unwrap();

        assert_eq!(result.state, "Neutral");
        assert_eq!(result.matched_rule, "Neutral");
        assert!(result.active_indicators.is_empty());
    }

    #[test]
    fn fallback_explanation_is_empty_even_with_active_indicators() {
        // high_bpm is active but no rule requiring only it exists, so the
        // fallback wins and the explanation stays empty.
        let config = ClassifierConfig {
            indicators: vec![
                IndicatorSpec::numeric("high_bpm", Comparator::GreaterThan, 100.0),
                IndicatorSpec::boolean("repetition_alert"),
            ],
            rules: vec![
                Rule::new(
                    "Alert",
                    vec!["high_bpm".into(), "repetition_alert".into()],
                    0,
                ),
                Rule::fallback("Stable", 99),
            ],
        };
        let classifier = FusionClassifier::new(config).unwrap();
        let result = classifier
            .classify(&values(&[
                ("high_bpm", num(120.0)),
                ("repetition_alert", flag(false)),
            ]))
            .unwrap();

        assert_eq!(result.state, "Stable");
        assert!(result.active_indicators.is_empty());
    }

    // ---- Determinism -----------------------------------------------------

    #[test]
    fn classify_is_deterministic() {
        let classifier = FusionClassifier::new(emotion_config()).unwrap();
        let input = anxious_values();
        let first = classifier.classify(&input).unwrap();
        let second = classifier.classify(&input).unwrap();
        assert_eq!(first, second);
    }

    // ---- Precedence ------------------------------------------------------

    #[test]
    fn lower_priority_number_wins() {
        let config = ClassifierConfig {
            indicators: vec![
                IndicatorSpec::boolean("a"),
                IndicatorSpec::boolean("b"),
            ],
            rules: vec![
                Rule::new("R1", vec!["a".into(), "b".into()], 0),
                Rule::new("R2", vec!["a".into()], 1),
                Rule::fallback("Default", 99),
            ],
        };
        let classifier = FusionClassifier::new(config).unwrap();
        let result = classifier
            .classify(&values(&[("a", flag(true)), ("b", flag(true))]))
            .unwrap();
        assert_eq!(result.matched_rule, "R1");
    }

    #[test]
    fn rules_may_be_supplied_out_of_order() {
        let config = ClassifierConfig {
            indicators: vec![
                IndicatorSpec::boolean("a"),
                IndicatorSpec::boolean("b"),
            ],
            rules: vec![
                Rule::fallback("Default", 99),
                Rule::new("R2", vec!["a".into()], 1),
                Rule::new("R1", vec!["a".into(), "b".into()], 0),
            ],
        };
        let classifier = FusionClassifier::new(config).unwrap();
        assert_eq!(
            classifier
                .rules()
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>(),
            vec!["R1", "R2", "Default"]
        );

        let result = classifier
            .classify(&values(&[("a", flag(true)), ("b", flag(true))]))
            .unwrap();
        assert_eq!(result.matched_rule, "R1");
    }

    // ---- NaN handling ----------------------------------------------------

    #[test]
    fn nan_value_does_not_fire_rules() {
        let config = ClassifierConfig {
            indicators: vec![IndicatorSpec::numeric(
                "high_bpm",
                Comparator::GreaterThan,
                100.0,
            )],
            rules: vec![
                Rule::new("Alert", vec!["high_bpm".into()], 0),
                Rule::fallback("Stable", 99),
            ],
        };
        let classifier = FusionClassifier::new(config).unwrap();
        let result = classifier
            .classify(&values(&[("high_bpm", num(f64::NAN))]))
            .unwrap();
        assert_eq!(result.state, "Stable");
    }

    // ---- Input contract --------------------------------------------------

    #[test]
    fn missing_declared_indicator_is_an_error() {
        let classifier = FusionClassifier::new(emotion_config()).unwrap();
        let mut input = anxious_values();
        input.remove("high_volume");

        let err = classifier.classify(&input).unwrap_err();
        assert_eq!(err, EvaluationError::MissingIndicator("high_volume".into()));
    }

    #[test]
    fn unknown_extra_keys_are_ignored() {
        let classifier = FusionClassifier::new(emotion_config()).unwrap();
        let mut input = anxious_values();
        input.insert("unrelated_extra".into(), num(42.0));

        let result = classifier.classify(&input).unwrap();
        assert_eq!(result.state, "Anxious");
    }

    // ---- Config validation -----------------------------------------------

    #[test]
    fn duplicate_priority_is_rejected() {
        let config = ClassifierConfig {
            indicators: vec![IndicatorSpec::boolean("a")],
            rules: vec![
                Rule::new("R1", vec!["a".into()], 5),
                Rule::new("R2", vec!["a".into()], 5),
                Rule::fallback("Default", 99),
            ],
        };
        let err = FusionClassifier::new(config).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicatePriority {
                priority: 5,
                first: "R1".into(),
                second: "R2".into(),
            }
        );
    }

    #[test]
    fn unknown_indicator_reference_is_rejected() {
        let config = ClassifierConfig {
            indicators: vec![IndicatorSpec::boolean("a")],
            rules: vec![
                Rule::new("R1", vec!["foo".into()], 0),
                Rule::fallback("Default", 99),
            ],
        };
        let err = FusionClassifier::new(config).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownIndicator {
                rule: "R1".into(),
                indicator: "foo".into(),
            }
        );
    }

    #[test]
    fn missing_fallback_is_rejected() {
        let config = ClassifierConfig {
            indicators: vec![IndicatorSpec::boolean("a")],
            rules: vec![Rule::new("R1", vec!["a".into()], 0)],
        };
        assert_eq!(
            FusionClassifier::new(config).unwrap_err(),
            ConfigError::MissingFallback
        );
    }

    #[test]
    fn duplicate_indicator_name_is_rejected() {
        let config = ClassifierConfig {
            indicators: vec![
                IndicatorSpec::boolean("a"),
                IndicatorSpec::numeric("a", Comparator::GreaterThan, 1.0),
            ],
            rules: vec![Rule::fallback("Default", 99)],
        };
        assert_eq!(
            FusionClassifier::new(config).unwrap_err(),
            ConfigError::DuplicateIndicator("a".into())
        );
    }

    #[test]
    fn shadowing_zero_requirement_rule_is_rejected() {
        let config = ClassifierConfig {
            indicators: vec![IndicatorSpec::boolean("a")],
            rules: vec![
                Rule::fallback("Eager", 0),
                Rule::new("R1", vec!["a".into()], 1),
                Rule::fallback("Default", 99),
            ],
        };
        let err = FusionClassifier::new(config).unwrap_err();
        assert_eq!(err, ConfigError::FallbackNotLast { rule: "Eager".into() });
    }

    #[test]
    fn classifier_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FusionClassifier>();
    }
}
