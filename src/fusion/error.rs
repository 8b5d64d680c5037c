// =============================================================================
// Fusion Errors
// =============================================================================
//
// Two distinct failure surfaces:
//
//   ConfigError      — the rule/indicator table is malformed. Raised once at
//                      construction; no classifier is built.
//   EvaluationError  — a single classify() call received unusable input.
//                      Local to that call; the caller decides retry, default
//                      substitution, or propagation.

use thiserror::Error;

/// Invalid classifier configuration detected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two indicator declarations share the same name.
    #[error("duplicate indicator name `{0}`")]
    DuplicateIndicator(String),

    /// A rule requires an indicator that was never declared.
    #[error("rule `{rule}` requires unknown indicator `{indicator}`")]
    UnknownIndicator { rule: String, indicator: String },

    /// Two rules share a priority, making precedence ambiguous.
    #[error("rules `{first}` and `{second}` share priority {priority}")]
    DuplicatePriority {
        priority: i32,
        first: String,
        second: String,
    },

    /// No zero-requirement fallback rule was configured.
    #[error("no fallback rule (empty `requires`) is configured")]
    MissingFallback,

    /// A zero-requirement rule sorts before another rule. Every rule below
    /// it would be unreachable.
    #[error("rule `{rule}` has no required indicators but is not the lowest-precedence rule")]
    FallbackNotLast { rule: String },
}

/// A single classification call received input it cannot evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The values mapping is missing a declared indicator.
    #[error("no value supplied for declared indicator `{0}`")]
    MissingIndicator(String),

    /// The supplied value's type contradicts the indicator's declared kind.
    #[error("indicator `{name}` expects a {expected} value")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages() {
        let e = ConfigError::DuplicateIndicator("high_bpm".into());
        assert_eq!(e.to_string(), "duplicate indicator name `high_bpm`");

        let e = ConfigError::UnknownIndicator {
            rule: "Anxious".into(),
            indicator: "foo".into(),
        };
        assert_eq!(
            e.to_string(),
            "rule `Anxious` requires unknown indicator `foo`"
        );

        let e = ConfigError::DuplicatePriority {
            priority: 5,
            first: "Sad".into(),
            second: "Happy".into(),
        };
        assert_eq!(e.to_string(), "rules `Sad` and `Happy` share priority 5");
    }

    #[test]
    fn evaluation_error_messages() {
        let e = EvaluationError::MissingIndicator("high_volume".into());
        assert_eq!(
            e.to_string(),
            "no value supplied for declared indicator `high_volume`"
        );

        let e = EvaluationError::TypeMismatch {
            name: "high_bpm".into(),
            expected: "numeric",
        };
        assert_eq!(e.to_string(), "indicator `high_bpm` expects a numeric value");
    }
}
