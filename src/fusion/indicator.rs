// =============================================================================
// Indicators — named, typed observations feeding the classifier
// =============================================================================
//
// An indicator declaration fixes a name and an activity condition at
// configuration time. Raw values arrive later, one per classify() call:
//
//   Boolean  — active iff the supplied value is `true`.
//   Numeric  — active iff `comparator(value, threshold)` holds.
//
// Numeric comparison uses IEEE-754 semantics. Every ordered comparison
// against NaN is false, so a NaN value is inactive regardless of comparator.

use serde::{Deserialize, Serialize};

use crate::fusion::error::EvaluationError;

// =============================================================================
// Comparator
// =============================================================================

/// Ordering predicate applied to a Numeric indicator's value and threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

impl Comparator {
    /// Apply the predicate. NaN on either side yields `false`.
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessOrEqual => value <= threshold,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GreaterThan => write!(f, ">"),
            Self::LessThan => write!(f, "<"),
            Self::GreaterOrEqual => write!(f, ">="),
            Self::LessOrEqual => write!(f, "<="),
        }
    }
}

// =============================================================================
// Raw values
// =============================================================================

/// A raw observed value supplied to `classify`. JSON booleans map to `Bool`,
/// JSON numbers to `Number`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Bool(bool),
    Number(f64),
}

impl From<bool> for SignalValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for SignalValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

// =============================================================================
// IndicatorSpec
// =============================================================================

/// The activity condition for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndicatorKind {
    /// Active iff the supplied value is `true`.
    Boolean,
    /// Active iff `comparator(value, threshold)` holds.
    Numeric {
        comparator: Comparator,
        threshold: f64,
    },
}

/// A single indicator declaration. Declaration order across the full set is
/// fixed at configuration time and determines report order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub name: String,
    pub kind: IndicatorKind,
}

impl IndicatorSpec {
    /// Declare a Boolean indicator.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: IndicatorKind::Boolean,
        }
    }

    /// Declare a Numeric indicator with its comparator and threshold.
    pub fn numeric(name: impl Into<String>, comparator: Comparator, threshold: f64) -> Self {
        Self {
            name: name.into(),
            kind: IndicatorKind::Numeric {
                comparator,
                threshold,
            },
        }
    }

    /// Evaluate whether this indicator is active for the given raw value.
    ///
    /// A value whose type contradicts the declared kind is an error, not a
    /// coercion. A NaN numeric value evaluates to inactive.
    pub fn is_active(&self, value: SignalValue) -> Result<bool, EvaluationError> {
        match (&self.kind, value) {
            (IndicatorKind::Boolean, SignalValue::Bool(b)) => Ok(b),
            (
                IndicatorKind::Numeric {
                    comparator,
                    threshold,
                },
                SignalValue::Number(n),
            ) => Ok(comparator.holds(n, *threshold)),
            (IndicatorKind::Boolean, SignalValue::Number(_)) => {
                Err(EvaluationError::TypeMismatch {
                    name: self.name.clone(),
                    expected: "boolean",
                })
            }
            (IndicatorKind::Numeric { .. }, SignalValue::Bool(_)) => {
                Err(EvaluationError::TypeMismatch {
                    name: self.name.clone(),
                    expected: "numeric",
                })
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_holds() {
        assert!(Comparator::GreaterThan.holds(101.0, 100.0));
        assert!(!Comparator::GreaterThan.holds(100.0, 100.0));
        assert!(Comparator::GreaterOrEqual.holds(100.0, 100.0));
        assert!(Comparator::LessThan.holds(-0.8, -0.3));
        assert!(!Comparator::LessThan.holds(-0.3, -0.3));
        assert!(Comparator::LessOrEqual.holds(-0.3, -0.3));
    }

    #[test]
    fn comparator_nan_is_always_false() {
        for cmp in [
            Comparator::GreaterThan,
            Comparator::LessThan,
            Comparator::GreaterOrEqual,
            Comparator::LessOrEqual,
        ] {
            assert!(!cmp.holds(f64::NAN, 100.0));
        }
    }

    #[test]
    fn comparator_display() {
        assert_eq!(Comparator::GreaterThan.to_string(), ">");
        assert_eq!(Comparator::LessOrEqual.to_string(), "<=");
    }

    #[test]
    fn boolean_indicator_activity() {
        let spec = IndicatorSpec::boolean("repetition_alert");
        assert!(spec.is_active(SignalValue::Bool(true)).unwrap());
        assert!(!spec.is_active(SignalValue::Bool(false)).unwrap());
    }

    #[test]
    fn numeric_indicator_activity() {
        let spec = IndicatorSpec::numeric("high_bpm", Comparator::GreaterThan, 100.0);
        assert!(spec.is_active(SignalValue::Number(130.0)).unwrap());
        assert!(!spec.is_active(SignalValue::Number(95.0)).unwrap());
        // Boundary is exclusive for GreaterThan.
        assert!(!spec.is_active(SignalValue::Number(100.0)).unwrap());
    }

    #[test]
    fn nan_value_is_inactive() {
        let spec = IndicatorSpec::numeric("high_bpm", Comparator::GreaterThan, 100.0);
        assert!(!spec.is_active(SignalValue::Number(f64::NAN)).unwrap());

        let spec = IndicatorSpec::numeric("negative_sentiment", Comparator::LessThan, -0.3);
        assert!(!spec.is_active(SignalValue::Number(f64::NAN)).unwrap());
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let spec = IndicatorSpec::numeric("high_bpm", Comparator::GreaterThan, 100.0);
        let err = spec.is_active(SignalValue::Bool(true)).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::TypeMismatch {
                name: "high_bpm".into(),
                expected: "numeric",
            }
        );

        let spec = IndicatorSpec::boolean("repetition_alert");
        let err = spec.is_active(SignalValue::Number(1.0)).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::TypeMismatch {
                name: "repetition_alert".into(),
                expected: "boolean",
            }
        );
    }

    #[test]
    fn signal_value_json_shapes() {
        let v: SignalValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, SignalValue::Bool(true));

        let v: SignalValue = serde_json::from_str("130.5").unwrap();
        assert_eq!(v, SignalValue::Number(130.5));
    }
}
