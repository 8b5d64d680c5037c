// =============================================================================
// Rules — prioritized conjunctions of required indicators
// =============================================================================
//
// A rule fires iff every indicator it requires is active. Rules are checked
// in ascending priority order (lower integer = higher precedence) and the
// first firing rule wins. The fallback rule requires nothing and therefore
// always fires, guaranteeing exactly one result per evaluation.

use serde::{Deserialize, Serialize};

/// One entry of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Identifier reported as `matched_rule` in the classification.
    pub name: String,

    /// Output state label emitted when this rule wins.
    pub state: String,

    /// Indicator names that must all be active for this rule to fire.
    pub requires: Vec<String>,

    /// Precedence: lower integer = checked first = higher precedence.
    pub priority: i32,
}

impl Rule {
    /// Build a rule whose name doubles as its output state.
    pub fn new(name: impl Into<String>, requires: Vec<String>, priority: i32) -> Self {
        let name = name.into();
        Self {
            state: name.clone(),
            name,
            requires,
            priority,
        }
    }

    /// Build the zero-requirement fallback rule.
    pub fn fallback(state: impl Into<String>, priority: i32) -> Self {
        Self::new(state, Vec::new(), priority)
    }

    /// Override the output state when it differs from the rule name.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// A fallback rule requires no indicators and therefore always fires.
    pub fn is_fallback(&self) -> bool {
        self.requires.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_name_as_state() {
        let rule = Rule::new("Anxious", vec!["high_bpm".into()], 0);
        assert_eq!(rule.name, "Anxious");
        assert_eq!(rule.state, "Anxious");
        assert!(!rule.is_fallback());
    }

    #[test]
    fn with_state_overrides_label() {
        let rule = Rule::new("anxiety-alert", vec!["high_bpm".into()], 0)
            .with_state("Anxious / Needs Help");
        assert_eq!(rule.name, "anxiety-alert");
        assert_eq!(rule.state, "Anxious / Needs Help");
    }

    #[test]
    fn fallback_requires_nothing() {
        let rule = Rule::fallback("Neutral", 99);
        assert!(rule.is_fallback());
        assert_eq!(rule.priority, 99);
        assert_eq!(rule.state, "Neutral");
    }
}
