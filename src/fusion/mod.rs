// =============================================================================
// Signal Fusion Module
// =============================================================================
//
// Rule-based fusion of independent indicator streams into a discrete state:
// - Indicator declarations (boolean flags, numeric threshold comparisons)
// - Prioritized rule table with a totality-guaranteeing fallback
// - Pure, deterministic classification with explainability output

pub mod classifier;
pub mod error;
pub mod indicator;
pub mod rule;

pub use classifier::{Classification, ClassifierConfig, FusionClassifier};
pub use error::{ConfigError, EvaluationError};
pub use indicator::{Comparator, IndicatorSpec, SignalValue};
pub use rule::Rule;
