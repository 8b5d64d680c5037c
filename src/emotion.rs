// =============================================================================
// Emotion Monitor
// =============================================================================
//
// Classifies the current emotional state from four observation streams using
// the fusion classifier. Each reading carries the contributing indicators so
// the dashboard can explain *why* a state was chosen.
//
// Rule table (evaluated by ascending priority; first match wins):
//
//   0  ANXIOUS  — high_bpm AND high_volume AND repetition_alert
//                 AND negative_sentiment
//   1  SAD      — negative_sentiment
//   2  HAPPY    — positive_sentiment
//   99 NEUTRAL  — fallback; always matches
//
// The classifier itself is pure and stateless; this module adds the service
// concerns around it: caching the latest reading, tracking how long the
// current state has been held, and swapping in a freshly validated
// classifier when thresholds change.

use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::fusion::{
    Classification, ClassifierConfig, Comparator, ConfigError, EvaluationError, FusionClassifier,
    IndicatorSpec, Rule, SignalValue,
};
use crate::runtime_config::EmotionThresholds;

// =============================================================================
// Indicator and state names
// =============================================================================

pub const HIGH_BPM: &str = "high_bpm";
pub const HIGH_VOLUME: &str = "high_volume";
pub const REPETITION_ALERT: &str = "repetition_alert";
pub const NEGATIVE_SENTIMENT: &str = "negative_sentiment";
pub const POSITIVE_SENTIMENT: &str = "positive_sentiment";

pub const STATE_ANXIOUS: &str = "Anxious";
pub const STATE_SAD: &str = "Sad";
pub const STATE_HAPPY: &str = "Happy";
pub const STATE_NEUTRAL: &str = "Neutral";

/// Emoji label for a state, for the dashboard's animated display.
pub fn emoji_for(state: &str) -> &'static str {
    match state {
        STATE_ANXIOUS => "😰",
        STATE_SAD => "😢",
        STATE_HAPPY => "😊",
        _ => "😐",
    }
}

// =============================================================================
// Classifier construction
// =============================================================================

/// The emotion indicator set and rule table for the given thresholds.
pub fn classifier_config(thresholds: &EmotionThresholds) -> ClassifierConfig {
    ClassifierConfig {
        indicators: vec![
            IndicatorSpec::numeric(HIGH_BPM, Comparator::GreaterThan, thresholds.high_bpm),
            IndicatorSpec::numeric(HIGH_VOLUME, Comparator::GreaterThan, thresholds.high_volume),
            IndicatorSpec::boolean(REPETITION_ALERT),
            IndicatorSpec::numeric(
                NEGATIVE_SENTIMENT,
                Comparator::LessThan,
                thresholds.negative_sentiment,
            ),
            IndicatorSpec::numeric(
                POSITIVE_SENTIMENT,
                Comparator::GreaterThan,
                thresholds.positive_sentiment,
            ),
        ],
        rules: vec![
            Rule::new(
                STATE_ANXIOUS,
                vec![
                    HIGH_BPM.into(),
                    HIGH_VOLUME.into(),
                    REPETITION_ALERT.into(),
                    NEGATIVE_SENTIMENT.into(),
                ],
                0,
            ),
            Rule::new(STATE_SAD, vec![NEGATIVE_SENTIMENT.into()], 1),
            Rule::new(STATE_HAPPY, vec![POSITIVE_SENTIMENT.into()], 2),
            Rule::fallback(STATE_NEUTRAL, 99),
        ],
    }
}

/// Build a validated emotion classifier for the given thresholds.
pub fn build_classifier(thresholds: &EmotionThresholds) -> Result<FusionClassifier, ConfigError> {
    FusionClassifier::new(classifier_config(thresholds))
}

// =============================================================================
// Features & readings
// =============================================================================

/// One snapshot of the reduced observation features, ready to classify.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionFeatures {
    /// Maximum BPM over the observation window.
    pub max_bpm: f64,
    /// Mean normalized voice volume over the window.
    pub avg_volume: f64,
    /// Adjacent-word repetition count in the transcript.
    pub repetition_count: u32,
    /// Compound sentiment polarity in [-1, 1].
    pub sentiment_compound: f64,
}

impl EmotionFeatures {
    /// The raw values mapping for `classify`. The repetition indicator is
    /// declared Boolean, so its threshold is applied here.
    pub fn to_values(self, repetition_min: u32) -> HashMap<String, SignalValue> {
        HashMap::from([
            (HIGH_BPM.to_string(), SignalValue::Number(self.max_bpm)),
            (
                HIGH_VOLUME.to_string(),
                SignalValue::Number(self.avg_volume),
            ),
            (
                REPETITION_ALERT.to_string(),
                SignalValue::Bool(self.repetition_count >= repetition_min),
            ),
            (
                NEGATIVE_SENTIMENT.to_string(),
                SignalValue::Number(self.sentiment_compound),
            ),
            (
                POSITIVE_SENTIMENT.to_string(),
                SignalValue::Number(self.sentiment_compound),
            ),
        ])
    }
}

/// Complete snapshot of the classified emotion plus all contributing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionReading {
    /// The classified state label.
    pub state: String,

    /// Emoji for the dashboard display.
    pub emoji: String,

    /// Name of the rule that produced this state.
    pub matched_rule: String,

    /// Indicators that were active and required by the matched rule, in
    /// declaration order.
    pub active_indicators: Vec<String>,

    /// Features the classification was computed from.
    pub features: EmotionFeatures,

    /// Number of seconds the current state has been held.
    pub state_age_secs: f64,

    /// ISO 8601 timestamp of this reading.
    pub created_at: String,
}

// =============================================================================
// EmotionMonitor
// =============================================================================

/// Thread-safe monitor that owns the classifier and caches the latest
/// reading.
///
/// Designed to be wrapped in an `Arc` and shared across the async runtime.
/// The classifier is immutable; the lock exists only so threshold updates
/// can atomically swap in a freshly validated replacement.
pub struct EmotionMonitor {
    classifier: RwLock<FusionClassifier>,

    /// The most recently produced reading (if any).
    reading: RwLock<Option<EmotionReading>>,

    /// Wall-clock instant of the last state *change* (not merely
    /// re-confirmation of the same state).
    last_change_time: RwLock<Instant>,
}

impl EmotionMonitor {
    /// Build a monitor with a validated classifier for `thresholds`.
    pub fn new(thresholds: &EmotionThresholds) -> Result<Self, ConfigError> {
        Ok(Self {
            classifier: RwLock::new(build_classifier(thresholds)?),
            reading: RwLock::new(None),
            last_change_time: RwLock::new(Instant::now()),
        })
    }

    /// Swap in a classifier rebuilt for new thresholds. The cached reading
    /// is kept; the next evaluation reflects the new thresholds.
    pub fn rebuild(&self, thresholds: &EmotionThresholds) -> Result<(), ConfigError> {
        let classifier = build_classifier(thresholds)?;
        *self.classifier.write() = classifier;
        Ok(())
    }

    /// Classify one feature snapshot directly, without touching the cached
    /// reading. Used by the raw `/observe` API path.
    pub fn classify_values(
        &self,
        values: &HashMap<String, SignalValue>,
    ) -> Result<Classification, EvaluationError> {
        self.classifier.read().classify(values)
    }

    /// Run a full evaluation: classify `features`, update state-age
    /// tracking, cache and return the new reading.
    pub fn evaluate(
        &self,
        features: EmotionFeatures,
        thresholds: &EmotionThresholds,
    ) -> Result<EmotionReading, EvaluationError> {
        let values = features.to_values(thresholds.repetition_min);
        let classification = self.classifier.read().classify(&values)?;

        // --- State age tracking ----------------------------------------------
        let now = Instant::now();
        let prev_state = self.reading.read().as_ref().map(|r| r.state.clone());
        if prev_state.as_deref() != Some(classification.state.as_str()) {
            *self.last_change_time.write() = now;
        }
        let state_age_secs = now
            .duration_since(*self.last_change_time.read())
            .as_secs_f64();

        let reading = EmotionReading {
            emoji: emoji_for(&classification.state).to_string(),
            state: classification.state,
            matched_rule: classification.matched_rule,
            active_indicators: classification.active_indicators,
            features,
            state_age_secs,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        debug!(
            state = %reading.state,
            rule = %reading.matched_rule,
            max_bpm = format!("{:.1}", features.max_bpm),
            avg_volume = format!("{:.2}", features.avg_volume),
            repetition = features.repetition_count,
            sentiment = format!("{:.2}", features.sentiment_compound),
            age_secs = format!("{:.1}", state_age_secs),
            "emotion evaluated"
        );

        *self.reading.write() = Some(reading.clone());
        Ok(reading)
    }

    /// Return the most recent reading without recomputing.
    pub fn current_reading(&self) -> Option<EmotionReading> {
        self.reading.read().clone()
    }

    /// The active indicator declarations and rule table, for the dashboard's
    /// explainability view.
    pub fn describe(&self) -> ClassifierConfig {
        let classifier = self.classifier.read();
        ClassifierConfig {
            indicators: classifier.indicators().to_vec(),
            rules: classifier.rules().to_vec(),
        }
    }
}
