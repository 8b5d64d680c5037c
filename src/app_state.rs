// =============================================================================
// Central Application State — CalmPulse Engine
// =============================================================================
//
// The single source of truth for the engine. All subsystems hold Arc
// references; AppState ties them together and provides a unified snapshot
// for the dashboard API and WebSocket feed.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared collections.
//   - Arc wrappers for subsystems that manage their own interior mutability.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::emotion::{EmotionMonitor, EmotionReading};
use crate::feed::ReplayFeed;
use crate::runtime_config::{EmotionThresholds, RuntimeConfig};
use crate::sentiment::{ScriptedSentiment, SentimentOracle};

// =============================================================================
// Records
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Auditable record of one classification, for the dashboard history view.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRecord {
    /// Unique identifier for this record (UUID v4).
    pub id: String,

    /// The classified state and its emoji label.
    pub state: String,
    pub emoji: String,

    /// Rule that produced the state, plus the contributing indicators.
    pub matched_rule: String,
    pub active_indicators: Vec<String>,

    /// Features the classification was computed from.
    pub features: crate::emotion::EmotionFeatures,

    /// Which path produced the record: "replay", "vitals", or "observe".
    pub source: String,

    /// ISO 8601 timestamp of when this record was created.
    pub created_at: String,
}

impl ClassificationRecord {
    /// Build a record from a finished reading.
    pub fn from_reading(reading: &EmotionReading, source: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: reading.state.clone(),
            emoji: reading.emoji.clone(),
            matched_rule: reading.matched_rule.clone(),
            active_indicators: reading.active_indicators.clone(),
            features: reading.features,
            source: source.into(),
            created_at: reading.created_at.clone(),
        }
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;
/// Maximum number of recent classification records to retain.
const MAX_RECENT_CLASSIFICATIONS: usize = 100;

/// Central application state shared across all async tasks via
/// `Arc<AppState>`.
pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Monotonically increasing version counter. Incremented on every
    /// meaningful state mutation. The WebSocket feed uses this to detect
    /// changes and push updates.
    pub state_version: AtomicU64,

    /// WebSocket message sequence number (incremented per message sent).
    pub ws_sequence_number: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Emotion pipeline ────────────────────────────────────────────────
    pub monitor: Arc<EmotionMonitor>,
    pub feed: Arc<ReplayFeed>,
    pub sentiment: Arc<dyn SentimentOracle>,

    // ── Classification Audit Trail ──────────────────────────────────────
    pub recent_classifications: RwLock<Vec<ClassificationRecord>>,

    // ── Error Log ───────────────────────────────────────────────────────
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    // ── Operational Status ──────────────────────────────────────────────
    pub ws_user_connected: RwLock<bool>,
    pub last_ws_user_event: RwLock<std::time::Instant>,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the engine was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct a new `AppState` from the given runtime configuration.
    ///
    /// Fails when the configured thresholds cannot produce a valid
    /// classifier — an invalid configuration is fatal to startup, never a
    /// degraded engine.
    pub fn new(config: RuntimeConfig) -> anyhow::Result<Self> {
        let monitor = EmotionMonitor::new(&config.thresholds)?;
        let sentiment = ScriptedSentiment::new(config.scripted_compound);

        Ok(Self {
            state_version: AtomicU64::new(1),
            ws_sequence_number: AtomicU64::new(0),

            runtime_config: Arc::new(RwLock::new(config)),

            monitor: Arc::new(monitor),
            feed: Arc::new(ReplayFeed::with_demo_data()),
            sentiment: Arc::new(sentiment),

            recent_classifications: RwLock::new(Vec::new()),
            recent_errors: RwLock::new(Vec::new()),

            ws_user_connected: RwLock::new(false),
            last_ws_user_event: RwLock::new(std::time::Instant::now()),

            start_time: std::time::Instant::now(),
        })
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version. Call this after every
    /// meaningful mutation to signal WebSocket clients that fresh data is
    /// available.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message. The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted when the limit is
    /// reached.
    pub fn push_error(&self, msg: String) {
        let record = ErrorRecord {
            message: msg,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }

        self.increment_version();
    }

    // ── Classification Audit ────────────────────────────────────────────

    /// Record a finished reading. The ring buffer is capped at
    /// [`MAX_RECENT_CLASSIFICATIONS`]; oldest entries are evicted when the
    /// limit is reached.
    pub fn record_reading(&self, reading: &EmotionReading, source: &str) {
        let record = ClassificationRecord::from_reading(reading, source);

        let mut records = self.recent_classifications.write();
        records.push(record);
        while records.len() > MAX_RECENT_CLASSIFICATIONS {
            records.remove(0);
        }

        self.increment_version();
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    /// Build a complete, serialisable snapshot of the engine state.
    ///
    /// This is the payload sent to the dashboard via the REST
    /// `GET /api/v1/state` endpoint and the WebSocket push feed.
    pub fn build_snapshot(&self) -> StateSnapshot {
        let config = self.runtime_config.read();
        let version = self.current_state_version();

        let ws_user_event_age_ms = self.last_ws_user_event.read().elapsed().as_millis() as u64;

        StateSnapshot {
            state_version: version,
            server_time: Utc::now().timestamp_millis(),
            uptime_secs: self.start_time.elapsed().as_secs(),

            monitor_mode: config.monitor_mode.to_string(),
            feed_mode: config.feed_mode.to_string(),
            thresholds: config.thresholds,

            emotion: self.monitor.current_reading(),
            recent_classifications: self.recent_classifications.read().clone(),
            recent_errors: self.recent_errors.read().clone(),

            ws_user_connected: *self.ws_user_connected.read(),
            last_ws_user_event_age_ms: ws_user_event_age_ms,
            ws_sequence_number: self.ws_sequence_number.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// Serialisable snapshot types
// =============================================================================

/// Full engine state snapshot sent to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub state_version: u64,
    pub server_time: i64,
    pub uptime_secs: u64,

    pub monitor_mode: String,
    pub feed_mode: String,
    pub thresholds: EmotionThresholds,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionReading>,
    pub recent_classifications: Vec<ClassificationRecord>,
    pub recent_errors: Vec<ErrorRecord>,

    pub ws_user_connected: bool,
    pub last_ws_user_event_age_ms: u64,
    pub ws_sequence_number: u64,
}
