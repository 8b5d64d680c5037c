// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The engine handles no funds or
// credentials, so the API is unauthenticated; bind it to a trusted
// interface.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::emotion::{self, EmotionFeatures};
use crate::fusion::SignalValue;
use crate::indicators::{heart_rate, speech, volume};
use crate::types::{FeedMode, MonitorMode};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/state", get(full_state))
        .route("/api/v1/emotion", get(current_emotion))
        .route("/api/v1/classifications", get(classifications))
        .route("/api/v1/observe", post(observe))
        .route("/api/v1/vitals", post(push_vitals))
        .route("/api/v1/rules", get(rule_table))
        .route("/api/v1/thresholds", get(get_thresholds))
        .route("/api/v1/thresholds", post(set_thresholds))
        .route("/api/v1/control/pause", post(control_pause))
        .route("/api/v1/control/resume", post(control_resume))
        .route("/api/v1/control/feed-mode", post(control_feed_mode))
        // ── WebSocket (handled in the ws module but mounted here) ───
        .route("/api/v1/ws", get(crate::api::ws::ws_handler))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Full state snapshot
// =============================================================================

async fn full_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.build_snapshot();
    Json(snapshot)
}

// =============================================================================
// Current emotion
// =============================================================================

async fn current_emotion(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.monitor.current_reading() {
        Some(reading) => Json(serde_json::json!(reading)).into_response(),
        None => {
            let body =
                serde_json::json!({ "emotion": null, "message": "No reading available yet" });
            Json(body).into_response()
        }
    }
}

// =============================================================================
// Classification history
// =============================================================================

async fn classifications(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = state.recent_classifications.read().clone();
    Json(records)
}

// =============================================================================
// Rule table — the active indicator declarations and rules
// =============================================================================

async fn rule_table(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.monitor.describe())
}

// =============================================================================
// Raw observation — the classifier's in-process contract over HTTP
// =============================================================================

async fn observe(
    State(state): State<Arc<AppState>>,
    Json(values): Json<HashMap<String, SignalValue>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    match state.monitor.classify_values(&values) {
        Ok(classification) => {
            let body = serde_json::json!({
                "state": classification.state,
                "emoji": emotion::emoji_for(&classification.state),
                "matched_rule": classification.matched_rule,
                "active_indicators": classification.active_indicators,
            });
            Ok(Json(body))
        }
        Err(e) => {
            // Local to this call — the engine keeps running.
            warn!(error = %e, "observe request rejected");
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": e.to_string() })),
            ))
        }
    }
}

// =============================================================================
// Pushed vitals — full feature pipeline for live producers
// =============================================================================

#[derive(Deserialize)]
struct VitalsRequest {
    bpm: Vec<f64>,
    volume: Vec<f64>,
    #[serde(default)]
    transcript: String,
    /// Optional pre-scored sentiment; the configured oracle runs otherwise.
    #[serde(default)]
    sentiment_compound: Option<f64>,
}

async fn push_vitals(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VitalsRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let bad_request = |msg: &str| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": msg })),
        )
    };

    let heart = heart_rate::summarize(&req.bpm)
        .ok_or_else(|| bad_request("bpm series is empty or non-finite"))?;
    let vol = volume::summarize(&req.volume)
        .ok_or_else(|| bad_request("volume series is empty or non-finite"))?;

    let top_terms = state.runtime_config.read().top_terms;
    let transcript_features = speech::analyze(&req.transcript, top_terms);

    let sentiment_compound = req
        .sentiment_compound
        .unwrap_or_else(|| state.sentiment.compound(&req.transcript));

    let features = EmotionFeatures {
        max_bpm: heart.max,
        avg_volume: vol.mean,
        repetition_count: transcript_features.repetition_count,
        sentiment_compound,
    };

    let thresholds = state.runtime_config.read().thresholds;
    match state.monitor.evaluate(features, &thresholds) {
        Ok(reading) => {
            state.record_reading(&reading, "vitals");
            let body = serde_json::json!({
                "reading": reading,
                "heart": heart,
                "heart_status": heart_rate::HeartStatus::from_bpm(heart.current).to_string(),
                "volume": vol,
                "transcript": transcript_features,
            });
            Ok(Json(body))
        }
        Err(e) => {
            warn!(error = %e, "vitals evaluation failed");
            state.push_error(format!("vitals evaluation failed: {e}"));
            Err(bad_request(&e.to_string()))
        }
    }
}

// =============================================================================
// Thresholds
// =============================================================================

async fn get_thresholds(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let thresholds = state.runtime_config.read().thresholds;
    Json(thresholds)
}

#[derive(Deserialize)]
struct ThresholdUpdate {
    #[serde(default)]
    high_bpm: Option<f64>,
    #[serde(default)]
    high_volume: Option<f64>,
    #[serde(default)]
    repetition_min: Option<u32>,
    #[serde(default)]
    negative_sentiment: Option<f64>,
    #[serde(default)]
    positive_sentiment: Option<f64>,
}

async fn set_thresholds(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ThresholdUpdate>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let mut config = state.runtime_config.write();
    let mut changes = Vec::new();

    macro_rules! apply_field {
        ($field:ident) => {
            if let Some(val) = update.$field {
                if config.thresholds.$field != val {
                    changes.push(format!(
                        "{}: {} -> {}",
                        stringify!($field),
                        config.thresholds.$field,
                        val
                    ));
                    config.thresholds.$field = val;
                }
            }
        };
    }

    apply_field!(high_bpm);
    apply_field!(high_volume);
    apply_field!(repetition_min);
    apply_field!(negative_sentiment);
    apply_field!(positive_sentiment);

    let thresholds = config.thresholds;
    let config_clone = config.clone();
    drop(config);

    if changes.is_empty() {
        return Ok(Json(serde_json::json!({
            "thresholds": thresholds,
            "changes": [],
        })));
    }

    // Swap in a classifier rebuilt for the new thresholds before reporting
    // success.
    if let Err(e) = state.monitor.rebuild(&thresholds) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ));
    }

    info!(changes = ?changes, "thresholds updated");

    // Save to disk (best-effort).
    if let Err(e) = config_clone.save("calmpulse_config.json") {
        warn!(error = %e, "Failed to save thresholds to disk");
    }

    state.increment_version();

    Ok(Json(serde_json::json!({
        "thresholds": thresholds,
        "changes": changes,
    })))
}

// =============================================================================
// Control endpoints
// =============================================================================

#[derive(Serialize)]
struct ControlResponse {
    monitor_mode: String,
    message: String,
}

async fn control_pause(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    {
        let mut config = state.runtime_config.write();
        config.monitor_mode = MonitorMode::Paused;
    }
    state.increment_version();
    info!("Monitoring PAUSED via API");

    Json(ControlResponse {
        monitor_mode: "Paused".to_string(),
        message: "Monitoring paused".to_string(),
    })
}

async fn control_resume(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    {
        let mut config = state.runtime_config.write();
        config.monitor_mode = MonitorMode::Running;
    }
    state.increment_version();
    info!("Monitoring RESUMED via API");

    Json(ControlResponse {
        monitor_mode: "Running".to_string(),
        message: "Monitoring resumed".to_string(),
    })
}

#[derive(Deserialize)]
struct FeedModeRequest {
    feed_mode: String,
}

#[derive(Serialize)]
struct FeedModeResponse {
    feed_mode: String,
}

async fn control_feed_mode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedModeRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let mode = match req.feed_mode.to_lowercase().as_str() {
        "replay" => FeedMode::Replay,
        "live" => FeedMode::Live,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": format!(
                        "Invalid feed mode: '{}'. Use 'replay' or 'live'.",
                        req.feed_mode
                    ),
                })),
            ));
        }
    };

    {
        let mut config = state.runtime_config.write();
        config.feed_mode = mode;
    }
    state.increment_version();
    info!(feed_mode = %mode, "Feed mode changed via API");

    Ok(Json(FeedModeResponse {
        feed_mode: mode.to_string(),
    }))
}
