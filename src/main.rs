// =============================================================================
// CalmPulse — Main Entry Point
// =============================================================================
//
// The engine starts in Replay mode, looping the canned demonstration
// episode. Switch to Live mode via the dashboard or API to feed real
// observations through `POST /api/v1/vitals`.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod emotion;
mod feed;
mod fusion;
mod indicators;
mod runtime_config;
mod sentiment;
mod types;

use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::emotion::EmotionFeatures;
use crate::indicators::{heart_rate, speech, volume};
use crate::runtime_config::RuntimeConfig;
use crate::types::{FeedMode, MonitorMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           CalmPulse Engine — Starting Up                ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config = RuntimeConfig::load("calmpulse_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    info!(
        monitor_mode = %config.monitor_mode,
        feed_mode = %config.feed_mode,
        tick_secs = config.tick_secs,
        "Engine configuration"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    // An invalid classifier configuration is fatal here, before anything
    // is spawned.
    let state = Arc::new(AppState::new(config)?);

    // ── 3. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();
    let bind_addr =
        std::env::var("CALMPULSE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let bind_addr_clone = bind_addr.clone();

    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        let listener = tokio::net::TcpListener::bind(&bind_addr_clone)
            .await
            .expect("Failed to bind API server");
        info!(addr = %bind_addr_clone, "API server listening");
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    // ── 4. Evaluation loop ───────────────────────────────────────────────
    let eval_state = state.clone();
    tokio::spawn(async move {
        let tick_secs = eval_state.runtime_config.read().tick_secs.max(1);
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(tick_secs));
        info!(tick_secs, "Evaluation loop starting");

        loop {
            interval.tick().await;

            let (monitor_mode, feed_mode, thresholds, top_terms) = {
                let config = eval_state.runtime_config.read();
                (
                    config.monitor_mode,
                    config.feed_mode,
                    config.thresholds,
                    config.top_terms,
                )
            };

            if monitor_mode == MonitorMode::Paused {
                continue;
            }
            // In Live mode, observations arrive via the API instead.
            if feed_mode != FeedMode::Replay {
                continue;
            }

            let window = eval_state.feed.advance();

            let (Some(heart), Some(vol)) = (
                heart_rate::summarize(&window.bpm),
                volume::summarize(&window.volume),
            ) else {
                warn!("Replay window produced no finite samples — skipping tick");
                continue;
            };

            let transcript_features = speech::analyze(&window.transcript, top_terms);
            let sentiment_compound = eval_state.sentiment.compound(&window.transcript);

            let features = EmotionFeatures {
                max_bpm: heart.max,
                avg_volume: vol.mean,
                repetition_count: transcript_features.repetition_count,
                sentiment_compound,
            };

            // A failed evaluation is local to this tick; the loop goes on.
            match eval_state.monitor.evaluate(features, &thresholds) {
                Ok(reading) => {
                    eval_state.record_reading(&reading, "replay");
                }
                Err(e) => {
                    warn!(error = %e, "Replay evaluation failed");
                    eval_state.push_error(format!("replay evaluation failed: {e}"));
                }
            }
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.runtime_config.read().save("calmpulse_config.json") {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("CalmPulse engine shut down complete.");
    Ok(())
}
