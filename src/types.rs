// =============================================================================
// Shared types used across the CalmPulse engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Whether the evaluation loop is actively producing readings or paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorMode {
    Running,
    Paused,
}

impl Default for MonitorMode {
    fn default() -> Self {
        Self::Running
    }
}

impl std::fmt::Display for MonitorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

/// Where observations come from: the canned replay data, or pushes from an
/// external producer via the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedMode {
    Replay,
    Live,
}

impl Default for FeedMode {
    fn default() -> Self {
        Self::Replay
    }
}

impl std::fmt::Display for FeedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replay => write!(f, "Replay"),
            Self::Live => write!(f, "Live"),
        }
    }
}
