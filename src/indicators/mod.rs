// =============================================================================
// Signal Indicators Module
// =============================================================================
//
// Pure, side-effect-free reductions of the raw observation streams into the
// scalar features the fusion pipeline thresholds:
// - Heart rate (BPM series statistics, instantaneous status)
// - Voice volume (normalized amplitude statistics)
// - Speech (tokenization, adjacent-word repetition, term frequency)
//
// Summary functions return `Option<T>` so callers are forced to handle
// empty or fully non-finite input.

pub mod heart_rate;
pub mod speech;
pub mod volume;

pub use heart_rate::{HeartStats, HeartStatus};
pub use speech::TranscriptFeatures;
pub use volume::VolumeStats;
