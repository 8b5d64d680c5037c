// =============================================================================
// Replay Feed — canned demonstration observation data
// =============================================================================
//
// The default deployment has no physical sensors attached; it replays a
// fixed BPM series, a fixed voice-volume series, and a fixed transcript — a
// calm baseline escalating into a distress episode and back. Each
// evaluation tick advances a cursor and serves the sliding window ending
// there, wrapping at the end of the series so the demo loops forever.
//
// Live observations bypass this module entirely and arrive via the API.

use parking_lot::Mutex;

/// One windowed snapshot of the observation streams.
#[derive(Debug, Clone, PartialEq)]
pub struct VitalsWindow {
    /// BPM samples, oldest first.
    pub bpm: Vec<f64>,
    /// Normalized [0, 1] volume samples, oldest first.
    pub volume: Vec<f64>,
    /// Transcript for the window.
    pub transcript: String,
}

/// Sliding-window replay over fixed series.
pub struct ReplayFeed {
    bpm: Vec<f64>,
    volume: Vec<f64>,
    transcript: String,
    window: usize,
    cursor: Mutex<usize>,
}

/// Samples served per window.
const DEMO_WINDOW: usize = 12;

impl ReplayFeed {
    /// Build a feed over the given series. Both series must have the same
    /// length; `window` is capped to that length.
    pub fn new(bpm: Vec<f64>, volume: Vec<f64>, transcript: impl Into<String>, window: usize) -> Self {
        assert_eq!(bpm.len(), volume.len(), "bpm and volume series must align");
        assert!(!bpm.is_empty(), "replay series must not be empty");

        let window = window.clamp(1, bpm.len());
        Self {
            bpm,
            volume,
            transcript: transcript.into(),
            window,
            // First advance() serves the window ending at the last index of
            // the first full window.
            cursor: Mutex::new(window - 1),
        }
    }

    /// The built-in demonstration episode: resting baseline, escalation past
    /// the 100 BPM / 0.4 volume thresholds, recovery.
    pub fn with_demo_data() -> Self {
        let bpm = vec![
            76.0, 78.0, 75.0, 80.0, 83.0, 82.0, 86.0, 90.0, 95.0, 99.0, 104.0, 109.0, 115.0,
            121.0, 126.0, 130.0, 128.0, 124.0, 118.0, 112.0, 105.0, 98.0, 92.0, 85.0,
        ];
        let volume = vec![
            0.12, 0.15, 0.13, 0.18, 0.22, 0.25, 0.31, 0.35, 0.42, 0.48, 0.55, 0.61, 0.66, 0.71,
            0.68, 0.63, 0.58, 0.52, 0.47, 0.41, 0.36, 0.30, 0.24, 0.18,
        ];
        let transcript = "I... I don't want to go. I don't want to. Please. Please. \
                          It's too loud. It's too loud. I don't like it. I want to go home. \
                          I want mom. I want mom.";

        Self::new(bpm, volume, transcript, DEMO_WINDOW)
    }

    /// Serve the window ending at the current cursor and advance it by one
    /// sample, wrapping at the end of the series.
    pub fn advance(&self) -> VitalsWindow {
        let mut cursor = self.cursor.lock();
        let end = *cursor;
        *cursor = (end + 1) % self.bpm.len();
        drop(cursor);

        VitalsWindow {
            bpm: self.window_ending_at(&self.bpm, end),
            volume: self.window_ending_at(&self.volume, end),
            transcript: self.transcript.clone(),
        }
    }

    /// Total samples in the replay series.
    pub fn series_len(&self) -> usize {
        self.bpm.len()
    }

    fn window_ending_at(&self, series: &[f64], end: usize) -> Vec<f64> {
        let len = series.len();
        (0..self.window)
            .rev()
            .map(|back| series[(end + len - back) % len])
            .collect()
    }
}
