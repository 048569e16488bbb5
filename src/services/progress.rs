//! Heuristic progress for a generation whose total length is unknown.
//!
//! Progress grows with the logarithm of the text received so far. The
//! estimate tops out at [`STREAMING_CEILING`]; the values above it are left
//! for the finalizing and completed phases.

/// Highest progress reported while text is still streaming.
pub const STREAMING_CEILING: u8 = 95;

/// Progress reported once the stream ended and the payload is being parsed.
pub const FINALIZING_PROGRESS: u8 = 97;

/// Progress of a job the moment generation starts.
pub const BASELINE_PROGRESS: u8 = 1;

/// Points of progress per tenfold growth in received characters.
const POINTS_PER_DECADE: f64 = 22.0;

/// Map the cumulative number of characters received to a percentage in `0..=95`.
pub fn estimate_progress(chars: usize) -> u8 {
    let decades = (chars.max(1) as f64).log10();
    let scaled = (decades * POINTS_PER_DECADE).floor();
    scaled.clamp(0.0, f64::from(STREAMING_CEILING)) as u8
}

/// Tracks the last value reported for one job so updates are only issued
/// when the estimate actually moves forward.
#[derive(Debug)]
pub struct ProgressTracker {
    last_chars: usize,
    reported: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            last_chars: 0,
            reported: BASELINE_PROGRESS,
        }
    }

    /// Returns the new progress if `chars` moves it past the last reported value.
    pub fn advance(&mut self, chars: usize) -> Option<u8> {
        if chars <= self.last_chars {
            return None;
        }
        self.last_chars = chars;

        let progress = estimate_progress(chars).max(BASELINE_PROGRESS);
        if progress > self.reported {
            self.reported = progress;
            Some(progress)
        } else {
            None
        }
    }

    pub fn reported(&self) -> u8 {
        self.reported
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
