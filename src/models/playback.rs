//! Persisted playback position

use serde::{Deserialize, Serialize};

/// Loop position saved across page loads
///
/// Stored in `localStorage` as `{"time": .., "timestamp": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Milliseconds into the animation loop
    #[serde(rename = "time")]
    pub position: f64,

    /// Wall-clock time of the save, in milliseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub saved_at_epoch_ms: f64,
}

impl PlaybackState {
    pub fn new(position: f64, saved_at_epoch_ms: f64) -> Self {
        Self {
            position,
            saved_at_epoch_ms,
        }
    }

    /// Position to seek to after a reload
    ///
    /// Time spent unloaded is added to the saved position and the result is
    /// wrapped into the loop. A clock that went backwards adds nothing.
    pub fn adjusted_position(&self, now_epoch_ms: f64, duration_ms: f64) -> Option<f64> {
        if !self.position.is_finite() || !duration_ms.is_finite() || duration_ms <= 0.0 {
            return None;
        }
        let elapsed = if self.saved_at_epoch_ms.is_finite() {
            (now_epoch_ms - self.saved_at_epoch_ms).max(0.0)
        } else {
            0.0
        };
        Some((self.position + elapsed).rem_euclid(duration_ms))
    }
}
