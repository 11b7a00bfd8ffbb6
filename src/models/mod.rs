//! Data models for the marquee
//!
//! Plain values shared by the lifecycle core, the platform bindings and the
//! JS-facing API.

pub mod config;
pub mod geometry;
pub mod playback;

// Re-export commonly used types
pub use config::{Axis, Direction, MarqueeConfig, DEFAULT_SPEED, MAX_SPEED};
pub use geometry::MeasuredGeometry;
pub use playback::PlaybackState;
