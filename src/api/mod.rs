//! New Marquee WASM API
//!
//! JavaScript-facing surface of the crate.
//!
//! # Module Structure
//!
//! - `containers`: auto-initialization of light-DOM `.marquee-container`s
//! - `helpers`: serialization and error conversion shared by the bindings
//! - `element`: the `NewMarquee` class a custom element forwards its lifecycle to
//! - `planning`: stateless direction, keyframe and persistence helpers

pub mod containers;
pub mod element;
pub mod helpers;
pub mod planning;

pub use containers::initialize_marquees;
pub use element::NewMarquee;
pub use planning::{adjusted_playback_position, compute_animation_plan, resolve_direction};
