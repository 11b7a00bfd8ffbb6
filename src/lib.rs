//! New Marquee WASM Module
//!
//! A scrolling marquee: content loops continuously in one of four
//! directions, defaults to scrolling right in right-to-left documents,
//! optionally pauses on hover and restarts when its size changes.
//!
//! The lifecycle and animation logic in [`marquee`] is host-independent and
//! drives a [`platform::Platform`]. [`platform::WebPlatform`] binds it to the
//! DOM; [`platform::MemoryPlatform`] runs it headless with a manual clock.

pub mod api;
pub mod error;
pub mod marquee;
pub mod models;
pub mod platform;

// Re-export commonly used types
pub use error::MarqueeError;
pub use marquee::{AnimationPlan, DocumentDirection, MarqueeController, Phase};
pub use models::{Axis, Direction, MarqueeConfig, MeasuredGeometry, PlaybackState};
pub use platform::{CallbackId, EventSource, MemoryPlatform, Platform};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    init_logging();

    log::info!("New Marquee WASM module initialized");

    api::containers::initialize_when_loaded();
}

#[cfg(feature = "console_log")]
fn init_logging() {
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("logger already initialized");
    }
}

#[cfg(not(feature = "console_log"))]
fn init_logging() {}
