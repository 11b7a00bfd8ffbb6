//! Host capabilities the marquee core drives
//!
//! The lifecycle core never touches the DOM directly. Everything it needs
//! from the host (measuring, scheduling, animating, storage) goes through
//! [`Platform`]. Asynchronous notifications come back as a [`CallbackId`]
//! passed to `MarqueeController::dispatch`.
//!
//! - `web`: browser implementation over `web-sys`
//! - `memory`: deterministic in-memory implementation with a manual clock

pub mod memory;
pub mod web;

use crate::error::Result;
use crate::marquee::direction::DocumentDirection;
use crate::marquee::driver::AnimationPlan;
use crate::models::MeasuredGeometry;

pub use memory::MemoryPlatform;
pub use web::WebPlatform;

/// Token for one scheduled timer, frame request, listener or readiness signal
///
/// Ids are never reused by a platform instance, so an id the controller no
/// longer knows about is always stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(pub u64);

/// Handle to a running looping animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(pub u64);

/// Events the controller subscribes to through [`Platform::listen`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventSource {
    /// Window resized
    WindowResize,
    /// Document visibility changed
    VisibilityChange,
    /// Pointer entered the content region
    PointerEnter,
    /// Pointer left the content region
    PointerLeave,
    /// The document root's `lang` or `dir` attribute changed
    DocumentDirection,
}

/// Everything the marquee core needs from its host
pub trait Platform {
    // ---- environment -----------------------------------------------------

    /// Wall-clock time in milliseconds since the Unix epoch
    fn now_ms(&self) -> f64;

    /// Raw value of a configuration attribute on the host element
    fn attribute(&self, name: &str) -> Option<String>;

    /// Base of the storage key when the host has no `id`
    fn key_base(&self) -> Option<String>;

    /// Sample the rendered sizes, or `None` if the expected structure is missing
    fn measure(&self) -> Option<MeasuredGeometry>;

    fn document_direction(&self) -> DocumentDirection;

    fn prefers_reduced_motion(&self) -> bool;

    fn is_document_hidden(&self) -> bool;

    /// Make the content visible (it starts hidden to avoid a pre-layout flash)
    fn reveal_content(&mut self);

    // ---- scheduling ------------------------------------------------------

    fn set_timeout(&mut self, delay_ms: u32) -> CallbackId;

    fn set_interval(&mut self, period_ms: u32) -> CallbackId;

    /// Fire once on the next animation frame
    fn request_frame(&mut self) -> CallbackId;

    /// Subscribe to an event source; `None` if the host cannot provide it
    fn listen(&mut self, source: EventSource) -> Option<CallbackId>;

    /// Watch every media element in the content that is still loading
    ///
    /// Each returned id fires once, when its element loads or fails to load.
    fn watch_media(&mut self) -> Vec<CallbackId>;

    /// Watch the font-loading readiness signal, if the host has one
    fn watch_fonts(&mut self) -> Option<CallbackId>;

    /// Cancel a timer, frame request, listener or watch
    ///
    /// Must be a no-op for ids that already fired or were never issued.
    fn cancel(&mut self, id: CallbackId);

    // ---- animation -------------------------------------------------------

    /// Start an infinite linear loop between the plan's two keyframes
    fn animate(&mut self, plan: &AnimationPlan) -> Result<AnimationId>;

    fn pause_animation(&mut self, id: AnimationId);

    fn play_animation(&mut self, id: AnimationId);

    fn cancel_animation(&mut self, id: AnimationId);

    /// Move the animation to `position_ms` into its loop
    fn seek_animation(&mut self, id: AnimationId, position_ms: f64);

    /// Current time of the animation in milliseconds, if known
    fn animation_time(&self, id: AnimationId) -> Option<f64>;

    // ---- storage ---------------------------------------------------------

    fn load(&self, key: &str) -> Result<Option<String>>;

    fn store(&mut self, key: &str, value: &str) -> Result<()>;
}
