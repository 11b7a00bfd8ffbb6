//! Pause-on-hover
//!
//! Only installed when `pauseonhover` is set. The listener ids returned at
//! registration are the ones later cancelled, so removal always detaches the
//! same handlers that were added.

use crate::platform::{CallbackId, EventSource, Platform};

use super::driver::AnimationDriver;

#[derive(Debug, Default)]
pub struct HoverController {
    hovered: bool,
}

impl HoverController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to pointer enter/leave on the content region
    pub fn install<P: Platform>(platform: &mut P) -> Vec<(EventSource, CallbackId)> {
        [EventSource::PointerEnter, EventSource::PointerLeave]
            .into_iter()
            .filter_map(|source| platform.listen(source).map(|id| (source, id)))
            .collect()
    }

    pub fn on_enter<P: Platform>(&mut self, driver: &AnimationDriver, platform: &mut P) {
        self.hovered = true;
        driver.pause(platform);
    }

    pub fn on_leave<P: Platform>(&mut self, driver: &AnimationDriver, platform: &mut P) {
        self.hovered = false;
        driver.resume(platform);
    }

    /// Whether the pointer is currently over the content
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn reset(&mut self) {
        self.hovered = false;
    }
}
