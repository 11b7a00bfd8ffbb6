//! In-memory platform
//!
//! A deterministic stand-in for the browser: a manual clock, a fixed
//! geometry, and bookkeeping for every timer, frame request, listener and
//! animation. Callbacks never fire on their own; the `MarqueeController`
//! helpers at the bottom of this file (`advance`, `run_frame`, `emit`, ...)
//! fire them in order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{MarqueeError, Result};
use crate::marquee::direction::DocumentDirection;
use crate::marquee::driver::AnimationPlan;
use crate::marquee::MarqueeController;
use crate::models::MeasuredGeometry;

use super::{AnimationId, CallbackId, EventSource, Platform};

/// Playback state of an in-memory animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Running,
    Paused,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct MemoryAnimation {
    pub plan: AnimationPlan,
    pub state: PlayState,
    time_at_anchor: f64,
    anchor_ms: f64,
}

impl MemoryAnimation {
    fn current_time(&self, now_ms: f64) -> f64 {
        match self.state {
            PlayState::Running => self.time_at_anchor + (now_ms - self.anchor_ms),
            PlayState::Paused | PlayState::Cancelled => self.time_at_anchor,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due_ms: f64,
    period_ms: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct MemoryPlatform {
    now_ms: f64,
    next_id: u64,
    attributes: HashMap<String, String>,
    key_base: String,
    geometry: Option<MeasuredGeometry>,
    document: DocumentDirection,
    reduced_motion: bool,
    hidden: bool,
    content_visible: bool,
    loading_media: usize,
    fonts_pending: bool,
    listen_unsupported: BTreeSet<EventSource>,
    timers: BTreeMap<CallbackId, Timer>,
    frames: BTreeSet<CallbackId>,
    listeners: BTreeMap<CallbackId, EventSource>,
    media_watches: BTreeSet<CallbackId>,
    font_watch: Option<CallbackId>,
    animations: BTreeMap<AnimationId, MemoryAnimation>,
    storage: HashMap<String, String>,
    storage_failing: bool,
    store_count: usize,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    /// A platform with a 2000x40 content strip inside a 500x40 viewport
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 1,
            attributes: HashMap::new(),
            key_base: "new-marquee".to_string(),
            geometry: Some(MeasuredGeometry::new(2000.0, 40.0, 500.0, 40.0)),
            document: DocumentDirection::default(),
            reduced_motion: false,
            hidden: false,
            content_visible: false,
            loading_media: 0,
            fonts_pending: false,
            listen_unsupported: BTreeSet::new(),
            timers: BTreeMap::new(),
            frames: BTreeSet::new(),
            listeners: BTreeMap::new(),
            media_watches: BTreeSet::new(),
            font_watch: None,
            animations: BTreeMap::new(),
            storage: HashMap::new(),
            storage_failing: false,
            store_count: 0,
        }
    }

    // ---- builders --------------------------------------------------------

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Storage key base used when no `id` attribute is set
    pub fn with_key_base(mut self, key_base: &str) -> Self {
        self.key_base = key_base.to_string();
        self
    }

    pub fn with_geometry(mut self, geometry: MeasuredGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Simulate a host whose inner content element is missing
    pub fn without_structure(mut self) -> Self {
        self.geometry = None;
        self
    }

    pub fn with_document(mut self, document: DocumentDirection) -> Self {
        self.document = document;
        self
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    pub fn with_now(mut self, now_ms: f64) -> Self {
        self.now_ms = now_ms;
        self
    }

    /// Number of media elements still loading when the marquee attaches
    pub fn with_loading_media(mut self, count: usize) -> Self {
        self.loading_media = count;
        self
    }

    pub fn with_fonts_pending(mut self) -> Self {
        self.fonts_pending = true;
        self
    }

    pub fn without_events(mut self, source: EventSource) -> Self {
        self.listen_unsupported.insert(source);
        self
    }

    // ---- environment mutators --------------------------------------------

    pub fn set_geometry(&mut self, geometry: MeasuredGeometry) {
        self.geometry = Some(geometry);
    }

    pub fn set_document(&mut self, document: DocumentDirection) {
        self.document = document;
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Move the clock without firing anything
    pub fn set_now(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn set_stored(&mut self, key: &str, value: &str) {
        self.storage.insert(key.to_string(), value.to_string());
    }

    pub fn set_storage_failing(&mut self, failing: bool) {
        self.storage_failing = failing;
    }

    // ---- inspection ------------------------------------------------------

    pub fn now(&self) -> f64 {
        self.now_ms
    }

    pub fn stored(&self, key: &str) -> Option<&str> {
        self.storage.get(key).map(String::as_str)
    }

    pub fn store_count(&self) -> usize {
        self.store_count
    }

    pub fn is_content_visible(&self) -> bool {
        self.content_visible
    }

    pub fn animation(&self, id: AnimationId) -> Option<&MemoryAnimation> {
        self.animations.get(&id)
    }

    /// Animations that have not been cancelled
    pub fn live_animations(&self) -> Vec<(AnimationId, &MemoryAnimation)> {
        self.animations
            .iter()
            .filter(|(_, a)| a.state != PlayState::Cancelled)
            .map(|(id, a)| (*id, a))
            .collect()
    }

    pub fn live_animation_count(&self) -> usize {
        self.live_animations().len()
    }

    pub fn animations_created(&self) -> usize {
        self.animations.len()
    }

    pub fn pending_timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listener_count_for(&self, source: EventSource) -> usize {
        self.listeners.values().filter(|s| **s == source).count()
    }

    /// Everything still registered: timers, frames, listeners and watches
    pub fn outstanding_callbacks(&self) -> usize {
        self.timers.len()
            + self.frames.len()
            + self.listeners.len()
            + self.media_watches.len()
            + usize::from(self.font_watch.is_some())
    }

    // ---- firing ----------------------------------------------------------

    fn next_callback(&mut self) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Take the earliest timer due at or before `until_ms`, moving the clock to it
    fn pop_due_timer(&mut self, until_ms: f64) -> Option<CallbackId> {
        let (id, timer) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by(|(a_id, a), (b_id, b)| a.due_ms.total_cmp(&b.due_ms).then(a_id.cmp(b_id)))
            .map(|(id, t)| (*id, *t))?;

        self.now_ms = self.now_ms.max(timer.due_ms);
        match timer.period_ms {
            Some(period) => {
                self.timers.insert(id, Timer { due_ms: timer.due_ms + period, ..timer });
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some(id)
    }

    fn take_frames(&mut self) -> Vec<CallbackId> {
        std::mem::take(&mut self.frames).into_iter().collect()
    }

    fn listeners_for(&self, source: EventSource) -> Vec<CallbackId> {
        self.listeners
            .iter()
            .filter(|(_, s)| **s == source)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl Platform for MemoryPlatform {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn key_base(&self) -> Option<String> {
        Some(self.key_base.clone())
    }

    fn measure(&self) -> Option<MeasuredGeometry> {
        self.geometry
    }

    fn document_direction(&self) -> DocumentDirection {
        self.document.clone()
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn is_document_hidden(&self) -> bool {
        self.hidden
    }

    fn reveal_content(&mut self) {
        self.content_visible = true;
    }

    fn set_timeout(&mut self, delay_ms: u32) -> CallbackId {
        let id = self.next_callback();
        let due_ms = self.now_ms + f64::from(delay_ms);
        self.timers.insert(id, Timer { due_ms, period_ms: None });
        id
    }

    fn set_interval(&mut self, period_ms: u32) -> CallbackId {
        let id = self.next_callback();
        let period = f64::from(period_ms.max(1));
        self.timers.insert(
            id,
            Timer {
                due_ms: self.now_ms + period,
                period_ms: Some(period),
            },
        );
        id
    }

    fn request_frame(&mut self) -> CallbackId {
        let id = self.next_callback();
        self.frames.insert(id);
        id
    }

    fn listen(&mut self, source: EventSource) -> Option<CallbackId> {
        if self.listen_unsupported.contains(&source) {
            return None;
        }
        let id = self.next_callback();
        self.listeners.insert(id, source);
        Some(id)
    }

    fn watch_media(&mut self) -> Vec<CallbackId> {
        (0..self.loading_media)
            .map(|_| {
                let id = self.next_callback();
                self.media_watches.insert(id);
                id
            })
            .collect()
    }

    fn watch_fonts(&mut self) -> Option<CallbackId> {
        if !self.fonts_pending {
            return None;
        }
        let id = self.next_callback();
        self.font_watch = Some(id);
        Some(id)
    }

    fn cancel(&mut self, id: CallbackId) {
        self.timers.remove(&id);
        self.frames.remove(&id);
        self.listeners.remove(&id);
        self.media_watches.remove(&id);
        if self.font_watch == Some(id) {
            self.font_watch = None;
        }
    }

    fn animate(&mut self, plan: &AnimationPlan) -> Result<AnimationId> {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.animations.insert(
            id,
            MemoryAnimation {
                plan: *plan,
                state: PlayState::Running,
                time_at_anchor: 0.0,
                anchor_ms: self.now_ms,
            },
        );
        Ok(id)
    }

    fn pause_animation(&mut self, id: AnimationId) {
        let now = self.now_ms;
        if let Some(animation) = self.animations.get_mut(&id) {
            if animation.state == PlayState::Running {
                animation.time_at_anchor = animation.current_time(now);
                animation.state = PlayState::Paused;
            }
        }
    }

    fn play_animation(&mut self, id: AnimationId) {
        let now = self.now_ms;
        if let Some(animation) = self.animations.get_mut(&id) {
            if animation.state == PlayState::Paused {
                animation.anchor_ms = now;
                animation.state = PlayState::Running;
            }
        }
    }

    fn cancel_animation(&mut self, id: AnimationId) {
        if let Some(animation) = self.animations.get_mut(&id) {
            animation.state = PlayState::Cancelled;
        }
    }

    fn seek_animation(&mut self, id: AnimationId, position_ms: f64) {
        let now = self.now_ms;
        if let Some(animation) = self.animations.get_mut(&id) {
            animation.time_at_anchor = position_ms;
            animation.anchor_ms = now;
        }
    }

    fn animation_time(&self, id: AnimationId) -> Option<f64> {
        self.animations
            .get(&id)
            .filter(|a| a.state != PlayState::Cancelled)
            .map(|a| a.current_time(self.now_ms))
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        if self.storage_failing {
            return Err(MarqueeError::Storage("storage disabled".to_string()));
        }
        Ok(self.storage.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> Result<()> {
        if self.storage_failing {
            return Err(MarqueeError::Storage("quota exceeded".to_string()));
        }
        self.store_count += 1;
        self.storage.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Drivers for a controller running on the in-memory platform
impl MarqueeController<MemoryPlatform> {
    /// Move the clock forward, firing every timer that comes due on the way
    pub fn advance(&mut self, ms: f64) {
        let target = self.platform().now() + ms;
        while let Some(id) = self.platform_mut().pop_due_timer(target) {
            self.dispatch(id);
        }
        self.platform_mut().set_now(target);
    }

    /// Fire the frame callbacks requested so far
    pub fn run_frame(&mut self) {
        for id in self.platform_mut().take_frames() {
            self.dispatch(id);
        }
    }

    pub fn run_frames(&mut self, count: usize) {
        for _ in 0..count {
            self.run_frame();
        }
    }

    /// Run frames until nothing requests another one, up to `limit`
    pub fn run_until_settled(&mut self, limit: usize) -> usize {
        let mut ran = 0;
        while self.platform().pending_frame_count() > 0 && ran < limit {
            self.run_frame();
            ran += 1;
        }
        ran
    }

    /// Deliver an event to every listener subscribed to `source`
    pub fn emit(&mut self, source: EventSource) {
        for id in self.platform().listeners_for(source) {
            self.dispatch(id);
        }
    }

    /// Report one watched media element as loaded (or failed)
    pub fn settle_one_media(&mut self) {
        let next = self.platform().media_watches.iter().next().copied();
        if let Some(id) = next {
            self.platform_mut().media_watches.remove(&id);
            self.dispatch(id);
        }
    }

    pub fn settle_fonts(&mut self) {
        if let Some(id) = self.platform_mut().font_watch.take() {
            self.dispatch(id);
        }
    }

    /// Fire an arbitrary id, e.g. to replay a callback captured before detach
    pub fn fire(&mut self, id: CallbackId) {
        self.dispatch(id);
    }
}
