//! Marquee lifecycle controller
//!
//! Owns every resource a marquee instance acquires between attach and
//! detach and routes platform callbacks to the direction resolver, the
//! layout-stability gate, the animation driver, hover handling and
//! persistence.
//!
//! Flow: attach → media/fonts settle → resolve direction → stability gate →
//! start → (resize) re-gate and restart → detach tears everything down.

use crate::models::{Direction, MarqueeConfig};
use crate::platform::{AnimationId, CallbackId, EventSource, Platform};

use super::direction::resolve;
use super::driver::{AnimationDriver, StartOutcome};
use super::hover::HoverController;
use super::layout_gate::LayoutStabilityGate;
use super::persistence::{PersistenceHelper, PERSIST_TICK_MS};
use super::registry::{CallbackRegistry, Purpose};

/// Debounce applied to window resize events
pub const RESIZE_DEBOUNCE_MS: u32 = 250;

/// Debounce applied to document `lang`/`dir` changes
pub const DIRECTION_DEBOUNCE_MS: u32 = 100;

/// Where an instance is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Detached,
    /// Waiting for media and fonts
    AwaitingContent,
    /// Sampling frames until layout is stable
    Gating,
    /// A loop is live
    Running,
    /// Attached without a live loop (reduced motion, zero size, start failure)
    Idle,
}

pub struct MarqueeController<P: Platform> {
    platform: P,
    phase: Phase,
    config: MarqueeConfig,
    direction: Direction,
    registry: CallbackRegistry,
    pending_media: usize,
    fonts_pending: bool,
    gate: LayoutStabilityGate,
    driver: AnimationDriver,
    hover: HoverController,
    persistence: Option<PersistenceHelper>,
}

impl<P: Platform> MarqueeController<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            phase: Phase::Detached,
            config: MarqueeConfig::default(),
            direction: Direction::Left,
            registry: CallbackRegistry::new(),
            pending_media: 0,
            fonts_pending: false,
            gate: LayoutStabilityGate::default(),
            driver: AnimationDriver::new(),
            hover: HoverController::new(),
            persistence: None,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_attached(&self) -> bool {
        self.phase != Phase::Detached
    }

    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }

    /// Effective scroll direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn live_animation(&self) -> Option<AnimationId> {
        self.driver.handle()
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    /// Number of callbacks currently registered with the platform
    pub fn registered_callbacks(&self) -> usize {
        self.registry.len()
    }

    // ---- lifecycle -------------------------------------------------------

    /// One-time setup when the host element enters the document
    pub fn attach(&mut self) {
        if self.is_attached() {
            log::warn!("marquee attach called while already attached");
            return;
        }

        self.reset_state();
        let platform = &self.platform;
        let key_base = platform.key_base();
        self.config = MarqueeConfig::from_attributes(|name| platform.attribute(name), key_base.as_deref());
        self.direction = resolve(self.config.explicit_direction, &self.platform.document_direction());
        self.phase = Phase::AwaitingContent;
        log::debug!("marquee attached: {:?}", self.config);

        self.subscribe(EventSource::DocumentDirection);

        let media = self.platform.watch_media();
        self.pending_media = media.len();
        for id in media {
            self.registry.insert(id, Purpose::MediaSettled);
        }
        if let Some(id) = self.platform.watch_fonts() {
            self.fonts_pending = true;
            self.registry.insert(id, Purpose::FontsReady);
        }

        self.content_ready_if_settled();
    }

    /// Release everything acquired since attach; safe to call repeatedly
    pub fn detach(&mut self) {
        if !self.is_attached() {
            return;
        }

        if let Some(mut persistence) = self.persistence.take() {
            persistence.flush(&mut self.platform, &self.driver);
        }
        for id in self.registry.drain() {
            self.platform.cancel(id);
        }
        self.driver.reset(&mut self.platform);
        self.phase = Phase::Detached;
        log::debug!("marquee detached");
    }

    /// Cancel the current loop, re-run the stability gate, then start again
    pub fn restart(&mut self) {
        match self.phase {
            Phase::Detached | Phase::AwaitingContent => return,
            Phase::Gating | Phase::Running | Phase::Idle => {}
        }

        self.stop_animation();
        self.release(Purpose::RetryStart);
        self.begin_gate();
    }

    /// Route a fired platform callback
    ///
    /// Ids that are not registered (already fired, cancelled, or issued
    /// before a detach) are ignored.
    pub fn dispatch(&mut self, id: CallbackId) {
        let Some(purpose) = self.registry.resolve(id) else {
            log::trace!("ignoring stale callback {:?}", id);
            return;
        };

        match purpose {
            Purpose::MediaSettled => {
                self.pending_media = self.pending_media.saturating_sub(1);
                self.content_ready_if_settled();
            }
            Purpose::FontsReady => {
                self.fonts_pending = false;
                self.content_ready_if_settled();
            }
            Purpose::GateFrame => self.sample_gate_frame(),
            Purpose::RetryStart => self.start_animation(false),
            Purpose::ResizeDebounce => self.handle_layout_change(),
            Purpose::DirectionDebounce => self.apply_document_direction(),
            Purpose::PersistTick => {
                if let Some(persistence) = self.persistence.as_mut() {
                    persistence.on_tick(&mut self.platform, &self.driver);
                }
            }
            Purpose::Listener(source) => self.handle_event(source),
        }
    }

    // ---- internals -------------------------------------------------------

    fn reset_state(&mut self) {
        for id in self.registry.drain() {
            self.platform.cancel(id);
        }
        self.driver.reset(&mut self.platform);
        self.config = MarqueeConfig::default();
        self.direction = Direction::Left;
        self.pending_media = 0;
        self.fonts_pending = false;
        self.gate.reset();
        self.hover.reset();
        self.persistence = None;
    }

    fn subscribe(&mut self, source: EventSource) {
        match self.platform.listen(source) {
            Some(id) => self.registry.insert(id, Purpose::Listener(source)),
            None => log::debug!("host does not provide {:?} events", source),
        }
    }

    fn release(&mut self, purpose: Purpose) {
        for id in self.registry.remove_purpose(purpose) {
            self.platform.cancel(id);
        }
    }

    fn content_ready_if_settled(&mut self) {
        if self.phase != Phase::AwaitingContent || self.pending_media > 0 || self.fonts_pending {
            return;
        }

        self.direction = resolve(self.config.explicit_direction, &self.platform.document_direction());
        self.subscribe(EventSource::WindowResize);
        self.subscribe(EventSource::VisibilityChange);
        if self.config.pause_on_hover {
            for (source, id) in HoverController::install(&mut self.platform) {
                self.registry.insert(id, Purpose::Listener(source));
            }
        }
        self.begin_gate();
    }

    fn begin_gate(&mut self) {
        self.release(Purpose::GateFrame);
        self.gate.reset();
        self.phase = Phase::Gating;
        let id = self.platform.request_frame();
        self.registry.insert(id, Purpose::GateFrame);
    }

    fn sample_gate_frame(&mut self) {
        let Some(geometry) = self.platform.measure() else {
            log::debug!("marquee structure missing, stopping layout sampling");
            self.phase = Phase::Idle;
            return;
        };

        if self.gate.observe(geometry.container_size()).is_open() {
            log::debug!(
                "layout sampled for {} frames ({} unchanged), starting",
                self.gate.sampled_frames(),
                self.gate.stable_frames()
            );
            self.start_animation(true);
        } else {
            let id = self.platform.request_frame();
            self.registry.insert(id, Purpose::GateFrame);
        }
    }

    fn start_animation(&mut self, allow_retry: bool) {
        self.stop_persistence();
        let allow_retry = allow_retry && !self.registry.contains_purpose(Purpose::RetryStart);

        match self.driver.start(&mut self.platform, self.direction, self.config.speed, allow_retry) {
            StartOutcome::Started(plan) => {
                self.phase = Phase::Running;
                if self.config.persistent {
                    let helper = PersistenceHelper::new(self.config.storage_key.clone(), plan.duration_ms);
                    let position = helper.restore_position(&self.platform);
                    if position > 0.0 {
                        self.driver.seek(&mut self.platform, position);
                    }
                    self.persistence = Some(helper);
                    let id = self.platform.set_interval(PERSIST_TICK_MS);
                    self.registry.insert(id, Purpose::PersistTick);
                }
                if self.hover.is_hovered() {
                    self.driver.pause(&mut self.platform);
                }
            }
            StartOutcome::RetryScheduled(id) => {
                self.registry.insert(id, Purpose::RetryStart);
                self.phase = Phase::Idle;
            }
            StartOutcome::NotReady => {
                log::warn!("marquee still has no size, waiting for the next resize");
                self.phase = Phase::Idle;
            }
            StartOutcome::ReducedMotion | StartOutcome::MissingStructure | StartOutcome::Failed => {
                self.phase = Phase::Idle;
            }
        }
    }

    fn stop_persistence(&mut self) {
        self.release(Purpose::PersistTick);
        self.persistence = None;
    }

    fn stop_animation(&mut self) {
        self.stop_persistence();
        self.driver.cancel(&mut self.platform);
    }

    fn handle_event(&mut self, source: EventSource) {
        match source {
            EventSource::WindowResize => {
                self.release(Purpose::ResizeDebounce);
                let id = self.platform.set_timeout(RESIZE_DEBOUNCE_MS);
                self.registry.insert(id, Purpose::ResizeDebounce);
            }
            EventSource::DocumentDirection => {
                self.release(Purpose::DirectionDebounce);
                let id = self.platform.set_timeout(DIRECTION_DEBOUNCE_MS);
                self.registry.insert(id, Purpose::DirectionDebounce);
            }
            EventSource::VisibilityChange => {
                if self.platform.is_document_hidden() {
                    if let Some(persistence) = self.persistence.as_mut() {
                        persistence.flush(&mut self.platform, &self.driver);
                    }
                } else {
                    self.handle_layout_change();
                }
            }
            EventSource::PointerEnter => self.hover.on_enter(&self.driver, &mut self.platform),
            EventSource::PointerLeave => self.hover.on_leave(&self.driver, &mut self.platform),
        }
    }

    /// Restart only if the size differs from the one the last start used
    fn handle_layout_change(&mut self) {
        if !matches!(self.phase, Phase::Running | Phase::Idle) {
            return;
        }
        let Some(geometry) = self.platform.measure() else {
            return;
        };
        if self.driver.last_geometry() == Some(geometry) {
            log::trace!("marquee size unchanged, not restarting");
            return;
        }
        log::debug!("marquee size changed to {:?}, restarting", geometry);
        self.restart();
    }

    fn apply_document_direction(&mut self) {
        let resolved = resolve(self.config.explicit_direction, &self.platform.document_direction());
        if resolved == self.direction {
            return;
        }

        log::info!("marquee direction changed: {} -> {}", self.direction, resolved);
        self.direction = resolved;
        if matches!(self.phase, Phase::Running | Phase::Idle) {
            self.restart();
        }
    }
}

impl<P: Platform> Drop for MarqueeController<P> {
    fn drop(&mut self) {
        self.detach();
    }
}
