//! Animation driver
//!
//! Turns measured geometry, direction and speed into a two-keyframe looping
//! animation and owns the single live handle of a marquee instance.
//!
//! | direction | start offset        | end offset          |
//! |-----------|---------------------|---------------------|
//! | left      | `+container_width`  | `-content_width`    |
//! | right     | `-content_width`    | `+container_width`  |
//! | up        | `+container_height` | `-content_height`   |
//! | down      | `-content_height`   | `+container_height` |

use serde::{Deserialize, Serialize};

use crate::models::{Axis, Direction, MeasuredGeometry};
use crate::platform::{AnimationId, CallbackId, Platform};

/// Delay before retrying a start that saw zero-sized geometry
pub const RETRY_DELAY_MS: u32 = 100;

/// One end of the loop: a translation along a single axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub axis: Axis,
    pub offset_px: f64,
}

impl Keyframe {
    pub fn new(axis: Axis, offset_px: f64) -> Self {
        Self { axis, offset_px }
    }

    /// CSS `transform` value for this keyframe
    pub fn transform(&self) -> String {
        match self.axis {
            Axis::Horizontal => format!("translateX({}px)", self.offset_px),
            Axis::Vertical => format!("translateY({}px)", self.offset_px),
        }
    }
}

/// Everything needed to start one looping animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationPlan {
    pub direction: Direction,
    /// Length of one loop in milliseconds
    pub duration_ms: f64,
    /// Start and end of the loop
    pub keyframes: [Keyframe; 2],
}

impl AnimationPlan {
    /// Compute the plan, or `None` while any measurement is still zero
    ///
    /// `speed` is in pixels per second and must already be sanitized.
    pub fn compute(geometry: &MeasuredGeometry, direction: Direction, speed: f64) -> Option<Self> {
        if !geometry.is_ready() || !speed.is_finite() || speed <= 0.0 {
            return None;
        }

        let axis = direction.axis();
        let content = geometry.content_extent(axis);
        let container = geometry.container_extent(axis);

        let (from, to) = match direction {
            Direction::Left | Direction::Up => (container, -content),
            Direction::Right | Direction::Down => (-content, container),
        };

        Some(Self {
            direction,
            duration_ms: 1000.0 * content / speed,
            keyframes: [Keyframe::new(axis, from), Keyframe::new(axis, to)],
        })
    }

    pub fn start(&self) -> &Keyframe {
        &self.keyframes[0]
    }

    pub fn end(&self) -> &Keyframe {
        &self.keyframes[1]
    }
}

/// Outcome of one start attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartOutcome {
    /// A new loop is running
    Started(AnimationPlan),
    /// Reduced motion is preferred; content shown without animating
    ReducedMotion,
    /// Geometry was zero; a retry was scheduled with this id
    RetryScheduled(CallbackId),
    /// Geometry was zero and no retry is allowed for this attempt
    NotReady,
    /// The host structure to measure is missing
    MissingStructure,
    /// The platform refused to create the animation
    Failed,
}

/// Owner of the single live animation handle
#[derive(Debug, Default)]
pub struct AnimationDriver {
    handle: Option<AnimationId>,
    plan: Option<AnimationPlan>,
    last_geometry: Option<MeasuredGeometry>,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure and start a new loop, cancelling the previous one first
    ///
    /// With `allow_retry`, zero-sized geometry schedules one retry timer and
    /// returns its id for the caller to track. Without it, the attempt just
    /// reports [`StartOutcome::NotReady`].
    pub fn start<P: Platform>(
        &mut self,
        platform: &mut P,
        direction: Direction,
        speed: f64,
        allow_retry: bool,
    ) -> StartOutcome {
        self.cancel(platform);

        let Some(geometry) = platform.measure() else {
            log::debug!("marquee structure missing, nothing to animate");
            return StartOutcome::MissingStructure;
        };
        // Zero sizes count too, so a collapsed marquee restarts when it reappears
        self.last_geometry = Some(geometry);

        if platform.prefers_reduced_motion() {
            log::info!("reduced motion preferred, showing marquee without animation");
            platform.reveal_content();
            return StartOutcome::ReducedMotion;
        }

        let Some(plan) = AnimationPlan::compute(&geometry, direction, speed) else {
            log::warn!("marquee has zero-sized geometry: {:?}", geometry);
            if allow_retry {
                let id = platform.set_timeout(RETRY_DELAY_MS);
                return StartOutcome::RetryScheduled(id);
            }
            return StartOutcome::NotReady;
        };

        match platform.animate(&plan) {
            Ok(handle) => {
                log::debug!(
                    "marquee started: {} over {}ms ({} -> {})",
                    plan.direction,
                    plan.duration_ms,
                    plan.start().transform(),
                    plan.end().transform()
                );
                platform.reveal_content();
                self.handle = Some(handle);
                self.plan = Some(plan);
                StartOutcome::Started(plan)
            }
            Err(err) => {
                log::error!("failed to start marquee animation: {}", err);
                StartOutcome::Failed
            }
        }
    }

    /// Stop and discard the live handle, if any
    pub fn cancel<P: Platform>(&mut self, platform: &mut P) {
        if let Some(handle) = self.handle.take() {
            platform.cancel_animation(handle);
        }
        self.plan = None;
    }

    /// Pause the live handle; no-op without one
    pub fn pause<P: Platform>(&self, platform: &mut P) {
        if let Some(handle) = self.handle {
            platform.pause_animation(handle);
        }
    }

    /// Resume the live handle; no-op without one
    pub fn resume<P: Platform>(&self, platform: &mut P) {
        if let Some(handle) = self.handle {
            platform.play_animation(handle);
        }
    }

    /// Seek the live handle to a position within its loop
    pub fn seek<P: Platform>(&self, platform: &mut P, position_ms: f64) {
        if let Some(handle) = self.handle {
            platform.seek_animation(handle, position_ms);
        }
    }

    /// Current loop-relative position of the live handle
    pub fn position<P: Platform>(&self, platform: &P) -> Option<f64> {
        let handle = self.handle?;
        let duration = self.plan?.duration_ms;
        let time = platform.animation_time(handle)?;
        Some(time.rem_euclid(duration))
    }

    /// Forget everything, including the size of the last start
    pub fn reset<P: Platform>(&mut self, platform: &mut P) {
        self.cancel(platform);
        self.last_geometry = None;
    }

    pub fn handle(&self) -> Option<AnimationId> {
        self.handle
    }

    pub fn plan(&self) -> Option<&AnimationPlan> {
        self.plan.as_ref()
    }

    /// Geometry measured by the last start attempt
    pub fn last_geometry(&self) -> Option<MeasuredGeometry> {
        self.last_geometry
    }
}
