//! Stateless helpers exported to JavaScript
//!
//! Useful for hosts that drive their own animation but want the same
//! direction, timing and keyframe rules as the `NewMarquee` element.

use wasm_bindgen::prelude::*;

use crate::marquee::direction::{resolve_direction as resolve, DocumentDirection};
use crate::marquee::driver::AnimationPlan;
use crate::models::config::sanitize_speed_value;
use crate::models::{Direction, MeasuredGeometry, PlaybackState};

use super::helpers::{deserialize, serialize};

/// Effective direction for an explicit attribute value and the document's `lang`/`dir`
#[wasm_bindgen(js_name = resolveDirection)]
pub fn resolve_direction(explicit: Option<String>, lang: Option<String>, dir: Option<String>) -> String {
    resolve(explicit.as_deref(), &DocumentDirection::new(lang, dir))
        .as_str()
        .to_string()
}

/// Plan for `{contentWidth, contentHeight, containerWidth, containerHeight}`
///
/// Returns `null` while any measurement is zero. An unrecognized direction
/// falls back to `left`; the speed is sanitized like the `speed` attribute.
#[wasm_bindgen(js_name = computeAnimationPlan)]
pub fn compute_animation_plan(geometry: JsValue, direction: &str, speed: f64) -> Result<JsValue, JsValue> {
    let geometry: MeasuredGeometry = deserialize(geometry, "Invalid geometry")?;
    let direction = direction.parse().unwrap_or(Direction::Left);
    let speed = sanitize_speed_value(speed);

    match AnimationPlan::compute(&geometry, direction, speed) {
        Some(plan) => serialize(&plan, "Failed to serialize animation plan"),
        None => Ok(JsValue::NULL),
    }
}

/// Seek target after a reload: `(position + max(0, now - savedAt)) mod durationMs`
#[wasm_bindgen(js_name = adjustedPlaybackPosition)]
pub fn adjusted_playback_position(position: f64, saved_at: f64, now: f64, duration_ms: f64) -> Option<f64> {
    PlaybackState::new(position, saved_at).adjusted_position(now, duration_ms)
}
