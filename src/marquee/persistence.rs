//! Best-effort playback persistence
//!
//! Saves the loop position so a reloaded page picks up roughly where it
//! left off. Every storage failure is logged and treated as "no saved
//! state"; nothing here can stop the marquee from running.

use crate::error::Result;
use crate::models::PlaybackState;
use crate::platform::Platform;

use super::driver::AnimationDriver;

/// Period of the persistence interval
pub const PERSIST_TICK_MS: u32 = 500;

/// Upper bound on the time between two writes
pub const MAX_WRITE_INTERVAL_MS: f64 = 1000.0;

/// Minimum time between writes for a loop of `duration_ms`
pub fn write_interval_ms(duration_ms: f64) -> f64 {
    (duration_ms / 10.0).min(MAX_WRITE_INTERVAL_MS)
}

#[derive(Debug, Clone)]
pub struct PersistenceHelper {
    key: String,
    duration_ms: f64,
    last_write_ms: Option<f64>,
}

impl PersistenceHelper {
    pub fn new(key: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            key: key.into(),
            duration_ms,
            last_write_ms: None,
        }
    }

    /// Position the freshly started loop should seek to
    ///
    /// Falls back to 0 when nothing usable is stored.
    pub fn restore_position<P: Platform>(&self, platform: &P) -> f64 {
        match load_state(platform, &self.key) {
            Ok(Some(state)) => state
                .adjusted_position(platform.now_ms(), self.duration_ms)
                .unwrap_or(0.0),
            Ok(None) => 0.0,
            Err(err) => {
                log::error!("error reading saved marquee state {:?}: {}", self.key, err);
                0.0
            }
        }
    }

    /// Interval callback: write the position unless the last write was too recent
    pub fn on_tick<P: Platform>(&mut self, platform: &mut P, driver: &AnimationDriver) {
        let now = platform.now_ms();
        if let Some(last) = self.last_write_ms {
            if now - last < write_interval_ms(self.duration_ms) {
                return;
            }
        }
        self.write(platform, driver, now);
    }

    /// Write the position immediately, ignoring the throttle
    pub fn flush<P: Platform>(&mut self, platform: &mut P, driver: &AnimationDriver) {
        let now = platform.now_ms();
        self.write(platform, driver, now);
    }

    fn write<P: Platform>(&mut self, platform: &mut P, driver: &AnimationDriver, now: f64) {
        let Some(position) = driver.position(platform) else {
            return;
        };
        self.last_write_ms = Some(now);
        if let Err(err) = save_state(platform, &self.key, &PlaybackState::new(position, now)) {
            log::error!("error saving marquee state {:?}: {}", self.key, err);
        }
    }
}

/// Read and decode the saved state for `key`
pub fn load_state<P: Platform>(platform: &P, key: &str) -> Result<Option<PlaybackState>> {
    match platform.load(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_state<P: Platform>(platform: &mut P, key: &str, state: &PlaybackState) -> Result<()> {
    let raw = serde_json::to_string(state)?;
    platform.store(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, MeasuredGeometry};
    use crate::platform::MemoryPlatform;

    fn running_driver(platform: &mut MemoryPlatform) -> AnimationDriver {
        let mut driver = AnimationDriver::new();
        driver.start(platform, Direction::Left, 100.0, false);
        driver
    }

    fn platform() -> MemoryPlatform {
        MemoryPlatform::new()
            .with_geometry(MeasuredGeometry::new(2000.0, 40.0, 500.0, 40.0))
            .with_now(1_000_000.0)
    }

    #[test]
    fn test_write_interval() {
        assert_eq!(write_interval_ms(20_000.0), 1000.0);
        assert_eq!(write_interval_ms(4000.0), 400.0);
    }

    #[test]
    fn test_restore_adds_elapsed_time() {
        let mut platform = platform();
        platform.set_stored("ticker-state", r#"{"time":5000,"timestamp":997000}"#);
        let helper = PersistenceHelper::new("ticker-state", 20_000.0);
        assert_eq!(helper.restore_position(&platform), 8000.0);
    }

    #[test]
    fn test_restore_falls_back_to_zero() {
        let mut platform = platform();
        let helper = PersistenceHelper::new("ticker-state", 20_000.0);
        assert_eq!(helper.restore_position(&platform), 0.0);

        platform.set_stored("ticker-state", "{not json");
        assert_eq!(helper.restore_position(&platform), 0.0);

        platform.set_stored("ticker-state", r#"{"time":"soon","timestamp":1}"#);
        assert_eq!(helper.restore_position(&platform), 0.0);

        platform.set_stored("ticker-state", r#"{"time":5000,"timestamp":997000}"#);
        platform.set_storage_failing(true);
        assert_eq!(helper.restore_position(&platform), 0.0);
    }

    #[test]
    fn test_ticks_are_throttled() {
        let mut platform = platform();
        let driver = running_driver(&mut platform);
        let mut helper = PersistenceHelper::new("ticker-state", 20_000.0);

        helper.on_tick(&mut platform, &driver);
        assert_eq!(platform.store_count(), 1);

        platform.set_now(1_000_500.0);
        helper.on_tick(&mut platform, &driver);
        assert_eq!(platform.store_count(), 1);

        platform.set_now(1_001_000.0);
        helper.on_tick(&mut platform, &driver);
        assert_eq!(platform.store_count(), 2);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut platform = platform();
        let driver = running_driver(&mut platform);
        let mut helper = PersistenceHelper::new("ticker-state", 20_000.0);

        platform.set_storage_failing(true);
        helper.flush(&mut platform, &driver);
        assert_eq!(platform.stored("ticker-state"), None);
    }

    #[test]
    fn test_saved_position_is_loop_relative() {
        let mut platform = platform();
        let driver = running_driver(&mut platform);
        let handle = driver.handle().unwrap();
        platform.seek_animation(handle, 45_000.0);

        let mut helper = PersistenceHelper::new("ticker-state", 20_000.0);
        helper.flush(&mut platform, &driver);

        let state = load_state(&platform, "ticker-state").unwrap().unwrap();
        assert_eq!(state.position, 5000.0);
        assert_eq!(state.saved_at_epoch_ms, 1_000_000.0);
    }
}
