//! Layout-stability gate
//!
//! The container size is sampled once per animation frame. The gate opens
//! once the size has been identical for [`STABLE_FRAMES_REQUIRED`]
//! consecutive frames, so the first animation never runs against a
//! pre-layout or still-settling size.

/// Consecutive unchanged frames needed to open the gate
pub const STABLE_FRAMES_REQUIRED: u32 = 3;

/// Frames sampled before the gate stops waiting and opens anyway
pub const MAX_GATE_FRAMES: u32 = 120;

/// Result of feeding one sample to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Keep sampling on the next frame
    Waiting,
    /// Size has been stable long enough
    Stable,
    /// Layout never settled within the frame budget; proceed with the last sample
    GaveUp,
}

impl GateStatus {
    pub fn is_open(self) -> bool {
        !matches!(self, GateStatus::Waiting)
    }
}

#[derive(Debug, Clone)]
pub struct LayoutStabilityGate {
    last_size: Option<(f64, f64)>,
    stable_frames: u32,
    sampled_frames: u32,
    required: u32,
    max_frames: u32,
}

impl Default for LayoutStabilityGate {
    fn default() -> Self {
        Self::new(STABLE_FRAMES_REQUIRED, MAX_GATE_FRAMES)
    }
}

impl LayoutStabilityGate {
    pub fn new(required: u32, max_frames: u32) -> Self {
        Self {
            last_size: None,
            stable_frames: 0,
            sampled_frames: 0,
            required,
            max_frames,
        }
    }

    /// Feed the container size sampled on this frame
    pub fn observe(&mut self, size: (f64, f64)) -> GateStatus {
        self.sampled_frames += 1;

        if self.last_size == Some(size) {
            self.stable_frames += 1;
        } else {
            self.stable_frames = 0;
            self.last_size = Some(size);
        }

        if self.stable_frames >= self.required {
            GateStatus::Stable
        } else if self.sampled_frames >= self.max_frames {
            log::warn!(
                "layout did not settle after {} frames, starting with {:?}",
                self.sampled_frames,
                size
            );
            GateStatus::GaveUp
        } else {
            GateStatus::Waiting
        }
    }

    pub fn reset(&mut self) {
        self.last_size = None;
        self.stable_frames = 0;
        self.sampled_frames = 0;
    }

    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    pub fn sampled_frames(&self) -> u32 {
        self.sampled_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_after_three_stable_frames() {
        let mut gate = LayoutStabilityGate::default();
        assert_eq!(gate.observe((500.0, 40.0)), GateStatus::Waiting);
        assert_eq!(gate.observe((500.0, 40.0)), GateStatus::Waiting);
        assert_eq!(gate.observe((500.0, 40.0)), GateStatus::Waiting);
        assert_eq!(gate.stable_frames(), 2);
        assert_eq!(gate.observe((500.0, 40.0)), GateStatus::Stable);
    }

    #[test]
    fn test_size_change_resets_counter() {
        let mut gate = LayoutStabilityGate::default();
        gate.observe((0.0, 0.0));
        gate.observe((0.0, 0.0));
        gate.observe((0.0, 0.0));
        assert_eq!(gate.stable_frames(), 2);

        assert_eq!(gate.observe((480.0, 40.0)), GateStatus::Waiting);
        assert_eq!(gate.stable_frames(), 0);

        // A change in height alone also counts
        gate.observe((480.0, 40.0));
        assert_eq!(gate.observe((480.0, 42.0)), GateStatus::Waiting);
        assert_eq!(gate.stable_frames(), 0);
    }

    #[test]
    fn test_gives_up_after_frame_budget() {
        let mut gate = LayoutStabilityGate::new(STABLE_FRAMES_REQUIRED, 10);
        let mut status = GateStatus::Waiting;
        for i in 0..10 {
            status = gate.observe((i as f64, 10.0));
        }
        assert_eq!(status, GateStatus::GaveUp);
        assert!(status.is_open());
    }

    #[test]
    fn test_reset_starts_over() {
        let mut gate = LayoutStabilityGate::default();
        for _ in 0..3 {
            gate.observe((100.0, 20.0));
        }
        gate.reset();
        assert_eq!(gate.stable_frames(), 0);
        assert_eq!(gate.sampled_frames(), 0);
        assert_eq!(gate.observe((100.0, 20.0)), GateStatus::Waiting);
    }
}
