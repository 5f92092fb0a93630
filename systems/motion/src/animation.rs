//! Sprite frame timing for actors.

use std::time::Duration;

/// Sprite frame accumulator.
///
/// Purely cosmetic: the clock never influences motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    frame: u32,
    frame_count: u32,
    frames_per_second: f32,
    progress: f32,
}

impl FrameClock {
    /// Creates a clock cycling through `frame_count` frames at the given rate.
    #[must_use]
    pub fn new(frame_count: u32, frames_per_second: f32) -> Self {
        let frames_per_second = if frames_per_second.is_finite() {
            frames_per_second.max(0.0)
        } else {
            0.0
        };
        Self {
            frame: 0,
            frame_count,
            frames_per_second,
            progress: 0.0,
        }
    }

    /// Index of the frame currently shown.
    #[must_use]
    pub const fn frame(&self) -> u32 {
        self.frame
    }

    /// Number of frames in the cycle.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Accumulates `dt` and moves on one frame for every whole frame period.
    pub fn advance(&mut self, dt: Duration) {
        if self.frame_count == 0 {
            return;
        }

        self.progress += dt.as_secs_f32() * self.frames_per_second;
        let whole = self.progress.floor();
        if whole < 1.0 {
            return;
        }

        self.progress -= whole;
        let steps = (whole as u64) % u64::from(self.frame_count);
        let frame = (u64::from(self.frame) + steps) % u64::from(self.frame_count);
        self.frame = u32::try_from(frame).unwrap_or(0);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(2, 8.0)
    }
}
