//! Drop-frame timecode labelling for 29.97 and 59.94 fps.
//!
//! Drop-frame timecode skips frame *labels* (never frames) so the displayed
//! timecode tracks wall-clock time:
//! - labels 0 and 1 (0-3 at 59.94) are skipped at the start of each minute
//! - except for minutes 0, 10, 20, 30, 40, 50

use super::FrameRate;

/// Drop-frame configuration for a frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropFrameConfig {
    /// Number of frame labels dropped per minute (except every 10th minute)
    pub frames_dropped_per_minute: u64,
    /// Nominal frame rate
    pub nominal_fps: u64,
    /// Frames per 10 minutes (accounting for drops)
    pub frames_per_10_minutes: u64,
    /// Frames per minute (accounting for drops, for non-10th minutes)
    pub frames_per_minute: u64,
}

impl DropFrameConfig {
    /// Get the configuration for a frame rate, if it supports drop-frame.
    #[must_use]
    pub const fn for_frame_rate(frame_rate: FrameRate) -> Option<Self> {
        match frame_rate {
            FrameRate::Fps29_97 => Some(Self {
                frames_dropped_per_minute: 2,
                nominal_fps: 30,
                // 30 * 60 * 10 - 9 * 2
                frames_per_10_minutes: 17_982,
                // 30 * 60 - 2
                frames_per_minute: 1_798,
            }),
            FrameRate::Fps59_94 => Some(Self {
                frames_dropped_per_minute: 4,
                nominal_fps: 60,
                frames_per_10_minutes: 35_964,
                frames_per_minute: 3_596,
            }),
            _ => None,
        }
    }

    /// Convert a real frame count to the label count shown on screen.
    ///
    /// The returned value is a frame number in the nominal (30/60 fps)
    /// labelling space, ready to split into `HH:MM:SS;FF`.
    #[must_use]
    pub const fn label_frame(&self, frame_number: u64) -> u64 {
        let drop = self.frames_dropped_per_minute;
        let ten_minute_blocks = frame_number / self.frames_per_10_minutes;
        let remainder = frame_number % self.frames_per_10_minutes;

        let skipped = if remainder > drop {
            drop * 9 * ten_minute_blocks + drop * ((remainder - drop) / self.frames_per_minute)
        } else {
            drop * 9 * ten_minute_blocks
        };
        frame_number.saturating_add(skipped)
    }
}
