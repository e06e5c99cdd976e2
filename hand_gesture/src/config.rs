//! Tunable thresholds.
//!
//! The defaults were tuned against a 640×480 webcam at arm's length.

use std::time::Duration;

/// Fingertip travel between consecutive frames (pixels) above which the
/// motion counts as a swipe.  Compared with a strict `>`.
pub const MOTION_THRESHOLD_PX: i32 = 80;

/// Minimum spacing between two swipe candidates of any direction, so one
/// continuous sweep of the hand is reported once.
pub const SWIPE_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Thumb-tip to index-tip distance (normalized units) below which the hand
/// is pinching.
pub const PINCH_THRESHOLD: f32 = 0.05;

/// Minimum spacing between two dispatches of the same label.
pub const COOLDOWN_WINDOW: Duration = Duration::from_millis(1200);

/// Frame size used to convert normalized landmarks to pixels.
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Width of the source image in pixels.
    pub frame_width: u32,
    /// Height of the source image in pixels.
    pub frame_height: u32,
    /// See [`MOTION_THRESHOLD_PX`].
    pub motion_threshold_px: i32,
    /// See [`SWIPE_MIN_INTERVAL`].
    pub swipe_min_interval: Duration,
    /// See [`PINCH_THRESHOLD`].
    pub pinch_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            frame_width:         DEFAULT_FRAME_WIDTH,
            frame_height:        DEFAULT_FRAME_HEIGHT,
            motion_threshold_px: MOTION_THRESHOLD_PX,
            swipe_min_interval:  SWIPE_MIN_INTERVAL,
            pinch_threshold:     PINCH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// See [`COOLDOWN_WINDOW`].
    pub cooldown: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig { cooldown: COOLDOWN_WINDOW }
    }
}
