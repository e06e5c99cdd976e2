//! Frame → candidate gestures.
//!
//! Two independent channels are evaluated on every frame:
//!
//! * **Swipe**: index-fingertip displacement since the previous frame,
//!   measured in pixels.  Rate-limited locally by `swipe_min_interval` so a
//!   single sweep of the hand is not sliced into several swipes.
//! * **Static pose**: pinch, open palm or fist, in that priority order.
//!
//! Both may fire on the same frame; the swipe candidate comes first.

use std::time::Instant;

use tracing::debug;

use crate::config::ClassifierConfig;
use crate::event::GestureEvent;
use crate::finger::FingerStateVector;
use crate::landmark::{LandmarkFrame, Point};

/// Motion history carried from one frame to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotionTrackState {
    /// Index fingertip of the previous classified frame, in pixels.
    pub prev_tip: Option<(i32, i32)>,
    /// When the last swipe candidate fired.
    pub last_swipe: Option<Instant>,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
    state: MotionTrackState,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Classifier { config, state: MotionTrackState::default() }
    }

    pub fn state(&self) -> &MotionTrackState {
        &self.state
    }

    /// Forget the previous fingertip and swipe time.
    pub fn reset(&mut self) {
        self.state = MotionTrackState::default();
    }

    /// Classify one hand frame observed at `now`.
    ///
    /// Returns at most two candidates: one swipe and one static pose.  The
    /// motion state is updated whether or not anything fires.
    pub fn classify(&mut self, frame: &LandmarkFrame, now: Instant) -> Vec<GestureEvent> {
        let fingers = FingerStateVector::from_frame(frame);
        let mut candidates = Vec::with_capacity(2);

        let tip = self.to_pixels(frame.index_tip());
        if let Some(swipe) = self.detect_swipe(tip, now) {
            candidates.push(swipe);
        }
        self.state.prev_tip = Some(tip);

        if let Some(pose) = self.static_pose(frame, &fingers) {
            candidates.push(pose);
        }

        if !candidates.is_empty() {
            debug!(
                ?candidates,
                extended = fingers.extended_count(),
                tip_x = tip.0,
                tip_y = tip.1,
                "gesture candidates"
            );
        }
        candidates
    }

    /// Rounded to the nearest pixel.  Coordinates are clamped to the image
    /// first, so frames built without validation cannot overflow the delta.
    fn to_pixels(&self, p: Point) -> (i32, i32) {
        let px = |v: f32, size: u32| (v.clamp(0.0, 1.0) * size as f32).round() as i32;
        (px(p.x, self.config.frame_width), px(p.y, self.config.frame_height))
    }

    fn detect_swipe(&mut self, (x, y): (i32, i32), now: Instant) -> Option<GestureEvent> {
        let (prev_x, prev_y) = self.state.prev_tip?;
        let (dx, dy) = (x - prev_x, y - prev_y);

        if dx.abs().max(dy.abs()) <= self.config.motion_threshold_px {
            return None;
        }

        if let Some(last) = self.state.last_swipe {
            if now.saturating_duration_since(last) < self.config.swipe_min_interval {
                debug!(dx, dy, "swipe motion inside minimum interval, ignored");
                return None;
            }
        }

        self.state.last_swipe = Some(now);
        Some(swipe_direction(dx, dy))
    }

    fn static_pose(&self, frame: &LandmarkFrame, fingers: &FingerStateVector) -> Option<GestureEvent> {
        let pinch_dist = frame.thumb_tip().distance_2d(&frame.index_tip());
        if pinch_dist < self.config.pinch_threshold {
            return Some(GestureEvent::Pinch);
        }
        match fingers.extended_count() {
            5 => Some(GestureEvent::OpenPalm),
            0 => Some(GestureEvent::Fist),
            _ => None,
        }
    }
}

/// Dominant axis wins; a tie (`|dx| == |dy|`) counts as vertical.
pub fn swipe_direction(dx: i32, dy: i32) -> GestureEvent {
    if dx.abs() > dy.abs() {
        if dx > 0 { GestureEvent::SwipeRight } else { GestureEvent::SwipeLeft }
    } else if dy > 0 {
        GestureEvent::SwipeDown
    } else {
        GestureEvent::SwipeUp
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
