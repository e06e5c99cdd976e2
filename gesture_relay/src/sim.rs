//! Keyboard/mouse hand simulator.
//!
//! The preview window translates keys and pointer motion into [`SimInput`]
//! events and sends them here; [`SimSource`] turns the resulting simulated
//! hand into a steady ~30 fps landmark stream.  This decouples the window
//! event loop from the frame loop, the same way a camera would be.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use hand_gesture::pose::Pose;
use hand_gesture::{DetectedHand, Handedness};

use crate::source::{LandmarkSource, SourceFrame};

/// Small nudge: well under the swipe threshold.
const MOVE_STEP: f32 = 0.02;
/// Flick: 0.2 of the frame is 128 px horizontally / 96 px vertically at
/// 640×480, comfortably over the 80 px swipe threshold.
const FLICK_STEP: f32 = 0.2;
const SIM_CONFIDENCE: f32 = 0.95;
pub const SIM_FRAME_PERIOD: Duration = Duration::from_millis(33);

/// Raw input event from the preview window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    /// Pointer moved to a normalized window position.
    Pointer { x: f32, y: f32 },
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Move(Direction),   // arrows
    Flick(Direction),  // Shift+arrows
    Pose(Pose),        // P / O / F / N
    ToggleHand,        // H
    Quit,              // Q / Escape
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    fn unit(self) -> (f32, f32) {
        match self {
            Direction::Left  => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up    => (0.0, -1.0),
            Direction::Down  => (0.0, 1.0),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHand
// ════════════════════════════════════════════════════════════════════════════

/// The simulated hand: where the index fingertip is and what shape the
/// hand makes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    pub x:       f32,
    pub y:       f32,
    pub pose:    Pose,
    pub visible: bool,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { x: 0.5, y: 0.5, pose: Pose::Pointing, visible: true }
    }
}

impl SimHand {
    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Pointer { x, y } => self.move_to(x, y),
            SimInput::KeyDown(SimKey::Move(dir)) => self.nudge(dir, MOVE_STEP),
            SimInput::KeyDown(SimKey::Flick(dir)) => self.nudge(dir, FLICK_STEP),
            SimInput::KeyDown(SimKey::Pose(pose)) => self.pose = pose,
            SimInput::KeyDown(SimKey::ToggleHand) => self.visible = !self.visible,
            SimInput::KeyDown(SimKey::Quit) => {}
        }
    }

    fn nudge(&mut self, dir: Direction, step: f32) {
        let (ux, uy) = dir.unit();
        self.move_to(self.x + ux * step, self.y + uy * step);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.x = x.clamp(0.0, 1.0);
        self.y = y.clamp(0.0, 1.0);
    }

    pub fn detected(&self) -> Option<DetectedHand> {
        if !self.visible {
            return None;
        }
        Some(DetectedHand {
            frame:      self.pose.frame(self.x, self.y),
            confidence: SIM_CONFIDENCE,
            handedness: Some(Handedness::Right),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimSource
// ════════════════════════════════════════════════════════════════════════════

pub struct SimSource {
    rx:     Receiver<SimInput>,
    hand:   SimHand,
    period: Duration,
}

impl SimSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        Self::with_period(rx, SIM_FRAME_PERIOD)
    }

    pub fn with_period(rx: Receiver<SimInput>, period: Duration) -> Self {
        SimSource { rx, hand: SimHand::default(), period }
    }
}

impl LandmarkSource for SimSource {
    fn next_frame(&mut self) -> Option<SourceFrame> {
        if !self.period.is_zero() {
            thread::sleep(self.period);
        }
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::KeyDown(SimKey::Quit)) => return None,
                Ok(input) => self.hand.apply(input),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return None,
            }
        }
        let at = Instant::now();
        Some(match self.hand.detected() {
            Some(hand) => SourceFrame::single(at, hand),
            None => SourceFrame::empty(at),
        })
    }

    fn name(&self) -> &'static str {
        "sim"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn flick_moves_far_enough_to_swipe() {
        let mut hand = SimHand::default();
        hand.apply(SimInput::KeyDown(SimKey::Flick(Direction::Right)));
        assert!(((hand.x - 0.5) * 640.0).round() > 80.0);
        hand.apply(SimInput::KeyDown(SimKey::Flick(Direction::Up)));
        assert!(((0.5 - hand.y) * 480.0).round() > 80.0);
    }

    #[test]
    fn nudge_stays_under_threshold() {
        let mut hand = SimHand::default();
        hand.apply(SimInput::KeyDown(SimKey::Move(Direction::Left)));
        assert!(((0.5 - hand.x) * 640.0).round() < 80.0);
    }

    #[test]
    fn pointer_is_clamped() {
        let mut hand = SimHand::default();
        hand.apply(SimInput::Pointer { x: 1.7, y: -0.2 });
        assert_eq!((hand.x, hand.y), (1.0, 0.0));
    }

    #[test]
    fn hidden_hand_yields_empty_frames() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimSource::with_period(rx, Duration::ZERO);
        tx.send(SimInput::KeyDown(SimKey::ToggleHand)).unwrap();
        assert!(src.next_frame().unwrap().hands.is_empty());
        tx.send(SimInput::KeyDown(SimKey::ToggleHand)).unwrap();
        assert_eq!(src.next_frame().unwrap().hands.len(), 1);
    }

    #[test]
    fn pose_key_changes_landmarks() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimSource::with_period(rx, Duration::ZERO);
        tx.send(SimInput::KeyDown(SimKey::Pose(Pose::Fist))).unwrap();
        let frame = src.next_frame().unwrap();
        assert_eq!(frame.hands[0].frame, hand_gesture::pose::fist(0.5, 0.5));
    }

    #[test]
    fn quit_or_disconnect_ends_stream() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimSource::with_period(rx, Duration::ZERO);
        tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();
        assert!(src.next_frame().is_none());

        let (tx, rx) = mpsc::channel::<SimInput>();
        let mut src = SimSource::with_period(rx, Duration::ZERO);
        drop(tx);
        assert!(src.next_frame().is_none());
    }
}
