//! Leap Motion landmark source (requires the `leap` feature and the
//! Ultraleap tracking service).
//!
//! Each tracked hand's bone joints are mapped onto the 21-point landmark
//! layout and projected from millimetres above the device into normalized
//! image coordinates.

use std::time::Instant;

use leaprs::{Connection, ConnectionConfig, Event, HandType};
use tracing::{debug, info, warn};

use hand_gesture::landmark::{LANDMARK_COUNT, WRIST};
use hand_gesture::{DetectedHand, Handedness, LandmarkFrame, Point};

use crate::error::{RelayError, Result};
use crate::source::{LandmarkSource, SourceFrame};

// Interaction box, in mm (empirically tuned).
const BOX_HALF_WIDTH: f32 = 200.0;
const BOX_FLOOR:      f32 = 50.0;
const BOX_HEIGHT:     f32 = 400.0;
const POLL_TIMEOUT_MS: u32 = 100;

/// Project a device-space position (mm, y up) into image space (0..1, y down).
pub fn project_mm(x: f32, y: f32, z: f32) -> Point {
    Point::with_depth(
        ((x + BOX_HALF_WIDTH) / (2.0 * BOX_HALF_WIDTH)).clamp(0.0, 1.0),
        (1.0 - (y - BOX_FLOOR) / BOX_HEIGHT).clamp(0.0, 1.0),
        z / BOX_HEIGHT,
    )
}

fn hand_to_frame(hand: &leaprs::Hand) -> Option<LandmarkFrame> {
    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 {
        return None;
    }

    let mut points = [Point::new(0.0, 0.0); LANDMARK_COUNT];
    let wrist = digits[2].metacarpal().prev_joint();
    points[WRIST] = project_mm(wrist.x, wrist.y, wrist.z);

    // Per digit: knuckle, middle joint, last joint, tip.
    for (d, digit) in digits.iter().take(5).enumerate() {
        let joints = [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ];
        for (j, v) in joints.iter().enumerate() {
            points[1 + d * 4 + j] = project_mm(v.x, v.y, v.z);
        }
    }
    Some(LandmarkFrame::new(points))
}

pub struct LeapSource {
    connection: Connection,
}

impl LeapSource {
    pub fn open() -> Result<Self> {
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| RelayError::Leap(format!("create connection: {e:?}")))?;
        connection
            .open()
            .map_err(|e| RelayError::Leap(format!("open device: {e:?}")))?;
        info!("leap connection opened");
        Ok(LeapSource { connection })
    }
}

impl LandmarkSource for LeapSource {
    /// Blocks for at most one poll timeout; a timeout yields an empty frame
    /// so the frame loop can observe its quit flag.
    fn next_frame(&mut self) -> Option<SourceFrame> {
        let msg = match self.connection.poll(POLL_TIMEOUT_MS) {
            Ok(m) => m,
            Err(e) => {
                debug!(error = ?e, "leap poll");
                return Some(SourceFrame::empty(Instant::now()));
            }
        };
        let at = Instant::now();

        let Event::Tracking(frame) = msg.event() else {
            return Some(SourceFrame::empty(at));
        };

        let hands = frame
            .hands()
            .filter_map(|h| {
                let Some(landmarks) = hand_to_frame(&h) else {
                    warn!("leap hand with missing digits");
                    return None;
                };
                let handedness = match h.hand_type() {
                    HandType::Left => Handedness::Left,
                    HandType::Right => Handedness::Right,
                };
                Some(DetectedHand {
                    frame:      landmarks,
                    confidence: 1.0,
                    handedness: Some(handedness),
                })
            })
            .collect();

        Some(SourceFrame { at, hands })
    }

    fn name(&self) -> &'static str {
        "leap"
    }
}
