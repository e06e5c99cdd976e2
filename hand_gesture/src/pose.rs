//! Synthetic hand poses.
//!
//! Hand-built landmark layouts for the four shapes the classifier cares
//! about.  Every pose is positioned so that the **index fingertip lands
//! exactly on the requested `(x, y)`**, which keeps swipe arithmetic in
//! tests and in the keyboard simulator easy to reason about.

use crate::landmark::{LandmarkFrame, Point, LANDMARK_COUNT};

/// Column offsets (from the wrist) of thumb, index, middle, ring, pinky.
const COLUMNS: [f32; 5] = [-0.10, -0.04, 0.0, 0.04, 0.08];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pose {
    /// All five fingers extended.
    OpenPalm,
    /// All fingers curled, thumb tucked across the palm.
    Fist,
    /// Thumb tip touching the index tip, remaining fingers extended.
    Pinch,
    /// Index extended, everything else curled.  Matches no static gesture.
    Pointing,
}

impl Pose {
    pub fn frame(self, x: f32, y: f32) -> LandmarkFrame {
        match self {
            Pose::OpenPalm => open_palm(x, y),
            Pose::Fist     => fist(x, y),
            Pose::Pinch    => pinch(x, y),
            Pose::Pointing => pointing(x, y),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pose::OpenPalm => "open palm",
            Pose::Fist     => "fist",
            Pose::Pinch    => "pinch",
            Pose::Pointing => "pointing",
        }
    }
}

// ── finger builders (offsets relative to the wrist) ───────────────────────

fn extended_finger(col: f32) -> [(f32, f32); 4] {
    [(col, -0.10), (col, -0.15), (col, -0.19), (col, -0.23)]
}

fn curled_finger(col: f32) -> [(f32, f32); 4] {
    [(col, -0.10), (col, -0.14), (col, -0.11), (col, -0.08)]
}

fn extended_thumb() -> [(f32, f32); 4] {
    [(-0.04, -0.02), (-0.08, -0.05), (-0.11, -0.08), (-0.14, -0.10)]
}

fn tucked_thumb() -> [(f32, f32); 4] {
    [(-0.04, -0.02), (-0.07, -0.05), (-0.05, -0.07), (0.02, -0.05)]
}

fn pinching_index() -> [(f32, f32); 4] {
    [(-0.04, -0.10), (-0.05, -0.15), (-0.07, -0.17), (-0.09, -0.16)]
}

fn pinching_thumb() -> [(f32, f32); 4] {
    [(-0.04, -0.02), (-0.08, -0.06), (-0.11, -0.10), (-0.095, -0.145)]
}

/// Lay the five fingers out around a wrist placed so the index tip
/// (landmark 8) ends up at `(tip_x, tip_y)`.
fn assemble(fingers: [[(f32, f32); 4]; 5], tip_x: f32, tip_y: f32) -> LandmarkFrame {
    let (ix, iy) = fingers[1][3];
    let (wx, wy) = (tip_x - ix, tip_y - iy);

    let mut points = [Point::new(wx, wy); LANDMARK_COUNT];
    for (f, joints) in fingers.iter().enumerate() {
        for (j, &(dx, dy)) in joints.iter().enumerate() {
            points[1 + f * 4 + j] = Point::new(wx + dx, wy + dy);
        }
    }
    // Land the anchor exactly, independent of float round-off above.
    points[8] = Point::new(tip_x, tip_y);
    LandmarkFrame::new(points)
}

pub fn open_palm(x: f32, y: f32) -> LandmarkFrame {
    assemble(
        [
            extended_thumb(),
            extended_finger(COLUMNS[1]),
            extended_finger(COLUMNS[2]),
            extended_finger(COLUMNS[3]),
            extended_finger(COLUMNS[4]),
        ],
        x, y,
    )
}

pub fn fist(x: f32, y: f32) -> LandmarkFrame {
    assemble(
        [
            tucked_thumb(),
            curled_finger(COLUMNS[1]),
            curled_finger(COLUMNS[2]),
            curled_finger(COLUMNS[3]),
            curled_finger(COLUMNS[4]),
        ],
        x, y,
    )
}

pub fn pinch(x: f32, y: f32) -> LandmarkFrame {
    assemble(
        [
            pinching_thumb(),
            pinching_index(),
            extended_finger(COLUMNS[2]),
            extended_finger(COLUMNS[3]),
            extended_finger(COLUMNS[4]),
        ],
        x, y,
    )
}

pub fn pointing(x: f32, y: f32) -> LandmarkFrame {
    assemble(
        [
            tucked_thumb(),
            extended_finger(COLUMNS[1]),
            curled_finger(COLUMNS[2]),
            curled_finger(COLUMNS[3]),
            curled_finger(COLUMNS[4]),
        ],
        x, y,
    )
}
