//! Hand landmark model.
//!
//! A [`LandmarkFrame`] is exactly 21 points in the standard hand layout,
//! normalized to the image: `x` grows rightward, `y` grows downward, both in
//! `[0, 1]`.  The fixed-size array makes "all 21 points present" a property
//! of the type rather than something the classifier has to check.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Bone connections, used for drawing the skeleton.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (INDEX_MCP, MIDDLE_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// One landmark in normalized image coordinates.  `z` is relative depth
/// when the source provides it, `0.0` otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y, z: 0.0 }
    }

    pub const fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Point { x, y, z }
    }

    /// Finite, with `x` and `y` inside the unit square.
    pub fn in_image(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y) && self.z.is_finite()
    }

    /// Euclidean distance in the image plane (depth ignored).
    pub fn distance_2d(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Accepted spellings of a point in recorded frames: `[x, y]`, `[x, y, z]`
/// or `{"x": .., "y": .., "z": ..}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Xy(f32, f32),
    Xyz(f32, f32, f32),
    Named {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
    },
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Xy(x, y) => Point::new(x, y),
            PointRepr::Xyz(x, y, z) | PointRepr::Named { x, y, z } => Point::with_depth(x, y, z),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    #[error("a hand frame needs exactly 21 landmarks, got {0}")]
    WrongPointCount(usize),

    /// `x`/`y` outside `[0, 1]`, or any coordinate NaN/infinite.
    #[error("landmark {index} is outside the image: ({x}, {y}, {z})")]
    OutOfRange { index: usize, x: f32, y: f32, z: f32 },
}

/// The 21 landmarks of exactly one hand in one camera frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct LandmarkFrame {
    points: [Point; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        LandmarkFrame { points }
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] {
        &self.points
    }

    pub fn thumb_tip(&self) -> Point { self.points[THUMB_TIP] }
    pub fn index_tip(&self) -> Point { self.points[INDEX_TIP] }

    /// Horizontally flipped copy (`x → 1 - x`), matching a selfie-view camera.
    pub fn mirrored(&self) -> Self {
        let mut points = self.points;
        for p in points.iter_mut() {
            p.x = 1.0 - p.x;
        }
        LandmarkFrame { points }
    }
}

impl TryFrom<Vec<Point>> for LandmarkFrame {
    type Error = LandmarkError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        let len = points.len();
        if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !p.in_image()) {
            return Err(LandmarkError::OutOfRange { index, x: p.x, y: p.y, z: p.z });
        }
        let points: [Point; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongPointCount(len))?;
        Ok(LandmarkFrame { points })
    }
}

impl From<LandmarkFrame> for Vec<Point> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.points.to_vec()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectedHand + selection policy
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

/// One hand as reported by a landmark source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    #[serde(rename = "landmarks")]
    pub frame: LandmarkFrame,
    pub confidence: f32,
    #[serde(default)]
    pub handedness: Option<Handedness>,
}

impl DetectedHand {
    pub fn new(frame: LandmarkFrame, confidence: f32) -> Self {
        DetectedHand { frame, confidence, handedness: None }
    }
}

/// Pick the single hand the classifier will see.
///
/// Hands below `min_confidence` are ignored; of the remainder the most
/// confident wins, and on a tie the one reported first.
pub fn select_hand(hands: &[DetectedHand], min_confidence: f32) -> Option<&DetectedHand> {
    let mut best: Option<&DetectedHand> = None;
    for hand in hands.iter().filter(|h| h.confidence >= min_confidence) {
        match best {
            Some(b) if hand.confidence <= b.confidence => {}
            _ => best = Some(hand),
        }
    }
    best
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_frame(x: f32) -> LandmarkFrame {
        LandmarkFrame::new([Point::new(x, 0.5); LANDMARK_COUNT])
    }

    #[test]
    fn rejects_short_and_long_point_lists() {
        assert_eq!(
            LandmarkFrame::try_from(vec![Point::default(); 20]),
            Err(LandmarkError::WrongPointCount(20))
        );
        assert_eq!(
            LandmarkFrame::try_from(vec![Point::default(); 22]),
            Err(LandmarkError::WrongPointCount(22))
        );
        assert!(LandmarkFrame::try_from(vec![Point::default(); 21]).is_ok());
    }

    #[test]
    fn rejects_points_outside_the_image() {
        let mut points = vec![Point::new(0.5, 0.5); LANDMARK_COUNT];
        points[INDEX_TIP] = Point::new(-1e30, 0.5);
        assert!(matches!(
            LandmarkFrame::try_from(points.clone()),
            Err(LandmarkError::OutOfRange { index: INDEX_TIP, .. })
        ));

        points[INDEX_TIP] = Point::new(0.5, f32::NAN);
        assert!(LandmarkFrame::try_from(points.clone()).is_err());

        points[INDEX_TIP] = Point::with_depth(0.5, 0.5, f32::INFINITY);
        assert!(LandmarkFrame::try_from(points.clone()).is_err());

        points[INDEX_TIP] = Point::new(1.0, 0.0);
        assert!(LandmarkFrame::try_from(points).is_ok());
    }

    #[test]
    fn frame_deserialize_rejects_huge_coordinates() {
        let mut pts = vec![[0.5f32, 0.5]; LANDMARK_COUNT];
        pts[INDEX_TIP] = [1e30, 0.5];
        let json = serde_json::to_string(&pts).unwrap();
        assert!(serde_json::from_str::<LandmarkFrame>(&json).is_err());
    }

    #[test]
    fn distance_ignores_depth() {
        let a = Point::with_depth(0.0, 0.0, 5.0);
        let b = Point::with_depth(0.3, 0.4, -5.0);
        assert!((a.distance_2d(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn mirrored_flips_x_only() {
        let m = flat_frame(0.2).mirrored();
        assert!((m.point(WRIST).x - 0.8).abs() < 1e-6);
        assert_eq!(m.point(WRIST).y, 0.5);
    }

    #[test]
    fn select_hand_prefers_highest_confidence() {
        let hands = vec![
            DetectedHand::new(flat_frame(0.1), 0.75),
            DetectedHand::new(flat_frame(0.2), 0.95),
            DetectedHand::new(flat_frame(0.3), 0.80),
        ];
        let chosen = select_hand(&hands, 0.7).unwrap();
        assert_eq!(chosen.confidence, 0.95);
    }

    #[test]
    fn select_hand_tie_keeps_first() {
        let hands = vec![
            DetectedHand::new(flat_frame(0.1), 0.9),
            DetectedHand::new(flat_frame(0.2), 0.9),
        ];
        let chosen = select_hand(&hands, 0.7).unwrap();
        assert_eq!(chosen.frame.point(WRIST).x, 0.1);
    }

    #[test]
    fn select_hand_drops_low_confidence() {
        let hands = vec![DetectedHand::new(flat_frame(0.1), 0.5)];
        assert!(select_hand(&hands, 0.7).is_none());
        assert!(select_hand(&[], 0.0).is_none());
    }

    #[test]
    fn point_accepts_array_and_object_forms() {
        let p: Point = serde_json::from_str("[0.1, 0.2]").unwrap();
        assert_eq!(p, Point::new(0.1, 0.2));
        let p: Point = serde_json::from_str("[0.1, 0.2, -0.3]").unwrap();
        assert_eq!(p, Point::with_depth(0.1, 0.2, -0.3));
        let p: Point = serde_json::from_str(r#"{"x": 0.4, "y": 0.6}"#).unwrap();
        assert_eq!(p, Point::new(0.4, 0.6));
    }

    #[test]
    fn frame_deserialize_enforces_point_count() {
        let short = serde_json::to_string(&vec![[0.5, 0.5]; 3]).unwrap();
        assert!(serde_json::from_str::<LandmarkFrame>(&short).is_err());
        let full = serde_json::to_string(&vec![[0.5, 0.5]; 21]).unwrap();
        assert!(serde_json::from_str::<LandmarkFrame>(&full).is_ok());
    }
}
