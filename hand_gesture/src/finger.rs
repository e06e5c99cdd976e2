//! Per-finger extended/curled state, derived fresh from every frame.

use crate::landmark::{
    LandmarkFrame, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP,
    RING_PIP, RING_TIP, THUMB_IP, THUMB_TIP,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// `(tip, reference joint)` landmark indices used for the extension test.
    fn landmarks(self) -> (usize, usize) {
        match self {
            Finger::Thumb  => (THUMB_TIP, THUMB_IP),
            Finger::Index  => (INDEX_TIP, INDEX_PIP),
            Finger::Middle => (MIDDLE_TIP, MIDDLE_PIP),
            Finger::Ring   => (RING_TIP, RING_PIP),
            Finger::Pinky  => (PINKY_TIP, PINKY_PIP),
        }
    }
}

/// Extended flags in thumb → pinky order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStateVector([bool; 5]);

impl FingerStateVector {
    /// Thumb: extended when the tip lies left of the IP joint (x axis).
    /// Other fingers: extended when the tip lies above the PIP joint; image
    /// y grows downward, so "above" means a smaller y.
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        let mut states = [false; 5];
        for (slot, finger) in states.iter_mut().zip(Finger::ALL) {
            let (tip, joint) = finger.landmarks();
            let (tip, joint) = (frame.point(tip), frame.point(joint));
            *slot = match finger {
                Finger::Thumb => tip.x < joint.x,
                _ => tip.y < joint.y,
            };
        }
        FingerStateVector(states)
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    pub fn extended_count(&self) -> usize {
        self.0.iter().filter(|&&s| s).count()
    }

    pub fn as_array(&self) -> [bool; 5] {
        self.0
    }
}
