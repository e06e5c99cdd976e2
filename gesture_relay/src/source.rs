//! Landmark sources: where hand frames come from.
//!
//! The frame loop only sees [`LandmarkSource`]; it does not care whether
//! frames come from a recording, the keyboard simulator or real hardware.

use std::collections::VecDeque;
use std::time::Instant;

use hand_gesture::DetectedHand;

/// One acquired camera frame: zero or more hands seen at `at`.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    pub at:    Instant,
    pub hands: Vec<DetectedHand>,
}

impl SourceFrame {
    pub fn empty(at: Instant) -> Self {
        SourceFrame { at, hands: Vec::new() }
    }

    pub fn single(at: Instant, hand: DetectedHand) -> Self {
        SourceFrame { at, hands: vec![hand] }
    }
}

/// Anything that can deliver frames, one at a time.
///
/// `next_frame` may block for up to one frame period.  `None` means
/// end-of-stream; the frame loop stops.
pub trait LandmarkSource: Send + 'static {
    fn next_frame(&mut self) -> Option<SourceFrame>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

impl LandmarkSource for Box<dyn LandmarkSource> {
    fn next_frame(&mut self) -> Option<SourceFrame> {
        (**self).next_frame()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// QueueSource: pre-built frames, used by tests and for replay
// ════════════════════════════════════════════════════════════════════════════

/// Hands out a fixed list of frames, then ends.
#[derive(Debug, Default)]
pub struct QueueSource {
    frames: VecDeque<SourceFrame>,
}

impl QueueSource {
    pub fn new(frames: impl IntoIterator<Item = SourceFrame>) -> Self {
        QueueSource { frames: frames.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for QueueSource {
    fn next_frame(&mut self) -> Option<SourceFrame> {
        self.frames.pop_front()
    }

    fn name(&self) -> &'static str {
        "queue"
    }
}
