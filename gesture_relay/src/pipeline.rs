//! The frame loop: source → hand selection → classifier → dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use hand_gesture::{
    select_hand, Classifier, ClassifierConfig, Dispatcher, GestureEvent, LandmarkFrame, Transport,
};

use crate::source::{LandmarkSource, SourceFrame};

/// Default minimum hand confidence, matching the detector's own default.
pub const MIN_HAND_CONFIDENCE: f32 = 0.7;

/// How the single classified hand is picked out of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSelection {
    /// Hands reported below this confidence are ignored.
    pub min_confidence: f32,
    /// Flip landmarks horizontally before classification (selfie view).
    pub mirror: bool,
}

impl Default for HandSelection {
    fn default() -> Self {
        HandSelection { min_confidence: MIN_HAND_CONFIDENCE, mirror: false }
    }
}

/// What happened to one frame.  Sent to the preview window.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutcome {
    /// The classified hand, after mirroring.  `None` when no hand passed
    /// selection.
    pub hand:       Option<LandmarkFrame>,
    pub candidates: Vec<GestureEvent>,
    /// Candidates that were actually broadcast.
    pub sent:       Vec<GestureEvent>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames:           usize,
    pub frames_with_hand: usize,
    pub candidates:       usize,
    pub sent:             usize,
}

// ════════════════════════════════════════════════════════════════════════════
// GesturePipeline
// ════════════════════════════════════════════════════════════════════════════

pub struct GesturePipeline<T: Transport + ?Sized> {
    classifier: Classifier,
    dispatcher: Dispatcher<T>,
    selection:  HandSelection,
}

impl<T: Transport + ?Sized> GesturePipeline<T> {
    pub fn new(classifier: ClassifierConfig, dispatcher: Dispatcher<T>, selection: HandSelection) -> Self {
        GesturePipeline {
            classifier: Classifier::new(classifier),
            dispatcher,
            selection,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// Run one frame through selection, classification and dispatch.
    ///
    /// A frame without a usable hand produces nothing and leaves the
    /// classifier's motion state untouched.
    pub fn process(&mut self, frame: &SourceFrame) -> FrameOutcome {
        let Some(chosen) = select_hand(&frame.hands, self.selection.min_confidence) else {
            if !frame.hands.is_empty() {
                debug!(
                    hands = frame.hands.len(),
                    min_confidence = self.selection.min_confidence,
                    "no hand above confidence threshold"
                );
            }
            return FrameOutcome { hand: None, candidates: Vec::new(), sent: Vec::new() };
        };

        let hand = if self.selection.mirror {
            chosen.frame.mirrored()
        } else {
            chosen.frame.clone()
        };

        let candidates = self.classifier.classify(&hand, frame.at);
        let sent = candidates
            .iter()
            .copied()
            .filter(|&event| self.dispatcher.dispatch(event, frame.at))
            .collect();

        FrameOutcome { hand: Some(hand), candidates, sent }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame loop
// ════════════════════════════════════════════════════════════════════════════

/// Pull frames until the source ends or `quit` is raised.
///
/// Each outcome is forwarded to `reports` if given; once the receiving side
/// hangs up, reporting stops but the loop carries on.
pub fn run_frame_loop<S, T>(
    source:   &mut S,
    pipeline: &mut GesturePipeline<T>,
    quit:     &AtomicBool,
    reports:  Option<Sender<FrameOutcome>>,
) -> LoopSummary
where
    S: LandmarkSource + ?Sized,
    T: Transport + ?Sized,
{
    let mut summary = LoopSummary::default();
    let mut reports = reports;

    info!(source = source.name(), "frame loop started");
    while !quit.load(Ordering::Relaxed) {
        let Some(frame) = source.next_frame() else {
            info!(source = source.name(), "end of stream");
            break;
        };

        let outcome = pipeline.process(&frame);
        summary.frames += 1;
        if outcome.hand.is_some() {
            summary.frames_with_hand += 1;
        }
        summary.candidates += outcome.candidates.len();
        summary.sent += outcome.sent.len();

        if let Some(tx) = &reports {
            if tx.send(outcome).is_err() {
                debug!("report receiver gone, no longer reporting");
                reports = None;
            }
        }
    }

    info!(
        frames = summary.frames,
        with_hand = summary.frames_with_hand,
        candidates = summary.candidates,
        sent = summary.sent,
        "frame loop finished"
    );
    summary
}

/// Run the frame loop on its own thread.
pub fn spawn_frame_loop<T>(
    mut source:   Box<dyn LandmarkSource>,
    mut pipeline: GesturePipeline<T>,
    quit:         Arc<AtomicBool>,
    reports:      Option<Sender<FrameOutcome>>,
) -> std::io::Result<JoinHandle<LoopSummary>>
where
    T: Transport + ?Sized + 'static,
{
    thread::Builder::new()
        .name("frame-loop".into())
        .spawn(move || run_frame_loop(&mut source, &mut pipeline, &quit, reports))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
