//! Recorded landmark files.
//!
//! One JSON object per line:
//!
//! ```text
//! # comment lines and blank lines are skipped
//! {"t": 0.000, "hands": [{"confidence": 0.93, "handedness": "right", "landmarks": [[0.41, 0.62], ...]}]}
//! {"t": 0.033, "hands": []}
//! ```
//!
//! `t` is seconds since the start of the recording.  Points may be `[x, y]`,
//! `[x, y, z]` or `{"x": .., "y": ..}`; every hand needs exactly 21 of them.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{info, warn};

use hand_gesture::DetectedHand;

use crate::error::{RelayError, Result};
use crate::source::{LandmarkSource, SourceFrame};

#[derive(Clone, Debug, Deserialize)]
pub struct RecordedFrame {
    /// Seconds since the start of the recording.
    pub t: f64,
    #[serde(default)]
    pub hands: Vec<DetectedHand>,
}

/// Parse a whole recording.  Fails on the first malformed line, reporting
/// its 1-based line number.
pub fn parse_recording(text: &str) -> Result<Vec<RecordedFrame>> {
    let mut frames = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame: RecordedFrame = serde_json::from_str(line)
            .map_err(|source| RelayError::Replay { line: idx + 1, source })?;
        if Duration::try_from_secs_f64(frame.t).is_err() {
            return Err(RelayError::Config(format!(
                "replay line {}: timestamp {} is not a usable number of seconds",
                idx + 1,
                frame.t
            )));
        }
        frames.push(frame);
    }
    Ok(frames)
}

/// Plays a recording back.
///
/// Frame instants are `start + t`, where `start` is taken when the first
/// frame is requested.  With `pace` the source sleeps so frames arrive in
/// real time; without it the whole recording is delivered as fast as the
/// frame loop can take it (timestamps still follow the recording).
pub struct ReplaySource {
    frames: std::vec::IntoIter<RecordedFrame>,
    pace:   bool,
    start:  Option<Instant>,
}

impl ReplaySource {
    pub fn new(frames: Vec<RecordedFrame>, pace: bool) -> Self {
        ReplaySource { frames: frames.into_iter(), pace, start: None }
    }

    pub fn open(path: &Path, pace: bool) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let frames = parse_recording(&text)?;
        info!(path = %path.display(), frames = frames.len(), pace, "replay loaded");
        Ok(Self::new(frames, pace))
    }
}

impl LandmarkSource for ReplaySource {
    fn next_frame(&mut self) -> Option<SourceFrame> {
        let rec = self.frames.next()?;
        let start = *self.start.get_or_insert_with(Instant::now);
        let Some(at) = Duration::try_from_secs_f64(rec.t)
            .ok()
            .and_then(|offset| start.checked_add(offset))
        else {
            warn!(t = rec.t, "replay timestamp out of range, ending replay");
            return None;
        };

        if self.pace {
            let wait = at.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                thread::sleep(wait);
            }
        }
        Some(SourceFrame { at, hands: rec.hands })
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{pose, Handedness};

    fn hand_line(t: f64) -> String {
        let points: Vec<[f32; 2]> = pose::fist(0.5, 0.5)
            .points()
            .iter()
            .map(|p| [p.x, p.y])
            .collect();
        format!(
            r#"{{"t": {t}, "hands": [{{"confidence": 0.9, "handedness": "right", "landmarks": {}}}]}}"#,
            serde_json::to_string(&points).unwrap()
        )
    }

    #[test]
    fn parses_hands_comments_and_blank_lines() {
        let text = format!(
            "# recorded at the desk\n\n{}\n{{\"t\": 0.05, \"hands\": []}}\n{{\"t\": 0.1}}\n",
            hand_line(0.0)
        );
        let frames = parse_recording(&text).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].hands.len(), 1);
        assert_eq!(frames[0].hands[0].handedness, Some(Handedness::Right));
        assert_eq!(frames[0].hands[0].frame, pose::fist(0.5, 0.5));
        assert!(frames[1].hands.is_empty());
        assert!(frames[2].hands.is_empty());
    }

    #[test]
    fn accepts_three_dimensional_points() {
        let pts = serde_json::to_string(&vec![[0.5, 0.5, -0.02]; 21]).unwrap();
        let text = format!(r#"{{"t": 0, "hands": [{{"confidence": 1.0, "landmarks": {pts}}}]}}"#);
        let frames = parse_recording(&text).unwrap();
        assert!((frames[0].hands[0].frame.point(0).z + 0.02).abs() < 1e-6);
    }

    #[test]
    fn reports_line_of_malformed_frame() {
        let short = serde_json::to_string(&vec![[0.5, 0.5]; 20]).unwrap();
        let text = format!(
            "{}\n# ok so far\n{{\"t\": 0.1, \"hands\": [{{\"confidence\": 1.0, \"landmarks\": {short}}}]}}\n",
            hand_line(0.0)
        );
        match parse_recording(&text) {
            Err(RelayError::Replay { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected replay error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_timestamp() {
        assert!(matches!(
            parse_recording(r#"{"t": -1.0, "hands": []}"#),
            Err(RelayError::Config(_))
        ));
    }

    #[test]
    fn rejects_timestamp_too_large_for_a_duration() {
        let text = format!("{}\n{{\"t\": 1e20, \"hands\": []}}\n", hand_line(0.0));
        match parse_recording(&text) {
            Err(RelayError::Config(msg)) => assert!(msg.contains("line 2"), "{msg}"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_instant_ends_replay_instead_of_panicking() {
        // Fits in a Duration but not added to any real Instant.
        let frames = parse_recording(r#"{"t": 1.8e19, "hands": []}"#).unwrap();
        let mut src = ReplaySource::new(frames, false);
        assert!(src.next_frame().is_none());
    }

    #[test]
    fn out_of_image_landmark_reports_its_line() {
        let mut pts = vec![[0.5f32, 0.5]; 21];
        pts[8] = [-1e30, 0.5];
        let pts = serde_json::to_string(&pts).unwrap();
        let text = format!(
            "{}\n{{\"t\": 0.1, \"hands\": [{{\"confidence\": 1.0, \"landmarks\": {pts}}}]}}\n",
            hand_line(0.0)
        );
        match parse_recording(&text) {
            Err(RelayError::Replay { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected replay error, got {other:?}"),
        }
    }

    #[test]
    fn replay_keeps_recorded_spacing() {
        let frames = parse_recording(&format!("{}\n{}", hand_line(0.0), hand_line(1.5))).unwrap();
        let mut src = ReplaySource::new(frames, false);
        let a = src.next_frame().unwrap();
        let b = src.next_frame().unwrap();
        assert_eq!(b.at - a.at, Duration::from_millis(1500));
        assert!(src.next_frame().is_none());
    }
}
