//! # hand_gesture
//!
//! Turns a stream of 21-point hand landmark frames into discrete gesture
//! labels, and rate-limits those labels before handing them to a transport.
//!
//! ## Pipeline
//!
//! ```text
//! LandmarkFrame ──► Classifier ──► 0..2 candidates ──► Dispatcher ──► Transport
//!                   (finger states,                    (per-label
//!                    fingertip motion)                  cooldown)
//! ```
//!
//! ## Gestures
//!
//! | Label | Rule |
//! |---|---|
//! | `SWIPE_LEFT` / `SWIPE_RIGHT` | index fingertip moved > 80 px, mostly horizontal |
//! | `SWIPE_UP` / `SWIPE_DOWN` | index fingertip moved > 80 px, mostly vertical |
//! | `PINCH` | thumb tip and index tip closer than 0.05 (normalized) |
//! | `OPEN_PALM` | all five fingers extended |
//! | `FIST` | no finger extended |
//!
//! A swipe may co-occur with one static pose in the same frame; the static
//! poses are mutually exclusive and checked in the order listed.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Instant;
//! use hand_gesture::{Classifier, Dispatcher, pose};
//! use hand_gesture::dispatcher::RecordingTransport;
//!
//! let transport = Arc::new(RecordingTransport::with_peers(1));
//! let dispatcher = Dispatcher::new(Arc::clone(&transport));
//! let mut classifier = Classifier::default();
//!
//! let now = Instant::now();
//! for event in classifier.classify(&pose::fist(0.5, 0.5), now) {
//!     dispatcher.dispatch(event, now);
//! }
//! assert_eq!(transport.sent(), vec!["FIST".to_string()]);
//! ```

pub mod landmark;
pub mod finger;
pub mod event;
pub mod config;
pub mod classifier;
pub mod dispatcher;
pub mod pose;

pub use landmark::{DetectedHand, Handedness, LandmarkError, LandmarkFrame, Point, select_hand};
pub use finger::{Finger, FingerStateVector};
pub use event::{GestureEvent, ParseGestureError};
pub use config::{ClassifierConfig, DispatchConfig};
pub use classifier::{Classifier, MotionTrackState};
pub use dispatcher::{CooldownState, Dispatcher, Transport};
