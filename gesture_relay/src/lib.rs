//! # gesture_relay
//!
//! Feeds hand landmarks through the [`hand_gesture`] classifier and relays
//! the debounced gesture labels to every connected WebSocket client.
//!
//! ## Threads
//!
//! | Thread | Owns |
//! |---|---|
//! | `frame-loop` | landmark source, classifier, dispatcher |
//! | `relay-net` (tokio) | axum server, one task pair per client |
//! | main | preview window (sim/preview mode), otherwise just waits |
//!
//! Clients connect to `ws://127.0.0.1:8765/` and receive one text message
//! per gesture, e.g. `SWIPE_LEFT`.  `GET /healthz` reports the peer count.
//!
//! ## Sources
//!
//! * `sim` (default): **Simulation mode**: a window whose keyboard drives a
//!   synthetic hand.
//! * `replay`: JSON-lines landmark recordings.
//! * `leap`: **Hardware mode**: polls a LeapMotion controller via LeapC
//!   (build with `--features leap`).
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Effect |
//! |---|---|
//! | Arrows / mouse drag | Move the index fingertip |
//! | `Shift`+arrow | Flick (swipe in that direction) |
//! | `P` | Pinch |
//! | `O` | Open palm |
//! | `F` | Fist |
//! | `N` | Neutral pointing hand |
//! | `H` | Hide / show the hand |
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod source;
pub mod replay;
pub mod sim;
pub mod pipeline;
pub mod hub;
pub mod server;
pub mod visualizer;
pub mod app;
#[cfg(feature = "leap")]
pub mod leap;

pub use error::{RelayError, Result};
