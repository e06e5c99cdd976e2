//! Error type for the relay application.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A recorded frame that does not parse; `line` is 1-based.
    #[error("replay line {line}: {source}")]
    Replay {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("preview window: {0}")]
    Window(String),

    #[error("LeapMotion: {0}")]
    Leap(String),

    #[error("frame loop thread panicked")]
    FrameLoopPanicked,
}
