//! gesture_relay: command-line entry point.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use gesture_relay::app::{self, AppConfig, SourceKind};
use gesture_relay::pipeline::{HandSelection, MIN_HAND_CONFIDENCE};
use gesture_relay::server::{DEFAULT_HOST, DEFAULT_PORT};
use hand_gesture::config::{
    COOLDOWN_WINDOW, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, MOTION_THRESHOLD_PX,
    PINCH_THRESHOLD, SWIPE_MIN_INTERVAL,
};
use hand_gesture::{ClassifierConfig, DispatchConfig};

#[derive(Parser, Debug)]
#[command(name = "gesture_relay", version, about = "Relay hand gestures to WebSocket clients")]
struct Cli {
    /// Landmark source
    #[arg(long, value_enum, default_value_t = SourceKind::Sim)]
    source: SourceKind,

    /// JSON-lines recording to play (with --source replay)
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// Play the recording back in real time
    #[arg(long)]
    pace: bool,

    /// Show the skeleton preview window for replay/leap sources
    #[arg(long)]
    preview: bool,

    /// Address to listen on
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Source image width used for fingertip pixel coordinates
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH)]
    frame_width: u32,

    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT)]
    frame_height: u32,

    /// Fingertip travel in pixels that counts as a swipe
    #[arg(long, default_value_t = MOTION_THRESHOLD_PX)]
    motion_threshold: i32,

    /// Minimum seconds between swipes
    #[arg(long, value_parser = parse_secs, default_value_t = SWIPE_MIN_INTERVAL.as_secs_f64())]
    swipe_interval: f64,

    /// Thumb–index distance (normalized) below which the hand pinches
    #[arg(long, default_value_t = PINCH_THRESHOLD)]
    pinch_threshold: f32,

    /// Seconds before the same gesture may be sent again
    #[arg(long, value_parser = parse_secs, default_value_t = COOLDOWN_WINDOW.as_secs_f64())]
    cooldown: f64,

    /// Ignore hands detected with lower confidence
    #[arg(long, default_value_t = MIN_HAND_CONFIDENCE)]
    min_confidence: f32,

    /// Flip landmarks horizontally (selfie camera)
    #[arg(long)]
    mirror: bool,
}

fn parse_secs(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(format!("expected a non-negative number of seconds, got {s}"))
    }
}

/// Whole milliseconds, so `1.2` is exactly 1200 ms.
fn secs(v: f64) -> Duration {
    Duration::from_millis((v * 1000.0).round() as u64)
}

impl Cli {
    fn into_config(self) -> AppConfig {
        AppConfig {
            source:      self.source,
            replay_path: self.replay,
            pace:        self.pace,
            preview:     self.preview,
            host:        self.host,
            port:        self.port,
            classifier:  ClassifierConfig {
                frame_width:         self.frame_width,
                frame_height:        self.frame_height,
                motion_threshold_px: self.motion_threshold,
                swipe_min_interval:  secs(self.swipe_interval),
                pinch_threshold:     self.pinch_threshold,
            },
            dispatch:    DispatchConfig { cooldown: secs(self.cooldown) },
            selection:   HandSelection {
                min_confidence: self.min_confidence,
                mirror:         self.mirror,
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_relay=info,hand_gesture=info".into()),
        )
        .init();

    info!("gesture_relay v{} starting", env!("CARGO_PKG_VERSION"));

    let summary = app::run(cli.into_config())?;

    println!(
        "frames: {}  with hand: {}  candidates: {}  sent: {}",
        summary.frames, summary.frames_with_hand, summary.candidates, summary.sent
    );
    Ok(())
}
