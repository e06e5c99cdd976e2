//! Application wiring.
//!
//! `run` owns everything: the tokio runtime serving WebSocket clients, the
//! frame-loop thread, and (in simulation or preview mode) the window on the
//! main thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use hand_gesture::{ClassifierConfig, DispatchConfig, Dispatcher, Transport};

use crate::error::{RelayError, Result};
use crate::hub::PeerHub;
use crate::pipeline::{spawn_frame_loop, GesturePipeline, HandSelection, LoopSummary};
use crate::replay::ReplaySource;
use crate::server::{self, DEFAULT_HOST, DEFAULT_PORT};
use crate::sim::{SimInput, SimSource};
use crate::source::LandmarkSource;
use crate::visualizer::Visualizer;

const SERVER_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Keyboard/mouse simulated hand (opens a window).
    #[default]
    Sim,
    /// JSON-lines landmark recording.
    Replay,
    /// LeapMotion hardware (needs the `leap` feature).
    Leap,
}

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub source:      SourceKind,
    pub replay_path: Option<PathBuf>,
    /// Deliver replayed frames at their recorded times.
    pub pace:        bool,
    /// Show the skeleton window for non-sim sources too.
    pub preview:     bool,
    pub host:        String,
    pub port:        u16,
    pub classifier:  ClassifierConfig,
    pub dispatch:    DispatchConfig,
    pub selection:   HandSelection,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source:      SourceKind::Sim,
            replay_path: None,
            pace:        false,
            preview:     false,
            host:        DEFAULT_HOST.to_string(),
            port:        DEFAULT_PORT,
            classifier:  ClassifierConfig::default(),
            dispatch:    DispatchConfig::default(),
            selection:   HandSelection::default(),
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: &str| Err(RelayError::Config(msg.to_string()));

        if self.source == SourceKind::Replay && self.replay_path.is_none() {
            return bad("--source replay needs --replay <PATH>");
        }
        if self.source != SourceKind::Replay && self.replay_path.is_some() {
            warn!("--replay is ignored unless --source replay");
        }
        let c = &self.classifier;
        if c.frame_width == 0 || c.frame_height == 0 {
            return bad("frame size must be non-zero");
        }
        if c.motion_threshold_px <= 0 {
            return bad("motion threshold must be positive");
        }
        if !(c.pinch_threshold.is_finite() && c.pinch_threshold > 0.0) {
            return bad("pinch threshold must be a positive number");
        }
        let conf = self.selection.min_confidence;
        if !(0.0..=1.0).contains(&conf) {
            return bad("minimum confidence must be within 0..=1");
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run()
// ════════════════════════════════════════════════════════════════════════════

/// Run the relay until the source ends, the window closes, or Ctrl-C.
pub fn run(cfg: AppConfig) -> Result<LoopSummary> {
    cfg.validate()?;

    // ── Transport ─────────────────────────────────────────────────────────
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("relay-net")
        .build()?;

    let hub = Arc::new(PeerHub::new());
    let addr = cfg.bind_addr();
    let listener = runtime
        .block_on(TcpListener::bind(&addr))
        .map_err(|source| RelayError::Bind { addr: addr.clone(), source })?;
    info!(%addr, "listening for websocket clients");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = runtime.spawn(server::serve(listener, Arc::clone(&hub), async {
        let _ = stop_rx.await;
    }));

    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit = Arc::clone(&quit);
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping");
                quit.store(true, Ordering::Relaxed);
            }
        });
    }

    // ── Pipeline + source ─────────────────────────────────────────────────
    let pipeline = GesturePipeline::new(
        cfg.classifier.clone(),
        Dispatcher::with_config(Arc::clone(&hub), cfg.dispatch.clone()),
        cfg.selection,
    );
    let (sim_tx, source) = open_source(&cfg)?;

    let summary = if sim_tx.is_some() || cfg.preview {
        // Window first: if it cannot open, nothing has started yet.
        let mut vis = Visualizer::new(sim_tx)?;
        let (report_tx, report_rx) = mpsc::channel();
        let frame_loop = spawn_frame_loop(source, pipeline, Arc::clone(&quit), Some(report_tx))?;

        'window: while vis.is_open() && !frame_loop.is_finished() {
            if !vis.poll_input() { break; }
            loop {
                match report_rx.try_recv() {
                    Ok(outcome) => vis.observe(outcome),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'window,
                }
            }
            vis.render(hub.peer_count());
        }

        quit.store(true, Ordering::Relaxed);
        // Dropping the window drops the sim sender, which ends the sim source.
        drop(vis);
        frame_loop.join().map_err(|_| RelayError::FrameLoopPanicked)?
    } else {
        let frame_loop = spawn_frame_loop(source, pipeline, Arc::clone(&quit), None)?;
        frame_loop.join().map_err(|_| RelayError::FrameLoopPanicked)?
    };

    // ── Shutdown ──────────────────────────────────────────────────────────
    let _ = stop_tx.send(());
    match runtime.block_on(server) {
        Ok(Ok(())) => info!("server stopped"),
        Ok(Err(e)) => error!(error = %e, "server error"),
        Err(e) => error!(error = %e, "server task failed"),
    }
    runtime.shutdown_timeout(SERVER_SHUTDOWN_GRACE);

    Ok(summary)
}

type OpenedSource = (Option<Sender<SimInput>>, Box<dyn LandmarkSource>);

/// Build the configured landmark source.  The sender is present only for
/// the simulator, whose input comes from the window.
fn open_source(cfg: &AppConfig) -> Result<OpenedSource> {
    match cfg.source {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel();
            Ok((Some(tx), Box::new(SimSource::new(rx))))
        }
        SourceKind::Replay => {
            let path = cfg
                .replay_path
                .as_deref()
                .ok_or_else(|| RelayError::Config("--source replay needs --replay <PATH>".into()))?;
            Ok((None, Box::new(ReplaySource::open(path, cfg.pace)?)))
        }
        #[cfg(feature = "leap")]
        SourceKind::Leap => Ok((None, Box::new(crate::leap::LeapSource::open()?))),
        #[cfg(not(feature = "leap"))]
        SourceKind::Leap => Err(RelayError::Config(
            "built without LeapMotion support; rebuild with --features leap".into(),
        )),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
