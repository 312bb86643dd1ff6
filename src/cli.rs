use crate::engine::{EngineControl, SequencerEngine};
use crate::model::{RunConfig, Scene, SceneEvent};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "prologue-cli",
    version,
    about = "Narrative prologue player with typewriter text and audio cues"
)]
pub struct Cli {
    /// Play unattended and print a text transcript (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Play unattended and print the run summary as JSON (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Reveal interval per character
    #[arg(long, default_value = "100ms")]
    pub tick: humantime::Duration,

    /// How long the title card holds before the first narration
    #[arg(long, default_value = "5s")]
    pub intro_hold: humantime::Duration,

    /// Pause after a narration finishes revealing
    #[arg(long, default_value = "2s")]
    pub post_delay: humantime::Duration,

    /// Pause after the finale finishes revealing
    #[arg(long, default_value = "3s")]
    pub finale_hold: humantime::Duration,

    /// Disable background audio entirely
    #[arg(long)]
    pub no_audio: bool,

    /// Start with audio cues muted
    #[arg(long)]
    pub muted: bool,

    /// Background track volume at start
    #[arg(long, default_value_t = 0.5)]
    pub volume: f32,

    /// Background track source id
    #[arg(long, default_value = crate::script::BGM_SOURCE)]
    pub bgm: String,

    /// In the TUI, begin and finish automatically without keypresses
    #[arg(long)]
    pub hands_free: bool,

    /// Export the run summary as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!(
            "--json and --text are mutually exclusive. Pick one output mode."
        ));
    }

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_headless(args).await;
        }
    }

    run_headless(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        tick: Duration::from(args.tick),
        intro_hold: Duration::from(args.intro_hold),
        post_delay: Duration::from(args.post_delay),
        finale_hold: Duration::from(args.finale_hold),
        audio: !args.no_audio,
        start_muted: args.muted,
        volume: args.volume.clamp(0.0, 1.0),
        bgm_source: args.bgm.clone(),
    }
}

/// Run the engine unattended: begin at once, finish the terminal scene as
/// soon as it is reached, and print per the selected output mode.
async fn run_headless(args: Cli) -> Result<()> {
    // Headless runs own stderr, so the telemetry sink can write there too.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cfg = build_config(&args);
    let quiet = args.json;
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<SceneEvent>();
    let (ctrl_tx, ctrl_rx) = mpsc::unbounded_channel::<EngineControl>();

    let engine = SequencerEngine::new(cfg.clone());
    let handle = tokio::spawn(async move { engine.run(evt_tx, ctrl_rx).await });
    let _ = ctrl_tx.send(EngineControl::Begin);

    while let Some(ev) = evt_rx.recv().await {
        match ev {
            SceneEvent::SceneEntered { scene } => {
                if !quiet {
                    let _ = out_tx.send(OutputLine::Stderr(format!("== {scene} ==")));
                    if let Some(title) = scene.spec(&cfg).title {
                        let _ = out_tx.send(OutputLine::Stderr(title.to_string()));
                    }
                }
                if scene == Scene::Complete {
                    // The terminal scene waits for an explicit action.
                    let _ = ctrl_tx.send(EngineControl::Skip);
                }
            }
            SceneEvent::RevealProgress { scene, done, .. } => {
                if done && !quiet {
                    let spec = scene.spec(&cfg);
                    if let Some(speaker) = spec.speaker {
                        let _ = out_tx.send(OutputLine::Stderr(format!("{speaker}:")));
                    }
                    if let Some(text) = spec.text {
                        for line in text.lines() {
                            let _ = out_tx.send(OutputLine::Stderr(line.to_string()));
                        }
                    }
                }
            }
            SceneEvent::Info(info) => {
                if !quiet {
                    let _ = out_tx.send(OutputLine::Stderr(info.to_message()));
                }
            }
            // Cues and fade progress only matter to interactive rendering.
            SceneEvent::Cue { .. }
            | SceneEvent::MuteChanged { .. }
            | SceneEvent::FadeTick { .. }
            | SceneEvent::RunCompleted { .. } => {}
        }
    }

    let summary = handle
        .await
        .context("engine task failed")?
        .context("narrative run failed")?;

    handle_exports(&args, &summary)?;

    if args.json {
        let out = serde_json::to_string_pretty(&summary)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        for line in crate::text_summary::build_text_summary(&summary).lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Handle export operations for both text and JSON modes.
pub fn handle_exports(args: &Cli, summary: &crate::model::RunSummary) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        let out = serde_json::to_string_pretty(summary)?;
        std::fs::write(p, out).with_context(|| format!("export summary to {}", p.display()))?;
    }
    Ok(())
}
