//! Run lifecycle controller.
//!
//! Owns start/stop/replay orchestration and emits events for presentation
//! layers. The engine task is the only owner of narrative state; this layer
//! just routes commands to it and observes its completion, so `RunCompleted`
//! is emitted exactly once per run no matter how the run ended up finishing.

use crate::cli::{build_config, Cli};
use crate::engine::{EngineControl, SequencerEngine};
use crate::model::{InfoEvent, RunConfig, RunSummary, SceneEvent};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by UI layers to control the running narrative.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Begin,
    Skip,
    ToggleMute,
    Replay,
    Quit,
}

/// Internal handle for a running narrative task.
struct RunCtx {
    ctrl_tx: UnboundedSender<EngineControl>,
    handle: Option<tokio::task::JoinHandle<Result<RunSummary>>>,
}

/// Spawn a new narrative run and return its control handle.
fn start_run(args: &Cli, event_tx: UnboundedSender<SceneEvent>) -> RunCtx {
    let cfg: RunConfig = build_config(args);
    let (ctrl_tx, ctrl_rx) = tokio::sync::mpsc::unbounded_channel::<EngineControl>();
    let engine = SequencerEngine::new(cfg);
    let handle = tokio::spawn(async move { engine.run(event_tx, ctrl_rx).await });
    RunCtx {
        ctrl_tx,
        handle: Some(handle),
    }
}

/// Orchestrate narrative runs based on UI commands and emit events back to
/// presentation layers.
pub(crate) async fn run_controller(
    args: &Cli,
    event_tx: UnboundedSender<SceneEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    // A run always exists at launch; the engine idles on its start screen
    // until the UI sends Begin.
    let mut run_ctx = Some(start_run(args, event_tx.clone()));
    let mut replay_pending = false;
    let mut quit_pending = false;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Begin) => {
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Begin);
                        }
                    }
                    Some(UiCommand::Skip) => {
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Skip);
                        }
                    }
                    Some(UiCommand::ToggleMute) => {
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::ToggleMute);
                        }
                    }
                    Some(UiCommand::Replay) => {
                        // Replay is serialized: cancel the active run first,
                        // then start a fresh one once we observe completion.
                        // A fresh engine also guarantees typing state and the
                        // audio handle start from scratch.
                        replay_pending = true;
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
                        } else {
                            run_ctx = Some(start_run(args, event_tx.clone()));
                            replay_pending = false;
                            let _ = event_tx.send(SceneEvent::Info(InfoEvent::Message(
                                "Replaying…".into(),
                            )));
                        }
                    }
                    Some(UiCommand::Quit) => {
                        // Quit waits for the current run to wind down so the
                        // audio handle is released before we return.
                        quit_pending = true;
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
                        } else {
                            break;
                        }
                    }
                    None => {
                        quit_pending = true;
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
                        } else {
                            break;
                        }
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it
            // can be dropped if another select branch is chosen, and we'll
            // never observe completion.
            maybe_done = async {
                if let Some(ctx) = &mut run_ctx {
                    if let Some(h) = ctx.handle.as_mut() {
                        return Some(h.await);
                    }
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    if let Some(ctx) = &mut run_ctx {
                        ctx.handle.take();
                    }
                    match join_res {
                        Ok(Ok(summary)) => {
                            if summary.completed {
                                let _ = event_tx.send(SceneEvent::RunCompleted {
                                    summary: Box::new(summary),
                                });
                            } else {
                                let _ = event_tx.send(SceneEvent::Info(InfoEvent::Message(
                                    "Run cancelled".into(),
                                )));
                            }
                        }
                        Ok(Err(e)) => {
                            let _ = event_tx.send(SceneEvent::Info(InfoEvent::Message(format!(
                                "Run failed: {e:#}"
                            ))));
                        }
                        Err(e) => {
                            let _ = event_tx.send(SceneEvent::Info(InfoEvent::Message(format!(
                                "Run join failed: {e}"
                            ))));
                        }
                    }
                    run_ctx = None;
                    if quit_pending {
                        break;
                    }
                    if replay_pending {
                        run_ctx = Some(start_run(args, event_tx.clone()));
                        replay_pending = false;
                        let _ = event_tx.send(SceneEvent::Info(InfoEvent::Message(
                            "Replaying…".into(),
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scene;
    use clap::Parser;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const GUARD: Duration = Duration::from_secs(600);

    fn test_args() -> Cli {
        Cli::parse_from(["prologue-cli"])
    }

    #[tokio::test(start_paused = true)]
    async fn quit_cancels_the_active_run_and_returns() {
        let args = test_args();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SceneEvent>();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
        let controller =
            tokio::spawn(async move { run_controller(&args, event_tx, cmd_rx).await });

        // The initial run idles on the start screen.
        match timeout(GUARD, event_rx.recv()).await.expect("event") {
            Some(SceneEvent::SceneEntered { scene }) => assert_eq!(scene, Scene::Start),
            other => panic!("expected start scene, got {other:?}"),
        }

        cmd_tx.send(UiCommand::Quit).expect("controller is gone");
        timeout(GUARD, controller)
            .await
            .expect("controller hung")
            .expect("controller panicked")
            .expect("controller failed");
    }

    #[tokio::test(start_paused = true)]
    async fn replay_starts_a_fresh_run_from_the_start_scene() {
        let args = test_args();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SceneEvent>();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
        let controller =
            tokio::spawn(async move { run_controller(&args, event_tx, cmd_rx).await });

        // First run: beyond the start screen.
        cmd_tx.send(UiCommand::Begin).expect("send");
        let mut seen_intro = false;
        while !seen_intro {
            if let Some(SceneEvent::SceneEntered { scene }) =
                timeout(GUARD, event_rx.recv()).await.expect("event")
            {
                seen_intro = scene == Scene::Intro;
            }
        }

        cmd_tx.send(UiCommand::Replay).expect("send");
        // The fresh run re-enters the start scene with typing state reset.
        let mut starts = 0;
        while starts == 0 {
            match timeout(GUARD, event_rx.recv()).await.expect("event") {
                Some(SceneEvent::SceneEntered { scene }) if scene == Scene::Start => starts += 1,
                Some(_) => {}
                None => panic!("controller closed the event channel early"),
            }
        }

        cmd_tx.send(UiCommand::Quit).expect("send");
        timeout(GUARD, controller)
            .await
            .expect("controller hung")
            .expect("controller panicked")
            .expect("controller failed");
    }
}
