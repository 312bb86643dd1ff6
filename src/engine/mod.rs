//! Scene sequencing engine.
//!
//! One tokio task owns the whole run: scene state, typewriter, audio
//! controller and every live timer. All waits go through a single deadline
//! slot, so entering a new scene replaces (and thereby cancels) whatever the
//! previous scene was waiting on. A timer belonging to a superseded scene can
//! never fire because it no longer exists.

pub mod audio;
pub mod typewriter;

use crate::model::{
    AdvanceReason, AdvanceRule, InfoEvent, RunConfig, RunSummary, Scene, SceneEvent, SceneVisit,
};
use anyhow::Result;
use audio::{AudioBackend, AudioCueController, CueOutcome, SilentBackend, FADE_STEP};
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant, Sleep};
use typewriter::Typewriter;

#[derive(Debug, Clone)]
pub enum EngineControl {
    /// Leave the start screen and begin the narrative.
    Begin,
    /// Complete the current reveal, or advance if nothing is revealing.
    Skip,
    ToggleMute,
    /// Tear down immediately: no fade, no completion.
    Cancel,
}

/// What the pending deadline, if any, means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Waiting {
    Idle,
    TypingTick,
    AutoAdvance,
    PostDelay,
    FadeStep,
}

/// Instruction from a state handler back to the run loop.
enum Step {
    /// Leave the current deadline in place.
    Keep,
    /// Drop the deadline and wait for control messages only.
    Park,
    /// Replace the deadline.
    Wait(Waiting, std::time::Duration),
    Finish,
}

enum Input {
    Control(Option<EngineControl>),
    Deadline,
}

pub struct SequencerEngine {
    cfg: RunConfig,
    backend: Box<dyn AudioBackend>,
}

impl SequencerEngine {
    pub fn new(cfg: RunConfig) -> Self {
        Self::with_backend(cfg, Box::new(SilentBackend))
    }

    pub fn with_backend(cfg: RunConfig, backend: Box<dyn AudioBackend>) -> Self {
        Self { cfg, backend }
    }

    pub async fn run(
        self,
        event_tx: mpsc::UnboundedSender<SceneEvent>,
        mut control_rx: mpsc::UnboundedReceiver<EngineControl>,
    ) -> Result<RunSummary> {
        let mut st = RunState::new(self.cfg, self.backend, event_tx);
        // The single wait slot. Dropping a Sleep cancels it, so every
        // transition that replaces the slot retires the old scene's timer.
        let mut deadline: Option<Pin<Box<Sleep>>> = None;
        st.enter_start();

        loop {
            let input = tokio::select! {
                cmd = control_rx.recv() => Input::Control(cmd),
                _ = wait_for(&mut deadline) => Input::Deadline,
            };
            let step = match input {
                Input::Control(Some(EngineControl::Begin)) => st.begin(),
                Input::Control(Some(EngineControl::Skip)) => st.skip(),
                Input::Control(Some(EngineControl::ToggleMute)) => st.toggle_mute(),
                // A dropped control channel means the host went away.
                Input::Control(Some(EngineControl::Cancel)) | Input::Control(None) => st.cancel(),
                Input::Deadline => st.deadline_fired(),
            };
            match step {
                Step::Keep => {}
                Step::Park => {
                    st.waiting = Waiting::Idle;
                    deadline = None;
                }
                Step::Wait(waiting, after) => {
                    st.waiting = waiting;
                    deadline = Some(Box::pin(sleep(after)));
                }
                Step::Finish => break,
            }
        }

        Ok(st.into_summary())
    }
}

/// Await the pending deadline, or forever when there is none.
async fn wait_for(slot: &mut Option<Pin<Box<Sleep>>>) {
    match slot.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => futures::future::pending().await,
    }
}

struct RunState {
    cfg: RunConfig,
    scene: Scene,
    typewriter: Typewriter,
    audio: AudioCueController,
    event_tx: mpsc::UnboundedSender<SceneEvent>,
    waiting: Waiting,
    started_at: Instant,
    visits: Vec<SceneVisit>,
    skips: u32,
    audio_started: bool,
    completed: bool,
}

impl RunState {
    fn new(
        cfg: RunConfig,
        backend: Box<dyn AudioBackend>,
        event_tx: mpsc::UnboundedSender<SceneEvent>,
    ) -> Self {
        let audio = AudioCueController::new(
            backend,
            cfg.bgm_source.clone(),
            cfg.start_muted,
            cfg.volume,
        );
        Self {
            scene: Scene::Start,
            typewriter: Typewriter::idle(),
            audio,
            event_tx,
            waiting: Waiting::Idle,
            started_at: Instant::now(),
            visits: Vec::new(),
            skips: 0,
            audio_started: false,
            completed: false,
            cfg,
        }
    }

    fn send(&self, ev: SceneEvent) {
        let _ = self.event_tx.send(ev);
    }

    fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    fn enter_start(&mut self) {
        self.visits.push(SceneVisit {
            scene: Scene::Start,
            entered_at_ms: 0,
            advanced_by: None,
        });
        self.send(SceneEvent::SceneEntered {
            scene: Scene::Start,
        });
    }

    fn begin(&mut self) -> Step {
        if self.scene != Scene::Start {
            return Step::Keep;
        }
        if self.cfg.audio {
            match self.audio.enable() {
                Ok(()) => self.audio_started = true,
                Err(e) => {
                    tracing::warn!(error = %e, "background audio failed to start");
                    self.send(SceneEvent::Info(InfoEvent::AudioUnavailable {
                        reason: format!("{e:#}"),
                    }));
                }
            }
        }
        self.enter(Scene::Intro, AdvanceReason::Begin)
    }

    /// Scene entry: close out the previous visit, reset typing state, request
    /// cues, and arm whatever the new scene waits on. Replacing the deadline
    /// happens in the run loop when the returned `Step` is applied.
    fn enter(&mut self, scene: Scene, via: AdvanceReason) -> Step {
        if let Some(prev) = self.visits.last_mut() {
            prev.advanced_by = Some(via);
        }
        self.scene = scene;
        self.typewriter = Typewriter::idle();
        self.visits.push(SceneVisit {
            scene,
            entered_at_ms: self.elapsed_ms(),
            advanced_by: None,
        });
        self.send(SceneEvent::SceneEntered { scene });

        let spec = scene.spec(&self.cfg);
        if via != AdvanceReason::Begin && spec.cue.is_some() {
            self.request_cue("transition");
        }
        if let Some(cue) = spec.cue {
            self.request_cue(cue);
        }
        if let Some(text) = spec.text {
            self.typewriter = Typewriter::start(text);
            self.send(SceneEvent::RevealProgress {
                scene,
                revealed: 0,
                done: false,
            });
            return Step::Wait(Waiting::TypingTick, self.cfg.tick);
        }
        match spec.advance {
            AdvanceRule::Hold { duration } => Step::Wait(Waiting::AutoAdvance, duration),
            _ => Step::Park,
        }
    }

    fn request_cue(&mut self, name: &str) {
        if self.audio.request_cue(name) == CueOutcome::Played {
            self.send(SceneEvent::Cue {
                name: name.to_string(),
            });
        }
    }

    fn deadline_fired(&mut self) -> Step {
        match self.waiting {
            Waiting::TypingTick => {
                if !self.typewriter.is_revealing() {
                    return self.arm_post_reveal();
                }
                let out = self.typewriter.advance();
                if out.cue {
                    self.request_cue("typing");
                }
                self.send(SceneEvent::RevealProgress {
                    scene: self.scene,
                    revealed: out.revealed,
                    done: out.completed,
                });
                if out.completed {
                    self.arm_post_reveal()
                } else {
                    Step::Wait(Waiting::TypingTick, self.cfg.tick)
                }
            }
            Waiting::AutoAdvance => self.advance(AdvanceReason::Timer),
            Waiting::PostDelay => {
                // Re-check against the live typewriter, not a snapshot taken
                // when the delay was armed.
                if self.typewriter.is_complete() {
                    self.advance(AdvanceReason::TextComplete)
                } else {
                    Step::Wait(Waiting::TypingTick, self.cfg.tick)
                }
            }
            Waiting::FadeStep => {
                if self.audio.fade_step() {
                    self.completed = true;
                    Step::Finish
                } else {
                    self.send(SceneEvent::FadeTick {
                        volume: self.audio.volume(),
                    });
                    Step::Wait(Waiting::FadeStep, FADE_STEP)
                }
            }
            Waiting::Idle => Step::Park,
        }
    }

    fn arm_post_reveal(&mut self) -> Step {
        match self.scene.spec(&self.cfg).advance {
            AdvanceRule::OnTextComplete { post_delay } => {
                Step::Wait(Waiting::PostDelay, post_delay)
            }
            AdvanceRule::Hold { duration } => Step::Wait(Waiting::AutoAdvance, duration),
            AdvanceRule::Await => Step::Park,
        }
    }

    fn advance(&mut self, via: AdvanceReason) -> Step {
        match self.scene.next() {
            Some(next) => self.enter(next, via),
            None => self.finish(),
        }
    }

    fn skip(&mut self) -> Step {
        if self.scene == Scene::Start || self.waiting == Waiting::FadeStep {
            // Nothing to skip on the start screen; during fade-out the run is
            // already completing.
            return Step::Keep;
        }
        self.skips += 1;
        if self.typewriter.is_revealing() {
            // First skip only completes the reveal; a second one advances.
            self.typewriter.complete_immediately();
            self.send(SceneEvent::RevealProgress {
                scene: self.scene,
                revealed: self.typewriter.revealed(),
                done: true,
            });
            return self.arm_post_reveal();
        }
        if self.scene == Scene::Complete {
            return self.finish();
        }
        self.advance(AdvanceReason::Skipped)
    }

    /// Run completion from the terminal scene: fade the track to silence,
    /// then stop. With no live track there is nothing to fade.
    fn finish(&mut self) -> Step {
        if let Some(last) = self.visits.last_mut() {
            last.advanced_by = Some(AdvanceReason::Finished);
        }
        if !self.audio.has_track() {
            self.completed = true;
            return Step::Finish;
        }
        Step::Wait(Waiting::FadeStep, FADE_STEP)
    }

    fn toggle_mute(&mut self) -> Step {
        let muted = self.audio.toggle_mute();
        self.send(SceneEvent::MuteChanged { muted });
        Step::Keep
    }

    fn cancel(&mut self) -> Step {
        self.audio.stop_now();
        if let Some(last) = self.visits.last_mut() {
            last.advanced_by = Some(AdvanceReason::Cancelled);
        }
        self.completed = false;
        Step::Finish
    }

    fn into_summary(self) -> RunSummary {
        RunSummary {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            completed: self.completed,
            skips: self.skips,
            cues_played: self.audio.cues_played(),
            cues_suppressed: self.audio.cues_suppressed(),
            audio_started: self.audio_started,
            scenes: self.visits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::audio::testing::{FailingBackend, RecordingBackend, SinkCommand};
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    /// Generous guard so a logic bug fails the test instead of hanging it.
    /// Under the paused clock this costs no wall time.
    const GUARD: Duration = Duration::from_secs(600);

    struct Harness {
        ctrl: UnboundedSender<EngineControl>,
        events: UnboundedReceiver<SceneEvent>,
        handle: JoinHandle<Result<RunSummary>>,
    }

    fn spawn_engine(backend: Box<dyn AudioBackend>) -> Harness {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (ctrl, control_rx) = mpsc::unbounded_channel();
        let engine = SequencerEngine::with_backend(RunConfig::default(), backend);
        let handle = tokio::spawn(async move { engine.run(event_tx, control_rx).await });
        Harness {
            ctrl,
            events,
            handle,
        }
    }

    impl Harness {
        fn send(&self, c: EngineControl) {
            self.ctrl.send(c).expect("engine is gone");
        }

        async fn event(&mut self) -> SceneEvent {
            timeout(GUARD, self.events.recv())
                .await
                .expect("timed out waiting for an event")
                .expect("engine closed its event channel")
        }

        /// Consume events until the given scene is entered; any other scene
        /// entry in between is a sequencing bug.
        async fn until_scene(&mut self, scene: Scene) {
            loop {
                if let SceneEvent::SceneEntered { scene: entered } = self.event().await {
                    assert_eq!(entered, scene, "unexpected scene transition");
                    return;
                }
            }
        }

        async fn summary(self) -> RunSummary {
            timeout(GUARD, self.handle)
                .await
                .expect("engine hung")
                .expect("engine task panicked")
                .expect("run failed")
        }
    }

    fn beat1_len() -> usize {
        Scene::Beat1.spec(&RunConfig::default()).char_len()
    }

    /// Elapsed-time assertion with a small allowance for timer granularity.
    fn assert_elapsed(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(20),
            "elapsed {actual:?}, expected ~{expected:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timers_advance_scenes_on_schedule() {
        let mut h = spawn_engine(Box::new(SilentBackend));
        h.until_scene(Scene::Start).await;

        let t0 = Instant::now();
        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;
        h.until_scene(Scene::Beat1).await;
        assert_elapsed(t0.elapsed(), Duration::from_secs(5));

        h.until_scene(Scene::Beat2).await;
        let reveal = Duration::from_millis(100) * beat1_len() as u32;
        assert_elapsed(
            t0.elapsed(),
            Duration::from_secs(5) + reveal + Duration::from_secs(2),
        );

        h.send(EngineControl::Cancel);
        let summary = h.summary().await;
        assert!(!summary.completed);
        let reasons: Vec<_> = summary.scenes.iter().map(|v| v.advanced_by).collect();
        assert_eq!(
            reasons,
            vec![
                Some(AdvanceReason::Begin),
                Some(AdvanceReason::Timer),
                Some(AdvanceReason::TextComplete),
                Some(AdvanceReason::Cancelled),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_is_one_character_per_tick_with_no_overshoot() {
        let mut h = spawn_engine(Box::new(SilentBackend));
        h.until_scene(Scene::Start).await;
        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;
        h.send(EngineControl::Skip);
        h.until_scene(Scene::Beat1).await;

        let entered = Instant::now();
        let len = beat1_len();
        let mut expected = 0usize;
        let mut typing_cues = 0usize;
        loop {
            match h.event().await {
                SceneEvent::RevealProgress {
                    scene,
                    revealed,
                    done,
                } => {
                    assert_eq!(scene, Scene::Beat1);
                    if revealed == 0 && !done {
                        // Entry marker emitted before the first tick.
                        continue;
                    }
                    expected += 1;
                    assert_eq!(revealed, expected, "reveal must advance by exactly one");
                    assert!(revealed <= len, "reveal must not overshoot");
                    if done {
                        assert_eq!(revealed, len);
                        break;
                    }
                }
                SceneEvent::Cue { name } if name == "typing" => typing_cues += 1,
                SceneEvent::Cue { .. } => {}
                other => panic!("unexpected event during reveal: {other:?}"),
            }
        }
        assert_elapsed(entered.elapsed(), Duration::from_millis(100) * len as u32);
        // One typing cue per three characters, starting with the first.
        assert_eq!(typing_cues, len.div_ceil(3));

        h.send(EngineControl::Cancel);
        h.summary().await;
    }

    #[tokio::test(start_paused = true)]
    async fn skip_while_revealing_completes_text_without_advancing() {
        let mut h = spawn_engine(Box::new(SilentBackend));
        h.until_scene(Scene::Start).await;
        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;
        h.send(EngineControl::Skip);
        h.until_scene(Scene::Beat1).await;

        // Let a few characters land first.
        let mut revealed = 0usize;
        while revealed < 3 {
            if let SceneEvent::RevealProgress { revealed: r, .. } = h.event().await {
                revealed = r;
            }
        }

        let skipped_at = Instant::now();
        h.send(EngineControl::Skip);
        let len = beat1_len();
        loop {
            match h.event().await {
                SceneEvent::RevealProgress { revealed, done, .. } => {
                    if done {
                        assert_eq!(revealed, len);
                        break;
                    }
                    // At most one already-armed tick may land before the skip.
                    assert!(revealed <= len);
                }
                SceneEvent::Cue { .. } => {}
                other => panic!("scene must not change while the skip completes: {other:?}"),
            }
        }

        // The post-delay still applies before the next scene.
        h.until_scene(Scene::Beat2).await;
        assert!(skipped_at.elapsed() >= Duration::from_secs(2));

        h.send(EngineControl::Cancel);
        let summary = h.summary().await;
        assert_eq!(summary.skips, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn second_skip_advances_without_waiting_out_the_post_delay() {
        let mut h = spawn_engine(Box::new(SilentBackend));
        h.until_scene(Scene::Start).await;
        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;
        h.send(EngineControl::Skip);
        h.until_scene(Scene::Beat1).await;

        let t0 = Instant::now();
        h.send(EngineControl::Skip); // completes the reveal
        h.send(EngineControl::Skip); // advances immediately
        h.until_scene(Scene::Beat2).await;
        assert!(
            t0.elapsed() < Duration::from_secs(1),
            "double skip must bypass the post-delay"
        );

        h.send(EngineControl::Cancel);
        h.summary().await;
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_scene_timer_never_fires() {
        let mut h = spawn_engine(Box::new(SilentBackend));
        h.until_scene(Scene::Start).await;
        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;
        // Skip out of the intro hold right away. Its 5s timer deadline falls
        // well inside beat1's reveal; if it survived the transition we would
        // see a second transition below.
        h.send(EngineControl::Skip);

        let mut entered = Vec::new();
        loop {
            match h.event().await {
                SceneEvent::SceneEntered { scene } => {
                    entered.push(scene);
                    if scene == Scene::Beat2 {
                        break;
                    }
                }
                _ => {}
            }
        }
        assert_eq!(entered, vec![Scene::Beat1, Scene::Beat2]);

        h.send(EngineControl::Cancel);
        h.summary().await;
    }

    #[tokio::test(start_paused = true)]
    async fn skip_and_begin_are_ignored_where_invalid() {
        let mut h = spawn_engine(Box::new(SilentBackend));
        h.until_scene(Scene::Start).await;
        h.send(EngineControl::Skip); // no-op on the start screen
        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;
        h.send(EngineControl::Begin); // no-op once begun
        h.send(EngineControl::Skip);
        h.until_scene(Scene::Beat1).await;

        h.send(EngineControl::Cancel);
        let summary = h.summary().await;
        assert_eq!(summary.skips, 1, "ignored skips must not be counted");
    }

    #[tokio::test(start_paused = true)]
    async fn mute_before_begin_creates_track_but_suppresses_cues() {
        let (backend, log) = RecordingBackend::new();
        let mut h = spawn_engine(Box::new(backend));
        h.until_scene(Scene::Start).await;

        h.send(EngineControl::ToggleMute);
        match h.event().await {
            SceneEvent::MuteChanged { muted } => assert!(muted),
            other => panic!("expected mute change, got {other:?}"),
        }

        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;
        let cmds = log.commands();
        assert!(cmds.contains(&SinkCommand::Created("sounds/prologue.ogg".into())));
        assert!(cmds.contains(&SinkCommand::SetMuted(true)));
        assert!(cmds.contains(&SinkCommand::Play));

        // Muted: the whole first reveal passes without a single cue event.
        h.send(EngineControl::Skip);
        loop {
            match h.event().await {
                SceneEvent::Cue { name } => panic!("cue {name} despite mute"),
                SceneEvent::SceneEntered { scene } => {
                    assert_eq!(scene, Scene::Beat1);
                    break;
                }
                _ => {}
            }
        }

        // Unmute and advance: cues flow again.
        h.send(EngineControl::ToggleMute);
        h.send(EngineControl::Skip);
        h.send(EngineControl::Skip);
        loop {
            match h.event().await {
                SceneEvent::Cue { .. } => break,
                _ => {}
            }
        }

        h.send(EngineControl::Cancel);
        let summary = h.summary().await;
        assert!(summary.cues_suppressed >= 2);
        assert!(summary.cues_played >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn audio_failure_is_nonfatal() {
        let mut h = spawn_engine(Box::new(FailingBackend));
        h.until_scene(Scene::Start).await;
        h.send(EngineControl::Begin);

        let mut saw_unavailable = false;
        loop {
            match h.event().await {
                SceneEvent::Info(InfoEvent::AudioUnavailable { .. }) => saw_unavailable = true,
                SceneEvent::SceneEntered { scene } => {
                    assert_eq!(scene, Scene::Intro);
                    break;
                }
                _ => {}
            }
        }
        assert!(saw_unavailable, "audio failure must be surfaced");

        h.send(EngineControl::Cancel);
        let summary = h.summary().await;
        assert!(!summary.audio_started);
    }

    #[tokio::test(start_paused = true)]
    async fn completing_the_run_fades_out_and_reports_once() {
        let (backend, log) = RecordingBackend::new();
        let mut h = spawn_engine(Box::new(backend));
        h.until_scene(Scene::Start).await;
        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;
        h.send(EngineControl::Skip);
        for scene in [Scene::Beat1, Scene::Beat2, Scene::Dialogue, Scene::Finale] {
            h.until_scene(scene).await;
            h.send(EngineControl::Skip); // complete the reveal
            h.send(EngineControl::Skip); // advance
        }
        h.until_scene(Scene::Complete).await;

        let t0 = Instant::now();
        h.send(EngineControl::Skip); // triggers the fade-out
        h.send(EngineControl::Skip); // ignored while fading
        h.send(EngineControl::Skip); // ignored while fading

        let mut volumes = Vec::new();
        while let Ok(Some(ev)) = timeout(GUARD, h.events.recv()).await {
            if let SceneEvent::FadeTick { volume } = ev {
                volumes.push(volume);
            }
        }
        // 0.5 down to the 0.05 floor in 0.05 steps, then release.
        assert_eq!(volumes.len(), 9);
        assert!((volumes[0] - 0.45).abs() < 1e-6);
        assert!(volumes.last().copied().expect("fade ticks") <= 0.05 + 1e-6);
        assert_elapsed(t0.elapsed(), Duration::from_millis(1000));

        let summary = h.summary().await;
        assert!(summary.completed);
        // intro skip + two per text scene + the finishing skip; the skips
        // sent during the fade are ignored.
        assert_eq!(summary.skips, 10);
        assert_eq!(
            summary.scenes.last().and_then(|v| v.advanced_by),
            Some(AdvanceReason::Finished)
        );

        let cmds = log.commands();
        assert_eq!(cmds.last(), Some(&SinkCommand::Pause));
        assert_eq!(
            cmds.iter().filter(|c| **c == SinkCommand::Pause).count(),
            1,
            "the track is released exactly once"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_audio_immediately_without_fade() {
        let (backend, log) = RecordingBackend::new();
        let mut h = spawn_engine(Box::new(backend));
        h.until_scene(Scene::Start).await;
        h.send(EngineControl::Begin);
        h.until_scene(Scene::Intro).await;

        h.send(EngineControl::Cancel);
        while let Ok(Some(ev)) = timeout(GUARD, h.events.recv()).await {
            assert!(
                !matches!(ev, SceneEvent::FadeTick { .. }),
                "cancel must not fade"
            );
        }
        let summary = h.summary().await;
        assert!(!summary.completed);
        assert_eq!(log.commands().last(), Some(&SinkCommand::Pause));
    }
}
