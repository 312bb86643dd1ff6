use crate::script;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Reveal interval per character.
    #[serde(with = "humantime_serde")]
    pub tick: Duration,
    /// How long the title card holds before the first narration.
    #[serde(with = "humantime_serde")]
    pub intro_hold: Duration,
    /// Pause after a narration finishes revealing.
    #[serde(with = "humantime_serde")]
    pub post_delay: Duration,
    /// Pause after the finale finishes revealing.
    #[serde(with = "humantime_serde")]
    pub finale_hold: Duration,
    pub audio: bool,
    pub start_muted: bool,
    pub volume: f32,
    pub bgm_source: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            intro_hold: Duration::from_secs(5),
            post_delay: Duration::from_secs(2),
            finale_hold: Duration::from_secs(3),
            audio: true,
            start_muted: false,
            volume: 0.5,
            bgm_source: script::BGM_SOURCE.to_string(),
        }
    }
}

/// One step of the narrative, in fixed forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    Start,
    Intro,
    Beat1,
    Beat2,
    Dialogue,
    Finale,
    Complete,
}

impl Scene {
    /// Successor in the fixed order; `None` for the terminal scene.
    pub fn next(self) -> Option<Scene> {
        match self {
            Scene::Start => Some(Scene::Intro),
            Scene::Intro => Some(Scene::Beat1),
            Scene::Beat1 => Some(Scene::Beat2),
            Scene::Beat2 => Some(Scene::Dialogue),
            Scene::Dialogue => Some(Scene::Finale),
            Scene::Finale => Some(Scene::Complete),
            Scene::Complete => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scene::Start => "start",
            Scene::Intro => "intro",
            Scene::Beat1 => "beat1",
            Scene::Beat2 => "beat2",
            Scene::Dialogue => "dialogue",
            Scene::Finale => "finale",
            Scene::Complete => "complete",
        }
    }

    /// Per-scene descriptor: payload text, audio cue, backdrop and advance policy.
    /// Keeping this a single table keeps the state machine data-driven.
    pub fn spec(self, cfg: &RunConfig) -> SceneSpec {
        match self {
            Scene::Start => SceneSpec {
                title: Some(script::TITLE),
                text: None,
                speaker: None,
                cue: None,
                backdrop: Backdrop::Starfield,
                advance: AdvanceRule::Await,
            },
            Scene::Intro => SceneSpec {
                title: Some(script::TITLE),
                text: None,
                speaker: None,
                cue: Some("title"),
                backdrop: Backdrop::Starfield,
                advance: AdvanceRule::Hold {
                    duration: cfg.intro_hold,
                },
            },
            Scene::Beat1 => SceneSpec {
                title: None,
                text: Some(script::BEAT1_TEXT),
                speaker: None,
                cue: Some("beat1"),
                backdrop: Backdrop::Sunrise,
                advance: AdvanceRule::OnTextComplete {
                    post_delay: cfg.post_delay,
                },
            },
            Scene::Beat2 => SceneSpec {
                title: None,
                text: Some(script::BEAT2_TEXT),
                speaker: None,
                cue: Some("beat2"),
                backdrop: Backdrop::Dusk,
                advance: AdvanceRule::OnTextComplete {
                    post_delay: cfg.post_delay,
                },
            },
            Scene::Dialogue => SceneSpec {
                title: None,
                text: Some(script::DIALOGUE_TEXT),
                speaker: Some(script::DIALOGUE_SPEAKER),
                cue: Some("dialogue"),
                backdrop: Backdrop::Starfield,
                advance: AdvanceRule::OnTextComplete {
                    post_delay: cfg.post_delay,
                },
            },
            Scene::Finale => SceneSpec {
                title: Some(script::FINALE_TITLE),
                text: Some(script::FINALE_TEXT),
                speaker: None,
                cue: Some("finale"),
                backdrop: Backdrop::Starfield,
                advance: AdvanceRule::OnTextComplete {
                    post_delay: cfg.finale_hold,
                },
            },
            Scene::Complete => SceneSpec {
                title: Some(script::COMPLETE_TITLE),
                text: None,
                speaker: None,
                cue: None,
                backdrop: Backdrop::Starfield,
                advance: AdvanceRule::Await,
            },
        }
    }
}

impl std::fmt::Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation-only tag looked up by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backdrop {
    Starfield,
    Sunrise,
    Dusk,
}

/// Condition under which a scene transitions onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceRule {
    /// Wait for an explicit user action.
    Await,
    /// One-shot timer, then the next scene.
    Hold { duration: Duration },
    /// Once the reveal finishes, wait `post_delay`, then the next scene.
    OnTextComplete { post_delay: Duration },
}

#[derive(Debug, Clone, Copy)]
pub struct SceneSpec {
    pub title: Option<&'static str>,
    pub text: Option<&'static str>,
    pub speaker: Option<&'static str>,
    pub cue: Option<&'static str>,
    pub backdrop: Backdrop,
    pub advance: AdvanceRule,
}

impl SceneSpec {
    /// Prefix of the payload text covering the first `revealed` characters.
    pub fn revealed_prefix(&self, revealed: usize) -> &'static str {
        let text = self.text.unwrap_or("");
        match text.char_indices().nth(revealed) {
            Some((byte, _)) => &text[..byte],
            None => text,
        }
    }

    /// Payload length in characters (reveal units), zero for text-less scenes.
    pub fn char_len(&self) -> usize {
        self.text.map(|t| t.chars().count()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SceneEvent {
    SceneEntered {
        scene: Scene,
    },
    RevealProgress {
        scene: Scene,
        revealed: usize,
        done: bool,
    },
    Cue {
        name: String,
    },
    MuteChanged {
        muted: bool,
    },
    FadeTick {
        volume: f32,
    },
    Info(InfoEvent),
    RunCompleted {
        // Box to keep SceneEvent small; RunSummary carries the whole transcript.
        summary: Box<RunSummary>,
    },
}

/// Structured info events emitted by the engine and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    // UI/CLI messages generated outside the engine.
    Message(String),
    AudioUnavailable { reason: String },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::AudioUnavailable { reason } => {
                format!("Audio unavailable, continuing silently: {reason}")
            }
        }
    }
}

/// How a scene was left (or how the run ended, for the last visit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceReason {
    Begin,
    Timer,
    TextComplete,
    Skipped,
    Finished,
    Cancelled,
}

impl AdvanceReason {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvanceReason::Begin => "begin",
            AdvanceReason::Timer => "timer",
            AdvanceReason::TextComplete => "text-complete",
            AdvanceReason::Skipped => "skipped",
            AdvanceReason::Finished => "finished",
            AdvanceReason::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneVisit {
    pub scene: Scene,
    pub entered_at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_by: Option<AdvanceReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default)]
    pub timestamp_utc: String,
    pub completed: bool,
    pub skips: u32,
    pub cues_played: u32,
    pub cues_suppressed: u32,
    pub audio_started: bool,
    pub scenes: Vec<SceneVisit>,
}
