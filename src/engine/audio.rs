//! Background audio ownership and cue gating.
//!
//! The controller owns at most one track handle per run and is the only code
//! allowed to touch it. Playback rendering is behind the [`AudioSink`] /
//! [`AudioBackend`] traits; the default backend honors the command contract
//! without producing sound, so the narrative always works on machines with no
//! audio device.

use anyhow::Result;
use std::time::Duration;

/// Fade-out cadence: one volume step per interval until the floor is reached.
pub const FADE_STEP: Duration = Duration::from_millis(100);
pub const FADE_AMOUNT: f32 = 0.05;
pub const FADE_FLOOR: f32 = 0.05;

/// Opaque audio track handle. Implementations must treat every call as
/// fire-and-forget; only `play` may fail, and that failure is non-fatal.
pub trait AudioSink: Send {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
    fn set_looping(&mut self, looping: bool);
}

/// Factory for track handles, injected by the host.
pub trait AudioBackend: Send {
    fn create_track(&self, source: &str) -> Result<Box<dyn AudioSink>>;
}

/// Default backend: accepts every command, renders nothing.
pub struct SilentBackend;

struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self) -> Result<()> {
        Ok(())
    }
    fn pause(&mut self) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn set_muted(&mut self, _muted: bool) {}
    fn set_looping(&mut self, _looping: bool) {}
}

impl AudioBackend for SilentBackend {
    fn create_track(&self, _source: &str) -> Result<Box<dyn AudioSink>> {
        Ok(Box::new(SilentSink))
    }
}

/// Whether a requested cue was dispatched or gated off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueOutcome {
    Played,
    Suppressed,
}

pub struct AudioCueController {
    backend: Box<dyn AudioBackend>,
    source: String,
    enabled: bool,
    muted: bool,
    volume: f32,
    track: Option<Box<dyn AudioSink>>,
    cues_played: u32,
    cues_suppressed: u32,
}

impl AudioCueController {
    pub fn new(
        backend: Box<dyn AudioBackend>,
        source: String,
        start_muted: bool,
        volume: f32,
    ) -> Self {
        Self {
            backend,
            source,
            enabled: false,
            muted: start_muted,
            volume,
            track: None,
            cues_played: 0,
            cues_suppressed: 0,
        }
    }

    /// Start the background track. Called at most once per run; a second call
    /// is a no-op. On failure the controller stays enabled but trackless, so
    /// cue gating is unchanged and the narrative continues silently.
    pub fn enable(&mut self) -> Result<()> {
        if self.enabled {
            return Ok(());
        }
        self.enabled = true;
        let mut track = self.backend.create_track(&self.source)?;
        track.set_looping(true);
        track.set_muted(self.muted);
        track.set_volume(self.volume);
        track.play()?;
        self.track = Some(track);
        Ok(())
    }

    /// Flip the mute flag and apply it to the live track, if any. Returns the
    /// new state. Does not touch `enabled`.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if let Some(track) = self.track.as_mut() {
            track.set_muted(self.muted);
        }
        self.muted
    }

    /// Gate a named cue on the enabled/muted flags. The cue itself is
    /// fire-and-forget; callers that care surface it as an event.
    pub fn request_cue(&mut self, name: &str) -> CueOutcome {
        if self.muted || !self.enabled {
            self.cues_suppressed += 1;
            return CueOutcome::Suppressed;
        }
        self.cues_played += 1;
        tracing::debug!(cue = name, "audio cue");
        CueOutcome::Played
    }

    /// One fade-out step: decrement the volume, or once the floor is reached
    /// pause and release the track. Returns true when the fade is finished.
    /// With no live track the fade finishes immediately.
    pub fn fade_step(&mut self) -> bool {
        let Some(track) = self.track.as_mut() else {
            return true;
        };
        if self.volume > FADE_FLOOR {
            self.volume = (self.volume - FADE_AMOUNT).max(0.0);
            track.set_volume(self.volume);
            return false;
        }
        if let Some(mut track) = self.track.take() {
            track.pause();
        }
        true
    }

    /// Immediate teardown for cancel/unmount. Idempotent with `fade_step`'s
    /// release: whichever runs first takes the handle, the other no-ops.
    pub fn stop_now(&mut self) {
        if let Some(mut track) = self.track.take() {
            track.pause();
        }
    }

    pub fn has_track(&self) -> bool {
        self.track.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn cues_played(&self) -> u32 {
        self.cues_played
    }

    pub fn cues_suppressed(&self) -> u32 {
        self.cues_suppressed
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingBackend, RecordingBackend, SinkCommand};
    use super::*;

    fn controller() -> (AudioCueController, super::testing::CommandLog) {
        let (backend, log) = RecordingBackend::new();
        (
            AudioCueController::new(Box::new(backend), "bgm".into(), false, 0.5),
            log,
        )
    }

    #[test]
    fn enable_starts_looping_track_once() {
        let (mut audio, log) = controller();
        audio.enable().expect("enable");
        audio.enable().expect("second enable is a no-op");
        assert_eq!(
            log.commands(),
            vec![
                SinkCommand::Created("bgm".into()),
                SinkCommand::SetLooping(true),
                SinkCommand::SetMuted(false),
                SinkCommand::SetVolume(0.5),
                SinkCommand::Play,
            ]
        );
        assert!(audio.has_track());
    }

    #[test]
    fn enable_failure_is_nonfatal_and_keeps_gating() {
        let mut audio =
            AudioCueController::new(Box::new(FailingBackend), "bgm".into(), false, 0.5);
        assert!(audio.enable().is_err());
        assert!(!audio.has_track());
        // Still enabled: unmuted cues keep flowing without a track.
        assert_eq!(audio.request_cue("typing"), CueOutcome::Played);
    }

    #[test]
    fn cues_are_gated_by_enabled_and_muted() {
        let (mut audio, _log) = controller();
        // Not enabled yet.
        assert_eq!(audio.request_cue("typing"), CueOutcome::Suppressed);
        audio.enable().expect("enable");
        assert_eq!(audio.request_cue("typing"), CueOutcome::Played);
        audio.toggle_mute();
        assert_eq!(audio.request_cue("typing"), CueOutcome::Suppressed);
        audio.toggle_mute();
        assert_eq!(audio.request_cue("typing"), CueOutcome::Played);
        assert_eq!(audio.cues_played(), 2);
        assert_eq!(audio.cues_suppressed(), 2);
    }

    #[test]
    fn toggle_mute_applies_to_live_track() {
        let (mut audio, log) = controller();
        audio.enable().expect("enable");
        assert!(audio.toggle_mute());
        assert!(!audio.toggle_mute());
        let muted: Vec<_> = log
            .commands()
            .into_iter()
            .filter(|c| matches!(c, SinkCommand::SetMuted(_)))
            .collect();
        assert_eq!(
            muted,
            vec![
                SinkCommand::SetMuted(false), // applied on enable
                SinkCommand::SetMuted(true),
                SinkCommand::SetMuted(false),
            ]
        );
    }

    #[test]
    fn fade_steps_down_then_releases() {
        let (mut audio, log) = controller();
        audio.enable().expect("enable");
        let mut steps = 0;
        while !audio.fade_step() {
            steps += 1;
            assert!(steps < 100, "fade must terminate");
        }
        // 0.5 -> 0.05 in 0.05 decrements is nine steps, then release.
        assert_eq!(steps, 9);
        assert!(!audio.has_track());
        let volumes = log.volumes();
        assert_eq!(volumes.len(), 10); // initial 0.5 plus nine decrements
        assert!((volumes[1] - 0.45).abs() < 1e-6);
        assert!(volumes.last().copied().expect("volumes") <= 0.05 + 1e-6);
        assert_eq!(log.commands().last(), Some(&SinkCommand::Pause));
    }

    #[test]
    fn fade_with_no_track_finishes_immediately() {
        let (mut audio, _log) = controller();
        assert!(audio.fade_step());
    }

    #[test]
    fn stop_now_and_fade_release_are_mutually_idempotent() {
        let (mut audio, log) = controller();
        audio.enable().expect("enable");
        audio.stop_now();
        audio.stop_now();
        assert!(audio.fade_step());
        let pauses = log
            .commands()
            .into_iter()
            .filter(|c| *c == SinkCommand::Pause)
            .count();
        assert_eq!(pauses, 1);
    }
}
