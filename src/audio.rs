//! Fire-and-forget sound cues
//!
//! The simulation never calls audio directly. The loop maps each tick's
//! events to [`SoundEffect`]s and hands them to an [`AudioSink`]; failures
//! are swallowed.

use std::io::Write;

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Consumable collected
    Eat,
    /// Pipe pair passed
    Score,
    /// Bird jumped
    Flap,
    /// Missile launched
    Fire,
    /// Enemy destroyed
    Explosion,
    /// Run ended
    GameOver,
}

impl SoundEffect {
    /// Cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Collected { .. } => Some(SoundEffect::Eat),
            GameEvent::Passed { .. } => Some(SoundEffect::Score),
            GameEvent::Jumped => Some(SoundEffect::Flap),
            GameEvent::Fired => Some(SoundEffect::Fire),
            GameEvent::EnemyDestroyed { .. } => Some(SoundEffect::Explosion),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::Despawned { .. }
            | GameEvent::Paused
            | GameEvent::Resumed
            | GameEvent::Restarted { .. } => None,
        }
    }

    /// How many terminal bells the cue rings
    fn bells(&self) -> usize {
        match self {
            SoundEffect::Flap | SoundEffect::Fire => 0,
            SoundEffect::Eat | SoundEffect::Score => 1,
            SoundEffect::Explosion => 2,
            SoundEffect::GameOver => 3,
        }
    }
}

/// Audio collaborator
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Rings the terminal bell (BEL) for cues
pub struct TerminalBell<W: Write> {
    out: W,
    muted: bool,
}

impl TerminalBell<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out, muted: false }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, effect: SoundEffect) {
        if self.muted || effect.bells() == 0 {
            return;
        }
        let bells = "\x07".repeat(effect.bells());
        if let Err(e) = self.out.write_all(bells.as_bytes()).and_then(|_| self.out.flush()) {
            log::warn!("Failed to play {:?}: {}", effect, e);
        }
    }
}

/// Records cues; handy for tests and headless runs
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundEffect>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.played.push(effect);
    }
}
