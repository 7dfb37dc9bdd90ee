//! Loop driver
//!
//! Owns the world and its collaborators. Single-threaded and cooperative:
//! each tick polls input once, advances the simulation, then hands the
//! resolved world to the render sink and the tick's cues to the audio sink.

use std::time::{Duration, Instant};

use crate::audio::{AudioSink, SoundEffect};
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::input::InputSource;
use crate::render::RenderSink;
use crate::sim::{Command, GameEvent, Scheduler, World, tick};

/// Whether the loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Totals across a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Ticks polled (including paused and game-over ticks)
    pub ticks: u64,
    /// Runs started, the first one included
    pub runs: u32,
    pub best_score: u32,
}

pub struct GameLoop<I, R, A> {
    config: GameConfig,
    world: World,
    scheduler: Scheduler,
    input: I,
    render: R,
    audio: A,
    audio_enabled: bool,
    quit: bool,
    summary: RunSummary,
}

impl<I: InputSource, R: RenderSink, A: AudioSink> GameLoop<I, R, A> {
    pub fn new(config: GameConfig, input: I, render: R, audio: A) -> Result<Self, EngineError> {
        config.validate()?;
        let world = World::reset(&config, config.seed);
        log::info!(
            "Starting {} at {} Hz (seed {})",
            config.variant.as_str(),
            config.tick_hz,
            config.seed
        );
        Ok(Self {
            scheduler: Scheduler::new(&config),
            audio_enabled: config.audio_enabled(),
            world,
            config,
            input,
            render,
            audio,
            quit: false,
            summary: RunSummary {
                runs: 1,
                ..Default::default()
            },
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    /// Run exactly one tick
    pub fn step(&mut self) -> LoopControl {
        if self.quit {
            return LoopControl::Quit;
        }

        let input = self.input.poll();
        if input.has(Command::Quit) {
            log::info!(
                "Quit after {} ticks, best score {}",
                self.summary.ticks,
                self.summary.best_score
            );
            self.quit = true;
            return LoopControl::Quit;
        }

        let events = tick(&mut self.world, &input, self.scheduler.step(), &self.config);
        self.summary.ticks += 1;
        self.summary.best_score = self.summary.best_score.max(self.world.score);

        for event in &events {
            log::debug!("{:?}", event);
            if matches!(event, GameEvent::Restarted { .. }) {
                self.summary.runs += 1;
            }
            if self.audio_enabled {
                if let Some(effect) = SoundEffect::for_event(event) {
                    self.audio.play(effect);
                }
            }
        }

        self.render.present(&self.world);
        LoopControl::Continue
    }

    /// Run however many ticks are due after `frame_dt` seconds
    pub fn frame(&mut self, frame_dt: f32) -> LoopControl {
        let due = self.scheduler.due_ticks(frame_dt);
        for _ in 0..due {
            if self.step() == LoopControl::Quit {
                return LoopControl::Quit;
            }
        }
        if self.quit {
            LoopControl::Quit
        } else {
            LoopControl::Continue
        }
    }

    /// Drive frames off the wall clock until a quit command arrives
    pub fn run(&mut self) -> RunSummary {
        let step = Duration::from_secs_f32(self.scheduler.step());
        let mut last = Instant::now();
        loop {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;

            if self.frame(dt) == LoopControl::Quit {
                break;
            }

            let spent = now.elapsed();
            if spent < step {
                std::thread::sleep(step - spent);
            }
        }
        self.summary
    }

    pub fn into_parts(self) -> (World, I, R, A) {
        (self.world, self.input, self.render, self.audio)
    }
}
