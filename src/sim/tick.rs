//! Fixed timestep simulation tick
//!
//! Core loop step that advances the world deterministically: phase commands
//! first, then motion, then rule resolution.

use serde::{Deserialize, Serialize};

use super::collision::resolve;
use super::motion::advance;
use super::state::{Direction, GameEvent, Phase, World};
use crate::config::GameConfig;
use crate::consts::MAX_FRAME_DT;

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Jump,
    Fire,
    /// Toggle between running and paused
    Pause,
    /// Start a new run after game over
    Restart,
    /// End the process from any phase
    Quit,
}

/// Smoothed continuous input from a pose tracker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Signal {
    /// Horizontal head offset from the frame center (positive is right)
    pub offset_x: f32,
    /// Upward head movement since the previous sample
    pub rise: f32,
}

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub commands: Vec<Command>,
    pub signal: Option<Signal>,
}

impl TickInput {
    pub fn from_commands(commands: &[Command]) -> Self {
        Self {
            commands: commands.to_vec(),
            signal: None,
        }
    }

    pub fn has(&self, command: Command) -> bool {
        self.commands.contains(&command)
    }

    /// First steering command this tick, if any
    pub fn direction(&self) -> Option<Direction> {
        self.commands.iter().find_map(|c| match c {
            Command::Up => Some(Direction::Up),
            Command::Down => Some(Direction::Down),
            Command::Left => Some(Direction::Left),
            Command::Right => Some(Direction::Right),
            _ => None,
        })
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32, config: &GameConfig) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.has(Command::Restart) && world.phase == Phase::GameOver {
        let seed = world.seed.wrapping_add(1);
        *world = World::reset(config, seed);
        log::info!("Restarted {} with seed {}", config.variant.as_str(), seed);
        events.push(GameEvent::Restarted { seed });
        return events;
    }

    // Handle pause toggle
    if input.has(Command::Pause) {
        match world.phase {
            Phase::Running => {
                world.phase = Phase::Paused;
                events.push(GameEvent::Paused);
                return events;
            }
            Phase::Paused => {
                world.phase = Phase::Running;
                events.push(GameEvent::Resumed);
            }
            Phase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    match world.phase {
        Phase::Paused | Phase::GameOver => return events,
        Phase::Running => {}
    }

    world.time_ticks += 1;
    events.extend(advance(world, input, dt, config));
    events.extend(resolve(world, config));
    world.normalize_order();
    events
}

/// Fixed-timestep accumulator
///
/// Frame deltas are clamped to [`MAX_FRAME_DT`] and at most `max_substeps`
/// ticks run per frame; leftover time carries into the next frame.
#[derive(Debug, Clone)]
pub struct Scheduler {
    step: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl Scheduler {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            step: config.tick_dt(),
            max_substeps: config.max_substeps,
            accumulator: 0.0,
        }
    }

    /// Fixed timestep fed to every tick
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Number of ticks due after `frame_dt` seconds of wall-clock time
    pub fn due_ticks(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            self.accumulator -= self.step;
            substeps += 1;
        }
        substeps
    }
}
