//! Arcade Loop - a fixed-timestep game loop engine for small arcade games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity model, collision rules, world state)
//! - `config`: Immutable game configuration built once at startup
//! - `input`: Input sources (keyboard, scripted, smoothed head tracking)
//! - `render`: Render sinks (terminal framebuffer)
//! - `audio`: Fire-and-forget sound cues
//! - `game_loop`: Loop driver tying the collaborators to the simulation

pub mod audio;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod input;
pub mod render;
pub mod sim;

pub use config::{GameConfig, Variant};
pub use error::EngineError;
pub use game_loop::{GameLoop, LoopControl, RunSummary};

/// Engine timing constants
pub mod consts {
    /// Default simulation rate (the source games ran at 30 FPS)
    pub const SIM_HZ: f32 = 30.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
