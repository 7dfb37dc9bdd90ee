//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No terminal, audio or input device dependencies

pub mod collision;
pub mod motion;
pub mod rect;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::resolve;
pub use motion::advance;
pub use rect::Rect;
pub use state::{
    Direction, EndCause, Entity, EntityKind, GameEvent, Payload, Phase, Side, SnakeBody, Tunables,
    World,
};
pub use tick::{Command, Scheduler, Signal, TickInput, tick};
