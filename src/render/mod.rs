//! Render sinks
//!
//! The core hands a read-only [`World`] to a [`RenderSink`] once per tick,
//! after resolution. Sinks never report back; failures are logged.

pub mod canvas;
pub mod terminal;

pub use canvas::{Canvas, Glyph, Tint, rasterize};
pub use terminal::{TerminalRenderer, restore};

use crate::sim::World;

/// Render collaborator
pub trait RenderSink {
    fn present(&mut self, world: &World);
}

/// Draws nothing; used for headless runs
#[derive(Debug, Default)]
pub struct NullRender {
    pub frames: u64,
}

impl RenderSink for NullRender {
    fn present(&mut self, _world: &World) {
        self.frames += 1;
    }
}
