//! Input sources
//!
//! Polled once per tick, never blocking. A source reports the discrete
//! commands seen since the last poll plus an optional smoothed signal.

pub mod keyboard;
pub mod tracker;

use std::collections::VecDeque;

pub use keyboard::{KeyboardInput, map_key};
pub use tracker::{HeadTracker, PoseSample, PoseSource, TrackedInput};

use crate::sim::TickInput;

/// Input collaborator
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

/// Replays a fixed script, one entry per tick, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<TickInput>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = TickInput>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> TickInput {
        self.script.pop_front().unwrap_or_default()
    }
}
