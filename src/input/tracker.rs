//! Smoothed head tracking
//!
//! A [`PoseSource`] yields raw head positions in camera pixels; the
//! [`HeadTracker`] turns them into a [`Signal`] using a short moving average.
//! Pose estimation itself lives outside this crate.

use std::collections::VecDeque;

use glam::Vec2;

use super::InputSource;
use crate::sim::{Signal, TickInput};

/// Samples averaged per signal
pub const SMOOTHING_FRAMES: usize = 5;

/// Raw head position in camera pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    pub x: f32,
    pub y: f32,
}

/// Pose collaborator; `None` when no face was found this tick
pub trait PoseSource {
    fn sample(&mut self) -> Option<PoseSample>;
}

/// Moving-average smoother over the last few samples
#[derive(Debug, Clone)]
pub struct HeadTracker {
    window: VecDeque<Vec2>,
    capacity: usize,
    center_x: f32,
}

impl HeadTracker {
    /// `frame_width` is the camera width; offsets are measured from its center
    pub fn new(frame_width: f32) -> Self {
        Self::with_capacity(frame_width, SMOOTHING_FRAMES)
    }

    pub fn with_capacity(frame_width: f32, capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            center_x: frame_width / 2.0,
        }
    }

    /// Feed one sample and get the smoothed signal
    ///
    /// `rise` compares the previous raw sample against the new average, so a
    /// quick upward head movement reads as a positive rise.
    pub fn push(&mut self, sample: PoseSample) -> Signal {
        self.window.push_back(Vec2::new(sample.x, sample.y));
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let mean = self.window.iter().copied().sum::<Vec2>() / self.window.len() as f32;
        let rise = if self.window.len() >= 2 {
            self.window[self.window.len() - 2].y - mean.y
        } else {
            0.0
        };
        Signal {
            offset_x: mean.x - self.center_x,
            rise,
        }
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

/// Pose-driven input; discrete commands still come from `keys`
pub struct TrackedInput<P, K> {
    pose: P,
    tracker: HeadTracker,
    keys: K,
}

impl<P: PoseSource, K: InputSource> TrackedInput<P, K> {
    pub fn new(pose: P, tracker: HeadTracker, keys: K) -> Self {
        Self {
            pose,
            tracker,
            keys,
        }
    }
}

impl<P: PoseSource, K: InputSource> InputSource for TrackedInput<P, K> {
    fn poll(&mut self) -> TickInput {
        let mut input = self.keys.poll();
        // A missed sample is simply absent this tick
        if let Some(sample) = self.pose.sample() {
            input.signal = Some(self.tracker.push(sample));
        }
        input
    }
}
