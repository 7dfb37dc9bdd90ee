//! World state and core simulation types
//!
//! Everything a run needs for determinism lives in [`World`], including the
//! seeded RNG, so a cloned world replays identically.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::spawn;
use crate::config::{GameConfig, Playfield, Variant};

/// Coarse game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Active gameplay
    Running,
    /// Frozen until the next pause command
    Paused,
    /// Run ended, waiting for a restart command
    GameOver,
}

/// Identity tag used by the consequence table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Obstacle,
    Projectile,
    Consumable,
}

/// Grid heading; y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// One-cell step
    pub fn delta(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// Who fired a missile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Friendly,
    Hostile,
}

/// Snake body trail, head first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeBody {
    pub segments: Vec<Vec2>,
    pub heading: Direction,
    /// Turn buffered until the next grid step
    pub next_heading: Direction,
}

impl SnakeBody {
    pub fn new(cell: Vec2, length: usize, heading: Direction) -> Self {
        Self {
            segments: vec![cell; length.max(1)],
            heading,
            next_heading: heading,
        }
    }

    #[inline]
    pub fn head(&self) -> Vec2 {
        self.segments.first().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Buffer a turn; reversing into the current heading is ignored
    pub fn turn(&mut self, dir: Direction) {
        if dir != self.heading.opposite() {
            self.next_heading = dir;
        }
    }

    /// Advance one cell: segments shift tail-to-head, then the head moves
    pub fn step(&mut self) {
        self.heading = self.next_heading;
        for i in (1..self.segments.len()).rev() {
            self.segments[i] = self.segments[i - 1];
        }
        if let Some(head) = self.segments.first_mut() {
            *head += self.heading.delta();
        }
    }

    /// Append a copy of the tail
    pub fn grow(&mut self) {
        if let Some(&tail) = self.segments.last() {
            self.segments.push(tail);
        }
    }
}

/// Variant-specific entity data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    None,
    Snake(SnakeBody),
    /// One half of a pipe pair; only the upper half carries `passed`
    PipeHalf { pair: u32, upper: bool, passed: bool },
    Enemy { code: String },
    Missile { side: Side },
}

/// A simulated object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Top-left corner (cells for the snake grid)
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub payload: Payload,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size: size.max(Vec2::ZERO),
            payload: Payload::None,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn snake(&self) -> Option<&SnakeBody> {
        match &self.payload {
            Payload::Snake(body) => Some(body),
            _ => None,
        }
    }

    pub fn snake_mut(&mut self) -> Option<&mut SnakeBody> {
        match &mut self.payload {
            Payload::Snake(body) => Some(body),
            _ => None,
        }
    }

    pub fn is_missile(&self, side: Side) -> bool {
        matches!(self.payload, Payload::Missile { side: s } if s == side)
    }
}

/// Scalar difficulty knobs derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tunables {
    /// Steps per second for the snake, px/s for everything else
    pub speed: f32,
    /// Pipe gap height (flappy only); no progression, fixed per run
    pub gap: f32,
}

/// Why the last run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    Boundary,
    SelfCollision,
    Obstacle,
    Projectile,
}

impl EndCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndCause::Boundary => "boundary",
            EndCause::SelfCollision => "self-collision",
            EndCause::Obstacle => "obstacle",
            EndCause::Projectile => "projectile",
        }
    }
}

/// Something that happened during a tick (drives audio and logging)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player picked up a consumable
    Collected { id: u32 },
    /// Player flew past a pipe pair
    Passed { pair: u32 },
    Jumped,
    Fired,
    /// A friendly missile hit the enemy
    EnemyDestroyed { code: String },
    /// Entity left the playfield
    Despawned { id: u32 },
    GameOver { cause: EndCause, score: u32 },
    Paused,
    Resumed,
    Restarted { seed: u64 },
}

/// Complete world state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub variant: Variant,
    pub playfield: Playfield,
    /// Live entities (sorted by id for determinism)
    pub entities: Vec<Entity>,
    pub score: u32,
    pub phase: Phase,
    pub tunables: Tunables,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seconds accumulated toward the next snake step
    pub step_clock: f32,
    pub end_cause: Option<EndCause>,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Next entity ID
    next_id: u32,
}

impl World {
    /// Build a fresh running world from the variant's initial layout
    pub fn reset(config: &GameConfig, seed: u64) -> Self {
        let mut world = Self {
            variant: config.variant,
            playfield: config.playfield(),
            entities: Vec::new(),
            score: 0,
            phase: Phase::Running,
            tunables: spawn::tunables_for(config, 0),
            time_ticks: 0,
            step_clock: 0.0,
            end_cause: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        spawn::populate(&mut world, config);
        world
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an entity built around a freshly allocated id
    pub fn spawn(&mut self, build: impl FnOnce(u32) -> Entity) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(build(id));
        id
    }

    pub fn despawn(&mut self, id: u32) {
        self.entities.retain(|e| e.id != id);
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.kind == EntityKind::Player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.kind == EntityKind::Player)
    }

    pub fn snake(&self) -> Option<&SnakeBody> {
        self.player().and_then(Entity::snake)
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    /// The playfield as a rectangle anchored at the origin
    pub fn field(&self) -> Rect {
        Rect::from_size(self.playfield.width, self.playfield.height)
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }
}
