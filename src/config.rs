//! Game configuration
//!
//! Built once at startup and passed by reference into the scheduler, entity
//! model and rule engine. Nothing in the simulation reads global state.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, SIM_HZ};
use crate::error::EngineError;
use crate::sim::Direction;

/// Which game the loop is driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    #[default]
    Snake,
    Flappy,
    Catch,
    Shooter,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Snake,
        Variant::Flappy,
        Variant::Catch,
        Variant::Shooter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Snake => "snake",
            Variant::Flappy => "flappy",
            Variant::Catch => "catch",
            Variant::Shooter => "shooter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(Variant::Snake),
            "flappy" | "flappy-bird" | "bird" => Some(Variant::Flappy),
            "catch" | "catch-the-ball" => Some(Variant::Catch),
            "shooter" | "war-zone" => Some(Variant::Shooter),
            _ => None,
        }
    }

    /// Default playfield for this variant
    ///
    /// Snake is measured in grid cells (500px board / 40px cells); the others
    /// in pixels.
    pub fn default_playfield(&self) -> Playfield {
        match self {
            Variant::Snake => Playfield::new(12.0, 12.0),
            Variant::Flappy => Playfield::new(500.0, 700.0),
            Variant::Catch => Playfield::new(1280.0, 720.0),
            Variant::Shooter => Playfield::new(800.0, 600.0),
        }
    }

    /// Whether sound cues are on by default (only the snake game had audio)
    pub fn default_audio(&self) -> bool {
        matches!(self, Variant::Snake)
    }
}

/// Playfield extents; the origin is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Stepped speed increase: `base + step * (score / every)`
///
/// Score never decreases within a run, so neither does the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub step: f32,
    pub every: u32,
}

impl Progression {
    pub const NONE: Self = Self {
        step: 0.0,
        every: 1,
    };

    pub const fn new(step: f32, every: u32) -> Self {
        Self { step, every }
    }

    pub fn apply(&self, base: f32, score: u32) -> f32 {
        if self.every == 0 {
            return base;
        }
        base + self.step * (score / self.every) as f32
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::NONE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Cell the whole body starts stacked on
    pub start_cell: Vec2,
    pub initial_length: usize,
    pub initial_heading: Direction,
    /// First food cell
    pub food_cell: Vec2,
    /// Grid steps per second before progression
    pub steps_per_second: f32,
    pub progression: Progression,
    /// Body segments below this index are never checked against the head
    pub self_collision_skip: usize,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            start_cell: Vec2::new(1.0, 1.0),
            initial_length: 2,
            initial_heading: Direction::Down,
            food_cell: Vec2::new(2.0, 2.0),
            steps_per_second: 5.0,
            progression: Progression::NONE,
            self_collision_skip: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlappyConfig {
    pub bird_x: f32,
    pub bird_size: Vec2,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Velocity set by a jump (px/s, negative is up)
    pub jump_impulse: f32,
    /// Smoothed head rise (camera px) that counts as a jump
    pub jump_threshold: f32,
    pub pipe_width: f32,
    /// Pipe scroll speed before progression (px/s)
    pub pipe_speed: f32,
    /// Horizontal distance between consecutive pipe pairs
    pub pipe_spacing: f32,
    /// Gap height as a fraction of the playfield height
    pub gap_fraction: f32,
    /// Top pipe height range, as fractions of the playfield height
    pub top_min_fraction: f32,
    pub top_max_fraction: f32,
    pub progression: Progression,
}

impl Default for FlappyConfig {
    fn default() -> Self {
        Self {
            bird_x: 100.0,
            bird_size: Vec2::new(50.0, 35.0),
            gravity: 270.0,
            jump_impulse: -180.0,
            jump_threshold: 15.0,
            pipe_width: 80.0,
            pipe_speed: 60.0,
            pipe_spacing: 300.0,
            gap_fraction: 0.25,
            top_min_fraction: 1.0 / 6.0,
            top_max_fraction: 0.5,
            progression: Progression::NONE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchConfig {
    pub player_size: Vec2,
    /// Player top edge sits this far above the bottom of the playfield
    pub player_bottom_offset: f32,
    pub player_speed: f32,
    /// Smoothed head offset (camera px) from center that moves the player
    pub move_threshold: f32,
    pub object_size: Vec2,
    /// Objects spawn with x in `[margin, width - margin)`
    pub spawn_margin: f32,
    /// Fall speed before progression (px/s)
    pub fall_speed: f32,
    pub objects: usize,
    pub progression: Progression,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            player_size: Vec2::new(200.0, 180.0),
            player_bottom_offset: 200.0,
            player_speed: 300.0,
            move_threshold: 40.0,
            object_size: Vec2::new(100.0, 100.0),
            spawn_margin: 50.0,
            fall_speed: 150.0,
            objects: 1,
            progression: Progression::new(1.5, 5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    pub ship_size: Vec2,
    /// Ship bottom edge sits this far above the bottom of the playfield
    pub ship_bottom_margin: f32,
    pub ship_speed: f32,
    pub move_threshold: f32,
    pub missile_size: Vec2,
    pub missile_speed: f32,
    /// Friendly missiles allowed in flight at once
    pub max_missiles: usize,
    pub enemy_size: Vec2,
    pub enemy_top: f32,
    /// Enemy jitter speed before progression (px/s)
    pub enemy_speed: f32,
    /// Chance per tick that the enemy fires
    pub enemy_fire_chance: f64,
    pub code_length: usize,
    pub spawn_margin: f32,
    pub progression: Progression,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            ship_size: Vec2::new(80.0, 80.0),
            ship_bottom_margin: 50.0,
            ship_speed: 300.0,
            move_threshold: 40.0,
            missile_size: Vec2::new(30.0, 30.0),
            missile_speed: 420.0,
            max_missiles: 3,
            enemy_size: Vec2::new(80.0, 80.0),
            enemy_top: 50.0,
            enemy_speed: 120.0,
            enemy_fire_chance: 1.0 / 90.0,
            code_length: 4,
            spawn_margin: 50.0,
            progression: Progression::NONE,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,
    /// Simulation ticks per second
    pub tick_hz: f32,
    pub max_substeps: u32,
    /// Seed for the first run; restarts derive the next seed from it
    pub seed: u64,
    /// Overrides the variant's default playfield
    pub playfield: Option<Playfield>,
    /// Overrides the variant's default audio setting
    pub audio: Option<bool>,
    pub snake: SnakeConfig,
    pub flappy: FlappyConfig,
    pub catch: CatchConfig,
    pub shooter: ShooterConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

impl GameConfig {
    /// Default configuration for a variant
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            tick_hz: SIM_HZ,
            max_substeps: MAX_SUBSTEPS,
            seed: 1,
            playfield: None,
            audio: None,
            snake: SnakeConfig::default(),
            flappy: FlappyConfig::default(),
            catch: CatchConfig::default(),
            shooter: ShooterConfig::default(),
        }
    }

    /// Fixed timestep (seconds)
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_hz
    }

    pub fn playfield(&self) -> Playfield {
        self.playfield
            .unwrap_or_else(|| self.variant.default_playfield())
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio.unwrap_or_else(|| self.variant.default_audio())
    }

    /// Speed progression for the active variant
    pub fn progression(&self) -> Progression {
        match self.variant {
            Variant::Snake => self.snake.progression,
            Variant::Flappy => self.flappy.progression,
            Variant::Catch => self.catch.progression,
            Variant::Shooter => self.shooter.progression,
        }
    }

    /// Speed at score zero for the active variant
    pub fn base_speed(&self) -> f32 {
        match self.variant {
            Variant::Snake => self.snake.steps_per_second,
            Variant::Flappy => self.flappy.pipe_speed,
            Variant::Catch => self.catch.fall_speed,
            Variant::Shooter => self.shooter.enemy_speed,
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded {} config from {}", config.variant.as_str(), path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.tick_hz > 0.0) {
            return Err(invalid("tick_hz must be positive"));
        }
        if self.max_substeps == 0 {
            return Err(invalid("max_substeps must be at least 1"));
        }
        let field = self.playfield();
        if !(field.width > 0.0 && field.height > 0.0) {
            return Err(invalid("playfield must have positive width and height"));
        }
        let progression = self.progression();
        if progression.every == 0 || progression.step < 0.0 {
            return Err(invalid("progression needs every > 0 and step >= 0"));
        }
        if !(self.base_speed() > 0.0) {
            return Err(invalid("base speed must be positive"));
        }

        match self.variant {
            Variant::Snake => {
                let snake = &self.snake;
                if snake.initial_length == 0 {
                    return Err(invalid("snake initial_length must be at least 1"));
                }
                if !cell_in_field(snake.start_cell, field) || !cell_in_field(snake.food_cell, field)
                {
                    return Err(invalid("snake start and food cells must lie on the grid"));
                }
                if field.width.fract() != 0.0 || field.height.fract() != 0.0 {
                    return Err(invalid("snake grid must be a whole number of cells"));
                }
                if field.width * field.height < 2.0 {
                    return Err(invalid("snake grid needs at least two cells"));
                }
                if snake.steps_per_second > self.tick_hz {
                    return Err(invalid("snake steps_per_second must not exceed tick_hz"));
                }
            }
            Variant::Flappy => {
                let flappy = &self.flappy;
                check_size("bird_size", flappy.bird_size)?;
                if !(flappy.pipe_width > 0.0 && flappy.pipe_spacing > 0.0) {
                    return Err(invalid("pipe width and spacing must be positive"));
                }
                if !(0.0..=1.0).contains(&flappy.gap_fraction)
                    || flappy.top_min_fraction > flappy.top_max_fraction
                    || flappy.top_max_fraction + flappy.gap_fraction > 1.0
                {
                    return Err(invalid("pipe gap and top fractions must fit the playfield"));
                }
            }
            Variant::Catch => {
                let catch = &self.catch;
                check_size("player_size", catch.player_size)?;
                check_size("object_size", catch.object_size)?;
                if catch.spawn_margin * 2.0 >= field.width {
                    return Err(invalid("catch spawn_margin leaves no room to spawn"));
                }
                if catch.objects == 0 {
                    return Err(invalid("catch needs at least one object"));
                }
            }
            Variant::Shooter => {
                let shooter = &self.shooter;
                check_size("ship_size", shooter.ship_size)?;
                check_size("missile_size", shooter.missile_size)?;
                check_size("enemy_size", shooter.enemy_size)?;
                if shooter.spawn_margin * 2.0 >= field.width {
                    return Err(invalid("shooter spawn_margin leaves no room to spawn"));
                }
                if !(0.0..=1.0).contains(&shooter.enemy_fire_chance) {
                    return Err(invalid("enemy_fire_chance must be a probability"));
                }
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> EngineError {
    EngineError::InvalidConfig(msg.to_string())
}

fn check_size(name: &str, size: Vec2) -> Result<(), EngineError> {
    if size.x >= 0.0 && size.y >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must not be negative"
        )))
    }
}

fn cell_in_field(cell: Vec2, field: Playfield) -> bool {
    cell.x >= 0.0 && cell.y >= 0.0 && cell.x < field.width && cell.y < field.height
}
