//! Entity motion laws
//!
//! Runs before collision resolution each tick. Everything integrates with
//! the tick's `dt`, so halving the rate and doubling `dt` covers the same
//! distance.

use glam::Vec2;
use rand::Rng;

use super::spawn;
use super::state::{EntityKind, GameEvent, Payload, Side, World};
use super::tick::{Command, TickInput};
use crate::config::{GameConfig, Variant};

/// Advance every entity by one timestep
pub fn advance(world: &mut World, input: &TickInput, dt: f32, config: &GameConfig) -> Vec<GameEvent> {
    let mut events = Vec::new();
    sync_velocities(world);

    match config.variant {
        Variant::Snake => step_snake(world, input, dt),
        Variant::Flappy => {
            if flap(world, input, dt, config) {
                events.push(GameEvent::Jumped);
            }
        }
        Variant::Catch => {
            let catch = &config.catch;
            slide_player(world, input, dt, catch.player_speed, catch.move_threshold);
        }
        Variant::Shooter => {
            let shooter = &config.shooter;
            slide_player(world, input, dt, shooter.ship_speed, shooter.move_threshold);
            if input.has(Command::Fire) && try_fire(world, config) {
                events.push(GameEvent::Fired);
            }
            jitter_enemies(world, dt, config);
        }
    }

    for entity in world.entities.iter_mut() {
        if entity.kind != EntityKind::Player {
            entity.pos += entity.vel * dt;
        }
    }
    events
}

/// Scrolling pipes and falling objects move at the current tuned speed
fn sync_velocities(world: &mut World) {
    let speed = world.tunables.speed;
    for entity in world.entities.iter_mut() {
        match (entity.kind, &entity.payload) {
            (EntityKind::Obstacle, Payload::PipeHalf { .. }) => entity.vel = Vec2::new(-speed, 0.0),
            (EntityKind::Consumable, _) if entity.vel != Vec2::ZERO => {
                entity.vel = Vec2::new(0.0, speed)
            }
            _ => {}
        }
    }
}

fn step_snake(world: &mut World, input: &TickInput, dt: f32) {
    let interval = 1.0 / world.tunables.speed;
    world.step_clock += dt;
    let stepped = world.step_clock >= interval;
    if stepped {
        // One step per tick at most; don't bank the excess
        world.step_clock = (world.step_clock - interval).min(interval);
    }

    let Some(player) = world.player_mut() else {
        return;
    };
    let head = {
        let Some(body) = player.snake_mut() else {
            return;
        };
        if let Some(dir) = input.direction() {
            body.turn(dir);
        }
        if stepped {
            body.step();
        }
        body.head()
    };
    player.pos = head;
}

/// Returns whether the bird jumped this tick
fn flap(world: &mut World, input: &TickInput, dt: f32, config: &GameConfig) -> bool {
    let flappy = &config.flappy;
    let jumped = input.has(Command::Jump)
        || input.has(Command::Up)
        || input.signal.is_some_and(|s| s.rise > flappy.jump_threshold);

    let Some(bird) = world.player_mut() else {
        return false;
    };
    if jumped {
        bird.vel.y = flappy.jump_impulse;
    }
    bird.vel.y += flappy.gravity * dt;
    bird.pos += bird.vel * dt;
    jumped
}

/// Horizontal movement clamped to the playfield
fn slide_player(world: &mut World, input: &TickInput, dt: f32, speed: f32, threshold: f32) {
    let mut dir = 0.0;
    if input.has(Command::Left) {
        dir -= 1.0;
    }
    if input.has(Command::Right) {
        dir += 1.0;
    }
    if dir == 0.0 {
        if let Some(signal) = input.signal {
            if signal.offset_x > threshold {
                dir = 1.0;
            } else if signal.offset_x < -threshold {
                dir = -1.0;
            }
        }
    }

    let width = world.playfield.width;
    let Some(player) = world.player_mut() else {
        return;
    };
    let max_x = (width - player.size.x).max(0.0);
    player.vel = Vec2::new(dir * speed, 0.0);
    player.pos.x = (player.pos.x + player.vel.x * dt).clamp(0.0, max_x);
}

/// Launch a friendly missile unless the cap is reached
fn try_fire(world: &mut World, config: &GameConfig) -> bool {
    let in_flight = world
        .entities
        .iter()
        .filter(|e| e.is_missile(Side::Friendly))
        .count();
    if in_flight >= config.shooter.max_missiles {
        return false;
    }
    let Some(ship) = world.player().map(|p| p.bounds()) else {
        return false;
    };
    spawn::spawn_missile(world, config, ship, Side::Friendly);
    true
}

/// Enemies wander left or right at random and occasionally fire
fn jitter_enemies(world: &mut World, dt: f32, config: &GameConfig) {
    let step = world.tunables.speed * dt;
    let width = world.playfield.width;
    let enemies: Vec<u32> = world
        .entities
        .iter()
        .filter(|e| matches!(e.payload, Payload::Enemy { .. }))
        .map(|e| e.id)
        .collect();

    for id in enemies {
        let rightward = world.rng_mut().random_bool(0.5);
        let fires = world.rng_mut().random_bool(config.shooter.enemy_fire_chance);
        let Some(enemy) = world.entity_mut(id) else {
            continue;
        };
        let max_x = (width - enemy.size.x).max(0.0);
        let dx = if rightward { step } else { -step };
        enemy.pos.x = (enemy.pos.x + dx).clamp(0.0, max_x);
        let from = enemy.bounds();
        if fires {
            spawn::spawn_missile(world, config, from, Side::Hostile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Playfield;
    use crate::sim::state::Direction;
    use crate::sim::tick::Signal;

    fn input(commands: &[Command]) -> TickInput {
        TickInput {
            commands: commands.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_snake_steps_on_interval() {
        let config = GameConfig::for_variant(Variant::Snake);
        let mut world = World::reset(&config, 1);
        let dt = config.tick_dt();
        // 5 steps/s at 30 Hz: one step roughly every 6 ticks
        for _ in 0..5 {
            advance(&mut world, &TickInput::default(), dt, &config);
        }
        assert_eq!(world.snake().unwrap().head(), Vec2::new(1.0, 1.0));
        advance(&mut world, &TickInput::default(), dt, &config);
        advance(&mut world, &TickInput::default(), dt, &config);
        assert_eq!(world.snake().unwrap().head(), Vec2::new(1.0, 2.0));
        assert_eq!(world.player().unwrap().pos, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_snake_faster_than_ticks_keeps_no_backlog() {
        let mut config = GameConfig::for_variant(Variant::Snake);
        config.playfield = Some(Playfield::new(1000.0, 1000.0));
        let mut world = World::reset(&config, 1);
        let dt = config.tick_dt();
        world.tunables.speed = 60.0;
        for _ in 0..300 {
            advance(&mut world, &TickInput::default(), dt, &config);
        }
        assert_eq!(world.snake().unwrap().head(), Vec2::new(1.0, 301.0));
        assert!(world.step_clock <= 1.0 / 60.0 + 1e-4);

        // Back to 5 steps/s: the next step waits a full interval
        world.tunables.speed = 5.0;
        for _ in 0..5 {
            advance(&mut world, &TickInput::default(), dt, &config);
        }
        assert_eq!(world.snake().unwrap().head(), Vec2::new(1.0, 301.0));
    }

    #[test]
    fn test_snake_turn_applies_on_step() {
        let config = GameConfig::for_variant(Variant::Snake);
        let mut world = World::reset(&config, 1);
        world.step_clock = 1.0;
        advance(&mut world, &input(&[Command::Right]), config.tick_dt(), &config);
        assert_eq!(world.snake().unwrap().heading, Direction::Right);
        assert_eq!(world.snake().unwrap().head(), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_flappy_gravity_integrates_dt() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let mut world = World::reset(&config, 1);
        let y0 = world.player().unwrap().pos.y;
        advance(&mut world, &TickInput::default(), 0.1, &config);
        let bird = world.player().unwrap();
        assert!((bird.vel.y - 27.0).abs() < 1e-4);
        assert!((bird.pos.y - (y0 + 2.7)).abs() < 1e-4);
    }

    #[test]
    fn test_flappy_jump_from_signal() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let mut world = World::reset(&config, 1);
        let tick = TickInput {
            signal: Some(Signal {
                offset_x: 0.0,
                rise: 20.0,
            }),
            ..Default::default()
        };
        let events = advance(&mut world, &tick, config.tick_dt(), &config);
        assert_eq!(events, vec![GameEvent::Jumped]);
        assert!(world.player().unwrap().vel.y < 0.0);
    }

    #[test]
    fn test_pipes_scroll_left() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let mut world = World::reset(&config, 1);
        advance(&mut world, &TickInput::default(), 0.5, &config);
        let pipe = world
            .entities
            .iter()
            .find(|e| e.kind == EntityKind::Obstacle)
            .unwrap();
        assert!((pipe.pos.x - 470.0).abs() < 1e-3);
    }

    #[test]
    fn test_catch_player_clamped() {
        let config = GameConfig::for_variant(Variant::Catch);
        let mut world = World::reset(&config, 1);
        for _ in 0..200 {
            advance(&mut world, &input(&[Command::Right]), 0.1, &config);
        }
        let player = world.player().unwrap();
        assert_eq!(player.pos.x, 1280.0 - 200.0);
    }

    #[test]
    fn test_catch_signal_threshold() {
        let config = GameConfig::for_variant(Variant::Catch);
        let mut world = World::reset(&config, 1);
        let x0 = world.player().unwrap().pos.x;
        let weak = TickInput {
            signal: Some(Signal {
                offset_x: -30.0,
                rise: 0.0,
            }),
            ..Default::default()
        };
        advance(&mut world, &weak, 0.1, &config);
        assert_eq!(world.player().unwrap().pos.x, x0);

        let strong = TickInput {
            signal: Some(Signal {
                offset_x: -60.0,
                rise: 0.0,
            }),
            ..Default::default()
        };
        advance(&mut world, &strong, 0.1, &config);
        assert!((world.player().unwrap().pos.x - (x0 - 30.0)).abs() < 1e-3);
    }

    #[test]
    fn test_shooter_missile_cap() {
        let mut config = GameConfig::for_variant(Variant::Shooter);
        config.shooter.enemy_fire_chance = 0.0;
        let mut world = World::reset(&config, 1);
        let mut fired = 0;
        for _ in 0..5 {
            let events = advance(&mut world, &input(&[Command::Fire]), 0.001, &config);
            fired += events.iter().filter(|e| **e == GameEvent::Fired).count();
        }
        assert_eq!(fired, 3);
        let missiles = world
            .entities
            .iter()
            .filter(|e| e.is_missile(Side::Friendly))
            .count();
        assert_eq!(missiles, 3);
    }

    #[test]
    fn test_enemy_stays_in_field() {
        let mut config = GameConfig::for_variant(Variant::Shooter);
        config.shooter.enemy_fire_chance = 0.0;
        let mut world = World::reset(&config, 4);
        for _ in 0..500 {
            advance(&mut world, &TickInput::default(), 0.1, &config);
        }
        let enemy = world
            .entities
            .iter()
            .find(|e| matches!(e.payload, Payload::Enemy { .. }))
            .unwrap();
        assert!(enemy.pos.x >= 0.0 && enemy.pos.x <= 800.0 - 80.0);
    }
}
