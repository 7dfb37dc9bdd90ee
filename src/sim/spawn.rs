//! Initial layouts and spawn rules
//!
//! Every random draw goes through the world's seeded RNG so layouts replay
//! exactly for a given seed.

use glam::Vec2;
use rand::Rng;

use super::rect::Rect;
use super::state::{Entity, EntityKind, Payload, Side, SnakeBody, Tunables, World};
use crate::config::{GameConfig, Variant};

/// Letters used for enemy identification codes
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Tunables for a score under the active variant's progression rule
pub fn tunables_for(config: &GameConfig, score: u32) -> Tunables {
    let speed = config.progression().apply(config.base_speed(), score);
    let gap = match config.variant {
        Variant::Flappy => config.playfield().height * config.flappy.gap_fraction,
        _ => 0.0,
    };
    Tunables { speed, gap }
}

/// Recompute tunables after a score change
pub fn refresh_tunables(world: &mut World, config: &GameConfig) {
    let next = tunables_for(config, world.score);
    if next != world.tunables {
        log::debug!(
            "Speed {:.2} -> {:.2} at score {}",
            world.tunables.speed,
            next.speed,
            world.score
        );
        world.tunables = next;
    }
}

/// Lay out the variant's starting entities
pub fn populate(world: &mut World, config: &GameConfig) {
    let field = world.playfield;
    match config.variant {
        Variant::Snake => {
            let snake = &config.snake;
            let body = SnakeBody::new(snake.start_cell, snake.initial_length, snake.initial_heading);
            world.spawn(|id| {
                Entity::new(id, EntityKind::Player, snake.start_cell, Vec2::ONE)
                    .with_payload(Payload::Snake(body))
            });
            world.spawn(|id| Entity::new(id, EntityKind::Consumable, snake.food_cell, Vec2::ONE));
        }
        Variant::Flappy => {
            let flappy = &config.flappy;
            let pos = Vec2::new(flappy.bird_x, field.height / 2.0);
            world.spawn(|id| Entity::new(id, EntityKind::Player, pos, flappy.bird_size));
            spawn_pipe_pair(world, config, field.width);
        }
        Variant::Catch => {
            let catch = &config.catch;
            let pos = Vec2::new(
                (field.width - catch.player_size.x) / 2.0,
                field.height - catch.player_bottom_offset,
            );
            world.spawn(|id| Entity::new(id, EntityKind::Player, pos, catch.player_size));
            for _ in 0..catch.objects {
                spawn_falling(world, config);
            }
        }
        Variant::Shooter => {
            let shooter = &config.shooter;
            let pos = Vec2::new(
                (field.width - shooter.ship_size.x) / 2.0,
                field.height - shooter.ship_bottom_margin - shooter.ship_size.y,
            );
            world.spawn(|id| Entity::new(id, EntityKind::Player, pos, shooter.ship_size));
            let (pos, code) = enemy_placement(world, config);
            world.spawn(|id| {
                Entity::new(id, EntityKind::Obstacle, pos, shooter.enemy_size)
                    .with_payload(Payload::Enemy { code })
            });
        }
    }
    world.normalize_order();
    log::debug!(
        "Populated {} world with {} entities",
        config.variant.as_str(),
        world.entities.len()
    );
}

/// Move a consumed consumable somewhere new
///
/// Snake food picks a uniform grid cell other than the one it occupied;
/// falling objects restart at the top with a fresh x.
pub fn respawn_consumable(world: &mut World, config: &GameConfig, id: u32) {
    let pos = match config.variant {
        Variant::Snake => {
            let Some(old) = world.entity(id).map(|e| e.pos) else {
                return;
            };
            random_cell_except(world, old)
        }
        _ => falling_start(world, config),
    };
    if let Some(entity) = world.entity_mut(id) {
        log::debug!("Respawn consumable {} at ({:.1}, {:.1})", id, pos.x, pos.y);
        entity.pos = pos;
    }
}

/// Give the enemy a new code and position
pub fn respawn_enemy(world: &mut World, config: &GameConfig, id: u32) {
    let (pos, code) = enemy_placement(world, config);
    if let Some(entity) = world.entity_mut(id) {
        log::debug!("Respawn enemy {} as {}", id, code);
        entity.pos = pos;
        entity.payload = Payload::Enemy { code };
    }
}

/// Spawn a falling consumable at the top edge
pub fn spawn_falling(world: &mut World, config: &GameConfig) -> u32 {
    let pos = falling_start(world, config);
    let vel = Vec2::new(0.0, world.tunables.speed);
    let size = config.catch.object_size;
    world.spawn(|id| Entity::new(id, EntityKind::Consumable, pos, size).with_velocity(vel))
}

/// Spawn an upper and lower pipe with its left edge at `x`
pub fn spawn_pipe_pair(world: &mut World, config: &GameConfig, x: f32) -> u32 {
    let flappy = &config.flappy;
    let height = world.playfield.height;
    let gap = world.tunables.gap;
    let lo = height * flappy.top_min_fraction;
    let hi = height * flappy.top_max_fraction;
    let top = world.rng_mut().random_range(lo..=hi);
    let vel = Vec2::new(-world.tunables.speed, 0.0);
    let width = flappy.pipe_width;

    let pair = world.spawn(|id| {
        Entity::new(id, EntityKind::Obstacle, Vec2::new(x, 0.0), Vec2::new(width, top))
            .with_velocity(vel)
            .with_payload(Payload::PipeHalf {
                pair: id,
                upper: true,
                passed: false,
            })
    });
    let bottom = top + gap;
    world.spawn(|id| {
        Entity::new(
            id,
            EntityKind::Obstacle,
            Vec2::new(x, bottom),
            Vec2::new(width, height - bottom),
        )
        .with_velocity(vel)
        .with_payload(Payload::PipeHalf {
            pair,
            upper: false,
            passed: false,
        })
    });
    log::debug!("Spawn pipe pair {} at x={:.0} (top {:.0})", pair, x, top);
    pair
}

/// Spawn a missile leaving `from`: friendly ones fly up from its top edge,
/// hostile ones fall from its bottom edge
pub fn spawn_missile(world: &mut World, config: &GameConfig, from: Rect, side: Side) -> u32 {
    let shooter = &config.shooter;
    let size = shooter.missile_size;
    let x = from.center().x - size.x / 2.0;
    let (pos, vel) = match side {
        Side::Friendly => (
            Vec2::new(x, from.min.y - size.y),
            Vec2::new(0.0, -shooter.missile_speed),
        ),
        Side::Hostile => (Vec2::new(x, from.max().y), Vec2::new(0.0, shooter.missile_speed)),
    };
    world.spawn(|id| {
        Entity::new(id, EntityKind::Projectile, pos, size)
            .with_velocity(vel)
            .with_payload(Payload::Missile { side })
    })
}

fn falling_start(world: &mut World, config: &GameConfig) -> Vec2 {
    let catch = &config.catch;
    let width = world.playfield.width;
    let center = world
        .rng_mut()
        .random_range(catch.spawn_margin..width - catch.spawn_margin);
    Vec2::new(center - catch.object_size.x / 2.0, 0.0)
}

fn enemy_placement(world: &mut World, config: &GameConfig) -> (Vec2, String) {
    let shooter = &config.shooter;
    let width = world.playfield.width;
    let rng = world.rng_mut();
    let center = rng.random_range(shooter.spawn_margin..width - shooter.spawn_margin);
    let code = random_code(rng, shooter.code_length);
    let x = (center - shooter.enemy_size.x / 2.0).clamp(0.0, (width - shooter.enemy_size.x).max(0.0));
    (Vec2::new(x, shooter.enemy_top), code)
}

fn random_code(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Uniform cell over the grid, skipping `old`
fn random_cell_except(world: &mut World, old: Vec2) -> Vec2 {
    let cols = world.playfield.width.floor() as u32;
    let rows = world.playfield.height.floor() as u32;
    let cells = cols.saturating_mul(rows);
    if cells < 2 {
        return old;
    }
    let old_index = (old.y as u32 * cols + old.x as u32).min(cells - 1);
    let mut index = world.rng_mut().random_range(0..cells - 1);
    if index >= old_index {
        index += 1;
    }
    Vec2::new((index % cols) as f32, (index / cols) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Playfield, Progression};

    #[test]
    fn test_snake_layout() {
        let config = GameConfig::for_variant(Variant::Snake);
        let world = World::reset(&config, 1);
        let body = world.snake().unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body.head(), Vec2::new(1.0, 1.0));
        let food = world
            .entities
            .iter()
            .find(|e| e.kind == EntityKind::Consumable)
            .unwrap();
        assert_eq!(food.pos, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_snake_food_respawns_elsewhere() {
        let config = GameConfig::for_variant(Variant::Snake);
        let mut world = World::reset(&config, 5);
        let food = world.entities[1].id;
        for _ in 0..200 {
            let before = world.entity(food).unwrap().pos;
            respawn_consumable(&mut world, &config, food);
            let after = world.entity(food).unwrap().pos;
            assert_ne!(before, after);
            assert!(after.x >= 0.0 && after.x < 12.0 && after.y >= 0.0 && after.y < 12.0);
        }
    }

    #[test]
    fn test_snake_food_on_two_cell_grid() {
        let mut config = GameConfig::for_variant(Variant::Snake);
        config.playfield = Some(Playfield::new(2.0, 1.0));
        config.snake.start_cell = Vec2::ZERO;
        config.snake.food_cell = Vec2::new(1.0, 0.0);
        config.snake.initial_length = 1;
        config.validate().unwrap();

        let mut world = World::reset(&config, 3);
        let food = world.entities[1].id;
        for i in 0..10 {
            respawn_consumable(&mut world, &config, food);
            let expected = if i % 2 == 0 { Vec2::ZERO } else { Vec2::new(1.0, 0.0) };
            assert_eq!(world.entity(food).unwrap().pos, expected);
        }

        // A single cell has nowhere else to go
        world.playfield = Playfield::new(1.5, 1.5);
        let before = world.entity(food).unwrap().pos;
        respawn_consumable(&mut world, &config, food);
        assert_eq!(world.entity(food).unwrap().pos, before);
    }

    #[test]
    fn test_pipe_pair_leaves_gap() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let world = World::reset(&config, 9);
        let pipes: Vec<_> = world
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Obstacle)
            .collect();
        assert_eq!(pipes.len(), 2);
        let upper = pipes[0].bounds();
        let lower = pipes[1].bounds();
        assert!((lower.min.y - upper.max().y - 175.0).abs() < 1e-3);
        assert!((lower.max().y - 700.0).abs() < 1e-3);
        assert!(upper.size().y >= 700.0 / 6.0 - 1e-3 && upper.size().y <= 350.0 + 1e-3);
        assert_eq!(upper.min.x, 500.0);
    }

    #[test]
    fn test_enemy_code_shape() {
        let config = GameConfig::for_variant(Variant::Shooter);
        let world = World::reset(&config, 11);
        let code = world
            .entities
            .iter()
            .find_map(|e| match &e.payload {
                Payload::Enemy { code } => Some(code.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_falling_spawn_inside_margins() {
        let config = GameConfig::for_variant(Variant::Catch);
        let mut world = World::reset(&config, 2);
        for _ in 0..100 {
            let id = spawn_falling(&mut world, &config);
            let e = world.entity(id).unwrap();
            let center = e.bounds().center().x;
            assert!((50.0..1230.0).contains(&center));
            assert_eq!(e.pos.y, 0.0);
        }
    }

    #[test]
    fn test_tunables_follow_progression() {
        let mut config = GameConfig::for_variant(Variant::Catch);
        assert_eq!(tunables_for(&config, 4).speed, 150.0);
        assert_eq!(tunables_for(&config, 5).speed, 151.5);
        config.catch.progression = Progression::NONE;
        assert_eq!(tunables_for(&config, 50).speed, 150.0);
    }

    #[test]
    fn test_gap_does_not_drift() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let start = tunables_for(&config, 0);
        assert_eq!(start.gap, 175.0);
        for score in [1, 5, 50, 500] {
            let later = tunables_for(&config, score);
            assert_eq!(later.gap, start.gap);
            assert!(later.speed >= start.speed);
        }
    }
}
