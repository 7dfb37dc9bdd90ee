//! Collision detection and rule resolution
//!
//! Runs once per tick after motion. Terminal checks come first: if the run
//! ends, nothing else in the consequence table applies for that tick.

use super::spawn;
use super::state::{EndCause, EntityKind, GameEvent, Payload, Phase, Side, World};
use crate::config::{GameConfig, Variant};

/// Apply the consequence table to the current overlaps
///
/// A world that is not running is left untouched.
pub fn resolve(world: &mut World, config: &GameConfig) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if world.phase != Phase::Running {
        return events;
    }

    if let Some(cause) = terminal_collision(world, config) {
        end_run(world, cause, &mut events);
        return events;
    }

    collect_consumables(world, config, &mut events);
    if config.variant == Variant::Shooter {
        strike_enemies(world, config, &mut events);
    }
    if config.variant == Variant::Flappy {
        score_passed_pipes(world, &mut events);
    }
    recycle_at_boundary(world, config, &mut events);
    if config.variant == Variant::Flappy {
        spawn_pipes_when_due(world, config);
    }
    spawn::refresh_tunables(world, config);
    events
}

/// First collision that ends the run, if any
pub fn terminal_collision(world: &World, config: &GameConfig) -> Option<EndCause> {
    let player = world.player()?;
    let player_box = player.bounds();

    if !world.field().contains(&player_box) {
        return Some(EndCause::Boundary);
    }

    if let Some(body) = player.snake() {
        let head = body.head();
        let skip = config.snake.self_collision_skip;
        if body.segments.iter().skip(skip).any(|&seg| seg == head) {
            return Some(EndCause::SelfCollision);
        }
    }

    for other in &world.entities {
        if other.id == player.id || !player_box.overlaps(&other.bounds()) {
            continue;
        }
        match other.kind {
            EntityKind::Obstacle => return Some(EndCause::Obstacle),
            EntityKind::Projectile if other.is_missile(Side::Hostile) => {
                return Some(EndCause::Projectile);
            }
            EntityKind::Projectile | EntityKind::Consumable | EntityKind::Player => {}
        }
    }
    None
}

/// Freeze the run: transient entities go, the player and score stay
pub fn end_run(world: &mut World, cause: EndCause, events: &mut Vec<GameEvent>) {
    world.entities.retain(|e| e.kind == EntityKind::Player);
    world.phase = Phase::GameOver;
    world.end_cause = Some(cause);
    log::info!(
        "Game over ({}) after {} ticks with score {}",
        cause.as_str(),
        world.time_ticks,
        world.score
    );
    events.push(GameEvent::GameOver {
        cause,
        score: world.score,
    });
}

fn collect_consumables(world: &mut World, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let Some(player_box) = world.player().map(|p| p.bounds()) else {
        return;
    };
    let touched: Vec<u32> = world
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Consumable && player_box.overlaps(&e.bounds()))
        .map(|e| e.id)
        .collect();

    for id in touched {
        world.score += 1;
        if let Some(body) = world.player_mut().and_then(|p| p.snake_mut()) {
            body.grow();
        }
        spawn::respawn_consumable(world, config, id);
        events.push(GameEvent::Collected { id });
    }
}

/// Friendly missiles destroy the enemy they hit
fn strike_enemies(world: &mut World, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let missiles: Vec<u32> = world
        .entities
        .iter()
        .filter(|e| e.is_missile(Side::Friendly))
        .map(|e| e.id)
        .collect();

    for missile_id in missiles {
        let Some(missile_box) = world.entity(missile_id).map(|m| m.bounds()) else {
            continue;
        };
        let hit = world.entities.iter().find_map(|e| match &e.payload {
            Payload::Enemy { code } if missile_box.overlaps(&e.bounds()) => {
                Some((e.id, code.clone()))
            }
            _ => None,
        });
        let Some((enemy_id, code)) = hit else {
            continue;
        };
        world.despawn(missile_id);
        world.score += 1;
        log::debug!("Missile {} destroyed enemy {}", missile_id, code);
        spawn::respawn_enemy(world, config, enemy_id);
        events.push(GameEvent::EnemyDestroyed { code });
    }
}

/// One point per pipe pair once the bird is fully past it
fn score_passed_pipes(world: &mut World, events: &mut Vec<GameEvent>) {
    let Some(bird_x) = world.player().map(|p| p.pos.x) else {
        return;
    };
    let mut gained = 0;
    for entity in world.entities.iter_mut() {
        let right = entity.bounds().max().x;
        if let Payload::PipeHalf {
            pair,
            upper: true,
            passed,
        } = &mut entity.payload
        {
            if !*passed && right < bird_x {
                *passed = true;
                gained += 1;
                events.push(GameEvent::Passed { pair: *pair });
            }
        }
    }
    world.score += gained;
}

/// Despawn whatever left the playfield; falling objects get a replacement
fn recycle_at_boundary(world: &mut World, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let field = world.field();
    let gone: Vec<(u32, EntityKind)> = world
        .entities
        .iter()
        .filter(|e| match e.kind {
            EntityKind::Player => false,
            // Falling objects only leave through the bottom
            EntityKind::Consumable => e.vel.y > 0.0 && e.pos.y >= field.max().y,
            // Pipes scroll in from the right edge, so only the left edge counts
            EntityKind::Obstacle => e.vel.x < 0.0 && e.bounds().max().x <= field.min.x,
            EntityKind::Projectile => !field.overlaps(&e.bounds()),
        })
        .map(|e| (e.id, e.kind))
        .collect();

    for (id, kind) in gone {
        world.despawn(id);
        events.push(GameEvent::Despawned { id });
        if kind == EntityKind::Consumable {
            let replacement = spawn::spawn_falling(world, config);
            log::debug!("Object {} fell out, replaced by {}", id, replacement);
        }
    }
}

/// New pair at the right edge once the newest pair has scrolled far enough
fn spawn_pipes_when_due(world: &mut World, config: &GameConfig) {
    let width = world.playfield.width;
    let newest_x = world
        .entities
        .iter()
        .filter(|e| matches!(e.payload, Payload::PipeHalf { upper: true, .. }))
        .max_by_key(|e| e.id)
        .map(|e| e.pos.x);
    let due = match newest_x {
        None => true,
        Some(x) => x < width - config.flappy.pipe_spacing,
    };
    if due {
        spawn::spawn_pipe_pair(world, config, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Progression;
    use crate::sim::TickInput;
    use crate::sim::state::{Entity, SnakeBody};
    use glam::Vec2;

    fn snake_world() -> (GameConfig, World) {
        let config = GameConfig::for_variant(Variant::Snake);
        let world = World::reset(&config, 1);
        (config, world)
    }

    fn food_id(world: &World) -> u32 {
        world
            .entities
            .iter()
            .find(|e| e.kind == EntityKind::Consumable)
            .unwrap()
            .id
    }

    fn set_snake(world: &mut World, segments: Vec<Vec2>) {
        let player = world.player_mut().unwrap();
        player.pos = segments[0];
        player.payload = Payload::Snake(SnakeBody {
            segments,
            heading: crate::sim::Direction::Right,
            next_heading: crate::sim::Direction::Right,
        });
    }

    #[test]
    fn test_consumable_scores_and_moves() {
        let (config, mut world) = snake_world();
        let food = food_id(&world);
        let food_pos = world.entity(food).unwrap().pos;
        set_snake(&mut world, vec![food_pos, Vec2::new(1.0, 2.0)]);

        let events = resolve(&mut world, &config);
        assert_eq!(world.score, 1);
        assert_eq!(events, vec![GameEvent::Collected { id: food }]);
        assert_ne!(world.entity(food).unwrap().pos, food_pos);
        assert_eq!(world.snake().unwrap().len(), 3);
    }

    #[test]
    fn test_boundary_ends_run() {
        let (config, mut world) = snake_world();
        set_snake(&mut world, vec![Vec2::new(-1.0, 3.0), Vec2::new(0.0, 3.0)]);
        let events = resolve(&mut world, &config);
        assert_eq!(world.phase, Phase::GameOver);
        assert_eq!(world.end_cause, Some(EndCause::Boundary));
        assert!(matches!(events[0], GameEvent::GameOver { .. }));
    }

    #[test]
    fn test_self_collision_respects_skip() {
        let (config, mut world) = snake_world();
        // Head meets index 2: inside the exclusion window
        set_snake(
            &mut world,
            vec![Vec2::new(5.0, 5.0), Vec2::new(5.0, 6.0), Vec2::new(5.0, 5.0)],
        );
        resolve(&mut world, &config);
        assert_eq!(world.phase, Phase::Running);

        // Head meets index 4
        set_snake(
            &mut world,
            vec![
                Vec2::new(5.0, 5.0),
                Vec2::new(6.0, 5.0),
                Vec2::new(6.0, 6.0),
                Vec2::new(5.0, 6.0),
                Vec2::new(5.0, 5.0),
            ],
        );
        resolve(&mut world, &config);
        assert_eq!(world.end_cause, Some(EndCause::SelfCollision));
    }

    #[test]
    fn test_game_over_clears_transients_and_keeps_score() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let mut world = World::reset(&config, 1);
        world.score = 4;
        world.player_mut().unwrap().pos.y = 800.0;
        resolve(&mut world, &config);
        assert_eq!(world.phase, Phase::GameOver);
        assert_eq!(world.score, 4);
        assert_eq!(world.entities.len(), 1);
        assert_eq!(world.entities[0].kind, EntityKind::Player);
    }

    #[test]
    fn test_resolve_noop_after_game_over() {
        let (config, mut world) = snake_world();
        set_snake(&mut world, vec![Vec2::new(20.0, 3.0), Vec2::new(19.0, 3.0)]);
        resolve(&mut world, &config);
        let frozen = world.clone();
        assert!(resolve(&mut world, &config).is_empty());
        assert!(resolve(&mut world, &config).is_empty());
        assert_eq!(world, frozen);
    }

    #[test]
    fn test_no_score_on_terminal_tick() {
        let config = GameConfig::for_variant(Variant::Shooter);
        let mut world = World::reset(&config, 1);
        let ship = world.player().unwrap().bounds();
        // A hostile missile on the ship and a friendly one on the enemy in the same tick
        spawn::spawn_missile(&mut world, &config, ship, Side::Friendly);
        let hostile = world.spawn(|id| {
            Entity::new(id, EntityKind::Projectile, ship.min, Vec2::new(30.0, 30.0))
                .with_payload(Payload::Missile {
                    side: Side::Hostile,
                })
        });
        let enemy = world
            .entities
            .iter()
            .find(|e| matches!(e.payload, Payload::Enemy { .. }))
            .unwrap()
            .bounds();
        let friendly = world
            .entities
            .iter()
            .find(|e| e.is_missile(Side::Friendly))
            .unwrap()
            .id;
        world.entity_mut(friendly).unwrap().pos = enemy.min;

        resolve(&mut world, &config);
        assert!(world.entity(hostile).is_none());
        assert_eq!(world.end_cause, Some(EndCause::Projectile));
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_missile_destroys_enemy() {
        let config = GameConfig::for_variant(Variant::Shooter);
        let mut world = World::reset(&config, 3);
        let ship = world.player().unwrap().bounds();
        let missile = spawn::spawn_missile(&mut world, &config, ship, Side::Friendly);
        let (enemy_id, enemy_min, old_code) = world
            .entities
            .iter()
            .find_map(|e| match &e.payload {
                Payload::Enemy { code } => Some((e.id, e.pos, code.clone())),
                _ => None,
            })
            .unwrap();
        world.entity_mut(missile).unwrap().pos = enemy_min + Vec2::new(10.0, 10.0);

        let events = resolve(&mut world, &config);
        assert_eq!(world.score, 1);
        assert!(world.entity(missile).is_none());
        assert!(world.entity(enemy_id).is_some());
        assert_eq!(events, vec![GameEvent::EnemyDestroyed { code: old_code }]);
    }

    #[test]
    fn test_pipe_pass_scores_once_per_pair() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let mut world = World::reset(&config, 1);
        for e in world.entities.iter_mut() {
            if e.kind == EntityKind::Obstacle {
                e.pos.x = 0.0;
            }
        }
        // Bird at x=100, pipe spans 0..80
        let events = resolve(&mut world, &config);
        let passed = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Passed { .. }))
            .count();
        assert_eq!(passed, 1);
        assert_eq!(world.score, 1);
        resolve(&mut world, &config);
        assert_eq!(world.score, 1);
    }

    #[test]
    fn test_pipe_spawn_rule() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let mut world = World::reset(&config, 1);
        let pairs = |w: &World| {
            w.entities
                .iter()
                .filter(|e| matches!(e.payload, Payload::PipeHalf { upper: true, .. }))
                .count()
        };
        resolve(&mut world, &config);
        assert_eq!(pairs(&world), 1);

        for e in world.entities.iter_mut() {
            if e.kind == EntityKind::Obstacle {
                e.pos.x = 190.0;
            }
        }
        resolve(&mut world, &config);
        assert_eq!(pairs(&world), 2);
    }

    #[test]
    fn test_offscreen_pipes_despawn() {
        let config = GameConfig::for_variant(Variant::Flappy);
        let mut world = World::reset(&config, 1);
        for e in world.entities.iter_mut() {
            if e.kind == EntityKind::Obstacle {
                e.pos.x = -80.0;
            }
        }
        let events = resolve(&mut world, &config);
        assert_eq!(world.phase, Phase::Running);
        let despawned = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Despawned { .. }))
            .count();
        assert_eq!(despawned, 2);
        // Replaced by a fresh pair at the right edge
        assert_eq!(world.count_of(EntityKind::Obstacle), 2);
    }

    #[test]
    fn test_falling_object_replaced_at_bottom() {
        let config = GameConfig::for_variant(Variant::Catch);
        let mut world = World::reset(&config, 1);
        let id = food_id(&world);
        world.entity_mut(id).unwrap().pos = Vec2::new(0.0, 720.0);
        resolve(&mut world, &config);
        assert_eq!(world.phase, Phase::Running);
        assert!(world.entity(id).is_none());
        assert_eq!(world.count_of(EntityKind::Consumable), 1);
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_catch_progression_speeds_up() {
        let config = GameConfig::for_variant(Variant::Catch);
        let mut world = World::reset(&config, 1);
        let start = world.tunables.speed;
        let player_min = world.player().unwrap().pos;
        for _ in 0..5 {
            let id = food_id(&world);
            world.entity_mut(id).unwrap().pos = player_min;
            resolve(&mut world, &config);
        }
        assert_eq!(world.score, 5);
        assert!(world.tunables.speed > start);
    }

    #[test]
    fn test_speed_after_ten_points() {
        let mut config = GameConfig::for_variant(Variant::Catch);
        config.catch.progression = Progression::new(0.05, 5);
        let mut world = World::reset(&config, 4);
        let start = world.tunables.speed;
        let player_min = world.player().unwrap().pos;
        for point in 1..=10 {
            let id = food_id(&world);
            world.entity_mut(id).unwrap().pos = player_min;
            resolve(&mut world, &config);
            assert_eq!(world.score, point);
            if point == 4 {
                assert_eq!(world.tunables.speed, start);
            }
        }
        assert_eq!(world.phase, Phase::Running);
        assert!(world.tunables.speed >= start + 0.10 - 1e-4);

        // Falling objects pick the new speed up on the next advance
        crate::sim::advance(&mut world, &TickInput::default(), config.tick_dt(), &config);
        let id = food_id(&world);
        assert_eq!(world.entity(id).unwrap().vel.y, world.tunables.speed);
    }
}
