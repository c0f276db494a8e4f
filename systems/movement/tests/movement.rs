use std::time::Duration;

use outpost_core::{Command, Event, SpawnerId, Vec2};
use outpost_system_movement::{pursue, Movement};
use outpost_world::{self as world, query, World};
use proptest::prelude::*;

fn spawned_world(positions: &[Vec2]) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::CreateSpawner {
            origin: Vec2::new(300.0, 300.0),
        },
        &mut events,
    );
    for position in positions {
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                spawner: SpawnerId::new(0),
                position: *position,
            },
            &mut events,
        );
    }
    world
}

fn tick() -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(16),
    }
}

#[test]
fn movement_waits_for_time_to_advance() {
    let world = spawned_world(&[Vec2::new(100.0, 100.0)]);
    let mut commands = Vec::new();
    Movement::default().handle(
        &[],
        &query::enemy_view(&world),
        query::player_position(&world),
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn every_enemy_steps_toward_the_player() {
    let mut world = spawned_world(&[Vec2::new(100.0, 2000.0), Vec2::new(2000.0, 3000.0)]);
    let player = query::player_position(&world);
    let mut commands = Vec::new();
    Movement::default().handle(&[tick()], &query::enemy_view(&world), player, &mut commands);

    assert_eq!(commands.len(), 2);
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let positions: Vec<Vec2> = query::enemy_view(&world)
        .iter()
        .map(|enemy| enemy.position)
        .collect();
    assert_eq!(
        positions,
        vec![Vec2::new(102.0, 2000.0), Vec2::new(2000.0, 2998.0)]
    );
}

#[test]
fn enemy_on_the_player_stays_put() {
    let world = spawned_world(&[Vec2::new(2000.0, 2000.0)]);
    let mut commands = Vec::new();
    Movement::default().handle(
        &[tick()],
        &query::enemy_view(&world),
        query::player_position(&world),
        &mut commands,
    );
    assert!(commands.is_empty());
}

proptest! {
    #[test]
    fn one_step_closes_exactly_the_enemy_speed(
        ex in 0.0f32..4000.0,
        ey in 0.0f32..4000.0,
        px in 0.0f32..4000.0,
        py in 0.0f32..4000.0,
    ) {
        let from = Vec2::new(ex, ey);
        let target = Vec2::new(px, py);
        let before = from.distance(target);
        prop_assume!(before > 2.0);

        let next = pursue(from, target, 2.0).expect("distinct points move");
        let after = next.distance(target);
        prop_assert!((before - after - 2.0).abs() < 1e-2, "closed {}", before - after);
        prop_assert!((next.distance(from) - 2.0).abs() < 1e-3);
    }
}
