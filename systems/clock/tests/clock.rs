use std::time::Duration;

use outpost_core::{config::WorldConfig, Event, FrameInput, MovementAxes, SpawnerId, Vec2};
use outpost_system_clock::{Config, FrameReport, SimulationClock};
use outpost_world::query;
use proptest::prelude::*;

const FRAME: Duration = Duration::from_millis(500);

fn scripted_inputs() -> Vec<FrameInput> {
    (0..24)
        .map(|frame| FrameInput {
            movement: MovementAxes {
                right: frame % 3 == 0,
                down: frame % 4 == 0,
                ..MovementAxes::NONE
            },
            sprint: frame % 5 == 0,
            pointer: Some(Vec2::new(640.0, 360.0)),
            ..FrameInput::default()
        })
        .collect()
}

fn replay(seed: u64) -> Vec<FrameReport> {
    let mut clock = SimulationClock::new(Config::new(seed));
    scripted_inputs()
        .iter()
        .map(|input| clock.step(FRAME, input))
        .collect()
}

fn spawn_positions(events: &[Event]) -> Vec<(SpawnerId, Vec2)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned {
                spawner, position, ..
            } => Some((*spawner, *position)),
            _ => None,
        })
        .collect()
}

#[test]
fn identical_seeds_replay_identically() {
    let first = replay(0x0b5e_55ed);
    let second = replay(0x0b5e_55ed);
    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn initial_layout_respects_spawner_separation() {
    let clock = SimulationClock::new(Config::new(42));
    let world = clock.world();
    let center = Vec2::new(2000.0, 2000.0);
    let spawners = query::spawner_view(world).into_vec();

    assert!(!spawners.is_empty() && spawners.len() <= 4);
    for (index, spawner) in spawners.iter().enumerate() {
        assert!(spawner.origin.distance(center) >= 800.0);
        for other in spawners.iter().skip(index + 1) {
            assert!(spawner.origin.distance(other.origin) >= 800.0);
        }
    }
    assert!(!query::fog_pending(world), "initial fog pass ran");
}

#[test]
fn spawned_enemies_are_published_to_presentation() {
    let mut clock = SimulationClock::new(Config::new(9));
    let spawner_count = query::spawner_view(clock.world()).iter().count();

    let mut report = FrameReport::default();
    for _ in 0..6 {
        report = clock.step(FRAME, &FrameInput::default());
    }

    let spawned: Vec<_> = report
        .events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), spawner_count, "one spawn per spawner at 3s");
    for enemy in spawned {
        assert!(report
            .position_updates
            .iter()
            .any(|update| update.enemy == enemy));
    }
}

#[test]
fn spawns_ring_the_configured_spawner_footprint() {
    let world = WorldConfig {
        spawner_size: 40.0,
        ..WorldConfig::default()
    };
    let mut clock = SimulationClock::new(Config::new(9).with_world(world));

    let mut spawned = Vec::new();
    for _ in 0..6 {
        let report = clock.step(FRAME, &FrameInput::default());
        spawned.extend(spawn_positions(&report.events));
    }

    assert!(!spawned.is_empty());
    let spawners = query::spawner_view(clock.world());
    for (spawner, position) in spawned {
        let origin = spawners.get(spawner).expect("spawner known").origin;
        let centre = origin + Vec2::splat(20.0);
        assert!((position.distance(centre) - 100.0).abs() < 1e-3);
    }
}

#[test]
fn enemy_counts_never_exceed_the_cap() {
    let mut clock = SimulationClock::new(Config::new(5));
    for _ in 0..60 {
        let _ = clock.step(FRAME, &FrameInput::default());
        for spawner in query::spawner_view(clock.world()).iter() {
            assert!(spawner.active_enemies <= 3);
        }
    }
    let total: u32 = query::spawner_view(clock.world())
        .iter()
        .map(|spawner| spawner.active_enemies)
        .sum();
    assert_eq!(total as usize, query::enemy_view(clock.world()).len());
}

#[test]
fn hotkey_pointer_and_click_place_a_building_in_one_frame() {
    let mut clock = SimulationClock::new(Config::new(1));
    let input = FrameInput {
        select_building: Some(1),
        pointer: Some(Vec2::new(750.0, 390.0)),
        confirm_placement: true,
        ..FrameInput::default()
    };

    let report = clock.step(Duration::from_millis(16), &input);
    let placed = report.events.iter().find_map(|event| match event {
        Event::BuildingPlaced { origin, .. } => Some(*origin),
        _ => None,
    });
    assert_eq!(placed, Some(Vec2::new(2100.0, 2000.0)));
    assert!(clock.selected_building().is_some());
    let preview = report.preview.expect("selection still active");
    assert!(!preview.placeable, "footprint is now occupied");

    let mut completed = false;
    for _ in 0..10 {
        let report = clock.step(Duration::from_millis(200), &FrameInput::default());
        completed |= report
            .events
            .iter()
            .any(|event| matches!(event, Event::ConstructionCompleted { .. }));
    }
    assert!(completed);
}

#[test]
fn resizing_the_viewport_reclamps_the_camera() {
    let mut clock = SimulationClock::new(Config::new(1));
    let events = clock.resize(3000.0, 3000.0);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ViewportResized { .. })));
    assert_eq!(
        query::camera_offset(clock.world()),
        Vec2::new(1000.0, 1000.0)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn explored_chunks_persist_across_frames(
        seed in any::<u64>(),
        moves in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..40)
    ) {
        let mut clock = SimulationClock::new(Config::new(seed));
        let mut explored: Vec<bool> = query::fog_view(clock.world())
            .iter()
            .map(|(_, state)| state.explored)
            .collect();

        for (right, down, sprint) in moves {
            let input = FrameInput {
                movement: MovementAxes { right, down, ..MovementAxes::NONE },
                sprint,
                ..FrameInput::default()
            };
            let _ = clock.step(FRAME, &input);
            let fog = query::fog_view(clock.world());
            for ((_, state), was) in fog.iter().zip(explored.iter_mut()) {
                prop_assert!(!*was || state.explored);
                *was = state.explored;
            }
        }
    }
}
