use outpost_core::{Command, Event, MovementAxes, Vec2};
use outpost_system_camera::{CameraControl, CameraInput};
use outpost_world::{self as world, query, World};

const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

fn step(world: &mut World, camera: &mut CameraControl, input: CameraInput) -> Vec<Event> {
    let mut commands = Vec::new();
    camera.handle(input, &mut commands);
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn pointer(x: f32, y: f32) -> CameraInput {
    CameraInput {
        pointer: Some(Vec2::new(x, y)),
        viewport: VIEWPORT,
        ..CameraInput::default()
    }
}

#[test]
fn edge_scroll_moves_fifteen_units_per_frame() {
    let mut world = World::new();
    let mut camera = CameraControl::default();
    let start = query::camera_offset(&world);

    let events = step(&mut world, &mut camera, pointer(1275.0, 360.0));

    assert_eq!(
        events,
        vec![Event::CameraMoved {
            offset: start + Vec2::new(15.0, 0.0),
        }]
    );
}

#[test]
fn follow_toggle_recentres_and_suppresses_edge_scroll() {
    let mut world = World::new();
    let mut camera = CameraControl::default();
    let _ = step(&mut world, &mut camera, pointer(5.0, 5.0));
    assert_ne!(query::camera_offset(&world), Vec2::new(1360.0, 1640.0));

    let mut commands = Vec::new();
    camera.handle(
        CameraInput {
            toggle_follow: true,
            ..pointer(5.0, 5.0)
        },
        &mut commands,
    );
    assert!(camera.following());
    assert_eq!(commands, vec![Command::CenterCamera]);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(query::camera_offset(&world), Vec2::new(1360.0, 1640.0));

    let idle = step(&mut world, &mut camera, pointer(5.0, 5.0));
    assert!(idle.is_empty(), "centred camera reports no movement");
}

#[test]
fn hold_to_center_is_momentary() {
    let mut world = World::new();
    let mut camera = CameraControl::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ScrollCamera {
            edges: MovementAxes {
                down: true,
                ..MovementAxes::NONE
            },
        },
        &mut events,
    );

    let centred = step(
        &mut world,
        &mut camera,
        CameraInput {
            hold_center: true,
            ..pointer(640.0, 360.0)
        },
    );
    assert_eq!(centred.len(), 1);
    assert!(!camera.following());

    let released = step(&mut world, &mut camera, pointer(640.0, 360.0));
    assert!(released.is_empty());
}
