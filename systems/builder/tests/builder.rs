use outpost_core::{BuildingKind, Command, Event, MovementAxes, PlacementError, Vec2};
use outpost_system_builder::{Builder, BuilderInput, PlacementPreview};
use outpost_world::{self as world, query, World};

fn preview_at(builder: &Builder, world: &World, screen: Vec2) -> Option<PlacementPreview> {
    let origin = query::snap_to_grid(world, query::screen_to_world(world, screen));
    builder.preview(Some(origin), query::config(world).building_size, |origin| {
        query::validate_placement(world, origin).is_ok()
    })
}

fn select(builder: &mut Builder, hotkey: u8) -> BuildingKind {
    let kind = BuildingKind::from_hotkey(hotkey).expect("valid hotkey");
    builder.update_selection(BuilderInput::new(Some(kind), false, false));
    kind
}

#[test]
fn confirming_a_valid_preview_places_the_building() {
    let mut world = World::new();
    let mut builder = Builder::new();
    let kind = select(&mut builder, 1);

    // Camera sits at (1360, 1640); this pointer lands on (2110, 2030).
    let preview = preview_at(&builder, &world, Vec2::new(750.0, 390.0)).expect("selection active");
    assert_eq!(preview.origin, Vec2::new(2100.0, 2000.0));
    assert!(preview.placeable);

    let confirm = BuilderInput::new(None, false, true);
    let mut commands = Vec::new();
    builder.handle(Some(preview), confirm, &mut commands);
    assert_eq!(
        commands,
        vec![Command::PlaceBuilding {
            kind,
            origin: Vec2::new(2100.0, 2000.0),
        }]
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert!(matches!(events.as_slice(), [Event::BuildingPlaced { .. }]));
    assert_eq!(
        builder.selected(),
        Some(kind),
        "selection survives placement"
    );

    let again = preview_at(&builder, &world, Vec2::new(750.0, 390.0)).expect("selection active");
    assert!(!again.placeable, "occupied footprint is flagged");
}

#[test]
fn out_of_range_previews_are_never_placed() {
    let world = World::new();
    let mut builder = Builder::new();
    let _ = select(&mut builder, 2);

    let preview = preview_at(&builder, &world, Vec2::new(10.0, 10.0)).expect("selection active");
    assert!(!preview.placeable);

    let mut commands = Vec::new();
    builder.handle(
        Some(preview),
        BuilderInput::new(None, false, true),
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn previews_require_confirmation() {
    let world = World::new();
    let mut builder = Builder::new();
    let _ = select(&mut builder, 3);

    let preview = preview_at(&builder, &world, Vec2::new(640.0, 360.0));
    let mut commands = Vec::new();
    builder.handle(preview, BuilderInput::default(), &mut commands);
    assert!(commands.is_empty());
}

fn confirm_and_apply(
    builder: &Builder,
    world: &mut World,
    preview: PlacementPreview,
) -> Vec<Event> {
    let mut commands = Vec::new();
    builder.handle(
        Some(preview),
        BuilderInput::new(None, false, true),
        &mut commands,
    );
    assert_eq!(commands.len(), 1, "a placeable preview is always submitted");

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn stale_preview_over_a_new_building_is_rejected() {
    let mut world = World::new();
    let mut builder = Builder::new();
    let kind = select(&mut builder, 1);

    let stale = preview_at(&builder, &world, Vec2::new(750.0, 390.0)).expect("selection active");
    assert!(stale.placeable);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceBuilding {
            kind,
            origin: Vec2::new(2150.0, 2050.0),
        },
        &mut events,
    );
    assert!(matches!(events.as_slice(), [Event::BuildingPlaced { .. }]));

    let events = confirm_and_apply(&builder, &mut world, stale);
    assert_eq!(
        events,
        vec![Event::BuildingPlacementRejected {
            kind,
            origin: Vec2::new(2100.0, 2000.0),
            reason: PlacementError::Occupied,
        }]
    );
    let origins: Vec<Vec2> = query::building_view(&world)
        .iter()
        .map(|building| building.origin)
        .collect();
    assert_eq!(origins, vec![Vec2::new(2150.0, 2050.0)]);
}

#[test]
fn stale_preview_beyond_build_range_is_rejected() {
    let mut world = World::new();
    let mut builder = Builder::new();
    let kind = select(&mut builder, 2);

    let stale = preview_at(&builder, &world, Vec2::new(750.0, 390.0)).expect("selection active");
    assert!(stale.placeable);

    let mut events = Vec::new();
    let left = MovementAxes {
        left: true,
        ..MovementAxes::NONE
    };
    for _ in 0..11 {
        world::apply(
            &mut world,
            Command::MovePlayer {
                movement: left,
                sprint: true,
            },
            &mut events,
        );
    }
    assert_eq!(query::player_position(&world), Vec2::new(1890.0, 2000.0));

    let events = confirm_and_apply(&builder, &mut world, stale);
    assert_eq!(
        events,
        vec![Event::BuildingPlacementRejected {
            kind,
            origin: Vec2::new(2100.0, 2000.0),
            reason: PlacementError::OutOfRange,
        }]
    );
    assert_eq!(query::building_view(&world).iter().count(), 0);
}
