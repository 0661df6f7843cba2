use firefly_maze_core::{Command, GridSize, TileGrid};
use firefly_maze_system_visibility::{
    can_step, is_point_lit, segment_intersects_any_light, IntersectionMode, SuitabilityGrid,
};
use firefly_maze_world::{self as world, query, World};
use glam::Vec2;

fn playing_world() -> World {
    let mut world = World::new(world::Config::new(
        TileGrid::new(GridSize::new(12, 12), 3.0),
        1.2,
        Vec2::ZERO,
    ));
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession, &mut events);
    world
}

#[test]
fn travelling_lights_never_open_ground() {
    let mut world = playing_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetTransitLights {
            positions: vec![Vec2::new(10.0, 0.0)],
        },
        &mut events,
    );

    let snapshot = query::light_snapshot(&world);
    assert!(!is_point_lit(Vec2::new(10.0, 0.0), snapshot.sources(), snapshot.radius()));
    assert!(!can_step(&snapshot, Vec2::new(10.0, 0.0), Vec2::X));
}

#[test]
fn active_and_static_lights_share_one_snapshot() {
    let mut world = playing_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetActiveLights {
            positions: vec![Vec2::new(4.0, 0.0)],
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::AddStaticLight {
            position: Vec2::new(0.0, 6.0),
        },
        &mut events,
    );

    let snapshot = query::light_snapshot(&world);
    assert_eq!(snapshot.sources().len(), 2);
    assert!(can_step(&snapshot, Vec2::new(2.0, 0.0), Vec2::X * 1.5));
    assert!(can_step(&snapshot, Vec2::new(0.0, 4.5), Vec2::Y));
    assert!(!can_step(&snapshot, Vec2::new(-3.0, -3.0), Vec2::X));
    assert!(segment_intersects_any_light(
        Vec2::ZERO,
        Vec2::new(8.0, 0.0),
        snapshot.sources(),
        snapshot.radius(),
        IntersectionMode::Segment,
    ));
}

#[test]
fn suitability_ring_tracks_player() {
    let mut world = playing_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetActiveLights {
            positions: vec![Vec2::new(1.0, 1.0)],
        },
        &mut events,
    );
    let snapshot = query::light_snapshot(&world);
    let inner = snapshot.radius() + 2.0;
    let outer = snapshot.radius() + 6.0;
    let mut grid = SuitabilityGrid::new(11, 0.4);

    let cells = grid
        .recompute(query::player_position(&world), snapshot.sources(), inner, outer)
        .to_vec();

    assert!(!cells.is_empty());
    for cell in &cells {
        let distance = cell.distance(Vec2::new(1.0, 1.0));
        assert!(distance >= inner && distance < outer);
    }
    assert!(!grid.is_suitable(5, 5), "player cell sits inside the light");
}
