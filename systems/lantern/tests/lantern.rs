use std::time::Duration;

use firefly_maze_core::{Command, Event, GridSize, TileGrid};
use firefly_maze_system_lantern::{Config, Lantern, LanternInput, LanternView};
use firefly_maze_world::{self as world, query, World};
use glam::Vec2;

const TICK: Duration = Duration::from_millis(100);

#[test]
fn placed_firefly_becomes_active_light_on_arrival() {
    let (mut world, mut lantern) = setup(Config::default());
    let _ = drive(&mut world, &mut lantern, Command::StartSession, LanternInput::default());

    let _ = drive(&mut world, &mut lantern, tick(), place(Vec2::new(1.0, 0.0)));
    assert_eq!(lantern.lamp_count(), 3);
    assert!(query::light_registry(&world).active().is_empty());
    assert_eq!(query::light_registry(&world).in_transit().len(), 1);

    let mut history = Vec::new();
    for _ in 0..2 {
        history.extend(drive(&mut world, &mut lantern, tick(), LanternInput::default()));
    }

    let registry = query::light_registry(&world);
    assert_eq!(registry.active().len(), 1);
    assert!(registry.active()[0].distance(Vec2::new(1.0, 0.0)) <= 0.5);
    assert!(registry.in_transit().is_empty());
    assert!(history
        .iter()
        .any(|event| matches!(event, Event::LightsChanged { .. })));
}

#[test]
fn recall_never_leaves_player_in_darkness() {
    let (mut world, mut lantern) = setup(Config::default());
    let _ = drive(&mut world, &mut lantern, Command::StartSession, LanternInput::default());
    let _ = drive(&mut world, &mut lantern, tick(), place(Vec2::new(1.0, 0.0)));
    settle(&mut world, &mut lantern, 5);
    let deployed = query::light_registry(&world).active()[0];

    let _ = drive(&mut world, &mut lantern, tick(), recall(deployed));
    assert_eq!(query::light_registry(&world).active(), &[deployed]);

    let _ = drive(
        &mut world,
        &mut lantern,
        Command::AddStaticLight {
            position: Vec2::new(0.0, 0.5),
        },
        LanternInput::default(),
    );
    let _ = drive(&mut world, &mut lantern, tick(), recall(deployed));
    assert!(query::light_registry(&world).active().is_empty());

    settle(&mut world, &mut lantern, 5);
    assert_eq!(lantern.lamp_count(), 4);
}

#[test]
fn full_pool_replaces_firefly_away_from_player() {
    let (mut world, mut lantern) = setup(Config::new(2, 4.0, 4.0, 0.5, 1.0));
    let _ = drive(&mut world, &mut lantern, Command::StartSession, LanternInput::default());
    let _ = drive(&mut world, &mut lantern, tick(), place(Vec2::new(1.0, 0.0)));
    let _ = drive(&mut world, &mut lantern, tick(), place(Vec2::new(6.0, 0.0)));
    settle(&mut world, &mut lantern, 30);
    assert_eq!(lantern.lamp_count(), 0);
    let near = query::light_registry(&world).active()[0];
    assert!(near.distance(Vec2::ZERO) < 1.2);

    let _ = drive(&mut world, &mut lantern, tick(), place(Vec2::new(0.0, -3.0)));
    assert_eq!(query::light_registry(&world).active(), &[near]);

    settle(&mut world, &mut lantern, 30);
    let active = query::light_registry(&world).active();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0], near);
    assert!(active[1].distance(Vec2::new(0.0, -3.0)) <= 0.5);
}

#[test]
fn idle_session_ignores_input() {
    let (mut world, mut lantern) = setup(Config::default());

    let events = drive(&mut world, &mut lantern, tick(), place(Vec2::new(1.0, 0.0)));

    assert_eq!(events, vec![Event::TimeAdvanced { dt: TICK }]);
    assert_eq!(lantern.lamp_count(), 4);
    assert!(query::light_registry(&world).in_transit().is_empty());
}

fn tick() -> Command {
    Command::Tick { dt: TICK }
}

fn place(target: Vec2) -> LanternInput {
    LanternInput {
        place: Some(target),
        recall: None,
    }
}

fn recall(point: Vec2) -> LanternInput {
    LanternInput {
        place: None,
        recall: Some(point),
    }
}

fn setup(config: Config) -> (World, Lantern) {
    let world = World::new(world::Config::new(
        TileGrid::new(GridSize::new(12, 12), 3.0),
        1.2,
        Vec2::ZERO,
    ));
    (world, Lantern::new(config))
}

fn settle(world: &mut World, lantern: &mut Lantern, ticks: usize) {
    for _ in 0..ticks {
        let _ = drive(world, lantern, tick(), LanternInput::default());
    }
}

fn drive(
    world: &mut World,
    lantern: &mut Lantern,
    command: Command,
    input: LanternInput,
) -> Vec<Event> {
    let mut pending = vec![command];
    let mut input = Some(input);
    let mut history = Vec::new();
    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        let statics = query::light_registry(world).statics().to_vec();
        let player = query::player_position(world);
        let view = LanternView {
            player,
            lamp: player,
            statics: &statics,
            walkable_range: query::light_snapshot(world).radius(),
        };
        lantern.handle(
            &events,
            query::session(world),
            &view,
            input.take().unwrap_or_default(),
            &mut pending,
        );
        history.extend(events);
    }
    history
}
