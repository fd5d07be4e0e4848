use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use tidewater_core::{BuildingType, Command, Event, PlayMode, ResourceType, Vec3};
use tidewater_world::{self as world, query, World, WorldConfig};

#[test]
fn generated_worlds_replay_identically() {
    let first = replay(&WorldConfig::default(), script());
    let second = replay(&WorldConfig::default(), script());

    assert_eq!(first.events, second.events, "event stream diverged");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::ShipStateChanged { .. })),
        "fleet never moved"
    );
}

#[test]
fn different_seeds_generate_different_worlds() {
    let mut config = WorldConfig::default();
    let first = World::with_config(&config);
    config.seed ^= 0x5eed;
    let second = World::with_config(&config);

    assert_ne!(
        fingerprint_world(&first),
        fingerprint_world(&second),
        "seed had no effect"
    );
}

#[test]
fn paused_interval_does_not_change_outcome() {
    let baseline = replay(&WorldConfig::default(), script());

    let mut paused = script();
    paused.insert(
        20,
        Command::SetPlayMode {
            mode: PlayMode::Paused,
        },
    );
    paused.insert(
        21,
        Command::Tick {
            dt: Duration::from_secs(30),
        },
    );
    paused.insert(
        22,
        Command::SetPlayMode {
            mode: PlayMode::Playing,
        },
    );
    let interrupted = replay(&WorldConfig::default(), paused);

    assert_eq!(baseline.world_fingerprint, interrupted.world_fingerprint);
}

fn script() -> Vec<Command> {
    let mut commands = Vec::new();
    for _ in 0..120 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(500),
        });
    }
    commands.push(Command::PlaceBuilding {
        kind: BuildingType::Lighthouse,
        position: Vec3::new(1_000.0, 0.0, 1_120.0),
    });
    for _ in 0..120 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(500),
        });
    }
    commands
}

fn replay(config: &WorldConfig, commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::with_config(config);
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    ReplayOutcome {
        world_fingerprint: fingerprint_world(&world),
        events,
    }
}

fn fingerprint_world(world: &World) -> u64 {
    let mut hasher = DefaultHasher::new();
    for resource in query::resources(world) {
        resource.id.hash(&mut hasher);
        resource.kind.hash(&mut hasher);
        resource.amount.hash(&mut hasher);
        resource.position.x.to_bits().hash(&mut hasher);
        resource.position.z.to_bits().hash(&mut hasher);
    }
    for ship in query::ships(world) {
        ship.id.hash(&mut hasher);
        ship.state.hash(&mut hasher);
        ship.cargo_total.hash(&mut hasher);
        ship.position.x.to_bits().hash(&mut hasher);
        ship.position.z.to_bits().hash(&mut hasher);
    }
    for building in query::buildings(world) {
        building.id.hash(&mut hasher);
        building.kind.hash(&mut hasher);
        for kind in ResourceType::ALL {
            building.inventory.get(kind).hash(&mut hasher);
        }
        building.construction_progress.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

struct ReplayOutcome {
    world_fingerprint: u64,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.world_fingerprint.hash(&mut hasher);
        self.events.len().hash(&mut hasher);
        hasher.finish()
    }
}
