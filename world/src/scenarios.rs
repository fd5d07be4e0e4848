//! End-to-end scenarios built on the scaffolding constructors.

use std::time::Duration;

use tidewater_core::{
    BuildingType, Command, Event, InteractionOutcome, RejectionReason, ResourceType, ShipState,
    ShipType, Vec3,
};

use crate::{apply, query, World};

fn tick(world: &mut World, events: &mut Vec<Event>) {
    advance(world, 1, events);
}

fn advance(world: &mut World, seconds: u64, events: &mut Vec<Event>) {
    apply(
        world,
        Command::Tick {
            dt: Duration::from_secs(seconds),
        },
        events,
    );
}

#[test]
fn harvester_strips_adjacent_wood_in_ten_seconds() {
    let mut world = World::empty();
    let mut events = Vec::new();
    let origin = Vec3::new(100.0, 0.0, 100.0);
    let wood = world.spawn_resource(ResourceType::Wood, origin, 50);
    let ship = world.spawn_ship(ShipType::Harvester, origin, ResourceType::Wood);

    apply(
        &mut world,
        Command::StartHarvesting {
            ship,
            resource: ResourceType::Wood,
        },
        &mut events,
    );
    for _ in 0..9 {
        tick(&mut world, &mut events);
    }
    assert_eq!(query::cargo_amount(&world, ship, ResourceType::Wood), 45);
    assert!(query::resource(&world, wood).is_some());

    tick(&mut world, &mut events);

    assert_eq!(query::cargo_amount(&world, ship, ResourceType::Wood), 50);
    assert!(query::resource(&world, wood).is_none());
    assert!(query::resources(&world).is_empty());
    assert!(events.contains(&Event::ResourceDepleted {
        resource: wood,
        kind: ResourceType::Wood,
    }));
}

#[test]
fn wood_harvest_is_independent_of_tick_length() {
    for millis in [10, 20, 50] {
        let mut world = World::empty();
        let mut events = Vec::new();
        let origin = Vec3::new(100.0, 0.0, 100.0);
        let wood = world.spawn_resource(ResourceType::Wood, origin, 50);
        let ship = world.spawn_ship(ShipType::Harvester, origin, ResourceType::Wood);

        apply(
            &mut world,
            Command::StartHarvesting {
                ship,
                resource: ResourceType::Wood,
            },
            &mut events,
        );
        for _ in 0..(10_000 / millis) {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(millis),
                },
                &mut events,
            );
        }

        assert_eq!(
            query::cargo_amount(&world, ship, ResourceType::Wood),
            50,
            "{millis} ms ticks"
        );
        assert!(query::resource(&world, wood).is_none());
    }
}

#[test]
fn oil_rig_output_is_independent_of_tick_length() {
    for millis in [10, 20, 50] {
        let mut world = World::empty();
        let mut events = Vec::new();
        let rig = world.spawn_building(BuildingType::OilRig, Vec3::new(50.0, 0.0, 50.0));

        // Oil rigs complete a cycle every five seconds.
        for _ in 0..(10_000 / millis) {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(millis),
                },
                &mut events,
            );
        }

        assert_eq!(
            query::resource_amount(&world, rig, ResourceType::Oil),
            2,
            "{millis} ms ticks"
        );
    }
}

#[test]
fn nearest_resource_respects_search_radius() {
    let mut world = World::empty();
    let origin = Vec3::new(300.0, 0.0, 300.0);
    let far = world.spawn_resource(ResourceType::Wood, origin + Vec3::new(8.0, 0.0, 0.0), 20);
    let near = world.spawn_resource(ResourceType::Wood, origin + Vec3::new(0.0, 0.0, 5.0), 20);
    let _ = world.spawn_resource(ResourceType::Stone, origin + Vec3::X, 20);

    assert_eq!(
        query::nearest_resource(&world, origin, ResourceType::Wood, 10.0),
        Some(near)
    );
    let beside_far = origin + Vec3::new(8.0, 0.0, 0.0);
    assert_eq!(
        query::nearest_resource(&world, beside_far, ResourceType::Wood, 1.0),
        Some(far)
    );
    assert_eq!(
        query::nearest_resource(&world, origin, ResourceType::Wood, 3.0),
        None
    );
}

#[test]
fn emptied_resource_is_never_returned_by_search() {
    let mut world = World::empty();
    let mut events = Vec::new();
    let wood = world.spawn_resource(ResourceType::Wood, Vec3::ZERO, 20);
    world.set_resource_amount(wood, 0);

    assert_eq!(
        query::nearest_resource(&world, Vec3::ZERO, ResourceType::Wood, 100.0),
        None
    );
    tick(&mut world, &mut events);
    assert!(query::resource(&world, wood).is_none());
}

#[test]
fn harvesting_ship_retargets_after_external_depletion() {
    let mut world = World::empty();
    let mut events = Vec::new();
    let first = world.spawn_resource(ResourceType::Iron, Vec3::ZERO, 60);
    let second = world.spawn_resource(ResourceType::Iron, Vec3::new(40.0, 0.0, 0.0), 60);
    let ship = world.spawn_ship(ShipType::Dredger, Vec3::ZERO, ResourceType::Iron);

    apply(
        &mut world,
        Command::StartHarvesting {
            ship,
            resource: ResourceType::Iron,
        },
        &mut events,
    );
    tick(&mut world, &mut events);
    assert_eq!(
        query::ship(&world, ship).map(|snapshot| snapshot.state),
        Some(ShipState::Harvesting)
    );

    world.set_resource_amount(first, 0);
    tick(&mut world, &mut events);

    let snapshot = query::ship(&world, ship).expect("ship exists");
    assert_eq!(snapshot.state, ShipState::MovingToResource);
    assert_eq!(snapshot.target_resource, Some(second));
}

#[test]
fn harvesting_ship_without_alternatives_heads_home() {
    let mut world = World::empty();
    let mut events = Vec::new();
    let home = Vec3::new(20.0, 0.0, 0.0);
    let only = world.spawn_resource(ResourceType::Fish, Vec3::ZERO, 60);
    let ship = world.spawn_ship(ShipType::Trawler, home, ResourceType::Fish);

    apply(
        &mut world,
        Command::StartHarvesting {
            ship,
            resource: ResourceType::Fish,
        },
        &mut events,
    );
    for _ in 0..4 {
        tick(&mut world, &mut events);
    }
    assert_eq!(
        query::ship(&world, ship).map(|snapshot| snapshot.state),
        Some(ShipState::Harvesting)
    );

    world.set_resource_amount(only, 0);
    tick(&mut world, &mut events);

    let snapshot = query::ship(&world, ship).expect("ship exists");
    assert_eq!(snapshot.state, ShipState::ReturnToPosition);
    assert_eq!(snapshot.target_resource, None);
}

#[test]
fn delivered_cargo_matches_harvested_total() {
    let mut world = World::empty();
    let mut events = Vec::new();
    let quay = Vec3::new(0.0, 0.0, 16.0);
    let _ = world.spawn_resource(ResourceType::Stone, Vec3::ZERO, 30);
    let headquarters = world.spawn_building(BuildingType::Headquarters, quay);
    let ship = world.spawn_ship(ShipType::Harvester, Vec3::ZERO, ResourceType::Stone);

    apply(
        &mut world,
        Command::StartHarvesting {
            ship,
            resource: ResourceType::Stone,
        },
        &mut events,
    );
    for _ in 0..20 {
        tick(&mut world, &mut events);
    }

    let harvested: u32 = events
        .iter()
        .filter_map(|event| match event {
            Event::ResourceHarvested { amount, .. } => Some(*amount),
            _ => None,
        })
        .sum();
    assert_eq!(harvested, 30);
    assert_eq!(
        query::resource_amount(&world, headquarters, ResourceType::Stone),
        harvested
    );
    assert_eq!(query::cargo_amount(&world, ship, ResourceType::Stone), 0);
}

#[test]
fn player_sells_collected_oil_at_market() {
    let mut world = World::empty();
    let mut events = Vec::new();
    let rig = world.spawn_building(BuildingType::OilRig, Vec3::ZERO);
    let market = world.spawn_building(BuildingType::Market, Vec3::new(30.0, 0.0, 0.0));
    apply(
        &mut world,
        Command::MovePlayer {
            position: Vec3::new(15.0, 0.0, 0.0),
        },
        &mut events,
    );

    // Oil rigs complete a cycle every five seconds.
    advance(&mut world, 5, &mut events);
    advance(&mut world, 5, &mut events);
    assert_eq!(query::resource_amount(&world, rig, ResourceType::Oil), 2);

    apply(&mut world, Command::Interact { building: rig }, &mut events);
    apply(&mut world, Command::Interact { building: market }, &mut events);

    assert!(events.contains(&Event::InteractionCompleted {
        building: rig,
        outcome: InteractionOutcome::Collected {
            kind: ResourceType::Oil,
            amount: 2,
        },
    }));
    assert_eq!(query::player_inventory(&world).get(ResourceType::Gold), 4);
    assert_eq!(query::player_inventory(&world).get(ResourceType::Oil), 0);
}

#[test]
fn interaction_requires_proximity() {
    let mut world = World::empty();
    let mut events = Vec::new();
    world.give_player(ResourceType::Wood, 3);
    let market = world.spawn_building(BuildingType::Market, Vec3::ZERO);
    apply(
        &mut world,
        Command::MovePlayer {
            position: Vec3::new(0.0, 0.0, 80.0),
        },
        &mut events,
    );

    assert_eq!(
        query::nearest_building_within(&world, query::player_position(&world), 50.0),
        None
    );
    apply(&mut world, Command::Interact { building: market }, &mut events);

    assert_eq!(
        events,
        vec![Event::CommandRejected {
            reason: RejectionReason::OutOfRange
        }]
    );
    assert_eq!(query::player_inventory(&world).get(ResourceType::Wood), 3);
}

#[test]
fn damaged_building_stops_receiving_interactions_until_repaired() {
    let mut world = World::empty();
    let mut events = Vec::new();
    world.give_player(ResourceType::Cobalt, 4);
    let enrichment = world.spawn_building(BuildingType::CobaltEnrichment, Vec3::ZERO);
    apply(
        &mut world,
        Command::MovePlayer {
            position: Vec3::ZERO,
        },
        &mut events,
    );

    apply(
        &mut world,
        Command::DamageBuilding {
            building: enrichment,
            amount: 10_000.0,
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::Interact {
            building: enrichment,
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::RepairBuilding {
            building: enrichment,
            amount: 50.0,
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::Interact {
            building: enrichment,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::BuildingDeactivated {
                building: enrichment
            },
            Event::CommandRejected {
                reason: RejectionReason::BuildingUnavailable
            },
            Event::BuildingReactivated {
                building: enrichment
            },
            Event::InteractionCompleted {
                building: enrichment,
                outcome: InteractionOutcome::Supplied {
                    kind: ResourceType::Cobalt,
                    amount: 4,
                },
            },
        ]
    );
}
