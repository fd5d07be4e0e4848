#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tidewater.
//!
//! The world owns every resource node, building, and ship, and is the only
//! place entities are created or removed. Adapters mutate it exclusively via
//! [`apply`] and observe it through the [`query`] module.

mod buildings;
mod generation;
mod player;
mod resources;
#[cfg(test)]
mod scenarios;

use std::{collections::BTreeMap, time::Duration};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tidewater_core::{
    BuildingId, BuildingType, Command, Event, PlayMode, RejectionReason, ResourceId,
    ResourceType, ShipId, ShipType, Vec3, WELCOME_BANNER,
};
use tidewater_system_ship_behavior::{Ship, Surroundings};
use tidewater_terrain::{HeightField, WORLD_CENTER};
use tracing::{info, warn};

use buildings::BuildingStore;
use player::Player;
use resources::ResourceStore;

pub use generation::WorldConfig;
pub use player::{INTERACTION_RANGE, PLAYER_CARGO_CAPACITY};

/// Simulated seconds in one full day cycle.
const DAY_LENGTH_SECONDS: f32 = 600.0;

/// Minimum spacing between two building sites.
const BUILDING_CLEARANCE: f32 = 10.0;

/// Represents the authoritative Tidewater world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    height_field: HeightField,
    resources: ResourceStore,
    buildings: BuildingStore,
    ships: BTreeMap<ShipId, Ship>,
    next_ship_id: ShipId,
    player: Player,
    play_mode: PlayMode,
    time_of_day: f32,
    tick_index: u64,
    /// Events raised while generating, handed out by the first [`apply`].
    pending_events: Vec<Event>,
}

impl World {
    /// Creates a world generated from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&WorldConfig::default())
    }

    /// Generates a world deterministically from the provided configuration.
    #[must_use]
    pub fn with_config(config: &WorldConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let height_field = HeightField::generate(&config.terrain, &mut rng);
        let mut world = Self::bare(height_field);

        generation::scatter_patches(
            &mut world.resources,
            &world.height_field,
            config.patches_per_type,
            &mut rng,
        );
        generation::place_settlement(&mut world.buildings, &world.height_field);

        let mut launch_events = Vec::new();
        for (index, (kind, preferred)) in config.ship_fleet.iter().enumerate() {
            let ship = world.launch_ship(*kind, generation::berth(index), *preferred);
            let launched = world.order_harvest(ship, *preferred, &mut launch_events);
            debug_assert!(launched);
        }
        world.pending_events = launch_events;

        info!(
            seed = config.seed,
            resources = world.resources.len(),
            buildings = world.buildings.len(),
            ships = world.ships.len(),
            "world generated"
        );
        world
    }

    fn bare(height_field: HeightField) -> Self {
        Self {
            banner: WELCOME_BANNER,
            height_field,
            resources: ResourceStore::new(),
            buildings: BuildingStore::new(),
            ships: BTreeMap::new(),
            next_ship_id: ShipId::new(0),
            player: Player::new(Vec3::new(WORLD_CENTER, 0.0, WORLD_CENTER)),
            play_mode: PlayMode::Playing,
            time_of_day: 0.0,
            tick_index: 0,
            pending_events: Vec::new(),
        }
    }

    fn launch_ship(
        &mut self,
        kind: ShipType,
        position: Vec3,
        preferred: ResourceType,
    ) -> ShipId {
        let id = self.next_ship_id;
        self.next_ship_id = ShipId::new(id.get().saturating_add(1));
        let _ = self.ships.insert(id, Ship::new(id, kind, position, preferred));
        id
    }

    fn order_harvest(
        &mut self,
        ship: ShipId,
        kind: ResourceType,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(vessel) = self.ships.get_mut(&ship) else {
            return false;
        };
        let surroundings = WorldSurroundings {
            resources: &mut self.resources,
            buildings: &mut self.buildings,
        };
        vessel.start_harvesting(kind, &surroundings, out_events);
        true
    }

    /// Runs one simulation step: time of day, resources, ships, then buildings.
    fn update(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.time_of_day = (self.time_of_day + dt.as_secs_f32() / DAY_LENGTH_SECONDS).fract();

        self.resources.update(dt, out_events);
        self.resources.sweep_depleted(out_events);

        let mut surroundings = WorldSurroundings {
            resources: &mut self.resources,
            buildings: &mut self.buildings,
        };
        for ship in self.ships.values_mut() {
            ship.update(dt, &mut surroundings, out_events);
        }
        self.resources.sweep_depleted(out_events);

        self.buildings.update(dt, out_events);
    }

    fn place_building(
        &mut self,
        kind: BuildingType,
        position: Vec3,
    ) -> Result<BuildingId, RejectionReason> {
        if self.height_field.is_water(position.x, position.z) {
            return Err(RejectionReason::Underwater);
        }
        if self
            .buildings
            .nearest_within(position, BUILDING_CLEARANCE)
            .is_some()
        {
            return Err(RejectionReason::SiteOccupied);
        }
        let site = Vec3::new(
            position.x,
            self.height_field.height(position.x, position.z),
            position.z,
        );
        Ok(self.buildings.insert(kind, site, 0.0))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Test-only constructors and mutators for building precise scenarios.
#[cfg(any(test, feature = "scaffolding"))]
impl World {
    /// Creates a featureless world with no entities.
    #[must_use]
    pub fn empty() -> Self {
        Self::bare(HeightField::without_features())
    }

    /// Inserts a full resource node of `amount` units.
    pub fn spawn_resource(
        &mut self,
        kind: ResourceType,
        position: Vec3,
        amount: u32,
    ) -> ResourceId {
        self.resources.insert(kind, position, amount)
    }

    /// Inserts a fully built building.
    pub fn spawn_building(&mut self, kind: BuildingType, position: Vec3) -> BuildingId {
        self.buildings.insert(kind, position, 1.0)
    }

    /// Inserts an idle ship whose home is `position`.
    pub fn spawn_ship(
        &mut self,
        kind: ShipType,
        position: Vec3,
        preferred: ResourceType,
    ) -> ShipId {
        self.launch_ship(kind, position, preferred)
    }

    /// Overwrites the remaining amount of a resource node, capped at its maximum.
    pub fn set_resource_amount(&mut self, resource: ResourceId, amount: u32) {
        if let Some(node) = self.resources.get_mut(resource) {
            node.set_amount(amount);
        }
    }

    /// Adds goods to the player's personal inventory.
    pub fn give_player(&mut self, kind: ResourceType, amount: u32) {
        self.player.inventory_mut().add(kind, amount);
    }
}

/// Split borrow of the world collections a ship interacts with.
struct WorldSurroundings<'a> {
    resources: &'a mut ResourceStore,
    buildings: &'a mut BuildingStore,
}

impl Surroundings for WorldSurroundings<'_> {
    fn nearest_resource(
        &self,
        origin: Vec3,
        kind: ResourceType,
        max_distance: f32,
    ) -> Option<ResourceId> {
        self.resources.nearest(origin, kind, max_distance)
    }

    fn resource_position(&self, resource: ResourceId) -> Option<Vec3> {
        self.resources
            .get(resource)
            .filter(|node| !node.is_depleted())
            .map(|node| node.position())
    }

    fn is_resource_depleted(&self, resource: ResourceId) -> bool {
        self.resources
            .get(resource)
            .map_or(true, |node| node.is_depleted())
    }

    fn harvest(&mut self, resource: ResourceId, amount: u32) -> u32 {
        self.resources
            .get_mut(resource)
            .map_or(0, |node| node.harvest(amount))
    }

    fn nearest_dropoff(&self, origin: Vec3) -> Option<BuildingId> {
        self.buildings.nearest_dropoff(origin)
    }

    fn building_position(&self, building: BuildingId) -> Option<Vec3> {
        self.buildings.get(building).map(|site| site.position())
    }

    fn deposit(&mut self, building: BuildingId, kind: ResourceType, amount: u32) -> bool {
        self.buildings
            .get_mut(building)
            .map_or(false, |site| site.add_resource(kind, amount))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    out_events.append(&mut world.pending_events);
    if let Err(reason) = execute(world, command, out_events) {
        warn!(%reason, "command rejected");
        out_events.push(Event::CommandRejected { reason });
    }
}

fn execute(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    match command {
        Command::Tick { dt } => {
            if world.play_mode == PlayMode::Paused {
                return Ok(());
            }
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.update(dt, out_events);
        }
        Command::SetPlayMode { mode } => {
            if world.play_mode != mode {
                world.play_mode = mode;
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
        Command::StartHarvesting { ship, resource } => {
            if !world.order_harvest(ship, resource, out_events) {
                return Err(RejectionReason::MissingShip(ship));
            }
        }
        Command::SetShipTarget { ship, position } => {
            ship_mut(world, ship)?.set_target_position(position, out_events);
        }
        Command::ReturnShipHome { ship } => {
            ship_mut(world, ship)?.return_home(out_events);
        }
        Command::StopShip { ship } => {
            ship_mut(world, ship)?.stop_movement(out_events);
        }
        Command::PlaceBuilding { kind, position } => {
            let building = world.place_building(kind, position)?;
            let site = world
                .buildings
                .get(building)
                .map_or(position, |placed| placed.position());
            info!(building = building.get(), ?kind, "building placed");
            out_events.push(Event::BuildingPlaced {
                building,
                kind,
                position: site,
            });
        }
        Command::DamageBuilding { building, amount } => {
            building_mut(world, building)?.take_damage(amount, out_events);
        }
        Command::RepairBuilding { building, amount } => {
            building_mut(world, building)?.repair(amount, out_events);
        }
        Command::MovePlayer { position } => {
            world.player.move_to(position);
        }
        Command::Interact { building } => {
            let site = world
                .buildings
                .get_mut(building)
                .ok_or(RejectionReason::MissingBuilding(building))?;
            let outcome = world.player.interact(site)?;
            out_events.push(Event::InteractionCompleted { building, outcome });
        }
    }
    Ok(())
}

fn ship_mut(world: &mut World, ship: ShipId) -> Result<&mut Ship, RejectionReason> {
    world
        .ships
        .get_mut(&ship)
        .ok_or(RejectionReason::MissingShip(ship))
}

fn building_mut(
    world: &mut World,
    building: BuildingId,
) -> Result<&mut buildings::Building, RejectionReason> {
    world
        .buildings
        .get_mut(building)
        .ok_or(RejectionReason::MissingBuilding(building))
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tidewater_core::{
        BuildingId, BuildingSnapshot, Inventory, PlayMode, ResourceId, ResourceSnapshot,
        ResourceType, ShipId, ShipSnapshot, Vec3,
    };
    use tidewater_terrain::HeightField;

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the terrain height field.
    #[must_use]
    pub fn height_field(world: &World) -> &HeightField {
        &world.height_field
    }

    /// Terrain elevation at the provided horizontal coordinates.
    #[must_use]
    pub fn height_at(world: &World, x: f32, z: f32) -> f32 {
        world.height_field.height(x, z)
    }

    /// Fraction of the current day that has elapsed, in `0.0..1.0`.
    #[must_use]
    pub fn time_of_day(world: &World) -> f32 {
        world.time_of_day
    }

    /// Number of ticks that advanced the simulation.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the simulation is running or paused.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Captures every resource node in identifier order.
    #[must_use]
    pub fn resources(world: &World) -> Vec<ResourceSnapshot> {
        world.resources.iter().map(|node| node.snapshot()).collect()
    }

    /// Captures a single resource node, if it still exists.
    #[must_use]
    pub fn resource(world: &World, resource: ResourceId) -> Option<ResourceSnapshot> {
        world.resources.get(resource).map(|node| node.snapshot())
    }

    /// Nearest non-depleted resource of `kind` within `max_distance` of `position`.
    #[must_use]
    pub fn nearest_resource(
        world: &World,
        position: Vec3,
        kind: ResourceType,
        max_distance: f32,
    ) -> Option<ResourceId> {
        world.resources.nearest(position, kind, max_distance)
    }

    /// Captures every building in identifier order.
    #[must_use]
    pub fn buildings(world: &World) -> Vec<BuildingSnapshot> {
        world.buildings.iter().map(|site| site.snapshot()).collect()
    }

    /// Captures a single building, if it exists.
    #[must_use]
    pub fn building(world: &World, building: BuildingId) -> Option<BuildingSnapshot> {
        world.buildings.get(building).map(|site| site.snapshot())
    }

    /// Units of `kind` stored in a building; zero for unknown buildings.
    #[must_use]
    pub fn resource_amount(world: &World, building: BuildingId, kind: ResourceType) -> u32 {
        world
            .buildings
            .get(building)
            .map_or(0, |site| site.resource_amount(kind))
    }

    /// Nearest building of any type within `range` of `position`.
    #[must_use]
    pub fn nearest_building_within(
        world: &World,
        position: Vec3,
        range: f32,
    ) -> Option<BuildingId> {
        world.buildings.nearest_within(position, range)
    }

    /// Identifiers of every ship in ascending order.
    #[must_use]
    pub fn ship_ids(world: &World) -> Vec<ShipId> {
        world.ships.keys().copied().collect()
    }

    /// Captures every ship in identifier order.
    #[must_use]
    pub fn ships(world: &World) -> Vec<ShipSnapshot> {
        world.ships.values().map(|ship| ship.snapshot()).collect()
    }

    /// Captures a single ship, if it exists.
    #[must_use]
    pub fn ship(world: &World, ship: ShipId) -> Option<ShipSnapshot> {
        world.ships.get(&ship).map(|vessel| vessel.snapshot())
    }

    /// Units of `kind` carried by a ship; zero for unknown ships.
    #[must_use]
    pub fn cargo_amount(world: &World, ship: ShipId, kind: ResourceType) -> u32 {
        world
            .ships
            .get(&ship)
            .map_or(0, |vessel| vessel.cargo_amount(kind))
    }

    /// Current position of the player avatar.
    #[must_use]
    pub fn player_position(world: &World) -> Vec3 {
        world.player.position()
    }

    /// Goods the player carries.
    #[must_use]
    pub fn player_inventory(world: &World) -> &Inventory {
        world.player.inventory()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use tidewater_core::ShipState;

    fn tick(world: &mut World, seconds: u64, events: &mut Vec<Event>) {
        apply(
            world,
            Command::Tick {
                dt: Duration::from_secs(seconds),
            },
            events,
        );
    }

    #[test]
    fn generated_world_has_settlement_resources_and_fleet() {
        let world = World::new();
        let config = WorldConfig::default();

        assert_eq!(world.buildings.len(), 4);
        assert_eq!(world.ships.len(), config.ship_fleet.len());
        assert!(world.resources.len() >= ResourceType::HARVESTABLE.len() * config.patches_per_type);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn fleet_launch_is_reported_by_the_first_command() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Playing,
            },
            &mut events,
        );

        let launched: Vec<ShipId> = events
            .iter()
            .filter_map(|event| match event {
                Event::ShipStateChanged {
                    ship,
                    from: ShipState::Idle,
                    ..
                } => Some(*ship),
                _ => None,
            })
            .collect();
        assert_eq!(launched, query::ship_ids(&world));

        events.clear();
        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Playing,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn paused_world_ignores_ticks() {
        let mut world = World::empty();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Paused,
            },
            &mut events,
        );
        tick(&mut world, 30, &mut events);

        assert_eq!(
            events,
            vec![Event::PlayModeChanged {
                mode: PlayMode::Paused
            }]
        );
        assert_eq!(query::time_of_day(&world), 0.0);
        assert_eq!(query::tick_index(&world), 0);
    }

    #[test]
    fn time_of_day_wraps_after_a_full_day() {
        let mut world = World::empty();
        let mut events = Vec::new();
        tick(&mut world, 450, &mut events);
        assert!((query::time_of_day(&world) - 0.75).abs() < 1e-6);
        tick(&mut world, 300, &mut events);
        assert!((query::time_of_day(&world) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn commands_for_unknown_entities_are_rejected() {
        let mut world = World::empty();
        let mut events = Vec::new();
        let ghost = ShipId::new(42);
        apply(&mut world, Command::StopShip { ship: ghost }, &mut events);
        apply(
            &mut world,
            Command::DamageBuilding {
                building: BuildingId::new(9),
                amount: 1.0,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::CommandRejected {
                    reason: RejectionReason::MissingShip(ghost)
                },
                Event::CommandRejected {
                    reason: RejectionReason::MissingBuilding(BuildingId::new(9))
                },
            ]
        );
    }

    #[test]
    fn placed_building_starts_unbuilt_and_rejects_neighbours() {
        let mut world = World::empty();
        let mut events = Vec::new();
        let site = Vec3::new(500.0, 0.0, 500.0);
        world.height_field = HeightField::from_features(
            vec![tidewater_terrain::Peak { x: 500.0, z: 500.0 }],
            Vec::new(),
        );

        apply(
            &mut world,
            Command::PlaceBuilding {
                kind: BuildingType::Lighthouse,
                position: site,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceBuilding {
                kind: BuildingType::Market,
                position: site + Vec3::new(5.0, 0.0, 0.0),
            },
            &mut events,
        );

        let placed = query::building(&world, BuildingId::new(0)).expect("placed building");
        assert_eq!(placed.construction_progress, 0.0);
        assert!(placed.position.y > 100.0);
        assert!(matches!(events[0], Event::BuildingPlaced { .. }));
        assert_eq!(
            events[1],
            Event::CommandRejected {
                reason: RejectionReason::SiteOccupied
            }
        );
    }

    #[test]
    fn ship_orders_reach_the_state_machine() {
        let mut world = World::empty();
        let mut events = Vec::new();
        let ship = world.spawn_ship(ShipType::Scout, Vec3::ZERO, ResourceType::Crystal);

        apply(
            &mut world,
            Command::SetShipTarget {
                ship,
                position: Vec3::new(24.0, 0.0, 0.0),
            },
            &mut events,
        );
        tick(&mut world, 1, &mut events);
        assert_eq!(
            query::ship(&world, ship).map(|snapshot| snapshot.position),
            Some(Vec3::new(12.0, 0.0, 0.0))
        );

        apply(&mut world, Command::ReturnShipHome { ship }, &mut events);
        tick(&mut world, 1, &mut events);
        tick(&mut world, 1, &mut events);
        let snapshot = query::ship(&world, ship).expect("ship exists");
        assert_eq!(snapshot.position, Vec3::ZERO);
        assert_eq!(snapshot.state, ShipState::Idle);
    }
}
