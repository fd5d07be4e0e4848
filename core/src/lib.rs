#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tidewater simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. The closed enumerations describing resources,
//! buildings, and ships carry their tuning constants as static tables so the
//! variant to stat mapping lives in exactly one place.

use std::{collections::BTreeMap, time::Duration};

pub use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tidewater.";

/// Describes whether the simulation clock is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Ticks advance resources, ships, and buildings.
    Playing,
    /// Ticks are ignored until play resumes.
    Paused,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Orders a ship to harvest the nearest resource of the provided type.
    StartHarvesting {
        /// Ship receiving the order.
        ship: ShipId,
        /// Resource type the ship should prefer from now on.
        resource: ResourceType,
    },
    /// Sends a ship to an explicit position on the water plane.
    SetShipTarget {
        /// Ship receiving the order.
        ship: ShipId,
        /// Destination in world units; only the horizontal components matter.
        position: Vec3,
    },
    /// Sends a ship back to the position it was launched from.
    ReturnShipHome {
        /// Ship receiving the order.
        ship: ShipId,
    },
    /// Halts a ship and drops its current errand.
    StopShip {
        /// Ship receiving the order.
        ship: ShipId,
    },
    /// Requests construction of a new building at the provided site.
    PlaceBuilding {
        /// Type of building to construct.
        kind: BuildingType,
        /// Site of the building in world units.
        position: Vec3,
    },
    /// Applies damage to a building.
    DamageBuilding {
        /// Building receiving the damage.
        building: BuildingId,
        /// Health points removed.
        amount: f32,
    },
    /// Restores health to a building.
    RepairBuilding {
        /// Building being repaired.
        building: BuildingId,
        /// Health points restored.
        amount: f32,
    },
    /// Moves the player avatar to the provided position.
    MovePlayer {
        /// New player position in world units.
        position: Vec3,
    },
    /// Requests that the player interact with a nearby building.
    Interact {
        /// Building the player is interacting with.
        building: BuildingId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// Reports a transition of a ship's state machine.
    ShipStateChanged {
        /// Ship whose state changed.
        ship: ShipId,
        /// State held before the transition.
        from: ShipState,
        /// State held after the transition.
        to: ShipState,
    },
    /// Reports that a ship extracted units from a resource.
    ResourceHarvested {
        /// Ship performing the harvest.
        ship: ShipId,
        /// Resource the units were taken from.
        resource: ResourceId,
        /// Type of the harvested units.
        kind: ResourceType,
        /// Number of units moved into the ship's cargo.
        amount: u32,
    },
    /// Reports that a regenerating resource grew back.
    ResourceRegenerated {
        /// Resource that regenerated.
        resource: ResourceId,
        /// Units added by the regeneration step.
        amount: u32,
    },
    /// Confirms that an exhausted resource was removed from the world.
    ResourceDepleted {
        /// Identifier of the removed resource.
        resource: ResourceId,
        /// Type of the removed resource.
        kind: ResourceType,
    },
    /// Reports that a ship unloaded cargo into a building.
    CargoDelivered {
        /// Ship that unloaded.
        ship: ShipId,
        /// Building that received the cargo.
        building: BuildingId,
        /// Type of the delivered units.
        kind: ResourceType,
        /// Number of units delivered.
        amount: u32,
    },
    /// Reports that a building finished one production cycle.
    ProductionCompleted {
        /// Building that produced.
        building: BuildingId,
        /// Input unit consumed, if the recipe requires one.
        input: Option<ResourceType>,
        /// Output unit produced.
        output: ResourceType,
    },
    /// Confirms that a building reached full construction progress.
    ConstructionCompleted {
        /// Building that finished construction.
        building: BuildingId,
    },
    /// Confirms that a building was placed into the world.
    BuildingPlaced {
        /// Identifier assigned to the building by the world.
        building: BuildingId,
        /// Type of building that was placed.
        kind: BuildingType,
        /// Site of the building.
        position: Vec3,
    },
    /// Reports that a building lost all health and stopped working.
    BuildingDeactivated {
        /// Building that was deactivated.
        building: BuildingId,
    },
    /// Reports that a repaired building resumed working.
    BuildingReactivated {
        /// Building that was reactivated.
        building: BuildingId,
    },
    /// Reports the result of a successful player interaction.
    InteractionCompleted {
        /// Building the player interacted with.
        building: BuildingId,
        /// Goods exchanged during the interaction.
        outcome: InteractionOutcome,
    },
    /// Reports that a command could not be applied.
    CommandRejected {
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Goods exchanged when the player interacts with a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionOutcome {
    /// The player sold goods at a market.
    Sold {
        /// Units of goods removed from the player inventory.
        units: u32,
        /// Gold credited to the player inventory.
        gold: u32,
    },
    /// The player handed input material to a processing building.
    Supplied {
        /// Type of the supplied units.
        kind: ResourceType,
        /// Number of units supplied.
        amount: u32,
    },
    /// The player picked up a building's output.
    Collected {
        /// Type of the collected units.
        kind: ResourceType,
        /// Number of units collected.
        amount: u32,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum RejectionReason {
    /// No ship with the provided identifier exists.
    #[error("ship {0:?} does not exist")]
    MissingShip(ShipId),
    /// No building with the provided identifier exists.
    #[error("building {0:?} does not exist")]
    MissingBuilding(BuildingId),
    /// The requested building site lies on open water.
    #[error("construction site is under water")]
    Underwater,
    /// Another building already stands too close to the requested site.
    #[error("construction site is occupied")]
    SiteOccupied,
    /// The player stands too far away from the building.
    #[error("building is out of interaction range")]
    OutOfRange,
    /// The building is destroyed or still under construction.
    #[error("building is not operational")]
    BuildingUnavailable,
    /// The interaction had nothing to exchange.
    #[error("nothing to trade")]
    NothingToTrade,
}

/// Unique identifier assigned to a resource node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(u32);

impl ResourceId {
    /// Creates a new resource identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(u32);

impl ShipId {
    /// Creates a new ship identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of material that exist in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// Timber from coastal forests.
    Wood,
    /// Quarried rock.
    Stone,
    /// Iron ore.
    Iron,
    /// Cobalt ore.
    Cobalt,
    /// Crystal formations.
    Crystal,
    /// Fish shoals.
    Fish,
    /// Crude oil.
    Oil,
    /// Sawn timber.
    Planks,
    /// Refined fuel.
    Fuel,
    /// Smelted steel.
    Steel,
    /// Enriched cobalt alloy.
    Alloy,
    /// Currency earned at markets.
    Gold,
}

impl ResourceType {
    /// Every resource type in declaration order.
    pub const ALL: [ResourceType; 12] = [
        Self::Wood,
        Self::Stone,
        Self::Iron,
        Self::Cobalt,
        Self::Crystal,
        Self::Fish,
        Self::Oil,
        Self::Planks,
        Self::Fuel,
        Self::Steel,
        Self::Alloy,
        Self::Gold,
    ];

    /// Resource types that appear as harvestable nodes in the world.
    pub const HARVESTABLE: [ResourceType; 6] = [
        Self::Wood,
        Self::Stone,
        Self::Iron,
        Self::Cobalt,
        Self::Crystal,
        Self::Fish,
    ];

    /// Dense index of the type, suitable for per-type arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Units regenerated per second by nodes of this type, if they regenerate at all.
    #[must_use]
    pub const fn regeneration_rate(self) -> Option<f32> {
        match self {
            Self::Wood => Some(0.5),
            Self::Crystal => Some(0.2),
            _ => None,
        }
    }

    /// Inclusive range of starting amounts for world-generated nodes.
    #[must_use]
    pub const fn node_amount_range(self) -> (u32, u32) {
        match self {
            Self::Wood => (50, 150),
            Self::Stone => (80, 200),
            Self::Iron => (60, 160),
            Self::Cobalt => (30, 90),
            Self::Crystal => (20, 60),
            Self::Fish => (40, 120),
            _ => (0, 0),
        }
    }

    /// Gold paid per unit when sold at a market. Gold itself is not sellable.
    #[must_use]
    pub const fn market_price(self) -> u32 {
        match self {
            Self::Wood | Self::Stone | Self::Fish => 1,
            Self::Iron | Self::Oil => 2,
            Self::Planks | Self::Cobalt => 3,
            Self::Fuel | Self::Crystal => 4,
            Self::Steel => 5,
            Self::Alloy => 8,
            Self::Gold => 0,
        }
    }
}

/// Tuning constants shared by every building of a given type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingStats {
    /// Health of a fully repaired building.
    pub max_health: f32,
    /// Material consumed per production cycle, if any.
    pub input: Option<ResourceType>,
    /// Material produced per production cycle, if any.
    pub output: Option<ResourceType>,
    /// Production cycles completed per simulated second.
    pub production_rate: f32,
    /// Simulated seconds required to finish construction.
    pub construction_time: f32,
}

/// Types of buildings that can stand in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingType {
    /// Central command building and primary cargo dropoff.
    Headquarters,
    /// Dock that builds ships and accepts cargo.
    Shipyard,
    /// Plain storage.
    Warehouse,
    /// Turns wood into planks.
    Sawmill,
    /// Turns oil into fuel.
    Refinery,
    /// Pumps oil without any input.
    OilRig,
    /// Turns iron into steel.
    Smelter,
    /// Turns cobalt into alloy.
    CobaltEnrichment,
    /// Cuts stone without any input.
    Quarry,
    /// Breeds fish without any input.
    FishFarm,
    /// Buys goods from the player for gold.
    Market,
    /// Navigation aid.
    Lighthouse,
}

impl BuildingType {
    /// Every building type in declaration order.
    pub const ALL: [BuildingType; 12] = [
        Self::Headquarters,
        Self::Shipyard,
        Self::Warehouse,
        Self::Sawmill,
        Self::Refinery,
        Self::OilRig,
        Self::Smelter,
        Self::CobaltEnrichment,
        Self::Quarry,
        Self::FishFarm,
        Self::Market,
        Self::Lighthouse,
    ];

    /// Static tuning table for the building type.
    #[must_use]
    pub const fn stats(self) -> BuildingStats {
        const fn row(
            max_health: f32,
            input: Option<ResourceType>,
            output: Option<ResourceType>,
            production_rate: f32,
            construction_time: f32,
        ) -> BuildingStats {
            BuildingStats {
                max_health,
                input,
                output,
                production_rate,
                construction_time,
            }
        }

        use ResourceType as R;
        match self {
            Self::Headquarters => row(1_000.0, None, None, 0.0, 120.0),
            Self::Shipyard => row(800.0, None, None, 0.0, 90.0),
            Self::Warehouse => row(500.0, None, None, 0.0, 45.0),
            Self::Sawmill => row(400.0, Some(R::Wood), Some(R::Planks), 0.5, 40.0),
            Self::Refinery => row(450.0, Some(R::Oil), Some(R::Fuel), 0.25, 60.0),
            Self::OilRig => row(350.0, None, Some(R::Oil), 0.2, 50.0),
            Self::Smelter => row(500.0, Some(R::Iron), Some(R::Steel), 0.25, 60.0),
            Self::CobaltEnrichment => row(450.0, Some(R::Cobalt), Some(R::Alloy), 0.2, 75.0),
            Self::Quarry => row(600.0, None, Some(R::Stone), 0.1, 40.0),
            Self::FishFarm => row(300.0, None, Some(R::Fish), 0.15, 30.0),
            Self::Market => row(400.0, None, None, 0.0, 35.0),
            Self::Lighthouse => row(250.0, None, None, 0.0, 25.0),
        }
    }

    /// Reports whether ships may unload cargo at buildings of this type.
    #[must_use]
    pub const fn accepts_cargo(self) -> bool {
        matches!(self, Self::Headquarters | Self::Shipyard)
    }
}

/// Tuning constants shared by every ship of a given type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipStats {
    /// Travel speed in world units per simulated second.
    pub speed: f32,
    /// Health of an undamaged hull.
    pub max_health: f32,
    /// Maximum number of cargo units the hold accepts.
    pub cargo_capacity: u32,
    /// Units extracted per harvest interval; the fractional part is ignored.
    pub harvest_rate: f32,
}

/// Types of ships available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShipType {
    /// Fast, lightly loaded explorer.
    Scout,
    /// General purpose harvesting vessel.
    Harvester,
    /// Bulk cargo carrier.
    Freighter,
    /// Liquid cargo carrier.
    Tanker,
    /// Fishing vessel.
    Trawler,
    /// Slow ore extractor.
    Dredger,
    /// Utility tug.
    Tug,
    /// Unpowered heavy barge.
    Barge,
}

impl ShipType {
    /// Every ship type in declaration order.
    pub const ALL: [ShipType; 8] = [
        Self::Scout,
        Self::Harvester,
        Self::Freighter,
        Self::Tanker,
        Self::Trawler,
        Self::Dredger,
        Self::Tug,
        Self::Barge,
    ];

    /// Static tuning table for the ship type.
    #[must_use]
    pub const fn stats(self) -> ShipStats {
        const fn row(speed: f32, max_health: f32, cargo_capacity: u32, harvest_rate: f32) -> ShipStats {
            ShipStats {
                speed,
                max_health,
                cargo_capacity,
                harvest_rate,
            }
        }

        match self {
            Self::Scout => row(12.0, 60.0, 40, 1.0),
            Self::Harvester => row(8.0, 120.0, 200, 5.0),
            Self::Freighter => row(6.0, 200.0, 400, 3.0),
            Self::Tanker => row(5.0, 220.0, 350, 4.0),
            Self::Trawler => row(7.0, 100.0, 150, 6.0),
            Self::Dredger => row(4.0, 180.0, 300, 8.0),
            Self::Tug => row(9.0, 150.0, 100, 2.0),
            Self::Barge => row(3.0, 250.0, 600, 2.5),
        }
    }
}

/// States of the autonomous ship behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipState {
    /// Waiting for orders.
    Idle,
    /// Travelling toward a targeted resource.
    MovingToResource,
    /// Extracting units from the targeted resource.
    Harvesting,
    /// Travelling toward a dropoff building.
    MovingToDropoff,
    /// Unloading cargo into the dropoff building.
    DroppingOff,
    /// Travelling back to a fixed position.
    ReturnToPosition,
}

/// Per-type tally of material units.
///
/// Entries never hold zero: removing the last unit of a type drops the entry,
/// so [`Inventory::iter`] only yields types that are actually present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    entries: BTreeMap<ResourceType, u32>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of units of the provided type.
    #[must_use]
    pub fn get(&self, kind: ResourceType) -> u32 {
        self.entries.get(&kind).copied().unwrap_or(0)
    }

    /// Adds units of the provided type.
    pub fn add(&mut self, kind: ResourceType, amount: u32) {
        if amount == 0 {
            return;
        }
        let entry = self.entries.entry(kind).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Removes up to `amount` units and returns how many were actually removed.
    pub fn remove(&mut self, kind: ResourceType, amount: u32) -> u32 {
        let Some(entry) = self.entries.get_mut(&kind) else {
            return 0;
        };
        let removed = amount.min(*entry);
        *entry -= removed;
        if *entry == 0 {
            let _ = self.entries.remove(&kind);
        }
        removed
    }

    /// Removes and returns every unit of the provided type.
    pub fn take_all(&mut self, kind: ResourceType) -> u32 {
        self.entries.remove(&kind).unwrap_or(0)
    }

    /// Sum of all units across every type.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.entries
            .values()
            .fold(0_u32, |total, amount| total.saturating_add(*amount))
    }

    /// Reports whether the inventory holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterator over the present types in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, u32)> + '_ {
        self.entries.iter().map(|(kind, amount)| (*kind, *amount))
    }
}

/// Immutable representation of a resource node used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResourceSnapshot {
    /// Identifier assigned to the resource.
    pub id: ResourceId,
    /// Type of material held by the node.
    pub kind: ResourceType,
    /// Location of the node.
    pub position: Vec3,
    /// Units remaining.
    pub amount: u32,
    /// Units held when full.
    pub max_amount: u32,
    /// Visual scale hint proportional to the remaining amount.
    pub scale: f32,
}

/// Immutable representation of a building used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingSnapshot {
    /// Identifier assigned to the building.
    pub id: BuildingId,
    /// Type of the building.
    pub kind: BuildingType,
    /// Site of the building.
    pub position: Vec3,
    /// Current health.
    pub health: f32,
    /// Health when fully repaired.
    pub max_health: f32,
    /// Indicates whether the building has health left.
    pub is_active: bool,
    /// Construction progress in the range 0.0..=1.0.
    pub construction_progress: f32,
    /// Stored material.
    pub inventory: Inventory,
}

/// Immutable representation of a ship used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipSnapshot {
    /// Identifier assigned to the ship.
    pub id: ShipId,
    /// Type of the ship.
    pub kind: ShipType,
    /// Current location.
    pub position: Vec3,
    /// Heading around the vertical axis, in radians.
    pub rotation: f32,
    /// Current health.
    pub health: f32,
    /// Current behaviour state.
    pub state: ShipState,
    /// Material currently carried.
    pub cargo: Inventory,
    /// Sum of all carried units.
    pub cargo_total: u32,
    /// Maximum number of carried units.
    pub cargo_capacity: u32,
    /// Resource the ship is currently tasked with.
    pub target_resource: Option<ResourceId>,
    /// Building the ship is currently delivering to.
    pub dropoff_building: Option<BuildingId>,
    /// Resource type the ship harvests when ordered to.
    pub preferred_resource: ResourceType,
}
