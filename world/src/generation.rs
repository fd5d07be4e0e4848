//! Seeded world generation: terrain, resource patches, starting buildings, and fleet.

use std::f32::consts::TAU;

use rand::Rng;
use tidewater_core::{BuildingType, ResourceType, ShipType, Vec3};
use tidewater_terrain::{HeightField, TerrainConfig, WATER_LEVEL, WORLD_CENTER};

use crate::{buildings::BuildingStore, resources::ResourceStore};

const DEFAULT_SEED: u64 = 0x7469_6465_7761_7465;
const DEFAULT_PATCHES_PER_TYPE: usize = 3;

const PATCH_MIN_DISTANCE: f32 = 100.0;
const PATCH_MAX_DISTANCE: f32 = 800.0;
const PATCH_RADIUS: f32 = 30.0;
const PATCH_MIN_NODES: usize = 4;
const PATCH_MAX_NODES: usize = 8;

/// Offsets of the starting buildings from the world centre.
const STARTING_BUILDINGS: [(BuildingType, f32, f32); 4] = [
    (BuildingType::Headquarters, 0.0, 0.0),
    (BuildingType::Shipyard, 40.0, 0.0),
    (BuildingType::OilRig, -40.0, 30.0),
    (BuildingType::Refinery, -40.0, -30.0),
];

/// Offset of the first ship berth from the world centre.
const BERTH_OFFSET: f32 = 60.0;
const BERTH_SPACING: f32 = 15.0;

/// Parameters controlling world generation.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Seed of the random stream every generated feature is drawn from.
    pub seed: u64,
    /// Number of resource patches generated per harvestable type.
    pub patches_per_type: usize,
    /// Starting ships with the resource type each is ordered to harvest.
    pub ship_fleet: Vec<(ShipType, ResourceType)>,
    /// Terrain feature counts.
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            patches_per_type: DEFAULT_PATCHES_PER_TYPE,
            ship_fleet: vec![
                (ShipType::Harvester, ResourceType::Wood),
                (ShipType::Trawler, ResourceType::Fish),
                (ShipType::Dredger, ResourceType::Iron),
            ],
            terrain: TerrainConfig::default(),
        }
    }
}

/// Scatters clustered resource nodes for every harvestable type.
pub(crate) fn scatter_patches<R>(
    resources: &mut ResourceStore,
    height_field: &HeightField,
    patches_per_type: usize,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    for kind in ResourceType::HARVESTABLE {
        for _ in 0..patches_per_type {
            let centre = polar_offset(
                rng.gen_range(0.0..TAU),
                rng.gen_range(PATCH_MIN_DISTANCE..PATCH_MAX_DISTANCE),
            );
            let nodes = rng.gen_range(PATCH_MIN_NODES..=PATCH_MAX_NODES);
            let (low, high) = kind.node_amount_range();

            for _ in 0..nodes {
                let angle = rng.gen_range(0.0..TAU);
                let radius = rng.gen_range(0.0..PATCH_RADIUS);
                let x = centre.0 + angle.cos() * radius;
                let z = centre.1 + angle.sin() * radius;
                let amount = rng.gen_range(low..=high);
                let position = Vec3::new(x, height_field.height(x, z), z);
                let _ = resources.insert(kind, position, amount);
            }
        }
    }
}

/// Places the fully built starting settlement around the world centre.
pub(crate) fn place_settlement(buildings: &mut BuildingStore, height_field: &HeightField) {
    for (kind, dx, dz) in STARTING_BUILDINGS {
        let x = WORLD_CENTER + dx;
        let z = WORLD_CENTER + dz;
        let _ = buildings.insert(kind, Vec3::new(x, height_field.height(x, z), z), 1.0);
    }
}

/// Launch position of the `index`-th starting ship.
pub(crate) fn berth(index: usize) -> Vec3 {
    Vec3::new(
        WORLD_CENTER + BERTH_OFFSET + index as f32 * BERTH_SPACING,
        WATER_LEVEL,
        WORLD_CENTER + BERTH_OFFSET,
    )
}

fn polar_offset(angle: f32, distance: f32) -> (f32, f32) {
    (
        WORLD_CENTER + angle.cos() * distance,
        WORLD_CENTER + angle.sin() * distance,
    )
}
