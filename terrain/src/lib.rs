#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic terrain height field for the Tidewater world.
//!
//! The height at any `(x, z)` is a pure function of the coordinates and the
//! peak and plateau features sampled once when the field is generated. World
//! generation, ship placement, and rendering all sample the field
//! independently, so two calls with identical inputs must agree bit for bit.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

/// Elevation of the open water surface; the field never dips below it.
pub const WATER_LEVEL: f32 = 0.0;

/// Edge length of the square playable area in world units.
pub const WORLD_SIZE: f32 = 2_000.0;

/// Horizontal coordinate of the world centre along both axes.
pub const WORLD_CENTER: f32 = WORLD_SIZE / 2.0;

const BASE_FREQUENCY: f32 = 0.004;
const BASE_OCTAVES: usize = 4;
const HILL_HEIGHT: f32 = 18.0;

const MOUNTAIN_RADIUS: f32 = 200.0;
const MOUNTAIN_HEIGHT: f32 = 140.0;
const MOUNTAIN_DETAIL_FREQUENCY: f32 = 0.05;
const MOUNTAIN_DETAIL_HEIGHT: f32 = 12.0;
const MIN_PEAK_DISTANCE: f32 = 200.0;
const MAX_PEAK_DISTANCE: f32 = 900.0;

const PLATEAU_RADIUS: f32 = 100.0;
const PLATEAU_EDGE_WIDTH: f32 = 30.0;
const PLATEAU_MIN_HEIGHT: f32 = 20.0;
const PLATEAU_MAX_HEIGHT: f32 = 60.0;

const RIVER_FREQUENCY: f32 = 0.0025;
const RIVER_OFFSET_X: f32 = 173.0;
const RIVER_OFFSET_Z: f32 = -41.0;
const RIVER_BAND_LOW: f32 = 0.70;
const RIVER_BAND_HIGH: f32 = 0.75;
const RIVER_DEPTH: f32 = 10.0;

const DETAIL_FREQUENCY: f32 = 0.35;
const DETAIL_HEIGHT: f32 = 0.6;

/// Centre of a mountain that raises the terrain around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// Horizontal x coordinate of the summit.
    pub x: f32,
    /// Horizontal z coordinate of the summit.
    pub z: f32,
}

/// Flat-topped elevation the terrain is blended toward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plateau {
    /// Horizontal x coordinate of the plateau centre.
    pub x: f32,
    /// Horizontal z coordinate of the plateau centre.
    pub z: f32,
    /// Elevation of the plateau top.
    pub height: f32,
}

/// Parameters controlling how many features are sampled for a new field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainConfig {
    /// Number of mountain peaks scattered around the world centre.
    pub peak_count: usize,
    /// Number of plateaus scattered across the world.
    pub plateau_count: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            peak_count: 5,
            plateau_count: 3,
        }
    }
}

/// Terrain elevation function backed by a fixed set of seeded features.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    peaks: Vec<Peak>,
    plateaus: Vec<Plateau>,
}

impl HeightField {
    /// Samples peaks and plateaus from the provided random stream.
    ///
    /// Peaks are placed on an annulus around the world centre so that the
    /// headquarters area never sits on a mountainside.
    pub fn generate<R>(config: &TerrainConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let peaks = (0..config.peak_count)
            .map(|_| {
                let angle = rng.gen_range(0.0..TAU);
                let distance = rng.gen_range(MIN_PEAK_DISTANCE..MAX_PEAK_DISTANCE);
                Peak {
                    x: WORLD_CENTER + angle.cos() * distance,
                    z: WORLD_CENTER + angle.sin() * distance,
                }
            })
            .collect();

        let plateaus = (0..config.plateau_count)
            .map(|_| Plateau {
                x: rng.gen_range(0.0..WORLD_SIZE),
                z: rng.gen_range(0.0..WORLD_SIZE),
                height: rng.gen_range(PLATEAU_MIN_HEIGHT..PLATEAU_MAX_HEIGHT),
            })
            .collect();

        Self { peaks, plateaus }
    }

    /// Creates a field from explicit features.
    #[must_use]
    pub fn from_features(peaks: Vec<Peak>, plateaus: Vec<Plateau>) -> Self {
        Self { peaks, plateaus }
    }

    /// Creates a field made of noise layers only.
    #[must_use]
    pub fn without_features() -> Self {
        Self::from_features(Vec::new(), Vec::new())
    }

    /// Mountain peaks shaping the field.
    #[must_use]
    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    /// Plateaus shaping the field.
    #[must_use]
    pub fn plateaus(&self) -> &[Plateau] {
        &self.plateaus
    }

    /// Terrain elevation at the provided horizontal coordinates.
    #[must_use]
    pub fn height(&self, x: f32, z: f32) -> f32 {
        let base = base_height(x, z);
        let mut height = base;
        height += self.mountain_contribution(x, z);
        height = self.blend_plateaus(x, z, height);
        height = carve_river(x, z, height, base);
        height += detail(x, z);
        height.max(WATER_LEVEL)
    }

    /// Reports whether the provided coordinates lie on open water.
    #[must_use]
    pub fn is_water(&self, x: f32, z: f32) -> bool {
        self.height(x, z) <= WATER_LEVEL
    }

    fn mountain_contribution(&self, x: f32, z: f32) -> f32 {
        let point = Vec2::new(x, z);
        self.peaks
            .iter()
            .map(|peak| {
                let distance = point.distance(Vec2::new(peak.x, peak.z));
                if distance >= MOUNTAIN_RADIUS {
                    return 0.0;
                }
                let falloff = (1.0 - distance / MOUNTAIN_RADIUS).powi(3);
                let ridges = (x * MOUNTAIN_DETAIL_FREQUENCY).sin()
                    * (z * MOUNTAIN_DETAIL_FREQUENCY).cos()
                    * MOUNTAIN_DETAIL_HEIGHT;
                falloff * MOUNTAIN_HEIGHT + ridges * falloff
            })
            .sum()
    }

    fn blend_plateaus(&self, x: f32, z: f32, height: f32) -> f32 {
        let point = Vec2::new(x, z);
        self.plateaus.iter().fold(height, |current, plateau| {
            let distance = point.distance(Vec2::new(plateau.x, plateau.z));
            let factor = plateau_factor(distance);
            current + (plateau.height - current) * factor
        })
    }
}

/// Four-octave sine and cosine lattice noise in the range of roughly ±0.94.
#[must_use]
pub fn lattice_noise(x: f32, z: f32) -> f32 {
    let mut total = 0.0;
    let mut frequency = BASE_FREQUENCY;
    let mut weight = 0.5;
    for _ in 0..BASE_OCTAVES {
        total += weight * (x * frequency).sin() * (z * frequency).cos();
        frequency *= 2.0;
        weight *= 0.5;
    }
    total
}

fn base_height(x: f32, z: f32) -> f32 {
    lattice_noise(x, z) * HILL_HEIGHT
}

/// Blend weight for a plateau: full inside the core, fading linearly across the rim.
fn plateau_factor(distance: f32) -> f32 {
    if distance >= PLATEAU_RADIUS {
        return 0.0;
    }
    let core = PLATEAU_RADIUS - PLATEAU_EDGE_WIDTH;
    if distance <= core {
        1.0
    } else {
        1.0 - (distance - core) / PLATEAU_EDGE_WIDTH
    }
}

fn river_noise(x: f32, z: f32) -> f32 {
    let sample = ((x + RIVER_OFFSET_X) * RIVER_FREQUENCY).sin()
        * ((z + RIVER_OFFSET_Z) * RIVER_FREQUENCY).cos();
    (sample + 1.0) * 0.5
}

fn carve_river(x: f32, z: f32, height: f32, base: f32) -> f32 {
    let value = river_noise(x, z);
    if (RIVER_BAND_LOW..=RIVER_BAND_HIGH).contains(&value) {
        (height - RIVER_DEPTH).max(base)
    } else {
        height
    }
}

fn detail(x: f32, z: f32) -> f32 {
    (x * DETAIL_FREQUENCY).sin() * (z * DETAIL_FREQUENCY).cos() * DETAIL_HEIGHT
}
