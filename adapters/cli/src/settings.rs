//! TOML settings file and its merge with command-line flags.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tidewater_core::{ResourceType, ShipType};
use tidewater_world::WorldConfig;

const DEFAULT_TICKS: u64 = 1_200;
const DEFAULT_TICK_MS: u64 = 500;

/// Values read from a settings file. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) seed: Option<u64>,
    pub(crate) ticks: Option<u64>,
    pub(crate) tick_ms: Option<u64>,
    pub(crate) report_every: Option<u64>,
    pub(crate) patches_per_type: Option<usize>,
    pub(crate) peaks: Option<usize>,
    pub(crate) plateaus: Option<usize>,
    pub(crate) fleet: Option<Vec<FleetEntry>>,
}

/// One starting ship in the settings file.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FleetEntry {
    pub(crate) ship: ShipType,
    pub(crate) resource: ResourceType,
}

impl Settings {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }
}

/// Flag values that take precedence over the settings file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) ticks: Option<u64>,
    pub(crate) tick_ms: Option<u64>,
    pub(crate) report_every: Option<u64>,
}

/// Fully resolved parameters of one headless run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunPlan {
    pub(crate) world: WorldConfig,
    pub(crate) ticks: u64,
    pub(crate) tick: Duration,
    pub(crate) report_every: u64,
}

impl RunPlan {
    pub(crate) fn resolve(settings: Settings, overrides: Overrides) -> Result<Self> {
        let mut world = WorldConfig::default();
        if let Some(seed) = overrides.seed.or(settings.seed) {
            world.seed = seed;
        }
        if let Some(patches) = settings.patches_per_type {
            world.patches_per_type = patches;
        }
        if let Some(peaks) = settings.peaks {
            world.terrain.peak_count = peaks;
        }
        if let Some(plateaus) = settings.plateaus {
            world.terrain.plateau_count = plateaus;
        }
        if let Some(fleet) = settings.fleet {
            world.ship_fleet = fleet
                .into_iter()
                .map(|entry| (entry.ship, entry.resource))
                .collect();
        }

        let tick_ms = overrides
            .tick_ms
            .or(settings.tick_ms)
            .unwrap_or(DEFAULT_TICK_MS);
        if tick_ms == 0 {
            bail!("tick length must be at least one millisecond");
        }

        Ok(Self {
            world,
            ticks: overrides.ticks.or(settings.ticks).unwrap_or(DEFAULT_TICKS),
            tick: Duration::from_millis(tick_ms),
            report_every: overrides.report_every.or(settings.report_every).unwrap_or(0),
        })
    }
}
