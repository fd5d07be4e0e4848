//! Building state, production cycles, and the building registry.

use std::{collections::BTreeMap, time::Duration};

use tidewater_core::{
    BuildingId, BuildingSnapshot, BuildingType, Event, Inventory, ResourceType, Vec2, Vec3,
};
use tracing::debug;

/// Fixed-position structure with health, construction progress, and a recipe.
#[derive(Clone, Debug)]
pub(crate) struct Building {
    id: BuildingId,
    kind: BuildingType,
    position: Vec3,
    health: f32,
    max_health: f32,
    is_active: bool,
    construction_progress: f32,
    construction_time: f32,
    inventory: Inventory,
    input: Option<ResourceType>,
    output: Option<ResourceType>,
    production_cycle: Option<Duration>,
    production_timer: Duration,
}

impl Building {
    /// Creates an undamaged building at the provided construction progress.
    pub(crate) fn new(
        id: BuildingId,
        kind: BuildingType,
        position: Vec3,
        construction_progress: f32,
    ) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            position,
            health: stats.max_health,
            max_health: stats.max_health,
            is_active: true,
            construction_progress: construction_progress.clamp(0.0, 1.0),
            construction_time: stats.construction_time,
            inventory: Inventory::new(),
            input: stats.input,
            output: stats.output,
            production_cycle: production_cycle(stats.production_rate),
            production_timer: Duration::ZERO,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_recipe(
        mut self,
        input: Option<ResourceType>,
        output: Option<ResourceType>,
        production_rate: f32,
    ) -> Self {
        self.input = input;
        self.output = output;
        self.production_cycle = production_cycle(production_rate);
        self
    }

    pub(crate) const fn kind(&self) -> BuildingType {
        self.kind
    }

    pub(crate) const fn position(&self) -> Vec3 {
        self.position
    }

    /// Material consumed and produced per cycle.
    pub(crate) const fn recipe(&self) -> (Option<ResourceType>, Option<ResourceType>) {
        (self.input, self.output)
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.construction_progress >= 1.0
    }

    /// Reports whether the building is active and fully built.
    pub(crate) fn is_operational(&self) -> bool {
        self.is_active && self.is_complete()
    }

    pub(crate) fn resource_amount(&self, kind: ResourceType) -> u32 {
        self.inventory.get(kind)
    }

    /// Advances construction or production by `dt`.
    pub(crate) fn update(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.is_active {
            return;
        }

        if !self.is_complete() {
            self.advance_construction(dt.as_secs_f32(), out_events);
            return;
        }

        let (Some(output), Some(cycle)) = (self.output, self.production_cycle) else {
            return;
        };
        if let Some(input) = self.input {
            if self.inventory.get(input) == 0 {
                return;
            }
        }

        self.production_timer = self.production_timer.saturating_add(dt);
        if self.production_timer < cycle {
            return;
        }

        if let Some(input) = self.input {
            if !self.consume_resource(input, 1) {
                return;
            }
        }
        let _ = self.add_resource(output, 1);
        self.production_timer = Duration::ZERO;
        debug!(building = self.id.get(), kind = ?self.kind, ?output, "production completed");
        out_events.push(Event::ProductionCompleted {
            building: self.id,
            input: self.input,
            output,
        });
    }

    fn advance_construction(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let step = if self.construction_time > 0.0 {
            dt / self.construction_time
        } else {
            1.0
        };
        self.construction_progress = (self.construction_progress + step).min(1.0);
        if self.is_complete() {
            debug!(building = self.id.get(), kind = ?self.kind, "construction completed");
            out_events.push(Event::ConstructionCompleted { building: self.id });
        }
    }

    /// Stores material; storage is unbounded so this always succeeds.
    pub(crate) fn add_resource(&mut self, kind: ResourceType, amount: u32) -> bool {
        self.inventory.add(kind, amount);
        true
    }

    /// Removes exactly `amount` units, or nothing when fewer are stored.
    pub(crate) fn consume_resource(&mut self, kind: ResourceType, amount: u32) -> bool {
        if self.inventory.get(kind) < amount {
            return false;
        }
        let removed = self.inventory.remove(kind, amount);
        debug_assert_eq!(removed, amount);
        true
    }

    pub(crate) fn take_damage(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        if self.health <= 0.0 && self.is_active {
            self.is_active = false;
            debug!(building = self.id.get(), "building deactivated");
            out_events.push(Event::BuildingDeactivated { building: self.id });
        }
    }

    pub(crate) fn repair(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
        if self.health > 0.0 && !self.is_active {
            self.is_active = true;
            debug!(building = self.id.get(), "building reactivated");
            out_events.push(Event::BuildingReactivated { building: self.id });
        }
    }

    pub(crate) fn snapshot(&self) -> BuildingSnapshot {
        BuildingSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            is_active: self.is_active,
            construction_progress: self.construction_progress,
            inventory: self.inventory.clone(),
        }
    }
}

/// Registry that stores buildings and allocates their identifiers.
#[derive(Debug)]
pub(crate) struct BuildingStore {
    entries: BTreeMap<BuildingId, Building>,
    next_building_id: BuildingId,
}

impl BuildingStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_building_id: BuildingId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        kind: BuildingType,
        position: Vec3,
        construction_progress: f32,
    ) -> BuildingId {
        let id = self.next_building_id;
        self.next_building_id = BuildingId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Building::new(id, kind, position, construction_progress),
        );
        id
    }

    pub(crate) fn get(&self, id: BuildingId) -> Option<&Building> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Building> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn update(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for building in self.entries.values_mut() {
            building.update(dt, out_events);
        }
    }

    /// Nearest building accepting cargo; ties keep the earlier building.
    pub(crate) fn nearest_dropoff(&self, origin: Vec3) -> Option<BuildingId> {
        self.nearest_matching(|building| {
            building
                .kind
                .accepts_cargo()
                .then(|| origin.distance(building.position))
        })
    }

    /// Nearest building of any type within `range` on the horizontal plane.
    pub(crate) fn nearest_within(&self, origin: Vec3, range: f32) -> Option<BuildingId> {
        self.nearest_matching(|building| {
            let distance = planar_distance(origin, building.position);
            (distance <= range).then_some(distance)
        })
    }

    /// Scans in identifier order; `measure` returns `None` for rejected buildings.
    fn nearest_matching<F>(&self, measure: F) -> Option<BuildingId>
    where
        F: Fn(&Building) -> Option<f32>,
    {
        let mut nearest: Option<(BuildingId, f32)> = None;
        for building in self.entries.values() {
            let Some(distance) = measure(building) else {
                continue;
            };
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((building.id, distance));
            }
        }
        nearest.map(|(id, _)| id)
    }
}

/// Distance between two points ignoring elevation.
pub(crate) fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x, a.z).distance(Vec2::new(b.x, b.z))
}

/// Time one unit of output takes at `rate` cycles per second.
fn production_cycle(rate: f32) -> Option<Duration> {
    (rate > 0.0).then(|| Duration::from_secs_f64(1.0 / f64::from(rate)))
}
