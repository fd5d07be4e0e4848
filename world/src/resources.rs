//! Resource nodes and the per-type index used for nearest-neighbour search.

use std::{collections::BTreeMap, time::Duration};

use tidewater_core::{Event, ResourceId, ResourceSnapshot, ResourceType, Vec3};
use tracing::debug;

/// Simulated time between two regeneration steps.
const REGENERATION_INTERVAL: Duration = Duration::from_secs(5);

/// Depletable stockpile of a single material at a fixed position.
#[derive(Clone, Debug)]
pub(crate) struct Resource {
    id: ResourceId,
    kind: ResourceType,
    position: Vec3,
    amount: u32,
    max_amount: u32,
    regeneration_rate: Option<f32>,
    regeneration_timer: Duration,
    scale: f32,
}

impl Resource {
    /// Creates a full node holding `amount` units.
    pub(crate) fn new(id: ResourceId, kind: ResourceType, position: Vec3, amount: u32) -> Self {
        Self {
            id,
            kind,
            position,
            amount,
            max_amount: amount,
            regeneration_rate: kind.regeneration_rate(),
            regeneration_timer: Duration::ZERO,
            scale: 1.0,
        }
    }

    pub(crate) const fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) const fn is_depleted(&self) -> bool {
        self.amount == 0
    }

    /// Removes up to `requested` units and returns how many were taken.
    pub(crate) fn harvest(&mut self, requested: u32) -> u32 {
        let harvested = requested.min(self.amount);
        if harvested == 0 {
            return 0;
        }
        self.amount -= harvested;
        self.regeneration_timer = Duration::ZERO;
        self.refresh_scale();
        harvested
    }

    /// Advances regeneration, returning the units grown back during this step.
    ///
    /// Growth needs a full interval without harvesting.
    pub(crate) fn update(&mut self, dt: Duration) -> u32 {
        let Some(rate) = self.regeneration_rate else {
            return 0;
        };
        if self.is_depleted() || self.amount >= self.max_amount {
            return 0;
        }

        self.regeneration_timer = self.regeneration_timer.saturating_add(dt);
        if self.regeneration_timer < REGENERATION_INTERVAL {
            return 0;
        }
        self.regeneration_timer = Duration::ZERO;

        let grown = (rate * REGENERATION_INTERVAL.as_secs_f32()).floor() as u32;
        let before = self.amount;
        self.amount = self.amount.saturating_add(grown).min(self.max_amount);
        self.refresh_scale();
        self.amount - before
    }

    #[cfg(any(test, feature = "scaffolding"))]
    pub(crate) fn set_amount(&mut self, amount: u32) {
        self.amount = amount.min(self.max_amount);
        self.refresh_scale();
    }

    pub(crate) fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            amount: self.amount,
            max_amount: self.max_amount,
            scale: self.scale,
        }
    }

    fn refresh_scale(&mut self) {
        self.scale = if self.max_amount == 0 {
            0.0
        } else {
            self.amount as f32 / self.max_amount as f32
        };
        debug_assert!(self.amount <= self.max_amount);
    }
}

/// Owns every resource node and keeps one bucket of identifiers per type.
#[derive(Debug)]
pub(crate) struct ResourceStore {
    entries: BTreeMap<ResourceId, Resource>,
    buckets: [Vec<ResourceId>; ResourceType::ALL.len()],
    next_resource_id: ResourceId,
}

impl ResourceStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            buckets: std::array::from_fn(|_| Vec::new()),
            next_resource_id: ResourceId::new(0),
        }
    }

    /// Creates a node and registers it in its type bucket.
    pub(crate) fn insert(&mut self, kind: ResourceType, position: Vec3, amount: u32) -> ResourceId {
        let id = self.next_resource_id;
        self.next_resource_id = ResourceId::new(id.get().saturating_add(1));
        let _ = self
            .entries
            .insert(id, Resource::new(id, kind, position, amount));
        self.buckets[kind.index()].push(id);
        id
    }

    pub(crate) fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nearest non-depleted node of `kind` within `max_distance`; ties keep the earlier node.
    pub(crate) fn nearest(
        &self,
        origin: Vec3,
        kind: ResourceType,
        max_distance: f32,
    ) -> Option<ResourceId> {
        let mut nearest: Option<(ResourceId, f32)> = None;
        for id in &self.buckets[kind.index()] {
            let Some(resource) = self.entries.get(id) else {
                continue;
            };
            if resource.is_depleted() {
                continue;
            }
            let distance = origin.distance(resource.position);
            if distance > max_distance {
                continue;
            }
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((*id, distance));
            }
        }
        nearest.map(|(id, _)| id)
    }

    /// Runs regeneration for every node.
    pub(crate) fn update(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for resource in self.entries.values_mut() {
            let amount = resource.update(dt);
            if amount > 0 {
                out_events.push(Event::ResourceRegenerated {
                    resource: resource.id,
                    amount,
                });
            }
        }
    }

    /// Removes depleted nodes from the master map and their buckets.
    pub(crate) fn sweep_depleted(&mut self, out_events: &mut Vec<Event>) {
        let depleted: Vec<ResourceId> = self
            .entries
            .values()
            .filter(|resource| resource.is_depleted())
            .map(|resource| resource.id)
            .collect();

        for id in depleted {
            let Some(resource) = self.entries.remove(&id) else {
                continue;
            };
            self.buckets[resource.kind.index()].retain(|candidate| *candidate != id);
            debug!(resource = id.get(), kind = ?resource.kind, "resource depleted");
            out_events.push(Event::ResourceDepleted {
                resource: id,
                kind: resource.kind,
            });
        }
    }

    #[cfg(test)]
    fn bucket(&self, kind: ResourceType) -> &[ResourceId] {
        &self.buckets[kind.index()]
    }
}
