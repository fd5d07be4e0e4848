#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous cargo ship behaviour.
//!
//! Every [`Ship`] runs a small state machine that finds resources, travels to
//! them, harvests until its hold is nearly full, delivers the cargo to the
//! nearest dropoff building, and starts over. Ships never own the entities they
//! work with: targets are held as identifiers and resolved through the
//! [`Surroundings`] the world provides on every update, so a resource removed
//! between ticks simply stops resolving and the ship searches again.

use std::time::Duration;

use glam::Vec2;
use tidewater_core::{
    BuildingId, Event, Inventory, ResourceId, ResourceType, ShipId, ShipSnapshot, ShipState,
    ShipType, Vec3,
};
use tracing::debug;

/// Horizontal distance below which a ship counts as having reached its target.
pub const ARRIVAL_DISTANCE: f32 = 0.5;

/// Maximum distance searched when looking for a resource to harvest.
pub const RESOURCE_SEARCH_RADIUS: f32 = 500.0;

/// Simulated time between two harvest attempts.
pub const HARVEST_INTERVAL: Duration = Duration::from_secs(1);

/// Simulated time between two unloading rounds at a dropoff.
pub const DROPOFF_INTERVAL: Duration = Duration::from_millis(500);

/// Fraction of the hold that triggers a delivery run.
pub const DELIVERY_THRESHOLD: f32 = 0.9;

/// World-side lookups and mutations a ship needs while running its errands.
///
/// Implementations must treat identifiers as weak references: every method
/// accepts identifiers that no longer resolve and reports them as absent.
pub trait Surroundings {
    /// Nearest non-depleted resource of `kind` within `max_distance` of `origin`.
    fn nearest_resource(
        &self,
        origin: Vec3,
        kind: ResourceType,
        max_distance: f32,
    ) -> Option<ResourceId>;

    /// Position of the resource if it still exists and is not depleted.
    fn resource_position(&self, resource: ResourceId) -> Option<Vec3>;

    /// Reports whether the resource is gone or exhausted.
    fn is_resource_depleted(&self, resource: ResourceId) -> bool;

    /// Extracts up to `amount` units and returns how many were taken.
    fn harvest(&mut self, resource: ResourceId, amount: u32) -> u32;

    /// Nearest building that accepts cargo deliveries.
    fn nearest_dropoff(&self, origin: Vec3) -> Option<BuildingId>;

    /// Position of the building if it still exists.
    fn building_position(&self, building: BuildingId) -> Option<Vec3>;

    /// Hands cargo to a building, returning whether it was accepted.
    fn deposit(&mut self, building: BuildingId, kind: ResourceType, amount: u32) -> bool;
}

/// Cargo ship controlled by the autonomous harvesting behaviour.
#[derive(Clone, Debug)]
pub struct Ship {
    id: ShipId,
    kind: ShipType,
    position: Vec3,
    rotation: f32,
    speed: f32,
    health: f32,
    max_health: f32,
    cargo: Inventory,
    cargo_total: u32,
    cargo_capacity: u32,
    state: ShipState,
    target_resource: Option<ResourceId>,
    dropoff_building: Option<BuildingId>,
    home_position: Vec3,
    action_timer: Duration,
    harvest_rate: f32,
    preferred_resource: ResourceType,
    destination: Option<Vec3>,
}

impl Ship {
    /// Launches an idle ship at `position`, which also becomes its home.
    #[must_use]
    pub fn new(id: ShipId, kind: ShipType, position: Vec3, preferred: ResourceType) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            position,
            rotation: 0.0,
            speed: stats.speed,
            health: stats.max_health,
            max_health: stats.max_health,
            cargo: Inventory::new(),
            cargo_total: 0,
            cargo_capacity: stats.cargo_capacity,
            state: ShipState::Idle,
            target_resource: None,
            dropoff_building: None,
            home_position: position,
            action_timer: Duration::ZERO,
            harvest_rate: stats.harvest_rate,
            preferred_resource: preferred,
            destination: None,
        }
    }

    /// Identifier assigned to the ship.
    #[must_use]
    pub const fn id(&self) -> ShipId {
        self.id
    }

    /// Type of the ship.
    #[must_use]
    pub const fn kind(&self) -> ShipType {
        self.kind
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Heading around the vertical axis, in radians.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Position the ship returns to when it has nothing to do.
    #[must_use]
    pub const fn home_position(&self) -> Vec3 {
        self.home_position
    }

    /// Current behaviour state.
    #[must_use]
    pub const fn state(&self) -> ShipState {
        self.state
    }

    /// Resource the ship is tasked with, if any.
    #[must_use]
    pub const fn target_resource(&self) -> Option<ResourceId> {
        self.target_resource
    }

    /// Building the ship is delivering to, if any.
    #[must_use]
    pub const fn dropoff_building(&self) -> Option<BuildingId> {
        self.dropoff_building
    }

    /// Resource type harvested when the ship is ordered to work.
    #[must_use]
    pub const fn preferred_resource(&self) -> ResourceType {
        self.preferred_resource
    }

    /// Reports whether the ship is travelling toward a destination.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.destination.is_some()
    }

    /// Units of `kind` in the hold.
    #[must_use]
    pub fn cargo_amount(&self, kind: ResourceType) -> u32 {
        self.cargo.get(kind)
    }

    /// Sum of all units in the hold.
    #[must_use]
    pub const fn cargo_total(&self) -> u32 {
        self.cargo_total
    }

    /// Maximum number of units the hold accepts.
    #[must_use]
    pub const fn cargo_capacity(&self) -> u32 {
        self.cargo_capacity
    }

    /// Captures an immutable view of the ship.
    #[must_use]
    pub fn snapshot(&self) -> ShipSnapshot {
        ShipSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            rotation: self.rotation,
            health: self.health.clamp(0.0, self.max_health),
            state: self.state,
            cargo: self.cargo.clone(),
            cargo_total: self.cargo_total,
            cargo_capacity: self.cargo_capacity,
            target_resource: self.target_resource,
            dropoff_building: self.dropoff_building,
            preferred_resource: self.preferred_resource,
        }
    }

    /// Reports whether `amount` more units fit into the hold.
    #[must_use]
    pub fn can_add_cargo(&self, amount: u32) -> bool {
        self.cargo_total
            .checked_add(amount)
            .is_some_and(|total| total <= self.cargo_capacity)
    }

    /// Loads cargo, refusing the whole amount if it does not fit.
    pub fn add_cargo(&mut self, kind: ResourceType, amount: u32) -> bool {
        if !self.can_add_cargo(amount) {
            return false;
        }
        self.cargo.add(kind, amount);
        self.cargo_total += amount;
        self.debug_check_cargo();
        true
    }

    /// Unloads up to `amount` units of `kind` and returns how many left the hold.
    pub fn remove_cargo(&mut self, kind: ResourceType, amount: u32) -> u32 {
        let removed = self.cargo.remove(kind, amount);
        self.cargo_total -= removed;
        self.debug_check_cargo();
        removed
    }

    /// Sets the preferred resource type and immediately looks for the nearest node.
    pub fn start_harvesting<S>(&mut self, kind: ResourceType, surroundings: &S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        self.preferred_resource = kind;
        self.dropoff_building = None;
        self.seek_resource(surroundings, out);
    }

    /// Sends the ship to an explicit position; it idles once it gets there.
    pub fn set_target_position(&mut self, position: Vec3, out: &mut Vec<Event>) {
        self.target_resource = None;
        self.dropoff_building = None;
        self.travel_to(position);
        self.transition(ShipState::ReturnToPosition, out);
    }

    /// Sends the ship back to its home position.
    pub fn return_home(&mut self, out: &mut Vec<Event>) {
        self.set_target_position(self.home_position, out);
    }

    /// Halts the ship where it is and drops its errand.
    pub fn stop_movement(&mut self, out: &mut Vec<Event>) {
        self.destination = None;
        self.target_resource = None;
        self.dropoff_building = None;
        self.transition(ShipState::Idle, out);
    }

    /// Advances movement and the behaviour state machine by `dt`.
    pub fn update<S>(&mut self, dt: Duration, surroundings: &mut S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        if self.advance_movement(dt.as_secs_f32()) {
            self.handle_arrival(surroundings, out);
        }

        match self.state {
            ShipState::Idle | ShipState::ReturnToPosition => {}
            ShipState::MovingToResource => self.update_moving_to_resource(surroundings, out),
            ShipState::Harvesting => self.update_harvesting(dt, surroundings, out),
            ShipState::MovingToDropoff => self.update_moving_to_dropoff(surroundings, out),
            ShipState::DroppingOff => self.update_dropping_off(dt, surroundings, out),
        }

        self.debug_check_cargo();
    }

    /// Steps toward the destination on the water plane, returning `true` on arrival.
    fn advance_movement(&mut self, dt: f32) -> bool {
        let Some(destination) = self.destination else {
            return false;
        };

        let offset = Vec2::new(
            destination.x - self.position.x,
            destination.z - self.position.z,
        );
        let distance = offset.length();
        if distance < ARRIVAL_DISTANCE {
            self.destination = None;
            return true;
        }

        let direction = offset / distance;
        let step = (self.speed * dt).clamp(0.0, distance);
        self.position.x += direction.x * step;
        self.position.z += direction.y * step;
        self.rotation = direction.x.atan2(direction.y);
        false
    }

    fn handle_arrival<S>(&mut self, surroundings: &S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        match self.state {
            ShipState::MovingToResource => {
                if self.live_resource(surroundings).is_some() {
                    self.action_timer = Duration::ZERO;
                    self.transition(ShipState::Harvesting, out);
                } else {
                    self.target_resource = None;
                    self.transition(ShipState::Idle, out);
                }
            }
            ShipState::MovingToDropoff => {
                if self.live_dropoff(surroundings).is_some() {
                    self.action_timer = Duration::ZERO;
                    self.transition(ShipState::DroppingOff, out);
                } else {
                    self.dropoff_building = None;
                    self.transition(ShipState::Idle, out);
                }
            }
            ShipState::ReturnToPosition => self.transition(ShipState::Idle, out),
            ShipState::Idle | ShipState::Harvesting | ShipState::DroppingOff => {}
        }
    }

    fn update_moving_to_resource<S>(&mut self, surroundings: &S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        if self.live_resource(surroundings).is_none() {
            self.seek_resource(surroundings, out);
        }
    }

    fn update_harvesting<S>(&mut self, dt: Duration, surroundings: &mut S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        let Some(resource) = self.live_resource(surroundings) else {
            match self.find_resource(surroundings) {
                Some(resource) => self.head_for_resource(resource, surroundings, out),
                None if self.cargo_total > 0 => self.seek_dropoff(surroundings, out),
                None => self.head_home(out),
            }
            return;
        };

        self.action_timer = self.action_timer.saturating_add(dt);
        if self.action_timer < HARVEST_INTERVAL {
            return;
        }
        self.action_timer -= HARVEST_INTERVAL;

        let amount = self.harvest_rate.max(0.0).floor() as u32;
        if !self.can_add_cargo(amount) {
            self.seek_dropoff(surroundings, out);
            return;
        }

        let harvested = surroundings.harvest(resource, amount);
        if harvested > 0 {
            let kind = self.preferred_resource;
            let loaded = self.add_cargo(kind, harvested);
            debug_assert!(loaded, "harvest exceeded the checked hold capacity");
            out.push(Event::ResourceHarvested {
                ship: self.id,
                resource,
                kind,
                amount: harvested,
            });
        }

        let threshold = self.cargo_capacity as f32 * DELIVERY_THRESHOLD;
        if self.cargo_total as f32 >= threshold || surroundings.is_resource_depleted(resource) {
            self.seek_dropoff(surroundings, out);
        }
    }

    fn update_moving_to_dropoff<S>(&mut self, surroundings: &S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        if self.live_dropoff(surroundings).is_none() {
            self.seek_dropoff(surroundings, out);
        }
    }

    fn update_dropping_off<S>(&mut self, dt: Duration, surroundings: &mut S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        let Some(building) = self.live_dropoff(surroundings) else {
            self.seek_dropoff(surroundings, out);
            return;
        };

        self.action_timer = self.action_timer.saturating_add(dt);
        if self.action_timer < DROPOFF_INTERVAL {
            return;
        }
        self.action_timer -= DROPOFF_INTERVAL;

        let mut transferred = false;
        let manifest: Vec<(ResourceType, u32)> = self.cargo.iter().collect();
        for (kind, amount) in manifest {
            if !surroundings.deposit(building, kind, amount) {
                continue;
            }
            let removed = self.remove_cargo(kind, amount);
            transferred = true;
            out.push(Event::CargoDelivered {
                ship: self.id,
                building,
                kind,
                amount: removed,
            });
        }

        if self.cargo_total == 0 || !transferred {
            self.dropoff_building = None;
            self.seek_resource(surroundings, out);
        }
    }

    /// Targets the nearest preferred resource, or heads home when there is none.
    fn seek_resource<S>(&mut self, surroundings: &S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        match self.find_resource(surroundings) {
            Some(resource) => self.head_for_resource(resource, surroundings, out),
            None => self.head_home(out),
        }
    }

    fn find_resource<S>(&self, surroundings: &S) -> Option<ResourceId>
    where
        S: Surroundings + ?Sized,
    {
        surroundings.nearest_resource(
            self.position,
            self.preferred_resource,
            RESOURCE_SEARCH_RADIUS,
        )
    }

    fn head_for_resource<S>(&mut self, resource: ResourceId, surroundings: &S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        let Some(position) = surroundings.resource_position(resource) else {
            self.head_home(out);
            return;
        };
        self.target_resource = Some(resource);
        self.travel_to(position);
        self.transition(ShipState::MovingToResource, out);
    }

    /// Targets the nearest dropoff, or heads home when there is none.
    fn seek_dropoff<S>(&mut self, surroundings: &S, out: &mut Vec<Event>)
    where
        S: Surroundings + ?Sized,
    {
        self.target_resource = None;
        let found = surroundings.nearest_dropoff(self.position).and_then(|building| {
            surroundings
                .building_position(building)
                .map(|position| (building, position))
        });

        match found {
            Some((building, position)) => {
                self.dropoff_building = Some(building);
                self.travel_to(position);
                self.transition(ShipState::MovingToDropoff, out);
            }
            None => {
                self.dropoff_building = None;
                self.head_home(out);
            }
        }
    }

    fn head_home(&mut self, out: &mut Vec<Event>) {
        self.target_resource = None;
        self.travel_to(self.home_position);
        self.transition(ShipState::ReturnToPosition, out);
    }

    fn travel_to(&mut self, position: Vec3) {
        self.destination = Some(position);
    }

    fn live_resource<S>(&self, surroundings: &S) -> Option<ResourceId>
    where
        S: Surroundings + ?Sized,
    {
        self.target_resource
            .filter(|resource| !surroundings.is_resource_depleted(*resource))
    }

    fn live_dropoff<S>(&self, surroundings: &S) -> Option<BuildingId>
    where
        S: Surroundings + ?Sized,
    {
        self.dropoff_building
            .filter(|building| surroundings.building_position(*building).is_some())
    }

    fn transition(&mut self, to: ShipState, out: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        debug!(ship = self.id.get(), ?from, ?to, "ship state changed");
        out.push(Event::ShipStateChanged {
            ship: self.id,
            from,
            to,
        });
    }

    fn debug_check_cargo(&self) {
        debug_assert_eq!(self.cargo_total, self.cargo.total());
        debug_assert!(self.cargo_total <= self.cargo_capacity);
    }
}
