#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure fleet-control system translating player input into world commands.

use tidewater_core::{
    BuildingId, BuildingType, Command, Event, PlayMode, ResourceType, ShipId, Vec3,
};

/// Number of ships reachable through the selection hotkeys.
pub const SELECTION_SLOTS: usize = 3;

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FleetInput {
    /// Player asked to flip between playing and paused on this frame.
    pub toggle_pause: bool,
    /// Zero-based hotkey slot pressed on this frame.
    pub select_ship: Option<usize>,
    /// Resource the selected ship should start harvesting.
    pub harvest: Option<ResourceType>,
    /// Selected ship should head back to its launch position.
    pub return_home: bool,
    /// Selected ship should halt where it is.
    pub stop: bool,
    /// Explicit destination for the selected ship.
    pub steer_to: Option<Vec3>,
    /// Player avatar moved to this position.
    pub move_player: Option<Vec3>,
    /// Player asked to interact with the nearest building.
    pub interact: bool,
    /// Building the player wants to construct and where.
    pub place: Option<(BuildingType, Vec3)>,
}

/// Fleet-control system that keeps track of the selected ship and play mode.
#[derive(Debug, Clone)]
pub struct FleetControl {
    play_mode: PlayMode,
    selected: Option<ShipId>,
}

impl Default for FleetControl {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetControl {
    /// Creates a new fleet-control system assuming the world is playing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            play_mode: PlayMode::Playing,
            selected: None,
        }
    }

    /// Play mode last reported by the world.
    #[must_use]
    pub const fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    /// Ship that receives orders, if any was selected and still exists.
    #[must_use]
    pub fn selected(&self, ships: &[ShipId]) -> Option<ShipId> {
        match self.selected {
            Some(ship) if ships.contains(&ship) => Some(ship),
            _ => ships.first().copied(),
        }
    }

    /// Consumes world events and adapter input to emit fleet commands.
    ///
    /// `ships` lists the fleet in launch order. The `nearest_building`
    /// closure should mirror `query::nearest_building_within` evaluated at
    /// the player's position with the interaction range.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: FleetInput,
        ships: &[ShipId],
        mut nearest_building: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut() -> Option<BuildingId>,
    {
        for event in events {
            if let Event::PlayModeChanged { mode } = event {
                self.play_mode = *mode;
            }
        }

        if input.toggle_pause {
            let mode = match self.play_mode {
                PlayMode::Playing => PlayMode::Paused,
                PlayMode::Paused => PlayMode::Playing,
            };
            out.push(Command::SetPlayMode { mode });
            return;
        }

        if self.play_mode == PlayMode::Paused {
            return;
        }

        if let Some(slot) = input.select_ship {
            if slot < SELECTION_SLOTS {
                if let Some(ship) = ships.get(slot) {
                    self.selected = Some(*ship);
                }
            }
        }

        if let Some(ship) = self.selected(ships) {
            if let Some(resource) = input.harvest {
                out.push(Command::StartHarvesting { ship, resource });
            }
            if let Some(position) = input.steer_to {
                out.push(Command::SetShipTarget { ship, position });
            }
            if input.return_home {
                out.push(Command::ReturnShipHome { ship });
            }
            if input.stop {
                out.push(Command::StopShip { ship });
            }
        }

        if let Some(position) = input.move_player {
            out.push(Command::MovePlayer { position });
        }

        if input.interact {
            if let Some(building) = nearest_building() {
                out.push(Command::Interact { building });
            }
        }

        if let Some((kind, position)) = input.place {
            out.push(Command::PlaceBuilding { kind, position });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_falls_back_to_first_ship() {
        let ships = [ShipId::new(4), ShipId::new(9)];
        let mut control = FleetControl::new();
        assert_eq!(control.selected(&ships), Some(ShipId::new(4)));
        assert_eq!(control.selected(&[]), None);

        control.selected = Some(ShipId::new(9));
        assert_eq!(control.selected(&ships), Some(ShipId::new(9)));
        assert_eq!(control.selected(&ships[..1]), Some(ShipId::new(4)));
    }
}
