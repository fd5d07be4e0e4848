//! Player avatar, personal inventory, and building interactions.

use tidewater_core::{
    BuildingType, InteractionOutcome, Inventory, RejectionReason, ResourceType, Vec3,
};

use crate::buildings::{planar_distance, Building};

/// Maximum number of goods the player carries. Gold is not counted.
pub const PLAYER_CARGO_CAPACITY: u32 = 100;

/// Maximum horizontal distance between the player and a building they interact with.
pub const INTERACTION_RANGE: f32 = 50.0;

#[derive(Clone, Debug)]
pub(crate) struct Player {
    position: Vec3,
    inventory: Inventory,
}

impl Player {
    pub(crate) fn new(position: Vec3) -> Self {
        Self {
            position,
            inventory: Inventory::new(),
        }
    }

    pub(crate) const fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) fn move_to(&mut self, position: Vec3) {
        self.position = position;
    }

    pub(crate) const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[cfg(any(test, feature = "scaffolding"))]
    pub(crate) fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Goods currently carried, excluding gold.
    fn carried(&self) -> u32 {
        self.inventory.total() - self.inventory.get(ResourceType::Gold)
    }

    /// Exchanges goods with `building` according to its type.
    pub(crate) fn interact(
        &mut self,
        building: &mut Building,
    ) -> Result<InteractionOutcome, RejectionReason> {
        if planar_distance(self.position, building.position()) > INTERACTION_RANGE {
            return Err(RejectionReason::OutOfRange);
        }
        if !building.is_operational() {
            return Err(RejectionReason::BuildingUnavailable);
        }

        if building.kind() == BuildingType::Market {
            return self.sell_goods();
        }

        match building.recipe() {
            (Some(input), Some(_)) => {
                let amount = self.inventory.take_all(input);
                if amount == 0 {
                    return Err(RejectionReason::NothingToTrade);
                }
                let _ = building.add_resource(input, amount);
                Ok(InteractionOutcome::Supplied {
                    kind: input,
                    amount,
                })
            }
            (None, Some(output)) => {
                let room = PLAYER_CARGO_CAPACITY.saturating_sub(self.carried());
                let amount = building.resource_amount(output).min(room);
                if amount == 0 || !building.consume_resource(output, amount) {
                    return Err(RejectionReason::NothingToTrade);
                }
                self.inventory.add(output, amount);
                Ok(InteractionOutcome::Collected {
                    kind: output,
                    amount,
                })
            }
            _ => Err(RejectionReason::NothingToTrade),
        }
    }

    fn sell_goods(&mut self) -> Result<InteractionOutcome, RejectionReason> {
        let goods: Vec<(ResourceType, u32)> = self
            .inventory
            .iter()
            .filter(|(kind, _)| *kind != ResourceType::Gold)
            .collect();

        let mut units = 0_u32;
        let mut gold = 0_u32;
        for (kind, amount) in goods {
            let sold = self.inventory.take_all(kind);
            debug_assert_eq!(sold, amount);
            units = units.saturating_add(sold);
            gold = gold.saturating_add(sold.saturating_mul(kind.market_price()));
        }

        if units == 0 {
            return Err(RejectionReason::NothingToTrade);
        }
        self.inventory.add(ResourceType::Gold, gold);
        Ok(InteractionOutcome::Sold { units, gold })
    }
}
