use tidewater_core::{Inventory, ResourceType};

use crate::EconomyReport;

/// Share of harvested units that reached a dropoff, in basis points.
///
/// Returns `None` before anything was harvested.
#[must_use]
pub fn delivery_ratio_bps(report: &EconomyReport) -> Option<u32> {
    let harvested = u64::from(report.harvested.total());
    if harvested == 0 {
        return None;
    }
    let delivered = u64::from(report.delivered.total());
    let bps = delivered * 10_000 / harvested;
    Some(u32::try_from(bps).unwrap_or(u32::MAX))
}

/// Average number of units delivered per simulated minute.
#[must_use]
pub fn delivered_per_minute(report: &EconomyReport) -> f32 {
    let minutes = report.elapsed.as_secs_f32() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    report.delivered.total() as f32 / minutes
}

/// Type with the largest tally; ties keep the type declared first.
#[must_use]
pub fn leading_resource(inventory: &Inventory) -> Option<(ResourceType, u32)> {
    inventory
        .iter()
        .fold(None, |best: Option<(ResourceType, u32)>, (kind, amount)| {
            match best {
                Some((_, top)) if top >= amount => best,
                _ => Some((kind, amount)),
            }
        })
}
