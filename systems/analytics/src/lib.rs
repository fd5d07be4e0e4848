#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that folds world events into an economy report.

use std::{fmt, time::Duration};

use tidewater_core::{Event, InteractionOutcome, Inventory, ShipState};

mod metrics;

pub use metrics::{delivered_per_minute, delivery_ratio_bps, leading_resource};

/// Running totals describing the economy since the analytics system started.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EconomyReport {
    /// Number of ticks the world actually simulated.
    pub ticks: u64,
    /// Simulated time covered by those ticks.
    pub elapsed: Duration,
    /// Units extracted from resource nodes by ships.
    pub harvested: Inventory,
    /// Units unloaded by ships into dropoff buildings.
    pub delivered: Inventory,
    /// Units produced by buildings.
    pub produced: Inventory,
    /// Units grown back by regenerating nodes.
    pub regenerated: u64,
    /// Resource nodes removed after running dry.
    pub depleted_nodes: u32,
    /// Buildings placed by the player.
    pub buildings_placed: u32,
    /// Buildings that finished construction.
    pub constructions_completed: u32,
    /// Completed harvest and delivery round trips.
    pub round_trips: u32,
    /// Gold earned by selling goods at markets.
    pub gold_earned: u32,
    /// Commands the world refused.
    pub rejected_commands: u32,
}

impl EconomyReport {
    fn record(&mut self, event: &Event) {
        match event {
            Event::TimeAdvanced { dt } => {
                self.ticks += 1;
                self.elapsed = self.elapsed.saturating_add(*dt);
            }
            Event::ResourceHarvested { kind, amount, .. } => self.harvested.add(*kind, *amount),
            Event::CargoDelivered { kind, amount, .. } => self.delivered.add(*kind, *amount),
            Event::ProductionCompleted { output, .. } => self.produced.add(*output, 1),
            Event::ResourceRegenerated { amount, .. } => {
                self.regenerated = self.regenerated.saturating_add(u64::from(*amount));
            }
            Event::ResourceDepleted { .. } => self.depleted_nodes += 1,
            Event::BuildingPlaced { .. } => self.buildings_placed += 1,
            Event::ConstructionCompleted { .. } => self.constructions_completed += 1,
            Event::ShipStateChanged {
                from: ShipState::DroppingOff,
                ..
            } => self.round_trips += 1,
            Event::InteractionCompleted {
                outcome: InteractionOutcome::Sold { gold, .. },
                ..
            } => self.gold_earned = self.gold_earned.saturating_add(*gold),
            Event::CommandRejected { .. } => self.rejected_commands += 1,
            _ => {}
        }
    }
}

impl fmt::Display for EconomyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "after {} ticks ({:.1}s simulated)",
            self.ticks,
            self.elapsed.as_secs_f32()
        )?;
        writeln!(f, "  harvested: {}", Tally(&self.harvested))?;
        writeln!(f, "  delivered: {}", Tally(&self.delivered))?;
        writeln!(f, "  produced:  {}", Tally(&self.produced))?;
        match delivery_ratio_bps(self) {
            Some(bps) => writeln!(
                f,
                "  delivery ratio: {}.{:02}% ({:.1} units/min)",
                bps / 100,
                bps % 100,
                delivered_per_minute(self)
            )?,
            None => writeln!(f, "  delivery ratio: n/a")?,
        }
        if let Some((kind, amount)) = leading_resource(&self.harvested) {
            writeln!(f, "  leading resource: {kind:?} ({amount})")?;
        }
        write!(
            f,
            "  round trips: {}, nodes depleted: {}, regrown units: {}, gold earned: {}, rejected: {}",
            self.round_trips,
            self.depleted_nodes,
            self.regenerated,
            self.gold_earned,
            self.rejected_commands
        )
    }
}

struct Tally<'a>(&'a Inventory);

impl fmt::Display for Tally<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("-");
        }
        for (index, (kind, amount)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind:?} {amount}")?;
        }
        Ok(())
    }
}

/// Pure analytics system that accumulates events and publishes periodic reports.
#[derive(Debug, Default)]
pub struct Analytics {
    report: EconomyReport,
    last_report: Option<EconomyReport>,
    publish_every: u64,
    ticks_since_publish: u64,
}

impl Analytics {
    /// Creates an analytics system that only publishes on request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an analytics system publishing a report every `ticks` simulated ticks.
    ///
    /// A cadence of zero disables periodic publishing.
    #[must_use]
    pub fn with_cadence(ticks: u64) -> Self {
        Self {
            publish_every: ticks,
            ..Self::default()
        }
    }

    /// Totals accumulated so far, including events not yet published.
    #[must_use]
    pub fn report(&self) -> &EconomyReport {
        &self.report
    }

    /// Returns the last report published by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&EconomyReport> {
        self.last_report.as_ref()
    }

    /// Consumes world events and publishes a report whenever the cadence elapses.
    ///
    /// At most one report is published per call even if the events cover
    /// several ticks.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<EconomyReport>) {
        let mut ticks_observed = 0;
        for event in events {
            if matches!(event, Event::TimeAdvanced { .. }) {
                ticks_observed += 1;
            }
            self.report.record(event);
        }

        if self.publish_every == 0 || ticks_observed == 0 {
            return;
        }

        self.ticks_since_publish += ticks_observed;
        if self.ticks_since_publish < self.publish_every {
            return;
        }
        self.ticks_since_publish %= self.publish_every;
        out.push(self.publish());
    }

    /// Publishes the current totals immediately.
    pub fn publish(&mut self) -> EconomyReport {
        let report = self.report.clone();
        self.last_report = Some(report.clone());
        report
    }
}
