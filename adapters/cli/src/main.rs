#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Tidewater economy headlessly.

mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tidewater_core::{Command, Event, ResourceType};
use tidewater_system_analytics::{Analytics, EconomyReport};
use tidewater_system_fleet_control::{FleetControl, FleetInput, SELECTION_SLOTS};
use tidewater_world::{self as world, query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use settings::{Overrides, RunPlan, Settings};

#[derive(Debug, Parser)]
#[command(name = "tidewater")]
#[command(about = "Runs the Tidewater harbour economy without a window")]
struct Args {
    /// TOML settings file; flags take precedence over its values
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Seed for world generation
    #[arg(long)]
    seed: Option<u64>,
    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,
    /// Simulated milliseconds per tick
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Print an interim report every N ticks (0 prints only the final report)
    #[arg(long)]
    report_every: Option<u64>,
    /// Harvest order for a ship hotkey, e.g. `2:fish`
    #[arg(long = "order", value_parser = parse_order)]
    orders: Vec<Order>,
}

/// Harvest order addressed to a hotkey slot.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Order {
    slot: usize,
    resource: ResourceType,
}

fn parse_order(value: &str) -> Result<Order, String> {
    let (slot, resource) = value
        .split_once(':')
        .ok_or_else(|| format!("expected SLOT:RESOURCE, got `{value}`"))?;
    let slot: usize = slot
        .trim()
        .parse()
        .map_err(|_| format!("invalid ship slot `{slot}`"))?;
    if !(1..=SELECTION_SLOTS).contains(&slot) {
        return Err(format!("ship slot must be between 1 and {SELECTION_SLOTS}"));
    }
    let resource = ResourceType::HARVESTABLE
        .into_iter()
        .find(|kind| format!("{kind:?}").eq_ignore_ascii_case(resource.trim()))
        .ok_or_else(|| format!("`{resource}` is not a harvestable resource"))?;
    Ok(Order {
        slot: slot - 1,
        resource,
    })
}

/// Entry point for the Tidewater command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let overrides = Overrides {
        seed: args.seed,
        ticks: args.ticks,
        tick_ms: args.tick_ms,
        report_every: args.report_every,
    };
    let plan = RunPlan::resolve(settings, overrides)?;

    let report = run(&plan, &args.orders, |report| println!("{report}\n"));
    println!("{report}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Simulates `plan`, handing interim reports to `publish` and returning the final one.
fn run<F>(plan: &RunPlan, orders: &[Order], mut publish: F) -> EconomyReport
where
    F: FnMut(&EconomyReport),
{
    let mut world = World::with_config(&plan.world);
    println!("{}", query::welcome_banner(&world));
    info!(
        seed = plan.world.seed,
        ticks = plan.ticks,
        tick_ms = plan.tick.as_millis() as u64,
        "starting headless run"
    );

    let mut fleet = FleetControl::new();
    let mut analytics = Analytics::with_cadence(plan.report_every);
    let mut events: Vec<Event> = Vec::new();
    let mut commands: Vec<Command> = Vec::new();
    let mut reports = Vec::new();

    let ships = query::ship_ids(&world);
    for order in orders {
        fleet.handle(
            &events,
            FleetInput {
                select_ship: Some(order.slot),
                harvest: Some(order.resource),
                ..FleetInput::default()
            },
            &ships,
            || None,
            &mut commands,
        );
    }
    for command in commands.drain(..) {
        world::apply(&mut world, command, &mut events);
    }

    for _ in 0..plan.ticks {
        world::apply(&mut world, Command::Tick { dt: plan.tick }, &mut events);
        analytics.handle(&events, &mut reports);
        events.clear();
        for report in reports.drain(..) {
            publish(&report);
        }
    }

    info!(
        tick = query::tick_index(&world),
        resources = query::resources(&world).len(),
        buildings = query::buildings(&world).len(),
        "headless run finished"
    );
    analytics.publish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tidewater_world::WorldConfig;

    #[test]
    fn orders_use_one_based_slots() {
        assert_eq!(
            parse_order("2:fish"),
            Ok(Order {
                slot: 1,
                resource: ResourceType::Fish
            })
        );
        assert_eq!(
            parse_order(" 1 : Crystal"),
            Ok(Order {
                slot: 0,
                resource: ResourceType::Crystal
            })
        );
    }

    #[test]
    fn malformed_orders_are_rejected() {
        assert!(parse_order("fish").is_err());
        assert!(parse_order("0:wood").is_err());
        assert!(parse_order("4:wood").is_err());
        assert!(parse_order("1:planks").is_err(), "planks are produced, not harvested");
    }

    #[test]
    fn run_publishes_on_cadence() {
        let plan = RunPlan {
            world: WorldConfig::default(),
            ticks: 30,
            tick: Duration::from_millis(500),
            report_every: 10,
        };
        let mut interim = Vec::new();

        let report = run(&plan, &[], |report| interim.push(report.clone()));

        assert_eq!(interim.len(), 3);
        assert_eq!(interim[0].ticks, 10);
        assert_eq!(report.ticks, 30);
        assert_eq!(report.elapsed, Duration::from_secs(15));
    }
}
