use std::time::Duration;

use tidewater_core::{
    BuildingId, Event, InteractionOutcome, RejectionReason, ResourceId, ResourceType, ShipId,
};
use tidewater_system_analytics::{Analytics, EconomyReport};

fn tick(millis: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(millis),
    }
}

#[test]
fn periodic_report_waits_for_cadence() {
    let mut analytics = Analytics::with_cadence(3);
    let mut published = Vec::new();

    analytics.handle(&[tick(500), tick(500)], &mut published);
    assert!(published.is_empty(), "cadence not reached yet");
    assert!(analytics.last_report().is_none());

    analytics.handle(&[tick(500)], &mut published);

    assert_eq!(published.len(), 1, "report must be published on the third tick");
    assert_eq!(published[0].ticks, 3);
    assert_eq!(published[0].elapsed, Duration::from_millis(1_500));
    assert_eq!(analytics.last_report(), Some(&published[0]));
}

#[test]
fn several_ticks_in_one_batch_publish_once() {
    let mut analytics = Analytics::with_cadence(2);
    let mut published = Vec::new();

    analytics.handle(&[tick(10), tick(10), tick(10), tick(10), tick(10)], &mut published);
    assert_eq!(published.len(), 1);

    analytics.handle(&[tick(10)], &mut published);
    assert_eq!(published.len(), 2, "leftover tick carries into the next window");
    assert_eq!(published[1].ticks, 6);
}

#[test]
fn zero_cadence_never_publishes() {
    let mut analytics = Analytics::new();
    let mut published = Vec::new();

    analytics.handle(&vec![tick(16); 8], &mut published);

    assert!(published.is_empty());
    assert_eq!(analytics.report().ticks, 8);
    let report = analytics.publish();
    assert_eq!(analytics.last_report(), Some(&report));
}

#[test]
fn events_without_ticks_still_accumulate() {
    let mut analytics = Analytics::with_cadence(1);
    let mut published = Vec::new();

    analytics.handle(
        &[
            Event::ResourceHarvested {
                ship: ShipId::new(0),
                resource: ResourceId::new(2),
                kind: ResourceType::Crystal,
                amount: 3,
            },
            Event::ResourceDepleted {
                resource: ResourceId::new(2),
                kind: ResourceType::Crystal,
            },
            Event::ProductionCompleted {
                building: BuildingId::new(1),
                input: Some(ResourceType::Oil),
                output: ResourceType::Fuel,
            },
            Event::InteractionCompleted {
                building: BuildingId::new(4),
                outcome: InteractionOutcome::Sold { units: 3, gold: 12 },
            },
            Event::CommandRejected {
                reason: RejectionReason::SiteOccupied,
            },
        ],
        &mut published,
    );

    assert!(published.is_empty(), "publishing is driven by ticks");
    let report: &EconomyReport = analytics.report();
    assert_eq!(report.harvested.get(ResourceType::Crystal), 3);
    assert_eq!(report.produced.get(ResourceType::Fuel), 1);
    assert_eq!(report.depleted_nodes, 1);
    assert_eq!(report.gold_earned, 12);
    assert_eq!(report.rejected_commands, 1);
}
