//! Tick-driven arrival simulation.
//!
//! Drives a scheduler through a session of discrete minutes. Each tick:
//!
//! 1. With probability `sim_arrival_probability`, admit one random
//!    delivery (uniform class, estimated duration 10–129 min).
//! 2. Service up to `sim_service_counters` deliveries.
//! 3. Re-score all queues (fairness boost included).
//! 4. Run the starvation merge.
//!
//! Randomness comes from a caller-supplied [`Rng`], so runs are seedable
//! and reproducible. Arrival IDs are sequential (`D0001`, `D0002`, …).

use rand::Rng;
use tracing::debug;

use crate::models::{Delivery, DeliveryClass};
use crate::scheduler::{DeliveryScheduler, DispatchError};

/// Queue depths and activity observed at the end of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSnapshot {
    /// Simulated minute this snapshot was taken.
    pub time_min: i64,
    /// ID of the delivery that arrived this tick, if any.
    pub arrived: Option<String>,
    /// Deliveries serviced this tick.
    pub processed: usize,
    /// Urgent queue depth after the merge pass.
    pub urgent_queued: usize,
    /// Standard queue depth after the merge pass.
    pub standard_queued: usize,
    /// Fragile queue depth after the merge pass.
    pub fragile_queued: usize,
}

/// Aggregate outcome of a simulation run.
#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    /// One snapshot per simulated minute.
    pub ticks: Vec<TickSnapshot>,
    /// Total deliveries that arrived.
    pub total_arrivals: usize,
    /// Total deliveries serviced.
    pub total_processed: usize,
}

/// Runs a full simulated session against the scheduler.
///
/// Duration, arrival probability, and counter count come from the
/// scheduler's configuration. The scheduler keeps all state afterward
/// (queues, history, log), so a report can be generated from the same
/// instance.
pub fn run_simulation<R: Rng>(
    scheduler: &mut DeliveryScheduler,
    rng: &mut R,
) -> Result<SimulationResult, DispatchError> {
    let duration = scheduler.config().sim_duration_min;
    let arrival_probability = scheduler.config().sim_arrival_probability;
    let counters = scheduler.config().sim_service_counters;

    let mut result = SimulationResult::default();
    let mut next_arrival: usize = 1;

    for now in 0..duration {
        let mut arrived = None;
        if rng.random::<f64>() < arrival_probability {
            let delivery = random_delivery(&mut next_arrival, now, rng);
            debug!("tick {now}: arrival {} ({})", delivery.id, delivery.class);
            arrived = Some(delivery.id.clone());
            scheduler.add_delivery(delivery, now)?;
            result.total_arrivals += 1;
        }

        let mut processed = 0;
        for _ in 0..counters {
            if !scheduler.has_deliveries() {
                break;
            }
            scheduler.process_next_delivery(now)?;
            processed += 1;
        }
        result.total_processed += processed;

        scheduler.update_priorities(now);
        scheduler.merge_queues();

        result.ticks.push(TickSnapshot {
            time_min: now,
            arrived,
            processed,
            urgent_queued: scheduler.queue_len(DeliveryClass::Urgent),
            standard_queued: scheduler.queue_len(DeliveryClass::Standard),
            fragile_queued: scheduler.queue_len(DeliveryClass::Fragile),
        });
    }

    Ok(result)
}

fn random_delivery<R: Rng>(seq: &mut usize, now_min: i64, rng: &mut R) -> Delivery {
    let class = match rng.random_range(0..3u8) {
        0 => DeliveryClass::Urgent,
        1 => DeliveryClass::Standard,
        _ => DeliveryClass::Fragile,
    };
    let id = format!("D{:04}", *seq);
    *seq += 1;
    Delivery::new(id, class, now_min)
        .with_destination("simulated")
        .with_estimated_duration(rng.random_range(10..=129))
}
