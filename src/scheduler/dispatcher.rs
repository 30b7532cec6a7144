//! Delivery scheduler.
//!
//! Owns one max-heap priority queue per delivery class plus the session's
//! processed history and cancellation log. Work is served by fixed class
//! precedence (urgent → fragile → standard); within a class, by priority
//! score. A periodic re-prioritization pass rebuilds every queue with
//! fresh scores and the fairness boost, and a merge pass redirects
//! lower-precedence work into an empty urgent queue so no class starves.
//!
//! All operations take the current time as an explicit `now_min` argument
//! (minutes from the session epoch); the scheduler never reads a clock.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, DispatchConfig};
use crate::models::{Delivery, DeliveryClass};
use crate::queue::{HeapOrder, PriorityQueue};

/// Errors from scheduler operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Every class queue is empty. Expected in normal operation; check
    /// [`DeliveryScheduler::has_deliveries`] first or treat as "nothing
    /// to do".
    #[error("no deliveries available to process")]
    NoWorkAvailable,
    /// A delivery with this ID was already admitted this session.
    #[error("duplicate delivery id: {0}")]
    DuplicateId(String),
    /// The injected configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The delivery scheduler.
///
/// Constructed once per session. Every admitted delivery lives in exactly
/// one place at any time: a class queue, the processed history, or the
/// cancellation log. History and log grow monotonically for the session's
/// lifetime.
///
/// The scheduler is a plain single-owner value; callers needing shared
/// access must serialize all mutating calls externally, because
/// re-prioritization and cancellation are multi-step drain-and-rebuild
/// sequences.
#[derive(Debug, Clone)]
pub struct DeliveryScheduler {
    config: DispatchConfig,
    queues: [PriorityQueue<Delivery>; 3],
    processed: Vec<Delivery>,
    cancelled: Vec<Delivery>,
    admitted: HashSet<String>,
}

fn queue_index(class: DeliveryClass) -> usize {
    match class {
        DeliveryClass::Urgent => 0,
        DeliveryClass::Standard => 1,
        DeliveryClass::Fragile => 2,
    }
}

impl DeliveryScheduler {
    /// Creates a scheduler with the given configuration.
    ///
    /// Fails if the configuration does not validate; a misconfigured
    /// weight is an error, never a silent zero.
    pub fn new(config: DispatchConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self {
            config,
            queues: std::array::from_fn(|_| PriorityQueue::new(HeapOrder::Max)),
            processed: Vec::new(),
            cancelled: Vec::new(),
            admitted: HashSet::new(),
        })
    }

    /// The injected configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Admits a delivery: scores it and enqueues it into its class queue.
    ///
    /// Identity is unique per session — an ID already admitted (even if
    /// since processed or cancelled) is rejected with
    /// [`DispatchError::DuplicateId`].
    pub fn add_delivery(
        &mut self,
        mut delivery: Delivery,
        now_min: i64,
    ) -> Result<(), DispatchError> {
        if self.admitted.contains(&delivery.id) {
            return Err(DispatchError::DuplicateId(delivery.id));
        }
        self.admitted.insert(delivery.id.clone());

        let wait = delivery.wait_minutes(now_min);
        delivery.priority_score = self.config.priority_score(delivery.class, wait);
        debug!(
            "admitted {} delivery {} (score {:.2})",
            delivery.class, delivery.id, delivery.priority_score
        );
        self.queue_mut(delivery.class).enqueue(delivery);
        Ok(())
    }

    /// Services the next delivery by class precedence.
    ///
    /// Dequeues from the first non-empty queue in urgent → fragile →
    /// standard order, stamps `service_start = now` and
    /// `service_end = now + estimated_duration`, appends the completed
    /// record to the history, and returns a copy of it.
    pub fn process_next_delivery(&mut self, now_min: i64) -> Result<Delivery, DispatchError> {
        for class in DeliveryClass::PRECEDENCE {
            if let Ok(mut delivery) = self.queue_mut(class).dequeue() {
                delivery.service_start_min = Some(now_min);
                delivery.service_end_min = Some(now_min + delivery.estimated_duration_min);
                debug!(
                    "processing {} delivery {} after {} min wait",
                    delivery.class,
                    delivery.id,
                    delivery.wait_minutes(now_min)
                );
                self.processed.push(delivery.clone());
                return Ok(delivery);
            }
        }
        Err(DispatchError::NoWorkAvailable)
    }

    /// Whether any class queue holds work.
    pub fn has_deliveries(&self) -> bool {
        self.queues.iter().any(|queue| !queue.is_empty())
    }

    /// Re-scores every queued delivery and rebuilds all three queues.
    ///
    /// Drains the queues (urgent, standard, fragile), recomputes each
    /// score with the shared formula plus the fairness boost, then
    /// re-enqueues each item into the queue matching its own class. A
    /// full O(n log n) rebuild, run once per time tick.
    pub fn update_priorities(&mut self, now_min: i64) {
        let mut drained = Vec::with_capacity(self.total_queued());
        for class in DeliveryClass::ALL {
            while let Ok(delivery) = self.queue_mut(class).dequeue() {
                drained.push(delivery);
            }
        }
        for mut delivery in drained {
            let wait = delivery.wait_minutes(now_min);
            delivery.priority_score =
                self.config.priority_score(delivery.class, wait) + self.config.fairness_boost(wait);
            self.queue_mut(delivery.class).enqueue(delivery);
        }
    }

    /// One-shot starvation mitigation.
    ///
    /// If the urgent queue is empty and the standard queue is not, every
    /// standard item moves to the urgent queue. Then, independently, the
    /// same check runs for the fragile queue against the *current* urgent
    /// state — so if the first redirect refilled urgent, the second does
    /// not fire. Later additions still route by original class.
    pub fn merge_queues(&mut self) {
        if self.queue_len(DeliveryClass::Urgent) == 0
            && self.queue_len(DeliveryClass::Standard) > 0
        {
            info!(
                "urgent queue empty; redirecting {} standard deliveries",
                self.queue_len(DeliveryClass::Standard)
            );
            self.redirect(DeliveryClass::Standard, DeliveryClass::Urgent);
        }
        if self.queue_len(DeliveryClass::Urgent) == 0 && self.queue_len(DeliveryClass::Fragile) > 0
        {
            info!(
                "urgent queue empty; redirecting {} fragile deliveries",
                self.queue_len(DeliveryClass::Fragile)
            );
            self.redirect(DeliveryClass::Fragile, DeliveryClass::Urgent);
        }
    }

    /// Cancels the queued delivery with the given ID.
    ///
    /// Scans the queues in urgent → standard → fragile order via
    /// drain-and-rebuild; at most one match is removed and pushed onto
    /// the cancellation log. The rebuild is unconditional — every
    /// unmatched item is restored even after the match is found. Returns
    /// whether a match was removed.
    pub fn cancel_delivery(&mut self, id: &str) -> bool {
        let mut found = false;
        for class in DeliveryClass::ALL {
            let mut kept = Vec::with_capacity(self.queue_len(class));
            while let Ok(delivery) = self.queue_mut(class).dequeue() {
                if !found && delivery.id == id {
                    info!("cancelled {} delivery {}", delivery.class, delivery.id);
                    self.cancelled.push(delivery);
                    found = true;
                } else {
                    kept.push(delivery);
                }
            }
            for delivery in kept {
                self.queue_mut(class).enqueue(delivery);
            }
        }
        found
    }

    /// Cancelled deliveries, most recent first.
    pub fn cancelled_deliveries(&self) -> impl Iterator<Item = &Delivery> {
        self.cancelled.iter().rev()
    }

    /// Processed deliveries in completion order.
    pub fn processed_deliveries(&self) -> &[Delivery] {
        &self.processed
    }

    /// Number of deliveries queued for the given class.
    pub fn queue_len(&self, class: DeliveryClass) -> usize {
        self.queues[queue_index(class)].len()
    }

    /// Total deliveries across all class queues.
    pub fn total_queued(&self) -> usize {
        self.queues.iter().map(PriorityQueue::len).sum()
    }

    /// Read-only view of one class queue (heap layout, not priority
    /// order). For inspection and reporting; scores are as of the last
    /// scoring pass.
    pub fn queued_deliveries(&self, class: DeliveryClass) -> &[Delivery] {
        self.queues[queue_index(class)].as_slice()
    }

    fn queue_mut(&mut self, class: DeliveryClass) -> &mut PriorityQueue<Delivery> {
        &mut self.queues[queue_index(class)]
    }

    fn redirect(&mut self, from: DeliveryClass, to: DeliveryClass) {
        while let Ok(delivery) = self.queue_mut(from).dequeue() {
            self.queue_mut(to).enqueue(delivery);
        }
    }
}
