//! Delivery (work item) model.
//!
//! A delivery is one unit of schedulable work: an identity, a destination,
//! a priority class fixed at creation, a duration estimate, and the
//! timestamps the scheduler stamps as the item moves through its life
//! (`Created → Queued → (Requeued)* → InService → Completed`, or
//! `Queued → Cancelled`).
//!
//! # Time Representation
//! All times are whole minutes relative to a session epoch (t=0).
//! The consumer defines what t=0 means (e.g., shift start, midnight UTC).

use serde::{Deserialize, Serialize};

use crate::queue::Scored;

/// Priority class of a delivery.
///
/// Fixed at creation; determines queue membership, the urgency ordinal
/// used in scoring, and base service precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryClass {
    /// Time-critical delivery.
    Urgent,
    /// Regular delivery.
    Standard,
    /// Handle-with-care delivery.
    Fragile,
}

impl DeliveryClass {
    /// All classes, in queue drain order (urgent, standard, fragile).
    pub const ALL: [Self; 3] = [Self::Urgent, Self::Standard, Self::Fragile];

    /// Service precedence: the order queues are offered work from.
    pub const PRECEDENCE: [Self; 3] = [Self::Urgent, Self::Fragile, Self::Standard];

    /// Fixed urgency ordinal used by the scoring formula.
    pub fn urgency_level(self) -> i32 {
        match self {
            Self::Urgent => 5,
            Self::Fragile => 4,
            Self::Standard => 3,
        }
    }

    /// Lowercase label used in reports and filters.
    pub fn label(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Standard => "standard",
            Self::Fragile => "fragile",
        }
    }

    /// Parses a class from its lowercase label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "urgent" => Some(Self::Urgent),
            "standard" => Some(Self::Standard),
            "fragile" => Some(Self::Fragile),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A delivery work item.
///
/// Identity and class are immutable after creation. The scheduler owns the
/// score and the service timestamps: `priority_score` is recomputed on
/// admission and on every re-prioritization pass, and the two service
/// timestamps are written exactly once when the item is dequeued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    /// Unique delivery identifier (caller-supplied).
    pub id: String,
    /// Destination label. Carries no scheduling semantics.
    pub destination: String,
    /// Priority class, fixed at creation.
    pub class: DeliveryClass,
    /// Estimated service duration in minutes (non-negative).
    pub estimated_duration_min: i64,
    /// Minute the delivery entered the system; origin of wait computation.
    pub entry_time_min: i64,
    /// Minute service began. `None` until dequeued.
    pub service_start_min: Option<i64>,
    /// Minute service completed. `None` until dequeued.
    pub service_end_min: Option<i64>,
    /// Derived priority rank. Not meaningful before first scoring.
    pub priority_score: f64,
}

impl Delivery {
    /// Creates a new delivery entering the system at `entry_time_min`.
    pub fn new(id: impl Into<String>, class: DeliveryClass, entry_time_min: i64) -> Self {
        Self {
            id: id.into(),
            destination: String::new(),
            class,
            estimated_duration_min: 0,
            entry_time_min,
            service_start_min: None,
            service_end_min: None,
            priority_score: 0.0,
        }
    }

    /// Sets the destination label.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Sets the estimated service duration (minutes).
    pub fn with_estimated_duration(mut self, minutes: i64) -> Self {
        self.estimated_duration_min = minutes;
        self
    }

    /// Minutes waited since entry, as of `now_min`. Never negative.
    pub fn wait_minutes(&self, now_min: i64) -> i64 {
        (now_min - self.entry_time_min).max(0)
    }

    /// Minutes between entry and service start, once serviced.
    pub fn service_wait_minutes(&self) -> Option<i64> {
        self.service_start_min
            .map(|start| (start - self.entry_time_min).max(0))
    }

    /// Minutes spent in service, once serviced.
    pub fn service_minutes(&self) -> Option<i64> {
        match (self.service_start_min, self.service_end_min) {
            (Some(start), Some(end)) => Some((end - start).max(0)),
            _ => None,
        }
    }

    /// Whether service has started.
    pub fn is_serviced(&self) -> bool {
        self.service_start_min.is_some()
    }
}

impl Scored for Delivery {
    fn score(&self) -> f64 {
        self.priority_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_builder() {
        let delivery = Delivery::new("D1", DeliveryClass::Urgent, 10)
            .with_destination("depot-7")
            .with_estimated_duration(45);

        assert_eq!(delivery.id, "D1");
        assert_eq!(delivery.destination, "depot-7");
        assert_eq!(delivery.class, DeliveryClass::Urgent);
        assert_eq!(delivery.estimated_duration_min, 45);
        assert_eq!(delivery.entry_time_min, 10);
        assert!(!delivery.is_serviced());
        assert_eq!(delivery.priority_score, 0.0);
    }

    #[test]
    fn test_wait_minutes_never_negative() {
        let delivery = Delivery::new("D1", DeliveryClass::Standard, 100);
        assert_eq!(delivery.wait_minutes(130), 30);
        assert_eq!(delivery.wait_minutes(100), 0);
        // Clock before entry clamps to zero
        assert_eq!(delivery.wait_minutes(50), 0);
    }

    #[test]
    fn test_service_durations() {
        let mut delivery = Delivery::new("D1", DeliveryClass::Fragile, 0);
        assert_eq!(delivery.service_wait_minutes(), None);
        assert_eq!(delivery.service_minutes(), None);

        delivery.service_start_min = Some(20);
        delivery.service_end_min = Some(35);
        assert_eq!(delivery.service_wait_minutes(), Some(20));
        assert_eq!(delivery.service_minutes(), Some(15));
    }

    #[test]
    fn test_urgency_levels() {
        assert_eq!(DeliveryClass::Urgent.urgency_level(), 5);
        assert_eq!(DeliveryClass::Fragile.urgency_level(), 4);
        assert_eq!(DeliveryClass::Standard.urgency_level(), 3);
    }

    #[test]
    fn test_class_labels() {
        for class in DeliveryClass::ALL {
            assert_eq!(DeliveryClass::from_label(class.label()), Some(class));
        }
        assert_eq!(DeliveryClass::from_label("URGENT"), Some(DeliveryClass::Urgent));
        assert_eq!(DeliveryClass::from_label("overnight"), None);
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            DeliveryClass::PRECEDENCE,
            [
                DeliveryClass::Urgent,
                DeliveryClass::Fragile,
                DeliveryClass::Standard
            ]
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let delivery = Delivery::new("D9", DeliveryClass::Fragile, 5)
            .with_destination("pier-3")
            .with_estimated_duration(25);

        let json = serde_json::to_string(&delivery).unwrap();
        let back: Delivery = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "D9");
        assert_eq!(back.class, DeliveryClass::Fragile);
        assert_eq!(back.estimated_duration_min, 25);
    }
}
