//! Dispatching configuration.
//!
//! All tunables are carried in one explicitly constructed value injected
//! into the scheduler at creation — no process-wide state. The scoring
//! formula and the fairness boost live here so admission and
//! re-prioritization compute scores identically.
//!
//! # Scoring
//!
//! ```text
//! score = urgency_level(class) * urgency_weight
//!       + wait_min             * waiting_time_weight
//!       + base_score(class)    * service_type_weight
//! ```
//!
//! The weights are free coefficients; they are not required to sum to 1.
//! Items waiting beyond `max_wait_min` additionally receive
//! `(wait_min - max_wait_min) * boost_multiplier` during
//! re-prioritization, which grows without bound and guarantees eventual
//! service.
//!
//! # Reference
//! Kleinrock (1964), "A Delay Dependent Queue Discipline"

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DeliveryClass;

/// A configuration value that fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A weight, base score, or multiplier is NaN, infinite, or negative.
    #[error("`{0}` must be a finite, non-negative number")]
    InvalidCoefficient(&'static str),
    /// A duration or threshold is negative.
    #[error("`{0}` must be non-negative")]
    NegativeDuration(&'static str),
    /// The simulated arrival probability is outside 0.0..=1.0.
    #[error("`sim_arrival_probability` must be within 0.0..=1.0")]
    ArrivalProbabilityOutOfRange,
}

/// Scheduler and simulation tunables.
///
/// Defaults match the reference deployment: weights 0.5/0.3/0.2, base
/// scores urgent=10 fragile=8 standard=5, fairness threshold 25 min with
/// multiplier 0.5, and a 60-minute simulation at 0.5 arrivals/min on
/// 3 service counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Coefficient on the class urgency ordinal.
    pub urgency_weight: f64,
    /// Coefficient on elapsed wait minutes.
    pub waiting_time_weight: f64,
    /// Coefficient on the per-class base score.
    pub service_type_weight: f64,
    /// Base score for urgent deliveries.
    pub urgent_base_score: f64,
    /// Base score for fragile deliveries.
    pub fragile_base_score: f64,
    /// Base score for standard deliveries.
    pub standard_base_score: f64,
    /// Wait threshold (minutes) beyond which the fairness boost applies.
    pub max_wait_min: i64,
    /// Boost added per minute waited beyond the threshold.
    pub boost_multiplier: f64,
    /// Simulated session length in minutes.
    pub sim_duration_min: i64,
    /// Per-minute probability of a new arrival during simulation.
    pub sim_arrival_probability: f64,
    /// Deliveries serviceable per simulated minute.
    pub sim_service_counters: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            urgency_weight: 0.5,
            waiting_time_weight: 0.3,
            service_type_weight: 0.2,
            urgent_base_score: 10.0,
            fragile_base_score: 8.0,
            standard_base_score: 5.0,
            max_wait_min: 25,
            boost_multiplier: 0.5,
            sim_duration_min: 60,
            sim_arrival_probability: 0.5,
            sim_service_counters: 3,
        }
    }
}

impl DispatchConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the three scoring weights.
    pub fn with_weights(mut self, urgency: f64, waiting_time: f64, service_type: f64) -> Self {
        self.urgency_weight = urgency;
        self.waiting_time_weight = waiting_time;
        self.service_type_weight = service_type;
        self
    }

    /// Sets the base score for one class.
    pub fn with_base_score(mut self, class: DeliveryClass, score: f64) -> Self {
        match class {
            DeliveryClass::Urgent => self.urgent_base_score = score,
            DeliveryClass::Fragile => self.fragile_base_score = score,
            DeliveryClass::Standard => self.standard_base_score = score,
        }
        self
    }

    /// Sets the fairness boost threshold and multiplier.
    pub fn with_fairness(mut self, max_wait_min: i64, boost_multiplier: f64) -> Self {
        self.max_wait_min = max_wait_min;
        self.boost_multiplier = boost_multiplier;
        self
    }

    /// Sets the simulation parameters.
    pub fn with_simulation(
        mut self,
        duration_min: i64,
        arrival_probability: f64,
        service_counters: usize,
    ) -> Self {
        self.sim_duration_min = duration_min;
        self.sim_arrival_probability = arrival_probability;
        self.sim_service_counters = service_counters;
        self
    }

    /// Base score configured for the given class.
    pub fn base_score(&self, class: DeliveryClass) -> f64 {
        match class {
            DeliveryClass::Urgent => self.urgent_base_score,
            DeliveryClass::Fragile => self.fragile_base_score,
            DeliveryClass::Standard => self.standard_base_score,
        }
    }

    /// Priority score for a delivery of `class` that has waited
    /// `wait_min` minutes.
    pub fn priority_score(&self, class: DeliveryClass, wait_min: i64) -> f64 {
        f64::from(class.urgency_level()) * self.urgency_weight
            + wait_min as f64 * self.waiting_time_weight
            + self.base_score(class) * self.service_type_weight
    }

    /// Fairness boost for a delivery that has waited `wait_min` minutes.
    /// Zero at or below the threshold.
    pub fn fairness_boost(&self, wait_min: i64) -> f64 {
        if wait_min > self.max_wait_min {
            (wait_min - self.max_wait_min) as f64 * self.boost_multiplier
        } else {
            0.0
        }
    }

    /// Validates every tunable, failing loudly on the first offender.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let coefficients = [
            ("urgency_weight", self.urgency_weight),
            ("waiting_time_weight", self.waiting_time_weight),
            ("service_type_weight", self.service_type_weight),
            ("urgent_base_score", self.urgent_base_score),
            ("fragile_base_score", self.fragile_base_score),
            ("standard_base_score", self.standard_base_score),
            ("boost_multiplier", self.boost_multiplier),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCoefficient(name));
            }
        }
        if self.max_wait_min < 0 {
            return Err(ConfigError::NegativeDuration("max_wait_min"));
        }
        if self.sim_duration_min < 0 {
            return Err(ConfigError::NegativeDuration("sim_duration_min"));
        }
        if !(0.0..=1.0).contains(&self.sim_arrival_probability) {
            return Err(ConfigError::ArrivalProbabilityOutOfRange);
        }
        Ok(())
    }
}
