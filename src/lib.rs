//! Priority-class delivery dispatching.
//!
//! Schedules delivery work items across three priority classes, ranking
//! each by a recomputed score that blends class urgency, elapsed wait
//! time, and a configurable fairness boost. Starvation is corrected by
//! per-tick re-prioritization and by one-shot queue merges; cancellations
//! are kept in an auditable LIFO log.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Delivery`, `DeliveryClass`
//! - **`queue`**: Heap-backed containers — `BinaryHeap`, `PriorityQueue`
//! - **`config`**: Injected tunables and the scoring formula
//! - **`scheduler`**: The dispatching core and history reporting
//! - **`simulation`**: Seedable tick-driven arrival simulation
//!
//! # Architecture
//!
//! The scheduler is a single-owner, synchronous value advancing through
//! discrete minutes supplied by the caller — it never reads a wall clock
//! and holds no global state, so sessions are hermetic and reproducible.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kleinrock (1964), "A Delay Dependent Queue Discipline"
//! - Cormen et al. (2009), "Introduction to Algorithms", Ch. 6

pub mod config;
pub mod models;
pub mod queue;
pub mod scheduler;
pub mod simulation;

pub use config::{ConfigError, DispatchConfig};
pub use models::{Delivery, DeliveryClass};
pub use queue::{BinaryHeap, HeapOrder, PriorityQueue, QueueError, Scored};
pub use scheduler::{
    DeliveryReport, DeliveryScheduler, DispatchError, ReportError, ReportOptions, ReportRow,
    ReportSort,
};
pub use simulation::{run_simulation, SimulationResult, TickSnapshot};
