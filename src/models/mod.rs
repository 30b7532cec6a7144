//! Delivery domain models.
//!
//! Provides the core data types for the dispatching problem: the
//! schedulable work item and its priority class. The scheduler owns
//! all state transitions; these types only carry data.

mod delivery;

pub use delivery::{Delivery, DeliveryClass};
