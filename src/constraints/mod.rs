//! Deterministic corrections applied to every generated schedule.

pub mod manual_override;
pub mod rotate_by_queue;

pub use manual_override::ManualOverrideConstraint;
pub use rotate_by_queue::RotateByQueueConstraint;

use crate::schedule::Schedule;

/// Pure schedule correction. Implementations must keep the number and order
/// of assignments and only replace engineers.
pub trait Constraint: Send + Sync {
    fn name(&self) -> &'static str;

    fn constrain(&self, schedule: &Schedule) -> Schedule;
}
