//! Utility helpers: id arenas and scoped logging.

pub mod allocator;
pub mod logging;

pub use allocator::{Arena, ConstraintId, MobilizedBodyId, SubsystemId};
