//! Topology building blocks: bodies, mobilizers, constraints and their handles.

pub mod body;
pub mod constraints;
pub mod handle;
pub mod mobilizers;
pub mod types;

pub use body::Body;
pub use constraints::{Constraint, ConstraintKind};
pub use handle::{ConstraintHandle, Handle, MobilizedBodyHandle};
pub use mobilizers::{CustomMobility, MobilizedBody, MobilizerKind};
pub use types::{MassProperties, Transform};
