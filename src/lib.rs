//! Matter Topology – mobilizer and constraint catalogs for multibody dynamics.
//!
//! A [`MatterSubsystem`] owns a tree of [`MobilizedBody`] values rooted at
//! Ground plus a list of [`Constraint`]s that close loops across the tree.
//! Realizing the topology assigns every mobilizer a contiguous range of
//! generalized coordinates and speeds, and every constraint a range of
//! multipliers, inside a flat [`State`].
//!
//! ```
//! use matter_topology::{Body, Constraint, MatterSubsystem, MobilizerKind};
//!
//! let mut matter = MatterSubsystem::new();
//! let upper = matter
//!     .add_mobilized_body(matter.ground(), MobilizerKind::Pin, Body::default())
//!     .unwrap();
//! let lower = matter
//!     .add_mobilized_body(upper, MobilizerKind::Pin, Body::default())
//!     .unwrap();
//! matter.adopt_constraint(Constraint::weld(matter.ground(), lower)).unwrap();
//!
//! let mut state = matter.realize_and_create_state();
//! assert_eq!(state.q().len(), 2);
//! matter.set_one_q(lower, &mut state, 0.5).unwrap();
//! assert_eq!(state.q()[1], 0.5);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod state;
pub mod subsystem;
pub mod utils;

pub use glam::{Mat3, Quat, Vec3};

pub use core::{
    body::Body,
    constraints::{BallView, Constraint, ConstraintKind, RodView, WeldView},
    handle::{ConstraintHandle, Entity, Handle, MobilizedBodyHandle},
    mobilizers::{CustomMobility, FixedMobility, MobilizedBody, MobilizerKind},
    types::{InertiaTensorExt, MassProperties, Transform},
};
pub use error::{Result, TopologyError};
pub use state::State;
pub use subsystem::{MatterSubsystem, SlotMap, SlotRange};
pub use utils::allocator::{Arena, ArenaIndex, ConstraintId, MobilizedBodyId, SubsystemId};
