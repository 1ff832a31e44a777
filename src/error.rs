//! Error types for topology construction and state access.
//!
//! Every variant is a precondition violation by the caller building a model;
//! none of them are transient, so nothing in this crate retries.

use thiserror::Error;

use crate::utils::allocator::{ConstraintId, MobilizedBodyId, SubsystemId};

/// Errors raised while building a subsystem or resolving state slots.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// The id does not name a mobilized body in this subsystem.
    #[error("mobilized body {0} is not part of this subsystem")]
    UnknownMobilizedBody(MobilizedBodyId),

    /// The id does not name a constraint in this subsystem.
    #[error("constraint {0} is not part of this subsystem")]
    UnknownConstraint(ConstraintId),

    /// Two entities that must share a subsystem do not.
    #[error("entities belong to different subsystems ({expected} vs {actual})")]
    SubsystemMismatch {
        expected: SubsystemId,
        actual: SubsystemId,
    },

    /// The entity has not been adopted into any subsystem yet.
    #[error("{0} has not been adopted into a subsystem")]
    NotAdopted(&'static str),

    /// The entity already carries an id from a subsystem.
    #[error("{0} has already been adopted into a subsystem")]
    AlreadyAdopted(&'static str),

    /// Only the subsystem itself may create the Ground mobilized body.
    #[error("a subsystem has exactly one Ground mobilized body")]
    SecondGround,

    /// Rod constraints need a strictly positive, finite length.
    #[error("rod length must be greater than zero, got {0}")]
    InvalidRodLength(f32),

    /// Mass must be finite and non-negative.
    #[error("invalid mass properties: {0}")]
    InvalidMassProperties(String),

    /// Owner handles cannot be redirected to another implementation.
    #[error("an owner handle cannot be reassigned as a reference")]
    OwnerReassignment,

    /// `disown` was called on a handle that does not own its implementation.
    #[error("only an owner handle can transfer ownership")]
    NotOwner,

    /// `disown` can only move an implementation into an empty handle.
    #[error("ownership can only be transferred to an empty handle")]
    DestinationNotEmpty,

    /// The operation needs an implementation but the handle is empty.
    #[error("handle is empty")]
    EmptyHandle,

    /// A kind-specific operation was applied to the wrong kind.
    #[error("expected a {expected} but found a {actual}")]
    WrongKind {
        expected: &'static str,
        actual: &'static str,
    },

    /// A fixed-width view does not match the entity's slot width.
    #[error("slot width mismatch: requested {requested}, entity has {actual}")]
    WidthMismatch { requested: usize, actual: usize },

    /// The topology changed since the slot map (or state) was realized.
    #[error("topology is stale: realized at generation {realized:?}, current generation {current}")]
    StaleTopology { realized: Option<u64>, current: u64 },

    /// An externally supplied slot map does not pack the current topology.
    #[error("invalid slot map: {0}")]
    InvalidSlotMap(String),

    /// The state or slot map was produced by a different subsystem.
    #[error("state belongs to subsystem {actual}, not {expected}")]
    ForeignState {
        expected: SubsystemId,
        actual: SubsystemId,
    },
}

/// Convenient Result alias for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;
