//! User-facing handles for mobilized bodies and constraints.
//!
//! A handle is in one of three states:
//!
//! * **empty**: refers to nothing;
//! * **owner**: holds a detached implementation object it is responsible for;
//! * **reference**: names an implementation that lives inside a
//!   [`MatterSubsystem`](crate::subsystem::MatterSubsystem) arena by
//!   `(subsystem, id)`. References never own or destroy anything.
//!
//! Adoption turns an owner into a reference: the implementation moves into the
//! subsystem and the handle keeps only its id.

use std::fmt;

use super::constraints::Constraint;
use super::mobilizers::MobilizedBody;
use crate::error::{Result, TopologyError};
use crate::utils::allocator::{ConstraintId, MobilizedBodyId, SubsystemId};

/// Topology entity that can sit behind a [`Handle`].
pub trait Entity: Clone {
    type Id: Copy + Eq + fmt::Debug;

    const NAME: &'static str;

    fn id(&self) -> Option<Self::Id>;
    fn owner(&self) -> Option<SubsystemId>;
}

impl Entity for MobilizedBody {
    type Id = MobilizedBodyId;

    const NAME: &'static str = "mobilized body";

    fn id(&self) -> Option<MobilizedBodyId> {
        self.id
    }

    fn owner(&self) -> Option<SubsystemId> {
        self.owner
    }
}

impl Entity for Constraint {
    type Id = ConstraintId;

    const NAME: &'static str = "constraint";

    fn id(&self) -> Option<ConstraintId> {
        self.id
    }

    fn owner(&self) -> Option<SubsystemId> {
        self.owner
    }
}

pub type MobilizedBodyHandle = Handle<MobilizedBody>;
pub type ConstraintHandle = Handle<Constraint>;

#[derive(Debug)]
pub enum Handle<T: Entity> {
    Empty,
    Owner(Box<T>),
    Reference { subsystem: SubsystemId, id: T::Id },
}

impl<T: Entity> Handle<T> {
    pub fn new(value: T) -> Self {
        Handle::Owner(Box::new(value))
    }

    pub fn empty() -> Self {
        Handle::Empty
    }

    /// Non-owning handle naming an entity that lives in `subsystem`.
    pub fn reference(subsystem: SubsystemId, id: T::Id) -> Self {
        Handle::Reference { subsystem, id }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Handle::Empty)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Handle::Owner(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Handle::Reference { .. })
    }

    /// The owned implementation, if this handle is its owner.
    pub fn get(&self) -> Option<&T> {
        match self {
            Handle::Owner(value) => Some(&**value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Handle::Owner(value) => Some(&mut **value),
            _ => None,
        }
    }

    /// `(subsystem, id)` of the entity a reference handle names.
    pub fn target(&self) -> Result<(SubsystemId, T::Id)> {
        match self {
            Handle::Reference { subsystem, id } => Ok((*subsystem, *id)),
            Handle::Owner(_) => Err(TopologyError::NotAdopted(T::NAME)),
            Handle::Empty => Err(TopologyError::EmptyHandle),
        }
    }

    /// Replaces this handle's contents with a copy of `src`.
    ///
    /// An owned implementation held here is dropped first. Copying an owner
    /// yields a new, independent owner; copying a reference yields another
    /// reference to the same entity.
    pub fn assign_copy(&mut self, src: &Self) {
        *self = src.clone();
    }

    /// Redirects an empty or reference handle to the entity `src` names.
    ///
    /// Only entities living in a subsystem can be aliased, so `src` must be a
    /// reference (or empty, which empties this handle).
    pub fn assign_reference(&mut self, src: &Self) -> Result<()> {
        if self.is_owner() {
            return Err(TopologyError::OwnerReassignment);
        }
        *self = match src {
            Handle::Reference { subsystem, id } => Handle::Reference {
                subsystem: *subsystem,
                id: *id,
            },
            Handle::Empty => Handle::Empty,
            Handle::Owner(_) => return Err(TopologyError::NotAdopted(T::NAME)),
        };
        Ok(())
    }

    /// Moves the owned implementation into the empty handle `new_owner`.
    ///
    /// No copy is made; this handle is left empty.
    pub fn disown(&mut self, new_owner: &mut Self) -> Result<()> {
        if !self.is_owner() {
            return Err(TopologyError::NotOwner);
        }
        if !new_owner.is_empty() {
            return Err(TopologyError::DestinationNotEmpty);
        }
        *new_owner = std::mem::take(self);
        Ok(())
    }

    /// Takes the owned implementation out, leaving the handle empty.
    pub(crate) fn take_owned(&mut self) -> Result<T> {
        match std::mem::take(self) {
            Handle::Owner(value) => Ok(*value),
            other => {
                let err = if other.is_empty() {
                    TopologyError::EmptyHandle
                } else {
                    TopologyError::AlreadyAdopted(T::NAME)
                };
                *self = other;
                Err(err)
            }
        }
    }

    pub fn into_inner(self) -> Option<T> {
        match self {
            Handle::Owner(value) => Some(*value),
            _ => None,
        }
    }
}

impl<T: Entity> Clone for Handle<T> {
    fn clone(&self) -> Self {
        match self {
            Handle::Empty => Handle::Empty,
            Handle::Owner(value) => Handle::Owner(Box::new(value.as_ref().clone())),
            Handle::Reference { subsystem, id } => Handle::Reference {
                subsystem: *subsystem,
                id: *id,
            },
        }
    }
}

impl<T: Entity> Default for Handle<T> {
    fn default() -> Self {
        Handle::Empty
    }
}

impl<T: Entity> From<T> for Handle<T> {
    fn from(value: T) -> Self {
        Handle::new(value)
    }
}
