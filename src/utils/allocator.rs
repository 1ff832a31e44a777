use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::GROUND_INDEX;

static NEXT_SUBSYSTEM_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a matter subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SubsystemId(u32);

impl SubsystemId {
    /// Hands out a fresh id; ids are never reused within a process.
    pub fn next() -> Self {
        Self(NEXT_SUBSYSTEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subsystem-{}", self.0)
    }
}

/// Typed index into an [`Arena`], tagged with the subsystem that issued it.
pub trait ArenaIndex: Copy + Eq {
    fn from_parts(subsystem: SubsystemId, index: usize) -> Self;
    fn subsystem(&self) -> SubsystemId;
    fn index(&self) -> usize;
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
        pub struct $name {
            subsystem: SubsystemId,
            index: usize,
        }

        impl $name {
            pub fn new(subsystem: SubsystemId, index: usize) -> Self {
                Self { subsystem, index }
            }

            /// Subsystem that issued this id.
            pub fn subsystem(&self) -> SubsystemId {
                self.subsystem
            }

            pub fn index(&self) -> usize {
                self.index
            }
        }

        impl ArenaIndex for $name {
            fn from_parts(subsystem: SubsystemId, index: usize) -> Self {
                Self::new(subsystem, index)
            }

            fn subsystem(&self) -> SubsystemId {
                self.subsystem
            }

            fn index(&self) -> usize {
                self.index
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", self.subsystem, self.index)
            }
        }
    };
}

arena_id!(
    /// Identifier of a mobilized body. Ground is always index 0.
    MobilizedBodyId
);

arena_id!(
    /// Identifier of a constraint.
    ConstraintId
);

impl MobilizedBodyId {
    /// Ground of `subsystem`.
    pub fn ground(subsystem: SubsystemId) -> Self {
        Self::new(subsystem, GROUND_INDEX)
    }

    pub fn is_ground(&self) -> bool {
        self.index == GROUND_INDEX
    }
}

/// Append-only arena that hands out stable, never-reused ids.
///
/// Items are only ever pushed; an id handed out once names the same item for
/// the arena's whole lifetime. Ids issued for another subsystem never match.
#[derive(Debug, Clone)]
pub struct Arena<I, T> {
    owner: SubsystemId,
    items: Vec<T>,
    _marker: PhantomData<I>,
}

impl<I: ArenaIndex, T> Arena<I, T> {
    pub fn new(owner: SubsystemId) -> Self {
        Self {
            owner,
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn owner(&self) -> SubsystemId {
        self.owner
    }

    /// The id the next `insert` will return.
    pub fn next_id(&self) -> I {
        I::from_parts(self.owner, self.items.len())
    }

    pub fn insert(&mut self, item: T) -> I {
        let id = self.next_id();
        self.items.push(item);
        id
    }

    pub fn get(&self, id: I) -> Option<&T> {
        if id.subsystem() != self.owner {
            return None;
        }
        self.items.get(id.index())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        if id.subsystem() != self.owner {
            return None;
        }
        self.items.get_mut(id.index())
    }

    pub fn contains(&self, id: I) -> bool {
        id.subsystem() == self.owner && id.index() < self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(move |(index, item)| (I::from_parts(self.owner, index), item))
    }

    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        let owner = self.owner;
        (0..self.items.len()).map(move |index| I::from_parts(owner, index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
