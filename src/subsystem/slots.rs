use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::MatterSubsystem;
use crate::{
    core::{constraints::Constraint, mobilizers::MobilizedBody},
    error::{Result, TopologyError},
    state::State,
    utils::{
        allocator::{ConstraintId, MobilizedBodyId, SubsystemId},
        logging::ScopedTimer,
    },
};

/// Contiguous slice `offset..offset + count` of a state array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SlotRange {
    pub offset: usize,
    pub count: usize,
}

impl SlotRange {
    pub fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }

    pub fn end(&self) -> usize {
        self.offset + self.count
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Realized assignment of state slots, valid for one topology generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotMap {
    subsystem: SubsystemId,
    generation: u64,
    q: Vec<SlotRange>,
    u: Vec<SlotRange>,
    multipliers: Vec<SlotRange>,
    total_nq: usize,
    total_nu: usize,
    total_multipliers: usize,
}

/// Lays widths end to end, returning the ranges and their total.
fn pack(widths: impl IntoIterator<Item = usize>) -> (Vec<SlotRange>, usize) {
    let mut offset = 0;
    let ranges = widths
        .into_iter()
        .map(|count| {
            let range = SlotRange::new(offset, count);
            offset += count;
            range
        })
        .collect();
    (ranges, offset)
}

/// Checks that `ranges` lay `widths` end to end from offset 0 and sum to `total`.
fn check_packed(
    what: &str,
    ranges: &[SlotRange],
    widths: impl ExactSizeIterator<Item = usize>,
    total: usize,
) -> Result<()> {
    if ranges.len() != widths.len() {
        return Err(TopologyError::InvalidSlotMap(format!(
            "{} {what} ranges for {} entities",
            ranges.len(),
            widths.len()
        )));
    }
    let mut offset = 0;
    for (index, (range, width)) in ranges.iter().zip(widths).enumerate() {
        if range.count != width {
            return Err(TopologyError::WidthMismatch {
                requested: range.count,
                actual: width,
            });
        }
        if range.offset != offset {
            return Err(TopologyError::InvalidSlotMap(format!(
                "{what} range {index} starts at {}, expected {offset}",
                range.offset
            )));
        }
        offset += width;
    }
    if total != offset {
        return Err(TopologyError::InvalidSlotMap(format!(
            "{what} total is {total} but the ranges cover {offset}"
        )));
    }
    Ok(())
}

impl SlotMap {
    /// Packs per-body `(nq, nu)` widths and per-constraint multiplier widths
    /// contiguously, in iteration order.
    pub fn from_widths<B, C>(
        subsystem: SubsystemId,
        generation: u64,
        body_widths: B,
        constraint_widths: C,
    ) -> Self
    where
        B: IntoIterator<Item = (usize, usize)>,
        C: IntoIterator<Item = usize>,
    {
        let (nq, nu): (Vec<usize>, Vec<usize>) = body_widths.into_iter().unzip();
        let (q, total_nq) = pack(nq);
        let (u, total_nu) = pack(nu);
        let (multipliers, total_multipliers) = pack(constraint_widths);
        Self {
            subsystem,
            generation,
            q,
            u,
            multipliers,
            total_nq,
            total_nu,
            total_multipliers,
        }
    }

    fn realize<'a>(
        subsystem: SubsystemId,
        generation: u64,
        bodies: impl Iterator<Item = &'a MobilizedBody>,
        constraints: impl Iterator<Item = &'a Constraint>,
    ) -> Self {
        Self::from_widths(
            subsystem,
            generation,
            bodies.map(|body| (body.nq(), body.nu())),
            constraints.map(Constraint::removed_dofs),
        )
    }

    pub fn subsystem(&self) -> SubsystemId {
        self.subsystem
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn total_nq(&self) -> usize {
        self.total_nq
    }

    pub fn total_nu(&self) -> usize {
        self.total_nu
    }

    pub fn total_multipliers(&self) -> usize {
        self.total_multipliers
    }

    pub fn num_mobilized_bodies(&self) -> usize {
        self.q.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.multipliers.len()
    }

    /// `None` for ids of another subsystem or beyond the realized topology.
    pub fn q_range(&self, id: MobilizedBodyId) -> Option<SlotRange> {
        Self::lookup(&self.q, self.subsystem, id.subsystem(), id.index())
    }

    pub fn u_range(&self, id: MobilizedBodyId) -> Option<SlotRange> {
        Self::lookup(&self.u, self.subsystem, id.subsystem(), id.index())
    }

    pub fn multiplier_range(&self, id: ConstraintId) -> Option<SlotRange> {
        Self::lookup(&self.multipliers, self.subsystem, id.subsystem(), id.index())
    }

    fn lookup(
        ranges: &[SlotRange],
        owner: SubsystemId,
        subsystem: SubsystemId,
        index: usize,
    ) -> Option<SlotRange> {
        if subsystem != owner {
            return None;
        }
        ranges.get(index).copied()
    }
}

impl MatterSubsystem {
    /// Assigns contiguous q, u and multiplier slots in adoption order.
    ///
    /// Does nothing when the current map is still valid.
    pub fn realize_topology(&mut self) -> &SlotMap {
        if self.is_topology_stale() {
            self.slot_map = None;
        }
        let (id, generation) = (self.id, self.generation);
        let bodies = &self.bodies;
        let constraints = &self.constraints;
        self.slot_map.get_or_insert_with(|| {
            let _timer = ScopedTimer::new("realize_topology");
            let map = SlotMap::realize(id, generation, bodies.values(), constraints.values());
            debug!(
                "{id}: realized topology generation {generation}: nq = {}, nu = {}, multipliers = {}",
                map.total_nq(),
                map.total_nu(),
                map.total_multipliers()
            );
            map
        })
    }

    /// Accepts a slot map computed by an external realization pass.
    ///
    /// The map must be tagged with this subsystem and its current generation,
    /// every range must match the declared width of its entity, and the ranges
    /// must be laid end to end in adoption order.
    pub fn install_slot_map(&mut self, map: SlotMap) -> Result<()> {
        if map.subsystem() != self.id {
            return Err(TopologyError::ForeignState {
                expected: self.id,
                actual: map.subsystem(),
            });
        }
        if map.generation() != self.generation {
            return Err(TopologyError::StaleTopology {
                realized: Some(map.generation()),
                current: self.generation,
            });
        }
        check_packed("q", &map.q, self.bodies.values().map(MobilizedBody::nq), map.total_nq)?;
        check_packed("u", &map.u, self.bodies.values().map(MobilizedBody::nu), map.total_nu)?;
        check_packed(
            "multiplier",
            &map.multipliers,
            self.constraints.values().map(Constraint::removed_dofs),
            map.total_multipliers,
        )?;

        debug!("{}: installed external slot map for generation {}", self.id, self.generation);
        self.slot_map = Some(map);
        Ok(())
    }

    /// The slot map, provided it matches the current topology.
    pub fn slot_map(&self) -> Result<&SlotMap> {
        match &self.slot_map {
            Some(map) if map.generation() == self.generation => Ok(map),
            stale => Err(TopologyError::StaleTopology {
                realized: stale.as_ref().map(SlotMap::generation),
                current: self.generation,
            }),
        }
    }

    /// Fresh state sized from the realized topology, coordinates at their defaults.
    pub fn create_state(&self) -> Result<State> {
        let map = self.slot_map()?;
        let mut q = Vec::with_capacity(map.total_nq());
        for body in self.bodies.values() {
            q.extend_from_slice(body.default_q());
        }
        Ok(State::new(
            self.id,
            map.generation(),
            q,
            map.total_nu(),
            map.total_multipliers(),
        ))
    }

    /// Realizes if needed, then creates a default state.
    pub fn realize_and_create_state(&mut self) -> State {
        let map = self.realize_topology();
        let (id, generation, nu, n_multipliers) = (
            map.subsystem(),
            map.generation(),
            map.total_nu(),
            map.total_multipliers(),
        );
        let q = self
            .bodies
            .values()
            .flat_map(|body| body.default_q().iter().copied())
            .collect();
        State::new(id, generation, q, nu, n_multipliers)
    }
}
