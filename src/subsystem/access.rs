//! Per-entity views into a [`State`].
//!
//! Every accessor resolves the entity's slot range against the realized slot
//! map and hands back a slice of the caller's state, so writes through the
//! `_mut` variants land directly in that state.

use glam::Vec3;

use super::{MatterSubsystem, SlotMap, SlotRange};
use crate::{
    error::{Result, TopologyError},
    state::State,
    utils::allocator::{ConstraintId, MobilizedBodyId},
};

fn slots<'s>(array: &'s [f32], range: SlotRange) -> Result<&'s [f32]> {
    let len = array.len();
    array.get(range.range()).ok_or_else(|| out_of_bounds(range, len))
}

fn slots_mut<'s>(array: &'s mut [f32], range: SlotRange) -> Result<&'s mut [f32]> {
    let len = array.len();
    array.get_mut(range.range()).ok_or_else(|| out_of_bounds(range, len))
}

fn out_of_bounds(range: SlotRange, len: usize) -> TopologyError {
    TopologyError::InvalidSlotMap(format!(
        "slots {}..{} exceed a state array of length {len}",
        range.offset,
        range.end()
    ))
}

fn fixed<const N: usize>(slice: &[f32]) -> Result<&[f32; N]> {
    slice.try_into().map_err(|_| TopologyError::WidthMismatch {
        requested: N,
        actual: slice.len(),
    })
}

fn fixed_mut<const N: usize>(slice: &mut [f32]) -> Result<&mut [f32; N]> {
    let actual = slice.len();
    slice
        .try_into()
        .map_err(|_| TopologyError::WidthMismatch { requested: N, actual })
}

impl MatterSubsystem {
    /// Slot map valid for both the current topology and `state`.
    fn checked_map(&self, state: &State) -> Result<&SlotMap> {
        let map = self.slot_map()?;
        if state.subsystem() != self.id {
            return Err(TopologyError::ForeignState {
                expected: self.id,
                actual: state.subsystem(),
            });
        }
        if state.generation() != map.generation() {
            return Err(TopologyError::StaleTopology {
                realized: Some(state.generation()),
                current: self.generation,
            });
        }
        Ok(map)
    }

    pub fn q_range(&self, id: MobilizedBodyId, state: &State) -> Result<SlotRange> {
        self.check_body(id)?;
        self.checked_map(state)?
            .q_range(id)
            .ok_or(TopologyError::UnknownMobilizedBody(id))
    }

    pub fn u_range(&self, id: MobilizedBodyId, state: &State) -> Result<SlotRange> {
        self.check_body(id)?;
        self.checked_map(state)?
            .u_range(id)
            .ok_or(TopologyError::UnknownMobilizedBody(id))
    }

    /// Mobility forces share the layout of the generalized speeds.
    pub fn force_range(&self, id: MobilizedBodyId, state: &State) -> Result<SlotRange> {
        self.u_range(id, state)
    }

    pub fn multiplier_range(&self, id: ConstraintId, state: &State) -> Result<SlotRange> {
        self.check_constraint(id)?;
        self.checked_map(state)?
            .multiplier_range(id)
            .ok_or(TopologyError::UnknownConstraint(id))
    }

    pub fn q<'s>(&self, id: MobilizedBodyId, state: &'s State) -> Result<&'s [f32]> {
        let range = self.q_range(id, state)?;
        slots(state.q(), range)
    }

    pub fn q_mut<'s>(&self, id: MobilizedBodyId, state: &'s mut State) -> Result<&'s mut [f32]> {
        let range = self.q_range(id, state)?;
        slots_mut(state.q_mut(), range)
    }

    pub fn u<'s>(&self, id: MobilizedBodyId, state: &'s State) -> Result<&'s [f32]> {
        let range = self.u_range(id, state)?;
        slots(state.u(), range)
    }

    pub fn u_mut<'s>(&self, id: MobilizedBodyId, state: &'s mut State) -> Result<&'s mut [f32]> {
        let range = self.u_range(id, state)?;
        slots_mut(state.u_mut(), range)
    }

    pub fn mobility_forces<'s>(&self, id: MobilizedBodyId, state: &'s State) -> Result<&'s [f32]> {
        let range = self.force_range(id, state)?;
        slots(state.mobility_forces(), range)
    }

    pub fn mobility_forces_mut<'s>(
        &self,
        id: MobilizedBodyId,
        state: &'s mut State,
    ) -> Result<&'s mut [f32]> {
        let range = self.force_range(id, state)?;
        slots_mut(state.mobility_forces_mut(), range)
    }

    pub fn multipliers<'s>(&self, id: ConstraintId, state: &'s State) -> Result<&'s [f32]> {
        let range = self.multiplier_range(id, state)?;
        slots(state.multipliers(), range)
    }

    pub fn multipliers_mut<'s>(
        &self,
        id: ConstraintId,
        state: &'s mut State,
    ) -> Result<&'s mut [f32]> {
        let range = self.multiplier_range(id, state)?;
        slots_mut(state.multipliers_mut(), range)
    }

    /// Coordinates of a mobilizer with exactly `N` of them.
    pub fn q_as<'s, const N: usize>(
        &self,
        id: MobilizedBodyId,
        state: &'s State,
    ) -> Result<&'s [f32; N]> {
        fixed(self.q(id, state)?)
    }

    pub fn q_as_mut<'s, const N: usize>(
        &self,
        id: MobilizedBodyId,
        state: &'s mut State,
    ) -> Result<&'s mut [f32; N]> {
        fixed_mut(self.q_mut(id, state)?)
    }

    pub fn u_as<'s, const N: usize>(
        &self,
        id: MobilizedBodyId,
        state: &'s State,
    ) -> Result<&'s [f32; N]> {
        fixed(self.u(id, state)?)
    }

    pub fn u_as_mut<'s, const N: usize>(
        &self,
        id: MobilizedBodyId,
        state: &'s mut State,
    ) -> Result<&'s mut [f32; N]> {
        fixed_mut(self.u_mut(id, state)?)
    }

    pub fn mobility_forces_as<'s, const N: usize>(
        &self,
        id: MobilizedBodyId,
        state: &'s State,
    ) -> Result<&'s [f32; N]> {
        fixed(self.mobility_forces(id, state)?)
    }

    pub fn mobility_forces_as_mut<'s, const N: usize>(
        &self,
        id: MobilizedBodyId,
        state: &'s mut State,
    ) -> Result<&'s mut [f32; N]> {
        fixed_mut(self.mobility_forces_mut(id, state)?)
    }

    // Scalar helpers for Pin, Slider and Screw.

    pub fn one_q(&self, id: MobilizedBodyId, state: &State) -> Result<f32> {
        Ok(self.q_as::<1>(id, state)?[0])
    }

    pub fn set_one_q(&self, id: MobilizedBodyId, state: &mut State, value: f32) -> Result<()> {
        self.q_as_mut::<1>(id, state)?[0] = value;
        Ok(())
    }

    pub fn one_u(&self, id: MobilizedBodyId, state: &State) -> Result<f32> {
        Ok(self.u_as::<1>(id, state)?[0])
    }

    pub fn set_one_u(&self, id: MobilizedBodyId, state: &mut State, value: f32) -> Result<()> {
        self.u_as_mut::<1>(id, state)?[0] = value;
        Ok(())
    }

    pub fn one_mobility_force(&self, id: MobilizedBodyId, state: &State) -> Result<f32> {
        Ok(self.mobility_forces_as::<1>(id, state)?[0])
    }

    pub fn set_one_mobility_force(
        &self,
        id: MobilizedBodyId,
        state: &mut State,
        value: f32,
    ) -> Result<()> {
        self.mobility_forces_as_mut::<1>(id, state)?[0] = value;
        Ok(())
    }

    // Vec3 helpers for the three-wide kinds.

    pub fn q_vec3(&self, id: MobilizedBodyId, state: &State) -> Result<Vec3> {
        Ok(Vec3::from_array(*self.q_as::<3>(id, state)?))
    }

    pub fn set_q_vec3(&self, id: MobilizedBodyId, state: &mut State, value: Vec3) -> Result<()> {
        *self.q_as_mut::<3>(id, state)? = value.to_array();
        Ok(())
    }

    pub fn u_vec3(&self, id: MobilizedBodyId, state: &State) -> Result<Vec3> {
        Ok(Vec3::from_array(*self.u_as::<3>(id, state)?))
    }

    pub fn set_u_vec3(&self, id: MobilizedBodyId, state: &mut State, value: Vec3) -> Result<()> {
        *self.u_as_mut::<3>(id, state)? = value.to_array();
        Ok(())
    }

    pub fn mobility_forces_vec3(&self, id: MobilizedBodyId, state: &State) -> Result<Vec3> {
        Ok(Vec3::from_array(*self.mobility_forces_as::<3>(id, state)?))
    }

    pub fn set_mobility_forces_vec3(
        &self,
        id: MobilizedBodyId,
        state: &mut State,
        value: Vec3,
    ) -> Result<()> {
        *self.mobility_forces_as_mut::<3>(id, state)? = value.to_array();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{body::Body, mobilizers::MobilizerKind};

    #[test]
    fn short_state_arrays_are_reported_not_indexed() {
        let mut matter = MatterSubsystem::new();
        let pin = matter
            .add_mobilized_body(matter.ground(), MobilizerKind::Pin, Body::default())
            .unwrap();
        let generation = matter.realize_topology().generation();
        let mut state = State::new(matter.id(), generation, Vec::new(), 0, 0);

        assert!(matches!(
            matter.set_one_q(pin, &mut state, 1.0),
            Err(TopologyError::InvalidSlotMap(_))
        ));
        assert!(matches!(
            matter.u(pin, &state),
            Err(TopologyError::InvalidSlotMap(_))
        ));
    }

    #[test]
    fn ids_of_another_subsystem_are_rejected() {
        let mut matter = MatterSubsystem::new();
        let mut other = MatterSubsystem::new();
        let foreign = other
            .add_mobilized_body(other.ground(), MobilizerKind::Pin, Body::default())
            .unwrap();
        matter
            .add_mobilized_body(matter.ground(), MobilizerKind::Pin, Body::default())
            .unwrap();
        let state = matter.realize_and_create_state();
        assert_eq!(
            matter.q(foreign, &state).unwrap_err(),
            TopologyError::SubsystemMismatch {
                expected: matter.id(),
                actual: other.id()
            }
        );
    }
}
