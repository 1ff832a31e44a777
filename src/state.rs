//! Numerical state produced from a realized topology.

use serde::{Deserialize, Serialize};

use crate::utils::allocator::SubsystemId;

/// Flat per-subsystem arrays that mobilizer and constraint slots index into.
///
/// A state is only meaningful for the subsystem and topology generation it was
/// created from; the subsystem's accessors refuse anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    subsystem: SubsystemId,
    generation: u64,
    /// Generalized coordinates.
    q: Vec<f32>,
    /// Generalized speeds.
    u: Vec<f32>,
    /// Applied mobility forces, one per generalized speed.
    mobility_forces: Vec<f32>,
    /// Constraint multipliers, one per removed degree of freedom.
    multipliers: Vec<f32>,
}

impl State {
    pub(crate) fn new(
        subsystem: SubsystemId,
        generation: u64,
        q: Vec<f32>,
        nu: usize,
        n_multipliers: usize,
    ) -> Self {
        Self {
            subsystem,
            generation,
            q,
            u: vec![0.0; nu],
            mobility_forces: vec![0.0; nu],
            multipliers: vec![0.0; n_multipliers],
        }
    }

    pub fn subsystem(&self) -> SubsystemId {
        self.subsystem
    }

    /// Topology generation this state was sized for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn q(&self) -> &[f32] {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut [f32] {
        &mut self.q
    }

    pub fn u(&self) -> &[f32] {
        &self.u
    }

    pub fn u_mut(&mut self) -> &mut [f32] {
        &mut self.u
    }

    pub fn mobility_forces(&self) -> &[f32] {
        &self.mobility_forces
    }

    pub fn mobility_forces_mut(&mut self) -> &mut [f32] {
        &mut self.mobility_forces
    }

    pub fn multipliers(&self) -> &[f32] {
        &self.multipliers
    }

    pub fn multipliers_mut(&mut self) -> &mut [f32] {
        &mut self.multipliers
    }

    /// Zeroes speeds, forces and multipliers, keeping coordinates.
    pub fn clear_velocities_and_forces(&mut self) {
        self.u.fill(0.0);
        self.mobility_forces.fill(0.0);
        self.multipliers.fill(0.0);
    }
}
