//! The matter subsystem: owner of the mobilized-body tree and constraint list.

pub mod access;
pub mod slots;

use log::{debug, trace, warn};

use crate::{
    core::{
        body::Body,
        constraints::{Constraint, ConstraintKind},
        handle::{ConstraintHandle, Handle, MobilizedBodyHandle},
        mobilizers::{MobilizedBody, MobilizerKind},
        types::Transform,
    },
    error::{Result, TopologyError},
    utils::allocator::{Arena, ConstraintId, MobilizedBodyId, SubsystemId},
};

pub use slots::{SlotMap, SlotRange};

/// Central container that owns every adopted mobilized body and constraint.
///
/// Mobilized bodies are stored in adoption order, which is also the order
/// their state slots are allocated in. Ground is created with the subsystem
/// and always has id 0.
#[derive(Debug)]
pub struct MatterSubsystem {
    id: SubsystemId,
    bodies: Arena<MobilizedBodyId, MobilizedBody>,
    constraints: Arena<ConstraintId, Constraint>,
    children: Vec<Vec<MobilizedBodyId>>,
    /// Bumped by every structural mutation.
    generation: u64,
    slot_map: Option<SlotMap>,
}

impl Default for MatterSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MatterSubsystem {
    pub fn new() -> Self {
        let id = SubsystemId::next();
        let mut bodies = Arena::new(id);
        let mut ground = MobilizedBody::ground();
        ground.id = Some(bodies.next_id());
        ground.owner = Some(id);
        bodies.insert(ground);

        debug!("created matter subsystem {id}");
        Self {
            id,
            bodies,
            constraints: Arena::new(id),
            children: vec![Vec::new()],
            generation: 0,
            slot_map: None,
        }
    }

    pub fn id(&self) -> SubsystemId {
        self.id
    }

    pub fn ground(&self) -> MobilizedBodyId {
        MobilizedBodyId::ground(self.id)
    }

    /// Current topology generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn invalidate_topology(&mut self, reason: &str) {
        self.generation += 1;
        trace!(
            "{}: topology invalidated by {reason}, generation {}",
            self.id,
            self.generation
        );
    }

    /// Whether the slot map is missing or older than the current topology.
    pub fn is_topology_stale(&self) -> bool {
        self.slot_map
            .as_ref()
            .map(|map| map.generation() != self.generation)
            .unwrap_or(true)
    }

    fn check_subsystem(&self, actual: SubsystemId) -> Result<()> {
        if actual == self.id {
            Ok(())
        } else {
            Err(TopologyError::SubsystemMismatch {
                expected: self.id,
                actual,
            })
        }
    }

    fn check_body(&self, id: MobilizedBodyId) -> Result<()> {
        self.check_subsystem(id.subsystem())?;
        if self.bodies.contains(id) {
            Ok(())
        } else {
            Err(TopologyError::UnknownMobilizedBody(id))
        }
    }

    fn check_constraint(&self, id: ConstraintId) -> Result<()> {
        self.check_subsystem(id.subsystem())?;
        if self.constraints.contains(id) {
            Ok(())
        } else {
            Err(TopologyError::UnknownConstraint(id))
        }
    }

    /// Links a detached mobilized body under `parent` and returns its new id.
    pub fn adopt_mobilized_body(
        &mut self,
        parent: MobilizedBodyId,
        mut body: MobilizedBody,
    ) -> Result<MobilizedBodyId> {
        self.check_body(parent)?;
        if body.owner.is_some() {
            return Err(TopologyError::AlreadyAdopted("mobilized body"));
        }
        if body.kind().is_ground() {
            return Err(TopologyError::SecondGround);
        }
        if let Some(attached) = body.body() {
            attached.validate()?;
        } else {
            warn!(
                "{}: adopting a {} mobilizer that carries no body",
                self.id,
                body.kind().name()
            );
        }

        let id = self.bodies.next_id();
        body.id = Some(id);
        body.parent = Some(parent);
        body.owner = Some(self.id);
        debug!(
            "{}: adopted {} mobilizer {id} under {parent} (nq = {}, nu = {})",
            self.id,
            body.kind().name(),
            body.nq(),
            body.nu()
        );

        self.bodies.insert(body);
        self.children.push(Vec::new());
        self.children[parent.index()].push(id);
        self.invalidate_topology("mobilized body adoption");
        Ok(id)
    }

    /// Attaches `body` to a new mobilizer of `kind` under `parent`, with identity frames.
    pub fn add_mobilized_body(
        &mut self,
        parent: MobilizedBodyId,
        kind: MobilizerKind,
        body: Body,
    ) -> Result<MobilizedBodyId> {
        self.adopt_mobilized_body(parent, MobilizedBody::new(kind).with_body(body))
    }

    /// Like [`add_mobilized_body`](Self::add_mobilized_body) with explicit mobilizer frames.
    pub fn add_mobilized_body_with_frames(
        &mut self,
        parent: MobilizedBodyId,
        inboard: Transform,
        kind: MobilizerKind,
        body: Body,
        outboard: Transform,
    ) -> Result<MobilizedBodyId> {
        self.adopt_mobilized_body(
            parent,
            MobilizedBody::new(kind)
                .with_body(body)
                .with_frames(inboard, outboard),
        )
    }

    /// Moves the implementation out of an owner handle into this subsystem.
    ///
    /// On success the handle becomes a reference to the new id; on failure it
    /// keeps ownership.
    pub fn adopt_handle(
        &mut self,
        parent: MobilizedBodyId,
        handle: &mut MobilizedBodyHandle,
    ) -> Result<MobilizedBodyId> {
        self.check_body(parent)?;
        let body = handle.take_owned()?;
        // Keep a copy around so a rejected body goes back to its owner.
        let fallback = body.clone();
        match self.adopt_mobilized_body(parent, body) {
            Ok(id) => {
                *handle = Handle::reference(self.id, id);
                Ok(id)
            }
            Err(err) => {
                *handle = Handle::new(fallback);
                Err(err)
            }
        }
    }

    /// Appends a constraint whose bodies already belong to this subsystem.
    pub fn adopt_constraint(&mut self, mut constraint: Constraint) -> Result<ConstraintId> {
        if constraint.owner.is_some() {
            return Err(TopologyError::AlreadyAdopted("constraint"));
        }
        self.check_body(constraint.body1())?;
        self.check_body(constraint.body2())?;

        let id = self.constraints.next_id();
        constraint.id = Some(id);
        constraint.owner = Some(self.id);
        debug!(
            "{}: adopted {} constraint {id} between {} and {} (removes {} dofs)",
            self.id,
            constraint.kind().name(),
            constraint.body1(),
            constraint.body2(),
            constraint.removed_dofs()
        );

        self.constraints.insert(constraint);
        self.invalidate_topology("constraint adoption");
        Ok(id)
    }

    pub fn adopt_constraint_handle(&mut self, handle: &mut ConstraintHandle) -> Result<ConstraintId> {
        let constraint = handle.take_owned()?;
        let fallback = constraint.clone();
        match self.adopt_constraint(constraint) {
            Ok(id) => {
                *handle = Handle::reference(self.id, id);
                Ok(id)
            }
            Err(err) => {
                *handle = Handle::new(fallback);
                Err(err)
            }
        }
    }

    /// Builds a constraint of `kind` between the bodies two handles name and adopts it.
    ///
    /// Both handles must refer to bodies of this subsystem.
    pub fn adopt_constraint_between(
        &mut self,
        kind: ConstraintKind,
        body1: &MobilizedBodyHandle,
        body2: &MobilizedBodyHandle,
    ) -> Result<ConstraintId> {
        self.adopt_constraint(Constraint::between(kind, body1, body2)?)
    }

    /// Reference handle to an adopted mobilized body.
    pub fn handle(&self, id: MobilizedBodyId) -> Result<MobilizedBodyHandle> {
        self.check_body(id)?;
        Ok(Handle::reference(self.id, id))
    }

    pub fn constraint_handle(&self, id: ConstraintId) -> Result<ConstraintHandle> {
        self.check_constraint(id)?;
        Ok(Handle::reference(self.id, id))
    }

    /// Id named by a reference handle, checked against this subsystem.
    pub fn resolve(&self, handle: &MobilizedBodyHandle) -> Result<MobilizedBodyId> {
        let (subsystem, id) = handle.target()?;
        self.check_subsystem(subsystem)?;
        self.check_body(id)?;
        Ok(id)
    }

    pub fn mobilized_body(&self, id: MobilizedBodyId) -> Result<&MobilizedBody> {
        self.bodies
            .get(id)
            .ok_or(TopologyError::UnknownMobilizedBody(id))
    }

    /// Mutable access to an adopted mobilized body; invalidates the topology.
    pub fn mobilized_body_mut(&mut self, id: MobilizedBodyId) -> Result<&mut MobilizedBody> {
        self.check_body(id)?;
        self.invalidate_topology("mobilized body update");
        self.bodies
            .get_mut(id)
            .ok_or(TopologyError::UnknownMobilizedBody(id))
    }

    pub fn set_default_inboard_frame(&mut self, id: MobilizedBodyId, frame: Transform) -> Result<()> {
        self.mobilized_body_mut(id)?.set_default_inboard_frame(frame);
        Ok(())
    }

    pub fn set_default_outboard_frame(&mut self, id: MobilizedBodyId, frame: Transform) -> Result<()> {
        self.mobilized_body_mut(id)?.set_default_outboard_frame(frame);
        Ok(())
    }

    pub fn set_body(&mut self, id: MobilizedBodyId, body: Body) -> Result<()> {
        self.check_body(id)?;
        if id.is_ground() {
            return Err(TopologyError::WrongKind {
                expected: "non-Ground mobilizer",
                actual: "Ground",
            });
        }
        body.validate()?;
        self.mobilized_body_mut(id)?.set_body(body);
        Ok(())
    }

    pub fn constraint(&self, id: ConstraintId) -> Result<&Constraint> {
        self.constraints
            .get(id)
            .ok_or(TopologyError::UnknownConstraint(id))
    }

    /// Mutable access to an adopted constraint; invalidates the topology.
    pub fn constraint_mut(&mut self, id: ConstraintId) -> Result<&mut Constraint> {
        self.check_constraint(id)?;
        self.invalidate_topology("constraint update");
        self.constraints
            .get_mut(id)
            .ok_or(TopologyError::UnknownConstraint(id))
    }

    /// Independent, unattached copy of an adopted mobilized body.
    pub fn detached_copy(&self, id: MobilizedBodyId) -> Result<MobilizedBody> {
        Ok(self.mobilized_body(id)?.detached_clone())
    }

    pub fn detached_constraint_copy(&self, id: ConstraintId) -> Result<Constraint> {
        Ok(self.constraint(id)?.detached_clone())
    }

    /// Mobilized bodies in adoption order, Ground first.
    pub fn mobilized_bodies(&self) -> impl Iterator<Item = (MobilizedBodyId, &MobilizedBody)> + '_ {
        self.bodies.iter()
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> + '_ {
        self.constraints.iter()
    }

    /// Number of mobilized bodies including Ground.
    pub fn num_mobilized_bodies(&self) -> usize {
        self.bodies.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn parent_of(&self, id: MobilizedBodyId) -> Result<Option<MobilizedBodyId>> {
        Ok(self.mobilized_body(id)?.parent())
    }

    pub fn children_of(&self, id: MobilizedBodyId) -> Result<&[MobilizedBodyId]> {
        self.check_body(id)?;
        Ok(&self.children[id.index()])
    }

    /// Ids from `id` up to and including Ground.
    pub fn path_to_ground(&self, id: MobilizedBodyId) -> Result<Vec<MobilizedBodyId>> {
        let mut path = vec![id];
        let mut current = self.parent_of(id)?;
        while let Some(parent) = current {
            path.push(parent);
            current = self.parent_of(parent)?;
        }
        Ok(path)
    }

    /// Number of mobilizers between `id` and Ground.
    pub fn depth(&self, id: MobilizedBodyId) -> Result<usize> {
        Ok(self.path_to_ground(id)?.len() - 1)
    }

    pub fn total_nq(&self) -> usize {
        self.bodies.values().map(MobilizedBody::nq).sum()
    }

    pub fn total_nu(&self) -> usize {
        self.bodies.values().map(MobilizedBody::nu).sum()
    }

    pub fn total_removed_dofs(&self) -> usize {
        self.constraints.values().map(Constraint::removed_dofs).sum()
    }

    /// Speeds minus constraint equations; negative when constraints are redundant.
    pub fn net_mobility(&self) -> isize {
        self.total_nu() as isize - self.total_removed_dofs() as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_subsystem_has_only_ground() {
        let sub = MatterSubsystem::new();
        assert_eq!(sub.num_mobilized_bodies(), 1);
        let ground = sub.mobilized_body(sub.ground()).unwrap();
        assert!(ground.kind().is_ground());
        assert_eq!(ground.parent(), None);
        assert_eq!(ground.id(), Some(MobilizedBodyId::ground(sub.id())));
        assert!(sub.is_topology_stale());
    }

    #[test]
    fn children_and_paths_follow_adoption() {
        let mut sub = MatterSubsystem::new();
        let a = sub
            .add_mobilized_body(sub.ground(), MobilizerKind::Pin, Body::default())
            .unwrap();
        let b = sub
            .add_mobilized_body(a, MobilizerKind::Slider, Body::default())
            .unwrap();
        let c = sub
            .add_mobilized_body(a, MobilizerKind::Ball, Body::default())
            .unwrap();

        assert_eq!(sub.children_of(a).unwrap(), &[b, c]);
        assert_eq!(sub.path_to_ground(c).unwrap(), vec![c, a, sub.ground()]);
        assert_eq!(sub.depth(b).unwrap(), 2);
        assert_eq!(sub.depth(sub.ground()).unwrap(), 0);
    }

    #[test]
    fn mutable_access_bumps_generation() {
        let mut sub = MatterSubsystem::new();
        let before = sub.generation();
        let a = sub
            .add_mobilized_body(sub.ground(), MobilizerKind::Pin, Body::default())
            .unwrap();
        assert_eq!(sub.generation(), before + 1);
        sub.mobilized_body_mut(a).unwrap();
        assert_eq!(sub.generation(), before + 2);
        assert!(sub.mobilized_body_mut(MobilizedBodyId::new(sub.id(), 9)).is_err());
        assert_eq!(sub.generation(), before + 2);
    }
}
