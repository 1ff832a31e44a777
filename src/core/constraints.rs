use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::handle::MobilizedBodyHandle;
use super::types::Transform;
use crate::error::{Result, TopologyError};
use crate::utils::allocator::{ConstraintId, MobilizedBodyId, SubsystemId};

/// Built-in two-body constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Keeps two points a fixed distance apart.
    Rod {
        point1: Vec3,
        point2: Vec3,
        length: f32,
    },
    /// Keeps two points coincident.
    Ball { point1: Vec3, point2: Vec3 },
    /// Keeps two frames coincident.
    Weld { frame1: Transform, frame2: Transform },
}

impl ConstraintKind {
    /// Degrees of freedom removed from the mechanism.
    pub fn removed_dofs(&self) -> usize {
        match self {
            ConstraintKind::Rod { .. } => 1,
            ConstraintKind::Ball { .. } => 3,
            ConstraintKind::Weld { .. } => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConstraintKind::Rod { .. } => "Rod",
            ConstraintKind::Ball { .. } => "Ball",
            ConstraintKind::Weld { .. } => "Weld",
        }
    }
}

/// Borrowed view of a Rod constraint's attachment data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RodView {
    pub point1: Vec3,
    pub point2: Vec3,
    pub length: f32,
}

/// Borrowed view of a Ball constraint's attachment data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallView {
    pub point1: Vec3,
    pub point2: Vec3,
}

/// Borrowed view of a Weld constraint's attachment data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeldView {
    pub frame1: Transform,
    pub frame2: Transform,
}

fn check_rod_length(length: f32) -> Result<()> {
    // Written so NaN is rejected too.
    if length > 0.0 && length.is_finite() {
        Ok(())
    } else {
        Err(TopologyError::InvalidRodLength(length))
    }
}

/// A constraint between the bodies of two mobilized bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    kind: ConstraintKind,
    body1: MobilizedBodyId,
    body2: MobilizedBodyId,

    pub(crate) id: Option<ConstraintId>,
    pub(crate) owner: Option<SubsystemId>,
}

impl Constraint {
    fn new(kind: ConstraintKind, body1: MobilizedBodyId, body2: MobilizedBodyId) -> Self {
        Self {
            kind,
            body1,
            body2,
            id: None,
            owner: None,
        }
    }

    /// Builds a constraint between the entities two reference handles name.
    ///
    /// Both handles must refer to mobilized bodies of the same subsystem; the
    /// constraint can then only be adopted by that subsystem.
    pub fn between(
        kind: ConstraintKind,
        body1: &MobilizedBodyHandle,
        body2: &MobilizedBodyHandle,
    ) -> Result<Self> {
        let (subsystem1, id1) = body1.target()?;
        let (subsystem2, id2) = body2.target()?;
        if subsystem1 != subsystem2 || id1.subsystem() != id2.subsystem() {
            return Err(TopologyError::SubsystemMismatch {
                expected: id1.subsystem(),
                actual: id2.subsystem(),
            });
        }
        if let ConstraintKind::Rod { length, .. } = kind {
            check_rod_length(length)?;
        }
        Ok(Self::new(kind, id1, id2))
    }

    /// Rod attached at both body origins.
    pub fn rod(body1: MobilizedBodyId, body2: MobilizedBodyId, length: f32) -> Result<Self> {
        Self::rod_with_points(body1, Vec3::ZERO, body2, Vec3::ZERO, length)
    }

    pub fn rod_with_points(
        body1: MobilizedBodyId,
        point1: Vec3,
        body2: MobilizedBodyId,
        point2: Vec3,
        length: f32,
    ) -> Result<Self> {
        check_rod_length(length)?;
        Ok(Self::new(
            ConstraintKind::Rod {
                point1,
                point2,
                length,
            },
            body1,
            body2,
        ))
    }

    pub fn ball(body1: MobilizedBodyId, body2: MobilizedBodyId) -> Self {
        Self::ball_with_points(body1, Vec3::ZERO, body2, Vec3::ZERO)
    }

    pub fn ball_with_points(
        body1: MobilizedBodyId,
        point1: Vec3,
        body2: MobilizedBodyId,
        point2: Vec3,
    ) -> Self {
        Self::new(ConstraintKind::Ball { point1, point2 }, body1, body2)
    }

    pub fn weld(body1: MobilizedBodyId, body2: MobilizedBodyId) -> Self {
        Self::weld_with_frames(body1, Transform::IDENTITY, body2, Transform::IDENTITY)
    }

    pub fn weld_with_frames(
        body1: MobilizedBodyId,
        frame1: Transform,
        body2: MobilizedBodyId,
        frame2: Transform,
    ) -> Self {
        Self::new(ConstraintKind::Weld { frame1, frame2 }, body1, body2)
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn removed_dofs(&self) -> usize {
        self.kind.removed_dofs()
    }

    pub fn body1(&self) -> MobilizedBodyId {
        self.body1
    }

    pub fn body2(&self) -> MobilizedBodyId {
        self.body2
    }

    pub fn id(&self) -> Option<ConstraintId> {
        self.id
    }

    pub fn owner(&self) -> Option<SubsystemId> {
        self.owner
    }

    pub fn is_in_subsystem(&self) -> bool {
        self.owner.is_some()
    }

    /// Subsystem both constrained bodies belong to; `None` when they straddle two.
    pub fn bodies_subsystem(&self) -> Option<SubsystemId> {
        let subsystem = self.body1.subsystem();
        (self.body2.subsystem() == subsystem).then_some(subsystem)
    }

    pub fn as_rod(&self) -> Option<RodView> {
        match self.kind {
            ConstraintKind::Rod {
                point1,
                point2,
                length,
            } => Some(RodView {
                point1,
                point2,
                length,
            }),
            _ => None,
        }
    }

    pub fn as_ball(&self) -> Option<BallView> {
        match self.kind {
            ConstraintKind::Ball { point1, point2 } => Some(BallView { point1, point2 }),
            _ => None,
        }
    }

    pub fn as_weld(&self) -> Option<WeldView> {
        match self.kind {
            ConstraintKind::Weld { frame1, frame2 } => Some(WeldView { frame1, frame2 }),
            _ => None,
        }
    }

    fn wrong_kind(&self, expected: &'static str) -> TopologyError {
        TopologyError::WrongKind {
            expected,
            actual: self.kind.name(),
        }
    }

    /// Sets the attachment point on body 1 of a Rod or Ball constraint.
    pub fn set_default_point_on_body1(&mut self, point: Vec3) -> Result<&mut Self> {
        match &mut self.kind {
            ConstraintKind::Rod { point1, .. } | ConstraintKind::Ball { point1, .. } => {
                *point1 = point;
                Ok(self)
            }
            ConstraintKind::Weld { .. } => Err(self.wrong_kind("Rod or Ball")),
        }
    }

    /// Sets the attachment point on body 2 of a Rod or Ball constraint.
    pub fn set_default_point_on_body2(&mut self, point: Vec3) -> Result<&mut Self> {
        match &mut self.kind {
            ConstraintKind::Rod { point2, .. } | ConstraintKind::Ball { point2, .. } => {
                *point2 = point;
                Ok(self)
            }
            ConstraintKind::Weld { .. } => Err(self.wrong_kind("Rod or Ball")),
        }
    }

    pub fn set_default_rod_length(&mut self, new_length: f32) -> Result<&mut Self> {
        check_rod_length(new_length)?;
        match &mut self.kind {
            ConstraintKind::Rod { length, .. } => {
                *length = new_length;
                Ok(self)
            }
            _ => Err(self.wrong_kind("Rod")),
        }
    }

    pub fn set_default_frame_on_body1(&mut self, frame: Transform) -> Result<&mut Self> {
        match &mut self.kind {
            ConstraintKind::Weld { frame1, .. } => {
                *frame1 = frame;
                Ok(self)
            }
            _ => Err(self.wrong_kind("Weld")),
        }
    }

    pub fn set_default_frame_on_body2(&mut self, frame: Transform) -> Result<&mut Self> {
        match &mut self.kind {
            ConstraintKind::Weld { frame2, .. } => {
                *frame2 = frame;
                Ok(self)
            }
            _ => Err(self.wrong_kind("Weld")),
        }
    }

    /// Copy with identical attachment data but no subsystem attachment.
    pub fn detached_clone(&self) -> Self {
        Self {
            id: None,
            owner: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (MobilizedBodyId, MobilizedBodyId) {
        let sub = SubsystemId::next();
        (MobilizedBodyId::new(sub, 1), MobilizedBodyId::new(sub, 2))
    }

    #[test]
    fn rod_length_must_be_positive() {
        let (a, b) = pair();
        assert_eq!(
            Constraint::rod(a, b, 0.0),
            Err(TopologyError::InvalidRodLength(0.0))
        );
        assert!(Constraint::rod(a, b, -1.0).is_err());
        assert!(Constraint::rod(a, b, f32::NAN).is_err());
        assert!(Constraint::rod(a, b, 0.25).is_ok());
    }

    #[test]
    fn setters_reject_wrong_kind() {
        let (a, b) = pair();
        let mut weld = Constraint::weld(a, b);
        assert!(matches!(
            weld.set_default_point_on_body1(Vec3::X),
            Err(TopologyError::WrongKind { actual: "Weld", .. })
        ));

        let mut ball = Constraint::ball(a, b);
        assert!(ball.set_default_rod_length(1.0).is_err());
        ball.set_default_point_on_body2(Vec3::Y).unwrap();
        assert_eq!(ball.as_ball().unwrap().point2, Vec3::Y);
        assert!(ball.as_rod().is_none());
    }

    #[test]
    fn bodies_subsystem_requires_a_shared_subsystem() {
        let (a, b) = pair();
        let (c, _) = pair();
        assert_eq!(Constraint::ball(a, b).bodies_subsystem(), Some(a.subsystem()));
        assert_eq!(Constraint::ball(a, c).bodies_subsystem(), None);
    }
}
