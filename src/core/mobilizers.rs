//! Mobilizer (joint) catalog.
//!
//! A [`MobilizedBody`] couples a [`Body`] to its parent through a mobilizer
//! whose [`MobilizerKind`] fixes how many generalized coordinates (`nq`) and
//! generalized speeds (`nu`) it contributes to the state.

use glam::Vec3;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::body::Body;
use super::types::Transform;
use crate::config::{DEFAULT_COORDINATE, DEFAULT_SCREW_PITCH};
use crate::error::{Result, TopologyError};
use crate::utils::allocator::{MobilizedBodyId, SubsystemId};

/// Capability set for a user-defined motion law.
///
/// Only the widths are consumed here; the kinematics belong to whichever
/// dynamics layer knows how to evaluate the law.
pub trait CustomMobility: fmt::Debug + Send + Sync {
    /// Number of generalized coordinates.
    fn nq(&self) -> usize;

    /// Number of generalized speeds.
    fn nu(&self) -> usize;

    fn name(&self) -> &str {
        "custom"
    }

    /// Coordinates a new state starts from; must have length `nq`.
    fn default_q(&self) -> Vec<f32> {
        vec![DEFAULT_COORDINATE; self.nq()]
    }
}

/// Custom mobility that only declares its widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedMobility {
    pub nq: usize,
    pub nu: usize,
}

impl FixedMobility {
    pub fn new(nq: usize, nu: usize) -> Self {
        Self { nq, nu }
    }
}

impl CustomMobility for FixedMobility {
    fn nq(&self) -> usize {
        self.nq
    }

    fn nu(&self) -> usize {
        self.nu
    }
}

/// Type of mobilizer connecting a body to its parent in reduced coordinates.
#[derive(Debug, Clone)]
pub enum MobilizerKind {
    /// 0-DOF root of every tree.
    Ground,
    /// 1-DOF rotation about a single axis.
    Pin,
    /// 1-DOF translation along a single axis.
    Slider,
    /// 2 rotations about perpendicular axes.
    Universal,
    /// Rotation plus translation along the same axis.
    Cylinder,
    /// Rotation plus translation along a different axis.
    BendStretch,
    /// 2 translations plus the rotation normal to their plane.
    Planar,
    /// 3 body-fixed rotation angles.
    Gimbal,
    /// Orientation-only spherical joint.
    Ball,
    /// Free translation, no rotation.
    Translation,
    /// Full 6-DOF motion.
    Free,
    /// Orientation of a direction, no spin about it.
    LineOrientation,
    /// Free motion of a line-symmetric body.
    FreeLine,
    /// Rigid attachment with no relative motion.
    Weld,
    /// One coordinate driving rotation and translation coupled by `pitch`.
    Screw { pitch: f32 },
    /// Externally defined motion law.
    Custom(Arc<dyn CustomMobility>),
}

impl MobilizerKind {
    pub fn custom<M>(mobility: M) -> Self
    where
        M: CustomMobility + 'static,
    {
        MobilizerKind::Custom(Arc::new(mobility))
    }

    pub fn screw(pitch: f32) -> Self {
        MobilizerKind::Screw { pitch }
    }

    /// Screw with [`DEFAULT_SCREW_PITCH`].
    pub fn default_screw() -> Self {
        MobilizerKind::Screw {
            pitch: DEFAULT_SCREW_PITCH,
        }
    }

    /// Number of generalized coordinates contributed to `q`.
    pub fn nq(&self) -> usize {
        match self {
            MobilizerKind::Ground | MobilizerKind::Weld => 0,
            MobilizerKind::Pin | MobilizerKind::Slider | MobilizerKind::Screw { .. } => 1,
            MobilizerKind::Universal
            | MobilizerKind::Cylinder
            | MobilizerKind::BendStretch
            | MobilizerKind::LineOrientation => 2,
            MobilizerKind::Planar
            | MobilizerKind::Gimbal
            | MobilizerKind::Ball
            | MobilizerKind::Translation => 3,
            MobilizerKind::FreeLine => 5,
            MobilizerKind::Free => 6,
            MobilizerKind::Custom(mobility) => mobility.nq(),
        }
    }

    /// Number of generalized speeds contributed to `u`.
    pub fn nu(&self) -> usize {
        match self {
            MobilizerKind::Custom(mobility) => mobility.nu(),
            // Every built-in kind uses matched coordinate and speed counts.
            builtin => builtin.nq(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MobilizerKind::Ground => "Ground",
            MobilizerKind::Pin => "Pin",
            MobilizerKind::Slider => "Slider",
            MobilizerKind::Universal => "Universal",
            MobilizerKind::Cylinder => "Cylinder",
            MobilizerKind::BendStretch => "BendStretch",
            MobilizerKind::Planar => "Planar",
            MobilizerKind::Gimbal => "Gimbal",
            MobilizerKind::Ball => "Ball",
            MobilizerKind::Translation => "Translation",
            MobilizerKind::Free => "Free",
            MobilizerKind::LineOrientation => "LineOrientation",
            MobilizerKind::FreeLine => "FreeLine",
            MobilizerKind::Weld => "Weld",
            MobilizerKind::Screw { .. } => "Screw",
            MobilizerKind::Custom(_) => "Custom",
        }
    }

    pub fn default_q(&self) -> Vec<f32> {
        match self {
            MobilizerKind::Custom(mobility) => mobility.default_q(),
            builtin => vec![DEFAULT_COORDINATE; builtin.nq()],
        }
    }

    pub fn is_ground(&self) -> bool {
        matches!(self, MobilizerKind::Ground)
    }

    pub fn pitch(&self) -> Option<f32> {
        match self {
            MobilizerKind::Screw { pitch } => Some(*pitch),
            _ => None,
        }
    }
}

/// A body together with the mobilizer that connects it to its parent.
#[derive(Debug, Clone)]
pub struct MobilizedBody {
    kind: MobilizerKind,
    body: Option<Body>,
    /// Mobilizer frame fixed on the parent body.
    inboard_frame: Transform,
    /// Mobilizer frame fixed on this body.
    outboard_frame: Transform,
    default_q: Vec<f32>,

    pub(crate) id: Option<MobilizedBodyId>,
    pub(crate) parent: Option<MobilizedBodyId>,
    pub(crate) owner: Option<SubsystemId>,
}

impl MobilizedBody {
    /// Detached mobilized body with identity frames and no body attached.
    pub fn new(kind: MobilizerKind) -> Self {
        let mut default_q = kind.default_q();
        if let MobilizerKind::Custom(mobility) = &kind {
            if default_q.len() != mobility.nq() {
                warn!(
                    "custom mobility '{}' declared {} default coordinates for nq = {}",
                    mobility.name(),
                    default_q.len(),
                    mobility.nq()
                );
                default_q.resize(mobility.nq(), DEFAULT_COORDINATE);
            }
            if mobility.nq() < mobility.nu() {
                warn!(
                    "custom mobility '{}' has fewer coordinates ({}) than speeds ({})",
                    mobility.name(),
                    mobility.nq(),
                    mobility.nu()
                );
            }
        }

        Self {
            kind,
            body: None,
            inboard_frame: Transform::IDENTITY,
            outboard_frame: Transform::IDENTITY,
            default_q,
            id: None,
            parent: None,
            owner: None,
        }
    }

    pub(crate) fn ground() -> Self {
        Self {
            body: Some(Body::Ground),
            ..Self::new(MobilizerKind::Ground)
        }
    }

    pub fn pin() -> Self {
        Self::new(MobilizerKind::Pin)
    }

    pub fn slider() -> Self {
        Self::new(MobilizerKind::Slider)
    }

    pub fn universal() -> Self {
        Self::new(MobilizerKind::Universal)
    }

    pub fn cylinder() -> Self {
        Self::new(MobilizerKind::Cylinder)
    }

    pub fn bend_stretch() -> Self {
        Self::new(MobilizerKind::BendStretch)
    }

    pub fn planar() -> Self {
        Self::new(MobilizerKind::Planar)
    }

    pub fn gimbal() -> Self {
        Self::new(MobilizerKind::Gimbal)
    }

    pub fn ball() -> Self {
        Self::new(MobilizerKind::Ball)
    }

    pub fn translation() -> Self {
        Self::new(MobilizerKind::Translation)
    }

    pub fn free() -> Self {
        Self::new(MobilizerKind::Free)
    }

    pub fn line_orientation() -> Self {
        Self::new(MobilizerKind::LineOrientation)
    }

    pub fn free_line() -> Self {
        Self::new(MobilizerKind::FreeLine)
    }

    pub fn weld() -> Self {
        Self::new(MobilizerKind::Weld)
    }

    pub fn screw(pitch: f32) -> Self {
        Self::new(MobilizerKind::Screw { pitch })
    }

    pub fn custom<M>(mobility: M) -> Self
    where
        M: CustomMobility + 'static,
    {
        Self::new(MobilizerKind::custom(mobility))
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_frames(mut self, inboard: Transform, outboard: Transform) -> Self {
        self.inboard_frame = inboard;
        self.outboard_frame = outboard;
        self
    }

    pub fn kind(&self) -> &MobilizerKind {
        &self.kind
    }

    pub fn nq(&self) -> usize {
        self.kind.nq()
    }

    pub fn nu(&self) -> usize {
        self.kind.nu()
    }

    pub fn id(&self) -> Option<MobilizedBodyId> {
        self.id
    }

    /// Inboard (parent) mobilized body; `None` for Ground and for detached bodies.
    pub fn parent(&self) -> Option<MobilizedBodyId> {
        self.parent
    }

    pub fn owner(&self) -> Option<SubsystemId> {
        self.owner
    }

    pub fn is_in_subsystem(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_in_same_subsystem(&self, other: &MobilizedBody) -> bool {
        self.owner.is_some() && self.owner == other.owner
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    pub fn set_body(&mut self, body: Body) -> &mut Self {
        self.body = Some(body);
        self
    }

    pub fn default_inboard_frame(&self) -> &Transform {
        &self.inboard_frame
    }

    pub fn default_outboard_frame(&self) -> &Transform {
        &self.outboard_frame
    }

    pub fn set_default_inboard_frame(&mut self, frame: Transform) -> &mut Self {
        self.inboard_frame = frame;
        self
    }

    pub fn set_default_outboard_frame(&mut self, frame: Transform) -> &mut Self {
        self.outboard_frame = frame;
        self
    }

    pub fn default_q(&self) -> &[f32] {
        &self.default_q
    }

    pub fn default_q_mut(&mut self) -> &mut [f32] {
        &mut self.default_q
    }

    pub fn set_default_q(&mut self, q: &[f32]) -> Result<&mut Self> {
        if q.len() != self.default_q.len() {
            return Err(TopologyError::WidthMismatch {
                requested: q.len(),
                actual: self.default_q.len(),
            });
        }
        self.default_q.copy_from_slice(q);
        Ok(self)
    }

    /// Fixed-width view of the default coordinates; `None` unless `nq == N`.
    pub fn default_q_as<const N: usize>(&self) -> Option<&[f32; N]> {
        self.default_q.as_slice().try_into().ok()
    }

    pub fn default_q_as_mut<const N: usize>(&mut self) -> Option<&mut [f32; N]> {
        self.default_q.as_mut_slice().try_into().ok()
    }

    /// Default coordinate of a single-coordinate kind (Pin, Slider, Screw).
    pub fn one_default_q(&self) -> Option<f32> {
        self.default_q_as::<1>().map(|q| q[0])
    }

    /// Default coordinates of a three-coordinate kind (Planar, Gimbal, Ball, Translation).
    pub fn default_q_vec3(&self) -> Option<Vec3> {
        self.default_q_as::<3>().map(|q| Vec3::from_array(*q))
    }

    pub fn screw_pitch(&self) -> Option<f32> {
        self.kind.pitch()
    }

    pub fn set_screw_pitch(&mut self, pitch: f32) -> Result<&mut Self> {
        match &mut self.kind {
            MobilizerKind::Screw { pitch: current } => {
                *current = pitch;
                Ok(self)
            }
            other => Err(TopologyError::WrongKind {
                expected: "Screw",
                actual: other.name(),
            }),
        }
    }

    pub fn custom_mobility(&self) -> Option<&dyn CustomMobility> {
        match &self.kind {
            MobilizerKind::Custom(mobility) => Some(mobility.as_ref()),
            _ => None,
        }
    }

    /// Copy with identical field values but no subsystem attachment.
    pub fn detached_clone(&self) -> Self {
        Self {
            id: None,
            parent: None,
            owner: None,
            ..self.clone()
        }
    }
}
