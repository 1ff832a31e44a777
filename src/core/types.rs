use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_BODY_MASS;
use crate::error::{Result, TopologyError};

/// Rigid placement of one frame in another: a rotation followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Applies another transform on top of this one, returning the composition.
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * other.position,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.conjugate();
        Transform {
            position: -(rotation * self.position),
            rotation,
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }
}

/// Mass, center of mass (in the body frame), and inertia about the center of mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    pub mass: f32,
    pub center_of_mass: Vec3,
    pub inertia: Mat3,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: DEFAULT_BODY_MASS,
            center_of_mass: Vec3::ZERO,
            inertia: Mat3::IDENTITY,
        }
    }
}

impl MassProperties {
    pub fn new(mass: f32, center_of_mass: Vec3, inertia: Mat3) -> Self {
        Self {
            mass,
            center_of_mass,
            inertia,
        }
    }

    /// Point mass located at `center_of_mass`.
    pub fn point_mass(mass: f32, center_of_mass: Vec3) -> Self {
        Self::new(mass, center_of_mass, Mat3::ZERO)
    }

    pub fn solid_sphere(mass: f32, radius: f32) -> Self {
        Self::new(mass, Vec3::ZERO, Mat3::for_solid_sphere(radius, mass))
    }

    pub fn solid_box(mass: f32, half_extents: Vec3) -> Self {
        Self::new(mass, Vec3::ZERO, Mat3::for_solid_box(half_extents, mass))
    }

    pub fn is_valid(&self) -> bool {
        self.mass.is_finite()
            && self.mass >= 0.0
            && self.center_of_mass.is_finite()
            && self.inertia.is_finite()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(TopologyError::InvalidMassProperties(format!(
                "mass {} with center of mass {:?}",
                self.mass, self.center_of_mass
            )))
        }
    }
}

/// Helper methods for inertia calculations.
pub trait InertiaTensorExt {
    fn for_solid_box(half_extents: Vec3, mass: f32) -> Mat3;
    fn for_solid_sphere(radius: f32, mass: f32) -> Mat3;
}

impl InertiaTensorExt for Mat3 {
    fn for_solid_box(half_extents: Vec3, mass: f32) -> Mat3 {
        let lx = half_extents.x * 2.0;
        let ly = half_extents.y * 2.0;
        let lz = half_extents.z * 2.0;
        let factor = mass / 12.0;
        Mat3::from_diagonal(Vec3::new(
            factor * (ly * ly + lz * lz),
            factor * (lx * lx + lz * lz),
            factor * (lx * lx + ly * ly),
        ))
    }

    fn for_solid_sphere(radius: f32, mass: f32) -> Mat3 {
        let value = 0.4 * mass * radius * radius;
        Mat3::from_diagonal(Vec3::splat(value))
    }
}
