use serde::{Deserialize, Serialize};

use super::types::MassProperties;
use crate::error::Result;

/// The physical body a mobilizer moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Body {
    /// Immobile body of infinite mass; only the subsystem's root carries it.
    Ground,
    /// Rigid body with finite mass properties expressed in its own frame.
    Rigid(MassProperties),
}

impl Default for Body {
    fn default() -> Self {
        Body::Rigid(MassProperties::default())
    }
}

impl Body {
    pub fn ground() -> Self {
        Body::Ground
    }

    /// Builds a rigid body after checking that the mass properties make sense.
    pub fn rigid(mass_properties: MassProperties) -> Result<Self> {
        mass_properties.validate()?;
        Ok(Body::Rigid(mass_properties))
    }

    pub fn is_ground(&self) -> bool {
        matches!(self, Body::Ground)
    }

    /// Checks the mass properties of a rigid body; Ground is always valid.
    pub fn validate(&self) -> Result<()> {
        match self {
            Body::Rigid(props) => props.validate(),
            Body::Ground => Ok(()),
        }
    }

    /// Mass properties of a rigid body; `None` for Ground.
    pub fn mass_properties(&self) -> Option<&MassProperties> {
        match self {
            Body::Rigid(props) => Some(props),
            Body::Ground => None,
        }
    }

    pub fn mass_properties_mut(&mut self) -> Option<&mut MassProperties> {
        match self {
            Body::Rigid(props) => Some(props),
            Body::Ground => None,
        }
    }
}
