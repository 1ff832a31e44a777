//! Global configuration constants for the matter topology layer.

/// Arena index reserved for the Ground mobilized body of every subsystem.
pub const GROUND_INDEX: usize = 0;

/// Pitch (translation per radian) given to a Screw mobilizer when none is supplied.
pub const DEFAULT_SCREW_PITCH: f32 = 1.0;

/// Mass used by `MassProperties::default()` for a freshly constructed rigid body.
pub const DEFAULT_BODY_MASS: f32 = 1.0;

/// Value every generalized coordinate starts from unless a kind overrides it.
pub const DEFAULT_COORDINATE: f32 = 0.0;
