//! Screen-space projection of 3D splats.

pub(crate) mod atlas;
pub(crate) mod eigen;
pub(crate) mod projector;
