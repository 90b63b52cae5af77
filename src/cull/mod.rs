//! Hierarchical frustum culling over a uniform scene grid.

pub(crate) mod culler;
pub(crate) mod frustum;
pub(crate) mod grid;
