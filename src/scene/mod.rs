pub(crate) mod camera;
pub(crate) mod desc;
pub(crate) mod splat;
