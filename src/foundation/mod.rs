pub(crate) mod bounded;
pub(crate) mod error;
pub(crate) mod fixed;
pub(crate) mod lut;
pub(crate) mod matrix;
