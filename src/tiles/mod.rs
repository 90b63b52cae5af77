//! Screen tiling, per-tile depth ordering and load balancing.

pub(crate) mod assign;
pub(crate) mod balance;
pub(crate) mod grid;
pub(crate) mod list;
pub(crate) mod scheduler;
pub(crate) mod sort;
