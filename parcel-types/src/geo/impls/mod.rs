//! Implementations of the geographic traits.

pub mod projection;
