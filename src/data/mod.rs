//! Data layer: the device registry, its clock, and the listing template cache.

pub mod cache;
pub mod clock;
pub mod registry;
