//! Implements the conversions between the host-neutral convention and the host conventions

mod component_map;
mod host_convention;
mod rotation;
pub use crate::convention::component_map::*;
pub use crate::convention::host_convention::*;
pub use crate::convention::rotation::*;
