//! Implements the behaviour state, the behaviour contract, and reference behaviours

mod behaviour_contract;
mod behaviour_state;
mod elastic_stiffness;
mod linear_elastic;
pub use crate::material::behaviour_contract::*;
pub use crate::material::behaviour_state::*;
pub use crate::material::elastic_stiffness::*;
pub use crate::material::linear_elastic::*;
