//! Mechanical behaviour integration and dispatch core
//!
//! This crate calls constitutive laws (behaviours) written against the binary
//! conventions of several finite element hosts, or written in Rust, through a
//! single host-neutral integration driver.
//!
//! The main structures are:
//!
//! * [base::Hypothesis] -- the modelling hypotheses and their tensor sizes
//! * [material::BehaviourState] -- the state of a material point over one time step
//! * [material::BehaviourContract] -- the capabilities of a callable behaviour
//! * [native::NativeBehaviour] -- a behaviour exported by a native library
//! * [driver::IntegrationDriver] -- dispatch, conversions, guarded call, and commit

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod convention;
pub mod driver;
pub mod material;
pub mod native;
pub mod prelude;
