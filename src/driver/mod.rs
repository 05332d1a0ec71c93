//! Implements the integration driver: dispatch, conversions, guarded call, and commit

mod integration_driver;
mod integration_failure;
mod stage;
mod workspace;
pub use crate::driver::integration_driver::*;
pub use crate::driver::integration_failure::*;
pub use crate::driver::stage::*;
pub use crate::driver::workspace::*;
