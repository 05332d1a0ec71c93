//! Implements the base structures: hypotheses, descriptors, and settings

mod constants;
mod descriptor;
mod enums;
mod hypothesis;
mod settings;
#[cfg(test)]
mod testing;
pub use crate::base::constants::*;
pub use crate::base::descriptor::*;
pub use crate::base::enums::*;
pub use crate::base::hypothesis::*;
pub use crate::base::settings::*;

#[cfg(test)]
pub(crate) use crate::base::testing::*;
