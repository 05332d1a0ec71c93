//! Implements the boundary with native behaviours: status records, call blocks, and entry points

mod call_block;
mod entry_points;
mod errno;
mod guarded_call;
mod native_behaviour;
mod output_status;
pub use crate::native::call_block::*;
pub use crate::native::entry_points::*;
pub use crate::native::errno::*;
pub use crate::native::guarded_call::*;
pub use crate::native::native_behaviour::*;
pub use crate::native::output_status::*;
