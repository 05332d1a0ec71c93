//! Makes available common structures needed to integrate a behaviour
//!
//! You may write `use mbdriver::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{BehaviourDescriptor, BehaviourKind, DriverSettings, HostFamily, Hypothesis, InternalVariable};
pub use crate::base::{OutOfBoundsPolicy, StiffnessRequest, Symmetry, VariableType};
pub use crate::driver::{DriverStage, IntegrationDriver, IntegrationFailure, IntegrationOutcome, Workspace};
pub use crate::material::{BehaviourContract, BehaviourState, LinearElastic};
pub use crate::native::{EntryPoint, NativeBehaviour, OutputStatus};
pub use crate::StrError;
