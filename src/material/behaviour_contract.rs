use crate::base::{BehaviourDescriptor, HostFamily, OutOfBoundsPolicy, StiffnessRequest};
use crate::native::{CallBlock, CallOutcome};

/// Specifies the capabilities of a behaviour callable by the integration driver
///
/// Implementations read their inputs from and write their outputs to the
/// [CallBlock], which is expressed in the convention of [BehaviourContract::host_family].
/// Failures are reported through the returned [CallOutcome] and the `ndt` field
/// of the block; implementations must not rely on panics (panics are caught by
/// the driver and reported as native exceptions).
pub trait BehaviourContract: Send + Sync {
    /// Returns the static metadata of the behaviour
    fn descriptor(&self) -> &BehaviourDescriptor;

    /// Returns the host family defining the binary convention of the behaviour
    fn host_family(&self) -> HostFamily;

    /// Returns the stiffness operator computed when none is specified
    fn default_stiffness_request(&self) -> StiffnessRequest;

    /// Indicates whether the behaviour can compute the requested stiffness operator
    fn supports_stiffness_request(&self, request: StiffnessRequest, prediction: bool) -> bool;

    /// Sets the policy applied when an argument is out of its bounds
    ///
    /// Returns false if the behaviour does not expose this setting.
    fn set_out_of_bounds_policy(&self, _policy: OutOfBoundsPolicy) -> bool {
        false
    }

    /// Computes the prediction operator at the beginning of the step
    ///
    /// Only the tangent operator of the block is meaningful afterwards.
    fn compute_prediction_operator(&self, block: &mut CallBlock) -> CallOutcome;

    /// Integrates the behaviour over the time step
    fn integrate(&self, block: &mut CallBlock) -> CallOutcome;
}
