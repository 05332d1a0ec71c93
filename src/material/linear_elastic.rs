use super::{isotropic_stiffness, BehaviourContract};
use crate::base::{BehaviourDescriptor, BehaviourKind, HostFamily, OutOfBoundsPolicy, StiffnessRequest, Symmetry};
use crate::native::{CallBlock, CallOutcome, STATUS_NATIVE_EXCEPTION};
use crate::StrError;
use russell_lab::{mat_vec_mul_update, Matrix, Vector};
use std::sync::atomic::{AtomicU8, Ordering};

/// Implements an isotropic linear elastic behaviour (host-neutral convention)
///
/// ```text
/// σ = σ₀ + D : Δε
/// ```
///
/// The Poisson's coefficient has the normal bounds [0, 0.5[ and the physical bounds ]-1, 0.5[.
pub struct LinearElastic {
    descriptor: BehaviourDescriptor,
    index_young: usize,
    index_poisson: usize,
    policy: AtomicU8,
}

fn policy_to_u8(policy: OutOfBoundsPolicy) -> u8 {
    match policy {
        OutOfBoundsPolicy::None => 0,
        OutOfBoundsPolicy::Warning => 1,
        OutOfBoundsPolicy::Strict => 2,
    }
}

fn policy_from_u8(value: u8) -> OutOfBoundsPolicy {
    match value {
        1 => OutOfBoundsPolicy::Warning,
        2 => OutOfBoundsPolicy::Strict,
        _ => OutOfBoundsPolicy::None,
    }
}

impl LinearElastic {
    /// Allocates a new instance supporting all hypotheses
    pub fn new() -> Self {
        let mut descriptor = BehaviourDescriptor::new("LinearElastic", BehaviourKind::SmallStrain, Symmetry::Isotropic);
        descriptor.material_properties = vec!["YoungModulus".to_string(), "PoissonRatio".to_string()];
        LinearElastic {
            descriptor,
            index_young: 0,
            index_poisson: 1,
            policy: AtomicU8::new(0),
        }
    }

    /// Allocates a new instance with a custom descriptor
    ///
    /// The descriptor must declare the `YoungModulus` and `PoissonRatio` material properties.
    pub fn with_descriptor(descriptor: BehaviourDescriptor) -> Result<Self, StrError> {
        descriptor.validate()?;
        if descriptor.kind != BehaviourKind::SmallStrain || descriptor.symmetry != Symmetry::Isotropic {
            return Err("the linear elastic behaviour must be an isotropic small strain behaviour");
        }
        let find = |key: &str| descriptor.material_properties.iter().position(|name| name == key);
        let index_young = find("YoungModulus").ok_or("the YoungModulus material property is missing")?;
        let index_poisson = find("PoissonRatio").ok_or("the PoissonRatio material property is missing")?;
        Ok(LinearElastic {
            descriptor,
            index_young,
            index_poisson,
            policy: AtomicU8::new(0),
        })
    }

    /// Returns the current out-of-bounds policy
    pub fn out_of_bounds_policy(&self) -> OutOfBoundsPolicy {
        policy_from_u8(self.policy.load(Ordering::Relaxed))
    }

    /// Checks the bounds and computes the stiffness
    ///
    /// Returns the outcome to report if the material properties are not acceptable.
    /// A warning outcome is returned along with the stiffness.
    fn stiffness(&self, block: &CallBlock) -> Result<(Matrix, Option<CallOutcome>), CallOutcome> {
        let young = block.material_properties[self.index_young];
        let poisson = block.material_properties[self.index_poisson];
        let k_young = (self.index_young + 1) as i32;
        let k_poisson = (self.index_poisson + 1) as i32;
        if !(young > 0.0) {
            return Err(CallOutcome::bounds(
                -k_young,
                "YoungModulus is out of its physical bounds",
                0.0,
            ));
        }
        if !(poisson > -1.0 && poisson < 0.5) {
            return Err(CallOutcome::bounds(
                -k_poisson,
                "PoissonRatio is out of its physical bounds",
                0.0,
            ));
        }
        let mut warning = None;
        if poisson < 0.0 {
            match self.out_of_bounds_policy() {
                OutOfBoundsPolicy::None => (),
                OutOfBoundsPolicy::Warning => {
                    warning = Some(CallOutcome::bounds(k_poisson, "PoissonRatio is out of its bounds", 1.0));
                }
                OutOfBoundsPolicy::Strict => {
                    return Err(CallOutcome::bounds(-k_poisson, "PoissonRatio is out of its bounds", 0.0));
                }
            }
        }
        let n = block.n_force();
        let mut dd = Matrix::new(n, n);
        if let Err(message) = isotropic_stiffness(&mut dd, young, poisson, block.convention.hypothesis) {
            return Err(CallOutcome::failure(STATUS_NATIVE_EXCEPTION, message));
        }
        Ok((dd, warning))
    }

    /// Writes the stiffness into the tangent buffer (column-major)
    fn write_tangent(block: &mut CallBlock, dd: &Matrix) {
        let n = block.n_force();
        block.tangent[..n * n].copy_from_slice(dd.as_data());
    }
}

impl Default for LinearElastic {
    fn default() -> Self {
        LinearElastic::new()
    }
}

impl BehaviourContract for LinearElastic {
    fn descriptor(&self) -> &BehaviourDescriptor {
        &self.descriptor
    }

    fn host_family(&self) -> HostFamily {
        HostFamily::Generic
    }

    fn default_stiffness_request(&self) -> StiffnessRequest {
        StiffnessRequest::ConsistentTangent
    }

    /// Returns true for all requests since all operators equal the elastic stiffness
    fn supports_stiffness_request(&self, _request: StiffnessRequest, _prediction: bool) -> bool {
        true
    }

    fn set_out_of_bounds_policy(&self, policy: OutOfBoundsPolicy) -> bool {
        self.policy.store(policy_to_u8(policy), Ordering::Relaxed);
        true
    }

    fn compute_prediction_operator(&self, block: &mut CallBlock) -> CallOutcome {
        match self.stiffness(block) {
            Ok((dd, warning)) => {
                LinearElastic::write_tangent(block, &dd);
                warning.unwrap_or(CallOutcome::success(1.0))
            }
            Err(outcome) => outcome,
        }
    }

    fn integrate(&self, block: &mut CallBlock) -> CallOutcome {
        let (dd, warning) = match self.stiffness(block) {
            Ok(res) => res,
            Err(outcome) => return outcome,
        };
        let n = block.n_force();
        let mut stress = Vector::new(n);
        let mut increment = Vector::new(n);
        stress.set_vector(&block.stress[..n]);
        increment.set_vector(&block.driving_increment[..n]);
        if let Err(message) = mat_vec_mul_update(&mut stress, 1.0, &dd, &increment, 1.0) {
            return CallOutcome::failure(STATUS_NATIVE_EXCEPTION, message);
        }
        block.stress[..n].copy_from_slice(stress.as_data());
        LinearElastic::write_tangent(block, &dd);
        block.ndt = 1.0;
        warning.unwrap_or(CallOutcome::success(1.0))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
