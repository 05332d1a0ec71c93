use super::{DriverStage, IntegrationFailure, Workspace};
use crate::base::{BehaviourKind, DriverSettings, Hypothesis, OutOfBoundsPolicy, RotationHandling, StiffnessRequest, Symmetry};
use crate::convention::{check_rotation_matrix, rotate_stensor, rotate_tangent, Direction, HostConvention};
use crate::material::{elastic_stiffness_from_properties, BehaviourContract, BehaviourState};
use crate::native::{guarded_call, CallBlock, StatusClass};
use crate::StrError;
use russell_lab::Matrix;
use tracing::{debug, warn};

/// Tolerance used to check the orthogonality of rotation matrices
const ROTATION_TOLERANCE: f64 = 1e-10;

/// Holds the warning attached to a usable result (argument out of its normal bounds)
#[derive(Clone, Debug, PartialEq)]
pub struct BoundsWarning {
    /// Index of the offending argument (positive)
    pub bounds_status: i32,

    /// Message reported by the behaviour
    pub message: String,
}

/// Holds the results of a successful integration
#[derive(Clone, Debug)]
pub struct IntegrationOutcome {
    /// Stiffness operator (neutral convention, global frame)
    pub tangent: Matrix,

    /// Suggested ratio between the next and the current time increments (≥ 1)
    pub ndt: f64,

    /// Warning if an argument is out of its normal bounds
    pub warning: Option<BoundsWarning>,
}

/// Defines where the stiffness operator comes from
#[derive(Clone, Copy, Debug, PartialEq)]
enum TangentSource {
    Behaviour(StiffnessRequest),
    ElasticFromProperties,
}

/// Holds the block of an accepted call
struct Accepted {
    block: CallBlock,
    ndt: f64,
    warning: Option<BoundsWarning>,
}

/// Implements the integration driver
///
/// The driver dispatches on the modelling hypothesis, converts the state to the
/// convention of the behaviour's host family, calls the behaviour through the
/// guarded boundary, interprets the outcome, and commits the results into the
/// end-of-step values of the state. On failure, the state is left untouched.
///
/// The driver holds no mutable data; one driver may serve any number of threads,
/// each one with its own [Workspace].
pub struct IntegrationDriver<'a> {
    behaviour: &'a dyn BehaviourContract,
    settings: &'a DriverSettings,
}

impl<'a> IntegrationDriver<'a> {
    /// Allocates a new instance
    ///
    /// The out-of-bounds policy of the settings is forwarded to the behaviour.
    pub fn new(behaviour: &'a dyn BehaviourContract, settings: &'a DriverSettings) -> Result<Self, StrError> {
        behaviour.descriptor().validate()?;
        let policy = settings.out_of_bounds_policy;
        if !behaviour.set_out_of_bounds_policy(policy) && policy != OutOfBoundsPolicy::None {
            warn!(
                behaviour = %behaviour.descriptor().name,
                policy = ?policy,
                "the behaviour does not expose the out-of-bounds policy"
            );
        }
        Ok(IntegrationDriver { behaviour, settings })
    }

    /// Returns the behaviour
    pub fn behaviour(&self) -> &dyn BehaviourContract {
        self.behaviour
    }

    /// Integrates the behaviour over a time step
    ///
    /// # Input
    ///
    /// * `state` -- the state of the material point; `strain_end` must hold the driving variable at the end of the step
    /// * `dt` -- the time increment (≥ 0.0)
    /// * `hypothesis` -- the modelling hypothesis (must match the allocation of the state)
    /// * `request` -- the stiffness operator to compute
    /// * `workspace` -- scratch memory (contents are undefined on entry)
    ///
    /// # Output
    ///
    /// On success, `stress_end` and `internal_values_end` are updated (and `strain_end`
    /// if the generic plane stress algorithm is used). Call [BehaviourState::commit] to
    /// accept the step. On failure, the state is not modified.
    pub fn integrate(
        &self,
        state: &mut BehaviourState,
        dt: f64,
        hypothesis: Hypothesis,
        request: StiffnessRequest,
        workspace: &mut Workspace,
    ) -> Result<IntegrationOutcome, IntegrationFailure> {
        workspace.start();
        match self.try_integrate(state, dt, hypothesis, request, workspace) {
            Ok(outcome) => {
                workspace.enter(DriverStage::Committed);
                Ok(outcome)
            }
            Err(failure) => {
                debug!(behaviour = %self.behaviour.descriptor().name, %failure, "integration failed");
                workspace.enter(DriverStage::RolledBack);
                Err(failure)
            }
        }
    }

    /// Computes the prediction operator at the beginning of the step
    ///
    /// The state is not modified. The elastic operator is computed from the material
    /// properties if the behaviour cannot supply it.
    pub fn compute_prediction_operator(
        &self,
        state: &BehaviourState,
        hypothesis: Hypothesis,
        request: StiffnessRequest,
        workspace: &mut Workspace,
    ) -> Result<Matrix, IntegrationFailure> {
        workspace.start();
        match self.try_prediction(state, hypothesis, request, workspace) {
            Ok(tangent) => Ok(tangent),
            Err(failure) => {
                debug!(behaviour = %self.behaviour.descriptor().name, %failure, "prediction failed");
                workspace.enter(DriverStage::RolledBack);
                Err(failure)
            }
        }
    }

    /// Runs the integration; the state is only modified at the very end
    fn try_integrate(
        &self,
        state: &mut BehaviourState,
        dt: f64,
        hypothesis: Hypothesis,
        request: StiffnessRequest,
        ws: &mut Workspace,
    ) -> Result<IntegrationOutcome, IntegrationFailure> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(IntegrationFailure::InvalidConfiguration(
                "the time increment must be finite and ≥ 0.0",
            ));
        }
        if dt > 0.0 && dt < self.settings.dt_min {
            return Err(IntegrationFailure::InvalidConfiguration(
                "the time increment is smaller than dt_min",
            ));
        }
        let convention = self.dispatch(state, hypothesis, ws)?;
        let source = self.resolve(request, false)?;
        let call_request = match source {
            TangentSource::Behaviour(r) => r,
            TangentSource::ElasticFromProperties => self.behaviour.default_stiffness_request(),
        };
        ws.resize(convention.force.neutral_size, convention.driving.neutral_size);
        ws.driving_begin.copy_from_slice(state.strain_begin.as_data());
        ws.driving_end.copy_from_slice(state.strain_end.as_data());

        let plane_stress = self.behaviour.descriptor().uses_generic_plane_stress(hypothesis);
        let (accepted, axial_strain) = if plane_stress {
            let (accepted, ezz) = self.integrate_generic_plane_stress(state, &convention, call_request, dt, ws)?;
            (accepted, Some(ezz))
        } else {
            let n_iv = state.internal_values_begin.dim();
            let accepted = self.call_behaviour(state, &convention, call_request, false, dt, n_iv, ws)?;
            (accepted, None)
        };
        if source == TangentSource::ElasticFromProperties {
            if let Err(failure) = self.elastic_tangent(state, hypothesis, ws) {
                ws.block = Some(accepted.block);
                return Err(failure);
            }
        }

        // commit
        let block = accepted.block;
        let n_iv = block.n_internal_values;
        state.stress_end.as_mut_data().copy_from_slice(&ws.stress);
        state.internal_values_end.as_mut_data()[..n_iv].copy_from_slice(&block.internal_values[..n_iv]);
        if let Some(ezz) = axial_strain {
            state.strain_end[2] = ezz;
            state.internal_values_end[n_iv] = ezz;
        }
        let outcome = IntegrationOutcome {
            tangent: ws.tangent.clone(),
            ndt: accepted.ndt,
            warning: accepted.warning,
        };
        ws.block = Some(block);
        Ok(outcome)
    }

    /// Runs the computation of the prediction operator
    fn try_prediction(
        &self,
        state: &BehaviourState,
        hypothesis: Hypothesis,
        request: StiffnessRequest,
        ws: &mut Workspace,
    ) -> Result<Matrix, IntegrationFailure> {
        let convention = self.dispatch(state, hypothesis, ws)?;
        let source = self.resolve(request, true)?;
        ws.resize(convention.force.neutral_size, convention.driving.neutral_size);
        match source {
            TangentSource::ElasticFromProperties => {
                self.elastic_tangent(state, hypothesis, ws)?;
                ws.enter(DriverStage::Interpreted);
            }
            TangentSource::Behaviour(r) => {
                let plane_stress = self.behaviour.descriptor().uses_generic_plane_stress(hypothesis);
                let mut n_iv = state.internal_values_begin.dim();
                ws.driving_begin.copy_from_slice(state.strain_begin.as_data());
                if plane_stress {
                    n_iv -= 1;
                    ws.driving_begin[2] = state.internal_values_begin[n_iv];
                }
                ws.driving_end.copy_from_slice(&ws.driving_begin);
                let accepted = self.call_behaviour(state, &convention, r, true, 0.0, n_iv, ws)?;
                ws.block = Some(accepted.block);
                if plane_stress {
                    condense_out_of_plane(&mut ws.tangent)?;
                }
            }
        }
        Ok(ws.tangent.clone())
    }

    /// Checks the hypothesis and the state, then selects the host convention
    fn dispatch(
        &self,
        state: &BehaviourState,
        hypothesis: Hypothesis,
        ws: &mut Workspace,
    ) -> Result<HostConvention, IntegrationFailure> {
        let desc = self.behaviour.descriptor();
        let family = self.behaviour.host_family();
        if !desc.supports(hypothesis) {
            return Err(IntegrationFailure::UnsupportedHypothesis(hypothesis));
        }
        if state.hypothesis != hypothesis {
            return Err(IntegrationFailure::InvalidConfiguration(
                "the state was allocated for another modelling hypothesis",
            ));
        }
        state
            .check_sizes(desc, family)
            .map_err(|message| IntegrationFailure::ArgumentCountMismatch {
                message: message.to_string(),
            })?;
        let effective = desc.effective_hypothesis(hypothesis);
        let convention = HostConvention::new(family, desc.kind, effective)
            .map_err(|_| IntegrationFailure::UnsupportedHypothesis(hypothesis))?;
        if desc.symmetry == Symmetry::Orthotropic {
            check_rotation_matrix(&state.rotation, hypothesis.space_dim(), ROTATION_TOLERANCE)
                .map_err(IntegrationFailure::InvalidConfiguration)?;
            if self.rotated_by_driver(&convention) && !symmetric_kind(desc.kind) {
                return Err(IntegrationFailure::InvalidConfiguration(
                    "the driver can only rotate the symmetric tensors of small strain behaviours",
                ));
            }
        }
        debug!(
            behaviour = %desc.name,
            family = ?family,
            hypothesis = %hypothesis,
            effective = %effective,
            "dispatch"
        );
        ws.enter(DriverStage::Dispatched(hypothesis));
        Ok(convention)
    }

    /// Selects the source of the stiffness operator
    fn resolve(&self, request: StiffnessRequest, prediction: bool) -> Result<TangentSource, IntegrationFailure> {
        let behaviour = self.behaviour;
        if behaviour.supports_stiffness_request(request, prediction) {
            return Ok(TangentSource::Behaviour(request));
        }
        let from_properties = symmetric_kind(behaviour.descriptor().kind);
        if request == StiffnessRequest::Elastic && from_properties {
            return Ok(TangentSource::ElasticFromProperties);
        }
        if self.settings.stiffness_fallback {
            let default = behaviour.default_stiffness_request();
            if behaviour.supports_stiffness_request(default, prediction) {
                warn!(requested = ?request, used = ?default, prediction, "stiffness request replaced by the default");
                return Ok(TangentSource::Behaviour(default));
            }
            if from_properties {
                warn!(requested = ?request, prediction, "stiffness request replaced by the elastic operator");
                return Ok(TangentSource::ElasticFromProperties);
            }
        }
        Err(IntegrationFailure::UnsupportedStiffnessRequest(request))
    }

    /// Indicates that the driver must rotate the inputs and outputs
    fn rotated_by_driver(&self, convention: &HostConvention) -> bool {
        self.behaviour.descriptor().symmetry == Symmetry::Orthotropic
            && convention.rotation == RotationHandling::ByDriver
    }

    /// Converts the inputs, calls the behaviour, and converts the outputs back
    ///
    /// The neutral driving variables must be in `ws.driving_begin` and `ws.driving_end`.
    /// On success, `ws.stress` and `ws.tangent` hold the results (neutral convention,
    /// global frame) and the returned block holds the internal values.
    fn call_behaviour(
        &self,
        state: &BehaviourState,
        convention: &HostConvention,
        request: StiffnessRequest,
        prediction: bool,
        dt: f64,
        n_iv: usize,
        ws: &mut Workspace,
    ) -> Result<Accepted, IntegrationFailure> {
        let rr = &state.rotation;
        let by_driver = self.rotated_by_driver(convention);
        ws.stress.copy_from_slice(state.stress_begin.as_data());
        if by_driver {
            rotate_in_place(&mut ws.stress, &mut ws.rotated, rr, Direction::Forward)
                .and_then(|_| rotate_in_place(&mut ws.driving_begin, &mut ws.rotated, rr, Direction::Forward))
                .and_then(|_| rotate_in_place(&mut ws.driving_end, &mut ws.rotated, rr, Direction::Forward))
                .map_err(IntegrationFailure::InvalidConfiguration)?;
        }

        // inputs
        let n_mp = state.material_properties.dim();
        let n_ev = state.external_variables.dim() - 1;
        let mut block = ws.take_block(convention, request, prediction, n_mp, n_iv, n_ev);
        block.reset_outputs();
        block.dt = dt;
        convention.force_to_host(&mut block.stress, &ws.stress);
        convention.driving_to_host(&mut block.driving_begin, &ws.driving_begin);
        convention.driving_to_host(&mut block.driving_end, &ws.driving_end);
        for i in 0..block.driving_end.len() {
            block.driving_increment[i] = block.driving_end[i] - block.driving_begin[i];
        }
        block.material_properties[..n_mp].copy_from_slice(state.material_properties.as_data());
        block.internal_values[..n_iv].copy_from_slice(&state.internal_values_begin.as_data()[..n_iv]);
        block.temperature = state.external_variables[0];
        block.temperature_increment = state.external_variables_increments[0];
        block.external_variables[..n_ev].copy_from_slice(&state.external_variables.as_data()[1..]);
        block.external_variables_increments[..n_ev].copy_from_slice(&state.external_variables_increments.as_data()[1..]);
        for i in 0..3 {
            for j in 0..3 {
                block.rotation[i + j * 3] = if by_driver {
                    if i == j {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    rr.get(i, j)
                };
            }
        }
        ws.enter(DriverStage::Converted);

        // call
        let behaviour = self.behaviour;
        let outcome = guarded_call(self.settings.restore_errno, || {
            if prediction {
                behaviour.compute_prediction_operator(&mut block)
            } else {
                behaviour.integrate(&mut block)
            }
        });
        ws.enter(DriverStage::Called);

        // interpret
        if let Some(failure) = IntegrationFailure::from_outcome(&outcome) {
            ws.block = Some(block);
            return Err(failure);
        }
        let warning = if outcome.class() == StatusClass::UsableWithCaution {
            warn!(
                behaviour = %behaviour.descriptor().name,
                bounds_status = outcome.bounds_status,
                message = %outcome.message,
                "argument out of its normal bounds"
            );
            Some(BoundsWarning {
                bounds_status: outcome.bounds_status,
                message: outcome.message.clone(),
            })
        } else {
            None
        };
        if !prediction {
            convention.force_from_host(&mut ws.stress, &block.stress);
        }
        convention.tangent_from_host(&mut ws.tangent, &block.tangent);
        if by_driver {
            let rotated = if prediction {
                Ok(())
            } else {
                rotate_in_place(&mut ws.stress, &mut ws.rotated, rr, Direction::Backward)
            };
            if let Err(message) = rotated.and_then(|_| rotate_tangent(&mut ws.aux, &ws.tangent, rr, Direction::Backward)) {
                ws.block = Some(block);
                return Err(IntegrationFailure::InvalidConfiguration(message));
            }
            std::mem::swap(&mut ws.tangent, &mut ws.aux);
        }
        if self.settings.check_finite_outputs {
            let finite_stress = prediction
                || (ws.stress.iter().all(|x| x.is_finite())
                    && block.internal_values[..n_iv].iter().all(|x| x.is_finite()));
            let finite_tangent = ws.tangent.as_data().iter().all(|x| x.is_finite());
            if !finite_stress || !finite_tangent {
                ws.block = Some(block);
                return Err(IntegrationFailure::InvalidNumericResult {
                    message: "the behaviour returned non-finite values".to_string(),
                });
            }
        }
        ws.enter(DriverStage::Interpreted);
        Ok(Accepted {
            block,
            ndt: outcome.ndt,
            warning,
        })
    }

    /// Emulates plane stress by calling the behaviour in generalised plane strain
    ///
    /// The axial strain (last internal value) is found by Newton iterations such that
    /// the out-of-plane stress vanishes:
    ///
    /// ```text
    /// εzz ← εzz - σzz / Kzz
    /// ```
    ///
    /// The convergence is reached when `|σzz| ≤ tol · max(1, max|σᵢ|)`.
    ///
    /// Returns the accepted call and the axial strain at the end of the step.
    fn integrate_generic_plane_stress(
        &self,
        state: &BehaviourState,
        convention: &HostConvention,
        request: StiffnessRequest,
        dt: f64,
        ws: &mut Workspace,
    ) -> Result<(Accepted, f64), IntegrationFailure> {
        let n_iv = state.internal_values_begin.dim() - 1;
        let ezz_begin = state.internal_values_begin[n_iv];
        let mut ezz_end = ezz_begin;
        let tolerance = self.settings.plane_stress_tolerance;
        let max_iterations = self.settings.plane_stress_max_iterations;
        for iteration in 0..max_iterations {
            ws.driving_begin.copy_from_slice(state.strain_begin.as_data());
            ws.driving_end.copy_from_slice(state.strain_end.as_data());
            ws.driving_begin[2] = ezz_begin;
            ws.driving_end[2] = ezz_end;
            let accepted = self.call_behaviour(state, convention, request, false, dt, n_iv, ws)?;
            let szz = ws.stress[2];
            let kzz = ws.tangent.get(2, 2);
            let norm = ws.stress.iter().fold(0.0, |acc: f64, s| f64::max(acc, f64::abs(*s)));
            debug!(iteration, szz, ezz = ezz_end, "generic plane stress");
            if f64::abs(szz) <= tolerance * f64::max(1.0, norm) {
                if let Err(failure) = condense_out_of_plane(&mut ws.tangent) {
                    ws.block = Some(accepted.block);
                    return Err(failure);
                }
                ws.stress[2] = 0.0;
                return Ok((accepted, ezz_end));
            }
            ws.block = Some(accepted.block);
            if !kzz.is_finite() || kzz == 0.0 {
                return Err(IntegrationFailure::InvalidNumericResult {
                    message: "the out-of-plane stiffness vanishes".to_string(),
                });
            }
            ezz_end -= szz / kzz;
        }
        Err(IntegrationFailure::PlaneStressNotConverged {
            iterations: max_iterations,
        })
    }

    /// Computes the elastic stiffness from the material properties (global frame)
    fn elastic_tangent(&self, state: &BehaviourState, hypothesis: Hypothesis, ws: &mut Workspace) -> Result<(), IntegrationFailure> {
        let desc = self.behaviour.descriptor();
        if !symmetric_kind(desc.kind) {
            return Err(IntegrationFailure::UnsupportedStiffnessRequest(StiffnessRequest::Elastic));
        }
        elastic_stiffness_from_properties(
            &mut ws.tangent,
            desc,
            self.behaviour.host_family(),
            hypothesis,
            state.material_properties.as_data(),
        )
        .map_err(IntegrationFailure::InvalidConfiguration)?;
        if desc.symmetry == Symmetry::Orthotropic {
            rotate_tangent(&mut ws.aux, &ws.tangent, &state.rotation, Direction::Backward)
                .map_err(IntegrationFailure::InvalidConfiguration)?;
            std::mem::swap(&mut ws.tangent, &mut ws.aux);
        }
        Ok(())
    }
}

/// Indicates that the driving variables and forces are symmetric tensors
fn symmetric_kind(kind: BehaviourKind) -> bool {
    matches!(kind, BehaviourKind::SmallStrain | BehaviourKind::General)
}

/// Rotates a symmetric tensor using a scratch buffer
fn rotate_in_place(t: &mut [f64], scratch: &mut Vec<f64>, rr: &Matrix, direction: Direction) -> Result<(), StrError> {
    scratch.resize(t.len(), 0.0);
    rotate_stensor(scratch, t, rr, direction)?;
    t.copy_from_slice(scratch);
    Ok(())
}

/// Condenses the out-of-plane component of a generalised plane strain stiffness
///
/// ```text
/// K'ᵢⱼ = Kᵢⱼ - Kᵢ₂ K₂ⱼ / K₂₂   (i, j ≠ 2)
/// K'ᵢ₂ = K'₂ⱼ = 0
/// ```
fn condense_out_of_plane(kk: &mut Matrix) -> Result<(), IntegrationFailure> {
    let k22 = kk.get(2, 2);
    if !k22.is_finite() || k22 == 0.0 {
        return Err(IntegrationFailure::InvalidNumericResult {
            message: "the out-of-plane stiffness vanishes".to_string(),
        });
    }
    let (nrow, ncol) = kk.dims();
    let row: Vec<f64> = (0..ncol).map(|j| kk.get(2, j)).collect();
    let col: Vec<f64> = (0..nrow).map(|i| kk.get(i, 2)).collect();
    for i in 0..nrow {
        for j in 0..ncol {
            if i == 2 || j == 2 {
                kk.set(i, j, 0.0);
            } else {
                kk.set(i, j, kk.get(i, j) - col[i] * row[j] / k22);
            }
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
