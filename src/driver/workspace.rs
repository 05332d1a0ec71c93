use super::DriverStage;
use crate::base::StiffnessRequest;
use crate::convention::HostConvention;
use crate::native::CallBlock;
use russell_lab::Matrix;
use tracing::trace;

/// Holds the scratch memory of the integration driver
///
/// The workspace is owned by the caller and may be reused across material points
/// and hypotheses (one workspace per thread). Its contents are undefined on entry
/// of each driver call; only [Workspace::stage] and [Workspace::stages] are
/// meaningful afterwards.
pub struct Workspace {
    /// Stages visited during the last call
    stages: Vec<DriverStage>,

    /// Buffers handed to the behaviour
    pub(crate) block: Option<CallBlock>,

    /// Thermodynamic force in the neutral convention
    pub(crate) stress: Vec<f64>,

    /// Driving variable at the beginning of the step in the neutral convention
    pub(crate) driving_begin: Vec<f64>,

    /// Driving variable at the end of the step in the neutral convention
    pub(crate) driving_end: Vec<f64>,

    /// Rotated copy of a symmetric tensor
    pub(crate) rotated: Vec<f64>,

    /// Tangent operator in the neutral convention
    pub(crate) tangent: Matrix,

    /// Auxiliary matrix for rotations of the tangent operator
    pub(crate) aux: Matrix,
}

impl Workspace {
    /// Allocates a new (empty) instance
    pub fn new() -> Self {
        Workspace {
            stages: vec![DriverStage::NotStarted],
            block: None,
            stress: Vec::new(),
            driving_begin: Vec::new(),
            driving_end: Vec::new(),
            rotated: Vec::new(),
            tangent: Matrix::new(0, 0),
            aux: Matrix::new(0, 0),
        }
    }

    /// Returns the last stage reached by the driver
    pub fn stage(&self) -> DriverStage {
        self.stages.last().copied().unwrap_or(DriverStage::NotStarted)
    }

    /// Returns all stages visited during the last call of the driver
    pub fn stages(&self) -> &[DriverStage] {
        &self.stages
    }

    /// Clears the stage history
    pub(crate) fn start(&mut self) {
        self.stages.clear();
        self.stages.push(DriverStage::NotStarted);
    }

    /// Records a transition of the state machine
    pub(crate) fn enter(&mut self, stage: DriverStage) {
        let previous = self.stage();
        debug_assert!(previous.allows(stage), "invalid transition {} → {}", previous, stage);
        trace!(from = %previous, to = %stage, "driver transition");
        self.stages.push(stage);
    }

    /// Resizes the neutral buffers
    pub(crate) fn resize(&mut self, n_force: usize, n_driving: usize) {
        self.stress.resize(n_force, 0.0);
        self.driving_begin.resize(n_driving, 0.0);
        self.driving_end.resize(n_driving, 0.0);
        if self.tangent.dims() != (n_force, n_driving) {
            self.tangent = Matrix::new(n_force, n_driving);
        }
        if self.aux.dims() != (n_force, n_driving) {
            self.aux = Matrix::new(n_force, n_driving);
        }
    }

    /// Takes the call block out of the workspace, reusing the previous allocation if possible
    ///
    /// The block should be put back into `self.block` after the call.
    pub(crate) fn take_block(
        &mut self,
        convention: &HostConvention,
        request: StiffnessRequest,
        prediction: bool,
        n_material_properties: usize,
        n_internal_values: usize,
        n_external_variables: usize,
    ) -> CallBlock {
        let mut block = match self.block.take() {
            Some(block)
                if block.convention == *convention
                    && block.n_material_properties == n_material_properties
                    && block.n_internal_values == n_internal_values
                    && block.n_external_variables == n_external_variables =>
            {
                block
            }
            _ => CallBlock::new(
                convention.clone(),
                request,
                prediction,
                n_material_properties,
                n_internal_values,
                n_external_variables,
            ),
        };
        block.request = request;
        block.prediction = prediction;
        block
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
