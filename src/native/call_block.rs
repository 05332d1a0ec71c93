use super::OutputStatus;
use crate::base::StiffnessRequest;
use crate::convention::HostConvention;
use crate::StrError;

/// Holds the buffers passed to a behaviour during one call
///
/// All arrays are expressed in the host convention. They are owned copies of
/// the caller's data because native code writes through raw pointers.
///
/// The material properties, internal values and external variables are padded
/// to at least one entry since some hosts reject empty arrays; the actual
/// counts are kept in the `n_*` fields.
#[derive(Clone, Debug)]
pub struct CallBlock {
    /// Host convention (family, kind, effective hypothesis)
    pub convention: HostConvention,

    /// Requested stiffness operator
    pub request: StiffnessRequest,

    /// Indicates a prediction call (no integration)
    pub prediction: bool,

    /// Time increment
    pub dt: f64,

    /// Thermodynamic force: beginning of step on input and end of step on output
    pub stress: Vec<f64>,

    /// Driving variable at the beginning of the step
    pub driving_begin: Vec<f64>,

    /// Driving variable at the end of the step
    pub driving_end: Vec<f64>,

    /// Increment of the driving variable
    pub driving_increment: Vec<f64>,

    /// Material properties (padded)
    pub material_properties: Vec<f64>,

    /// Actual number of material properties
    pub n_material_properties: usize,

    /// Internal values: beginning of step on input and end of step on output (padded)
    pub internal_values: Vec<f64>,

    /// Actual number of internal values
    pub n_internal_values: usize,

    /// Temperature at the beginning of the step
    pub temperature: f64,

    /// Increment of temperature
    pub temperature_increment: f64,

    /// External variables other than the temperature (padded)
    pub external_variables: Vec<f64>,

    /// Increments of the external variables other than the temperature (padded)
    pub external_variables_increments: Vec<f64>,

    /// Actual number of external variables other than the temperature
    pub n_external_variables: usize,

    /// Rotation matrix from the global frame to the material frame (column-major)
    pub rotation: [f64; 9],

    /// Tangent operator (n_host_force × n_host_driving) in the host storage order
    pub tangent: Vec<f64>,

    /// Achievable fraction of the time increment (written by the behaviour)
    pub ndt: f64,

    /// Status record filled by behaviours supporting it
    pub status: OutputStatus,
}

impl CallBlock {
    /// Allocates a new instance with zeroed buffers
    ///
    /// # Input
    ///
    /// * `n_material_properties` -- number of material properties
    /// * `n_internal_values` -- number of internal values
    /// * `n_external_variables` -- number of external variables excluding the temperature
    pub fn new(
        convention: HostConvention,
        request: StiffnessRequest,
        prediction: bool,
        n_material_properties: usize,
        n_internal_values: usize,
        n_external_variables: usize,
    ) -> Self {
        let n_force = convention.n_host_force();
        let n_driving = convention.n_host_driving();
        let mut rotation = [0.0; 9];
        rotation[0] = 1.0;
        rotation[4] = 1.0;
        rotation[8] = 1.0;
        CallBlock {
            convention,
            request,
            prediction,
            dt: 0.0,
            stress: vec![0.0; n_force],
            driving_begin: vec![0.0; n_driving],
            driving_end: vec![0.0; n_driving],
            driving_increment: vec![0.0; n_driving],
            material_properties: vec![0.0; usize::max(1, n_material_properties)],
            n_material_properties,
            internal_values: vec![0.0; usize::max(1, n_internal_values)],
            n_internal_values,
            temperature: 0.0,
            temperature_increment: 0.0,
            external_variables: vec![0.0; usize::max(1, n_external_variables)],
            external_variables_increments: vec![0.0; usize::max(1, n_external_variables)],
            n_external_variables,
            rotation,
            tangent: vec![0.0; n_force * n_driving],
            ndt: 1.0,
            status: OutputStatus::new(),
        }
    }

    /// Returns the number of rows of the tangent operator
    pub fn n_force(&self) -> usize {
        self.convention.n_host_force()
    }

    /// Returns the number of columns of the tangent operator
    pub fn n_driving(&self) -> usize {
        self.convention.n_host_driving()
    }

    /// Clears the outputs and encodes the stiffness request in the tangent buffer (if the host expects it)
    pub fn reset_outputs(&mut self) {
        self.tangent.fill(0.0);
        if self.convention.stiffness_flag_in_tangent {
            if let Some(flag) = self.request.host_flag(self.prediction) {
                self.tangent[0] = flag;
            }
        }
        self.ndt = 1.0;
        self.status.reset();
    }

    /// Returns the rotation matrix entry (i, j)
    pub fn rotation(&self, i: usize, j: usize) -> f64 {
        self.rotation[i + j * 3]
    }

    /// Checks the lengths of all buffers against the host convention
    ///
    /// This is the last check before handing raw pointers to native code.
    pub fn validate(&self) -> Result<(), StrError> {
        let n_force = self.n_force();
        let n_driving = self.n_driving();
        if self.stress.len() != n_force {
            return Err("the stress buffer has an incorrect size");
        }
        if self.driving_begin.len() != n_driving
            || self.driving_end.len() != n_driving
            || self.driving_increment.len() != n_driving
        {
            return Err("the driving variable buffers have an incorrect size");
        }
        if self.material_properties.len() != usize::max(1, self.n_material_properties) {
            return Err("the material properties buffer has an incorrect size");
        }
        if self.internal_values.len() != usize::max(1, self.n_internal_values) {
            return Err("the internal values buffer has an incorrect size");
        }
        let n_ev = usize::max(1, self.n_external_variables);
        if self.external_variables.len() != n_ev || self.external_variables_increments.len() != n_ev {
            return Err("the external variables buffers have an incorrect size");
        }
        if self.tangent.len() != n_force * n_driving {
            return Err("the tangent buffer has an incorrect size");
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
