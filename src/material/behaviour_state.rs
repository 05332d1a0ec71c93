use crate::base::{BehaviourDescriptor, BehaviourKind, HostFamily, Hypothesis};
use crate::StrError;
use russell_lab::{Matrix, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Holds the mechanical state of a material point over one time step
///
/// All vectors are expressed in the host-neutral convention and in the global frame.
/// Their sizes are fixed by [BehaviourState::allocate] and never change afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BehaviourState {
    /// Modelling hypothesis used to size the vectors
    pub hypothesis: Hypothesis,

    /// Kinematic category of the behaviour
    pub kind: BehaviourKind,

    /// Thermodynamic force at the beginning of the step
    pub stress_begin: Vector,

    /// Thermodynamic force at the end of the step
    pub stress_end: Vector,

    /// Driving variable at the beginning of the step
    pub strain_begin: Vector,

    /// Driving variable at the end of the step
    pub strain_end: Vector,

    /// Material properties (order given by the host family)
    pub material_properties: Vector,

    /// Internal state variables at the beginning of the step (layout owned by the behaviour)
    pub internal_values_begin: Vector,

    /// Internal state variables at the end of the step
    pub internal_values_end: Vector,

    /// External state variables at the beginning of the step (the temperature comes first)
    pub external_variables: Vector,

    /// Increments of the external state variables
    pub external_variables_increments: Vector,

    /// Rotation matrix from the global frame to the material frame (3×3)
    pub rotation: Matrix,
}

impl BehaviourState {
    /// Allocates a new instance with all values set to zero
    ///
    /// The deformation gradients of finite strain behaviours are set to the identity
    /// and the rotation matrix is set to the identity.
    pub fn allocate(hypothesis: Hypothesis, descriptor: &BehaviourDescriptor, family: HostFamily) -> Result<Self, StrError> {
        if !descriptor.supports(hypothesis) {
            return Err("the behaviour does not support this modelling hypothesis");
        }
        let kind = descriptor.kind;
        let n_driving = hypothesis.driving_variable_size(kind);
        let n_force = hypothesis.thermodynamic_force_size(kind);
        let n_mp = descriptor.host_material_property_names(family, hypothesis).len();
        let n_iv = descriptor.n_internal_values(hypothesis);
        let n_ev = descriptor.n_external_variables();
        let mut strain_begin = Vector::new(n_driving);
        if kind == BehaviourKind::FiniteStrain {
            for i in 0..3 {
                strain_begin[i] = 1.0;
            }
        }
        let mut rotation = Matrix::new(3, 3);
        for i in 0..3 {
            rotation.set(i, i, 1.0);
        }
        Ok(BehaviourState {
            hypothesis,
            kind,
            stress_begin: Vector::new(n_force),
            stress_end: Vector::new(n_force),
            strain_end: strain_begin.clone(),
            strain_begin,
            material_properties: Vector::new(n_mp),
            internal_values_begin: Vector::new(n_iv),
            internal_values_end: Vector::new(n_iv),
            external_variables: Vector::new(n_ev),
            external_variables_increments: Vector::new(n_ev),
            rotation,
        })
    }

    /// Accepts the end-of-step values as the beginning of the next step
    ///
    /// ```text
    /// _begin := _end
    /// external_variables += external_variables_increments
    /// external_variables_increments := 0
    /// ```
    ///
    /// The external variables have no end-of-step copy and are advanced here.
    pub fn commit(&mut self) {
        self.stress_begin.as_mut_data().copy_from_slice(self.stress_end.as_data());
        self.strain_begin.as_mut_data().copy_from_slice(self.strain_end.as_data());
        self.internal_values_begin
            .as_mut_data()
            .copy_from_slice(self.internal_values_end.as_data());
        for i in 0..self.external_variables.dim() {
            self.external_variables[i] += self.external_variables_increments[i];
        }
        self.external_variables_increments.fill(0.0);
    }

    /// Discards the end-of-step values
    ///
    /// ```text
    /// _end := _begin
    /// ```
    pub fn revert(&mut self) {
        self.stress_end.as_mut_data().copy_from_slice(self.stress_begin.as_data());
        self.strain_end.as_mut_data().copy_from_slice(self.strain_begin.as_data());
        self.internal_values_end
            .as_mut_data()
            .copy_from_slice(self.internal_values_begin.as_data());
    }

    /// Returns the temperature at the beginning of the step
    pub fn temperature(&self) -> f64 {
        self.external_variables[0]
    }

    /// Sets the temperature at the beginning of the step and its increment
    pub fn set_temperature(&mut self, value: f64, increment: f64) -> &mut Self {
        self.external_variables[0] = value;
        self.external_variables_increments[0] = increment;
        self
    }

    /// Sets the driving variable at the end of the step from an increment
    ///
    /// ```text
    /// strain_end := strain_begin + increment
    /// ```
    pub fn set_strain_increment(&mut self, increment: &[f64]) -> Result<&mut Self, StrError> {
        if increment.len() != self.strain_begin.dim() {
            return Err("the strain increment has an incorrect number of components");
        }
        for i in 0..increment.len() {
            self.strain_end[i] = self.strain_begin[i] + increment[i];
        }
        Ok(self)
    }

    /// Returns the increment of the driving variable
    pub fn strain_increment(&self) -> Vector {
        let mut increment = Vector::new(self.strain_begin.dim());
        for i in 0..increment.dim() {
            increment[i] = self.strain_end[i] - self.strain_begin[i];
        }
        increment
    }

    /// Checks the sizes of all vectors against the hypothesis table and the descriptor
    pub fn check_sizes(&self, descriptor: &BehaviourDescriptor, family: HostFamily) -> Result<(), StrError> {
        let h = self.hypothesis;
        let kind = descriptor.kind;
        if kind != self.kind {
            return Err("the state was allocated for another kind of behaviour");
        }
        let n_driving = h.driving_variable_size(kind);
        let n_force = h.thermodynamic_force_size(kind);
        if self.stress_begin.dim() != n_force || self.stress_end.dim() != n_force {
            return Err("the thermodynamic force has an incorrect number of components");
        }
        if self.strain_begin.dim() != n_driving || self.strain_end.dim() != n_driving {
            return Err("the driving variable has an incorrect number of components");
        }
        if self.material_properties.dim() != descriptor.host_material_property_names(family, h).len() {
            return Err("the number of material properties is incorrect");
        }
        let n_iv = descriptor.n_internal_values(h);
        if self.internal_values_begin.dim() != n_iv || self.internal_values_end.dim() != n_iv {
            return Err("the number of internal state variables is incorrect");
        }
        let n_ev = descriptor.n_external_variables();
        if self.external_variables.dim() != n_ev || self.external_variables_increments.dim() != n_ev {
            return Err("the number of external state variables is incorrect");
        }
        if self.rotation.dims() != (3, 3) {
            return Err("the rotation matrix must be 3×3");
        }
        Ok(())
    }
}

impl fmt::Display for BehaviourState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hypothesis = {}\n", self.hypothesis).unwrap();
        write!(f, "stress_begin = {:?}\n", self.stress_begin.as_data()).unwrap();
        write!(f, "stress_end = {:?}\n", self.stress_end.as_data()).unwrap();
        write!(f, "strain_begin = {:?}\n", self.strain_begin.as_data()).unwrap();
        write!(f, "strain_end = {:?}\n", self.strain_end.as_data()).unwrap();
        write!(f, "internal_values_begin = {:?}\n", self.internal_values_begin.as_data()).unwrap();
        write!(f, "internal_values_end = {:?}", self.internal_values_end.as_data()).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
