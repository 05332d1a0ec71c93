use serde::{Deserialize, Serialize};

/// Defines the kinematic category of a behaviour
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum BehaviourKind {
    /// Generic behaviour with user-defined gradients and fluxes (treated as symmetric tensors)
    General,

    /// Small strain behaviour (strain → stress)
    SmallStrain,

    /// Finite strain behaviour (deformation gradient → Cauchy stress)
    FiniteStrain,

    /// Cohesive zone model (opening displacement → traction)
    CohesiveZone,
}

/// Defines the material symmetry
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum Symmetry {
    Isotropic,
    Orthotropic,
}

/// Defines the kind of stiffness (tangent) operator requested from a behaviour
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum StiffnessRequest {
    /// Elastic stiffness computed from the material properties
    Elastic,

    /// Secant operator
    Secant,

    /// Tangent operator (not consistent with the time discretisation)
    Tangent,

    /// Consistent tangent operator
    ConsistentTangent,
}

impl StiffnessRequest {
    /// Returns the flag written into the stiffness buffer by UMAT-like hosts
    ///
    /// Prediction requests are encoded with a negative sign.
    ///
    /// ```text
    /// integrate:  1 elastic, 2 secant, 3 tangent, 4 consistent tangent
    /// prediction: -1 elastic, -2 secant, -3 tangent
    /// ```
    pub fn host_flag(&self, prediction: bool) -> Option<f64> {
        let flag = match self {
            StiffnessRequest::Elastic => 1.0,
            StiffnessRequest::Secant => 2.0,
            StiffnessRequest::Tangent => 3.0,
            StiffnessRequest::ConsistentTangent => 4.0,
        };
        if prediction {
            if *self == StiffnessRequest::ConsistentTangent {
                return None;
            }
            return Some(-flag);
        }
        Some(flag)
    }
}

/// Defines the families of host conventions (plugin ABIs of finite element solvers)
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum HostFamily {
    /// Host-neutral convention used by behaviours written in Rust
    Generic,

    /// Cast3M UMAT-like interface
    Castem,

    /// Code_Aster interface
    Aster,

    /// Abaqus/Standard UMAT interface
    Abaqus,

    /// Cyrano (1D fuel performance) interface
    Cyrano,

    /// Europlexus (explicit dynamics, finite strain) interface
    Europlexus,

    /// CalculiX interface
    CalculiX,
}

impl HostFamily {
    /// Lists all host families
    pub const ALL: [HostFamily; 7] = [
        HostFamily::Generic,
        HostFamily::Castem,
        HostFamily::Aster,
        HostFamily::Abaqus,
        HostFamily::Cyrano,
        HostFamily::Europlexus,
        HostFamily::CalculiX,
    ];
}

/// Defines how out-of-bounds arguments are treated by a behaviour
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum OutOfBoundsPolicy {
    /// Bounds are not checked
    None,

    /// Violating the normal bounds produces a flagged result
    Warning,

    /// Violating the normal bounds is a failure
    Strict,
}

/// Defines the type of an internal state variable
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum VariableType {
    Scalar,
    Stensor,
    Tensor,
    Vector,
}

/// Defines the storage order of matrices exchanged with a host
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum StorageOrder {
    RowMajor,
    ColMajor,
}

/// Defines who applies the basis rotation for orthotropic behaviours
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum RotationHandling {
    /// The rotation matrix is forwarded and the behaviour rotates internally
    ByBehaviour,

    /// The driver rotates inputs to the material frame and outputs back to the global frame
    ByDriver,

    /// No rotation is possible (1D hypotheses)
    None,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
