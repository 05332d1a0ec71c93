use super::BehaviourKind;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines the modelling hypotheses
///
/// A modelling hypothesis is a simplification of the 3D kinematics fixing the
/// space dimension and the number of components of the tensors handled by a behaviour.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Hypothesis {
    /// Axisymmetrical generalised plane strain (1D, radial)
    AxisymmetricalGeneralisedPlaneStrain,

    /// Axisymmetrical generalised plane stress (1D, radial)
    AxisymmetricalGeneralisedPlaneStress,

    /// Axisymmetrical (2D, r-z)
    Axisymmetrical,

    /// Plane stress (2D)
    PlaneStress,

    /// Plane strain (2D)
    PlaneStrain,

    /// Generalised plane strain (2D)
    GeneralisedPlaneStrain,

    /// Tridimensional
    Tridimensional,
}

/// Holds the sizes associated with a modelling hypothesis
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HypothesisInfo {
    /// Name used in descriptors and input files
    pub name: &'static str,

    /// Space dimension
    pub space_dim: usize,

    /// Number of components of a symmetric second-order tensor
    pub stensor_size: usize,

    /// Number of components of a non-symmetric second-order tensor
    pub tensor_size: usize,

    /// Number of components of a vector
    pub vector_size: usize,
}

/// Holds the sizes of every hypothesis (the order matches `Hypothesis::ALL`)
const HYPOTHESIS_TABLE: [HypothesisInfo; 7] = [
    HypothesisInfo {
        name: "AxisymmetricalGeneralisedPlaneStrain",
        space_dim: 1,
        stensor_size: 3,
        tensor_size: 3,
        vector_size: 1,
    },
    HypothesisInfo {
        name: "AxisymmetricalGeneralisedPlaneStress",
        space_dim: 1,
        stensor_size: 3,
        tensor_size: 3,
        vector_size: 1,
    },
    HypothesisInfo {
        name: "Axisymmetrical",
        space_dim: 2,
        stensor_size: 4,
        tensor_size: 5,
        vector_size: 2,
    },
    HypothesisInfo {
        name: "PlaneStress",
        space_dim: 2,
        stensor_size: 4,
        tensor_size: 5,
        vector_size: 2,
    },
    HypothesisInfo {
        name: "PlaneStrain",
        space_dim: 2,
        stensor_size: 4,
        tensor_size: 5,
        vector_size: 2,
    },
    HypothesisInfo {
        name: "GeneralisedPlaneStrain",
        space_dim: 2,
        stensor_size: 4,
        tensor_size: 5,
        vector_size: 2,
    },
    HypothesisInfo {
        name: "Tridimensional",
        space_dim: 3,
        stensor_size: 6,
        tensor_size: 9,
        vector_size: 3,
    },
];

impl Hypothesis {
    /// Lists all hypotheses
    pub const ALL: [Hypothesis; 7] = [
        Hypothesis::AxisymmetricalGeneralisedPlaneStrain,
        Hypothesis::AxisymmetricalGeneralisedPlaneStress,
        Hypothesis::Axisymmetrical,
        Hypothesis::PlaneStress,
        Hypothesis::PlaneStrain,
        Hypothesis::GeneralisedPlaneStrain,
        Hypothesis::Tridimensional,
    ];

    /// Returns the sizes associated with this hypothesis
    pub fn info(&self) -> &'static HypothesisInfo {
        &HYPOTHESIS_TABLE[*self as usize]
    }

    /// Finds a hypothesis by its name
    pub fn from_name(name: &str) -> Result<Self, StrError> {
        for h in Hypothesis::ALL {
            if h.info().name == name {
                return Ok(h);
            }
        }
        Err("unknown modelling hypothesis name")
    }

    /// Returns the name of this hypothesis
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Returns the space dimension
    pub fn space_dim(&self) -> usize {
        self.info().space_dim
    }

    /// Returns the number of components of symmetric tensors
    pub fn stensor_size(&self) -> usize {
        self.info().stensor_size
    }

    /// Returns the number of components of non-symmetric tensors
    pub fn tensor_size(&self) -> usize {
        self.info().tensor_size
    }

    /// Returns the number of components of vectors
    pub fn vector_size(&self) -> usize {
        self.info().vector_size
    }

    /// Returns the size of the driving variable (strain, deformation gradient, opening displacement)
    pub fn driving_variable_size(&self, kind: BehaviourKind) -> usize {
        match kind {
            BehaviourKind::General | BehaviourKind::SmallStrain => self.stensor_size(),
            BehaviourKind::FiniteStrain => self.tensor_size(),
            BehaviourKind::CohesiveZone => self.vector_size(),
        }
    }

    /// Returns the size of the thermodynamic force (stress, traction)
    pub fn thermodynamic_force_size(&self, kind: BehaviourKind) -> usize {
        match kind {
            BehaviourKind::General | BehaviourKind::SmallStrain | BehaviourKind::FiniteStrain => self.stensor_size(),
            BehaviourKind::CohesiveZone => self.vector_size(),
        }
    }

    /// Returns `(space_dim, driving_variable_size, thermodynamic_force_size)`
    pub fn sizes(&self, kind: BehaviourKind) -> (usize, usize, usize) {
        (
            self.space_dim(),
            self.driving_variable_size(kind),
            self.thermodynamic_force_size(kind),
        )
    }

    /// Indicates that the out-of-plane stress vanishes
    pub fn is_plane_stress(&self) -> bool {
        matches!(
            self,
            Hypothesis::PlaneStress | Hypothesis::AxisymmetricalGeneralisedPlaneStress
        )
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
