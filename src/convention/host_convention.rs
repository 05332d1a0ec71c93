use super::{tangent_from_host, tangent_to_host, ComponentMap};
use crate::base::{BehaviourKind, HostFamily, Hypothesis, RotationHandling, StorageOrder, INV_SQRT_2, SQRT_2};
use crate::StrError;
use russell_lab::Matrix;

/// Holds the binary convention of a host family for a given behaviour kind and hypothesis
///
/// The host-neutral convention is:
///
/// ```text
/// symmetric tensors:     (xx, yy, zz, √2 xy, √2 yz, √2 zx)  (Mandel)
/// 1D symmetric tensors:  (rr, zz, θθ)
/// tensors:               (xx, yy, zz, xy, yx, xz, zx, yz, zy)
/// vectors (openings):    (normal, tangential 1, tangential 2)
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HostConvention {
    /// Host family
    pub family: HostFamily,

    /// Behaviour kind
    pub kind: BehaviourKind,

    /// Hypothesis seen by the caller
    pub hypothesis: Hypothesis,

    /// Map of the thermodynamic forces (stress, traction)
    pub force: ComponentMap,

    /// Map of the driving variables (strain, deformation gradient, opening)
    pub driving: ComponentMap,

    /// Storage order of the tangent operator
    pub storage: StorageOrder,

    /// Who applies the basis rotation for orthotropic behaviours
    pub rotation: RotationHandling,

    /// The requested stiffness is encoded in the first entry of the tangent buffer
    pub stiffness_flag_in_tangent: bool,
}

/// Returns the off-diagonal factors (stress, strain) of a family for symmetric tensors
fn shear_factors(family: HostFamily) -> (f64, f64) {
    match family {
        HostFamily::Generic => (1.0, 1.0),
        HostFamily::Castem | HostFamily::Aster | HostFamily::Abaqus => (INV_SQRT_2, SQRT_2),
        HostFamily::Cyrano => (1.0, 1.0),
        HostFamily::Europlexus => (INV_SQRT_2, 1.0),
        HostFamily::CalculiX => (INV_SQRT_2, INV_SQRT_2),
    }
}

/// Returns the neutral index of each host component of a symmetric tensor
fn stensor_permutation(family: HostFamily, hypothesis: Hypothesis) -> Vec<usize> {
    match (family, hypothesis.stensor_size()) {
        // host order (rr, θθ, zz)
        (HostFamily::Cyrano, 3) => vec![0, 2, 1],
        // reduced plane stress (xx, yy, xy)
        (HostFamily::Abaqus, 4) if hypothesis == Hypothesis::PlaneStress => vec![0, 1, 3],
        // host order (xx, yy, zz, xy, xz, yz)
        (HostFamily::Generic, 6) => (0..6).collect(),
        (_, 6) => vec![0, 1, 2, 3, 5, 4],
        (_, n) => (0..n).collect(),
    }
}

/// Returns the neutral index of each host component of an opening displacement
fn vector_permutation(family: HostFamily, hypothesis: Hypothesis) -> Vec<usize> {
    match (family, hypothesis.vector_size()) {
        // host order: tangential components first
        (HostFamily::Castem, 2) => vec![1, 0],
        (HostFamily::Castem, 3) => vec![1, 2, 0],
        (_, n) => (0..n).collect(),
    }
}

/// Lists the (kind, hypothesis) pairs handled by each host family
fn is_supported(family: HostFamily, kind: BehaviourKind, hypothesis: Hypothesis) -> bool {
    use BehaviourKind::*;
    use Hypothesis::*;
    match family {
        HostFamily::Generic => !(kind == CohesiveZone && hypothesis.space_dim() == 1),
        HostFamily::Castem => match kind {
            SmallStrain => hypothesis != AxisymmetricalGeneralisedPlaneStress,
            CohesiveZone => matches!(hypothesis, PlaneStress | PlaneStrain | GeneralisedPlaneStrain | Tridimensional),
            _ => false,
        },
        HostFamily::Aster => {
            kind == SmallStrain
                && matches!(
                    hypothesis,
                    Axisymmetrical | PlaneStress | PlaneStrain | GeneralisedPlaneStrain | Tridimensional
                )
        }
        HostFamily::Abaqus => {
            kind == SmallStrain && matches!(hypothesis, Axisymmetrical | PlaneStress | PlaneStrain | Tridimensional)
        }
        HostFamily::Cyrano => {
            kind == SmallStrain
                && matches!(
                    hypothesis,
                    AxisymmetricalGeneralisedPlaneStrain | AxisymmetricalGeneralisedPlaneStress
                )
        }
        HostFamily::Europlexus => {
            kind == FiniteStrain && matches!(hypothesis, Axisymmetrical | PlaneStress | PlaneStrain | Tridimensional)
        }
        HostFamily::CalculiX => kind == SmallStrain && hypothesis == Tridimensional,
    }
}

impl HostConvention {
    /// Allocates a new instance
    ///
    /// Returns an error if the host family cannot handle the behaviour kind or the hypothesis.
    pub fn new(family: HostFamily, kind: BehaviourKind, hypothesis: Hypothesis) -> Result<Self, StrError> {
        if !is_supported(family, kind, hypothesis) {
            return Err("the host family does not support this behaviour kind and hypothesis");
        }
        let (stress_shear, strain_shear) = shear_factors(family);
        let nstensor = hypothesis.stensor_size();
        let (force, driving) = match kind {
            BehaviourKind::General | BehaviourKind::SmallStrain => {
                let perm = stensor_permutation(family, hypothesis);
                (
                    ComponentMap::stensor(nstensor, &perm, stress_shear),
                    ComponentMap::stensor(nstensor, &perm, strain_shear),
                )
            }
            BehaviourKind::FiniteStrain => {
                let perm = stensor_permutation(family, hypothesis);
                (
                    ComponentMap::stensor(nstensor, &perm, stress_shear),
                    ComponentMap::identity(hypothesis.tensor_size()),
                )
            }
            BehaviourKind::CohesiveZone => {
                let perm = vector_permutation(family, hypothesis);
                let n = hypothesis.vector_size();
                (ComponentMap::permutation(n, &perm), ComponentMap::permutation(n, &perm))
            }
        };
        let storage = match family {
            HostFamily::CalculiX => StorageOrder::RowMajor,
            _ => StorageOrder::ColMajor,
        };
        let rotation = if hypothesis.space_dim() == 1 {
            RotationHandling::None
        } else {
            match family {
                HostFamily::Castem | HostFamily::Aster | HostFamily::Europlexus => RotationHandling::ByBehaviour,
                HostFamily::Generic | HostFamily::Abaqus | HostFamily::CalculiX => RotationHandling::ByDriver,
                HostFamily::Cyrano => RotationHandling::None,
            }
        };
        let stiffness_flag_in_tangent = matches!(
            family,
            HostFamily::Castem | HostFamily::Aster | HostFamily::Cyrano | HostFamily::Europlexus
        );
        Ok(HostConvention {
            family,
            kind,
            hypothesis,
            force,
            driving,
            storage,
            rotation,
            stiffness_flag_in_tangent,
        })
    }

    /// Returns the integer flag encoding the hypothesis, if the host expects one
    ///
    /// ```text
    /// Castem:     14 AGPS, 0 axisymmetrical, -2 plane stress, -1 plane strain, -3 GPS, 2 3D
    /// Aster:      4 axisymmetrical, 5 plane stress, 6 plane strain, 2 GPS, 3 3D
    /// Cyrano:     1 AGPS, 2 AGPStress
    /// Europlexus: 0 axisymmetrical, 1 plane strain, 2 plane stress, 3 3D
    /// ```
    pub fn hypothesis_flag(&self) -> Option<i32> {
        use Hypothesis::*;
        let h = self.hypothesis;
        match self.family {
            HostFamily::Castem => Some(match h {
                AxisymmetricalGeneralisedPlaneStrain | AxisymmetricalGeneralisedPlaneStress => 14,
                Axisymmetrical => 0,
                PlaneStress => -2,
                PlaneStrain => -1,
                GeneralisedPlaneStrain => -3,
                Tridimensional => 2,
            }),
            HostFamily::Aster => Some(match h {
                Axisymmetrical => 4,
                PlaneStress => 5,
                PlaneStrain => 6,
                GeneralisedPlaneStrain => 2,
                _ => 3,
            }),
            HostFamily::Cyrano => Some(match h {
                AxisymmetricalGeneralisedPlaneStress => 2,
                _ => 1,
            }),
            HostFamily::Europlexus => Some(match h {
                Axisymmetrical => 0,
                PlaneStrain => 1,
                PlaneStress => 2,
                _ => 3,
            }),
            _ => None,
        }
    }

    /// Returns the number of stress components seen by the host (NTENS)
    pub fn n_host_force(&self) -> usize {
        self.force.host_size()
    }

    /// Returns the number of driving variable components seen by the host
    pub fn n_host_driving(&self) -> usize {
        self.driving.host_size()
    }

    /// Converts the thermodynamic force to the host convention
    pub fn force_to_host(&self, host: &mut [f64], neutral: &[f64]) {
        self.force.to_host(host, neutral);
    }

    /// Converts the thermodynamic force from the host convention
    pub fn force_from_host(&self, neutral: &mut [f64], host: &[f64]) {
        self.force.from_host(neutral, host);
    }

    /// Converts the driving variable to the host convention
    pub fn driving_to_host(&self, host: &mut [f64], neutral: &[f64]) {
        self.driving.to_host(host, neutral);
    }

    /// Converts the driving variable from the host convention
    pub fn driving_from_host(&self, neutral: &mut [f64], host: &[f64]) {
        self.driving.from_host(neutral, host);
    }

    /// Converts the tangent operator returned by the host
    pub fn tangent_from_host(&self, kk: &mut Matrix, host: &[f64]) {
        tangent_from_host(kk, host, &self.force, &self.driving, self.storage);
    }

    /// Converts a host-neutral tangent operator to the host convention
    pub fn tangent_to_host(&self, host: &mut [f64], kk: &Matrix) {
        tangent_to_host(host, kk, &self.force, &self.driving, self.storage);
    }
}

/// Decodes the hypothesis from the integer flag of a host family
///
/// An unknown flag is a configuration error.
pub fn decode_hypothesis_flag(family: HostFamily, flag: i32) -> Result<Hypothesis, StrError> {
    use Hypothesis::*;
    match family {
        HostFamily::Castem => match flag {
            14 => Ok(AxisymmetricalGeneralisedPlaneStrain),
            0 => Ok(Axisymmetrical),
            -2 => Ok(PlaneStress),
            -1 => Ok(PlaneStrain),
            -3 => Ok(GeneralisedPlaneStrain),
            2 => Ok(Tridimensional),
            _ => Err("unknown Castem hypothesis flag"),
        },
        HostFamily::Aster => match flag {
            4 => Ok(Axisymmetrical),
            5 => Ok(PlaneStress),
            6 => Ok(PlaneStrain),
            2 => Ok(GeneralisedPlaneStrain),
            3 => Ok(Tridimensional),
            _ => Err("unknown Aster hypothesis flag"),
        },
        HostFamily::Cyrano => match flag {
            1 => Ok(AxisymmetricalGeneralisedPlaneStrain),
            2 => Ok(AxisymmetricalGeneralisedPlaneStress),
            _ => Err("unknown Cyrano hypothesis flag"),
        },
        HostFamily::Europlexus => match flag {
            0 => Ok(Axisymmetrical),
            1 => Ok(PlaneStrain),
            2 => Ok(PlaneStress),
            3 => Ok(Tridimensional),
            _ => Err("unknown Europlexus hypothesis flag"),
        },
        _ => Err("this host family does not encode the hypothesis with a flag"),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
