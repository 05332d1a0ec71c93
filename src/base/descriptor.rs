use super::{BehaviourKind, HostFamily, Hypothesis, Symmetry, VariableType, AXIAL_STRAIN};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Holds the name and type of an internal state variable
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct InternalVariable {
    /// Name of the variable
    pub name: String,

    /// Type of the variable
    pub var_type: VariableType,
}

impl InternalVariable {
    /// Allocates a new instance
    pub fn new(name: &str, var_type: VariableType) -> Self {
        InternalVariable {
            name: name.to_string(),
            var_type,
        }
    }

    /// Returns the number of components for a given hypothesis
    pub fn size(&self, hypothesis: Hypothesis) -> usize {
        match self.var_type {
            VariableType::Scalar => 1,
            VariableType::Stensor => hypothesis.stensor_size(),
            VariableType::Tensor => hypothesis.tensor_size(),
            VariableType::Vector => hypothesis.vector_size(),
        }
    }
}

/// Holds the static metadata of a behaviour
///
/// The descriptor is built once (in code or from a JSON file) and is shared
/// read-only by every material point using the behaviour.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BehaviourDescriptor {
    /// Name of the behaviour (used in messages only)
    pub name: String,

    /// Kinematic category
    pub kind: BehaviourKind,

    /// Material symmetry
    pub symmetry: Symmetry,

    /// The stiffness tensor is computed by the host from the material properties
    pub requires_stiffness_tensor: bool,

    /// The thermal expansion tensor is computed by the host from the material properties
    pub requires_thermal_expansion_tensor: bool,

    /// Ordered names of the material properties declared by the behaviour
    pub material_properties: Vec<String>,

    /// Ordered internal state variables
    pub internal_variables: Vec<InternalVariable>,

    /// Ordered names of the external state variables, excluding the temperature
    pub external_variables: Vec<String>,

    /// Supported modelling hypotheses
    pub hypotheses: Vec<Hypothesis>,

    /// Plane stress is handled by calling the generalised plane strain version
    /// with an extra axial strain internal variable
    pub generic_plane_stress: bool,
}

impl BehaviourDescriptor {
    /// Allocates a new instance supporting all hypotheses
    pub fn new(name: &str, kind: BehaviourKind, symmetry: Symmetry) -> Self {
        let hypotheses = match kind {
            BehaviourKind::CohesiveZone => vec![
                Hypothesis::PlaneStress,
                Hypothesis::PlaneStrain,
                Hypothesis::GeneralisedPlaneStrain,
                Hypothesis::Tridimensional,
            ],
            _ => Hypothesis::ALL.to_vec(),
        };
        BehaviourDescriptor {
            name: name.to_string(),
            kind,
            symmetry,
            requires_stiffness_tensor: false,
            requires_thermal_expansion_tensor: false,
            material_properties: Vec::new(),
            internal_variables: Vec::new(),
            external_variables: Vec::new(),
            hypotheses,
            generic_plane_stress: false,
        }
    }

    /// Reads a JSON file containing the descriptor
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open descriptor file")?;
        let buffered = BufReader::new(input);
        let descriptor: BehaviourDescriptor =
            serde_json::from_reader(buffered).map_err(|_| "cannot parse descriptor file")?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Parses a JSON string containing the descriptor
    pub fn from_json(json: &str) -> Result<Self, StrError> {
        let descriptor: BehaviourDescriptor =
            serde_json::from_str(json).map_err(|_| "cannot parse descriptor JSON string")?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Checks the consistency of the metadata
    pub fn validate(&self) -> Result<(), StrError> {
        if self.hypotheses.is_empty() {
            return Err("the behaviour must support at least one hypothesis");
        }
        if self.kind == BehaviourKind::CohesiveZone {
            for h in &self.hypotheses {
                if h.space_dim() == 1 {
                    return Err("cohesive zone models are not available in 1D");
                }
            }
        }
        for (i, name) in self.material_properties.iter().enumerate() {
            if name.is_empty() {
                return Err("material property names must not be empty");
            }
            if self.material_properties[..i].contains(name) {
                return Err("material property names must be unique");
            }
        }
        for (i, var) in self.internal_variables.iter().enumerate() {
            if var.name.is_empty() {
                return Err("internal variable names must not be empty");
            }
            if self.internal_variables[..i].iter().any(|v| v.name == var.name) {
                return Err("internal variable names must be unique");
            }
        }
        Ok(())
    }

    /// Indicates whether the hypothesis is supported, either natively or via the generic plane stress algorithm
    pub fn supports(&self, hypothesis: Hypothesis) -> bool {
        if self.hypotheses.contains(&hypothesis) {
            return true;
        }
        hypothesis == Hypothesis::PlaneStress
            && self.generic_plane_stress
            && self.hypotheses.contains(&Hypothesis::GeneralisedPlaneStrain)
    }

    /// Indicates that plane stress is emulated with the generic plane stress algorithm
    pub fn uses_generic_plane_stress(&self, hypothesis: Hypothesis) -> bool {
        hypothesis == Hypothesis::PlaneStress
            && self.generic_plane_stress
            && !self.hypotheses.contains(&Hypothesis::PlaneStress)
    }

    /// Returns the hypothesis actually used when calling the behaviour
    pub fn effective_hypothesis(&self, hypothesis: Hypothesis) -> Hypothesis {
        if self.uses_generic_plane_stress(hypothesis) {
            Hypothesis::GeneralisedPlaneStrain
        } else {
            hypothesis
        }
    }

    /// Returns the ordered names of the internal variables as seen by the caller
    pub fn internal_variable_names(&self, hypothesis: Hypothesis) -> Vec<String> {
        let mut names: Vec<String> = self.internal_variables.iter().map(|v| v.name.clone()).collect();
        if self.uses_generic_plane_stress(hypothesis) {
            names.push(AXIAL_STRAIN.to_string());
        }
        names
    }

    /// Returns the total number of internal values (components of all internal variables)
    pub fn n_internal_values(&self, hypothesis: Hypothesis) -> usize {
        let h = self.effective_hypothesis(hypothesis);
        let mut n: usize = self.internal_variables.iter().map(|v| v.size(h)).sum();
        if self.uses_generic_plane_stress(hypothesis) {
            n += 1;
        }
        n
    }

    /// Returns the number of external state variables including the temperature
    pub fn n_external_variables(&self) -> usize {
        1 + self.external_variables.len()
    }

    /// Returns the ordered names of the material properties expected by a host family
    ///
    /// Some hosts insert the elastic properties (and a few others) before the
    /// properties declared by the behaviour.
    pub fn host_material_property_names(&self, family: HostFamily, hypothesis: Hypothesis) -> Vec<String> {
        let prefix: Vec<&str> = match family {
            HostFamily::Castem => castem_prefix(self, hypothesis),
            HostFamily::Cyrano => cyrano_prefix(self),
            _ => Vec::new(),
        };
        let mut names: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
        for name in &self.material_properties {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Returns the material properties inserted by Cast3M before the behaviour's own
fn castem_prefix(descriptor: &BehaviourDescriptor, hypothesis: Hypothesis) -> Vec<&'static str> {
    if descriptor.kind == BehaviourKind::CohesiveZone {
        return vec![
            "NormalStiffness",
            "TangentialStiffness",
            "MassDensity",
            "NormalThermalExpansion",
        ];
    }
    let h = descriptor.effective_hypothesis(hypothesis);
    let mut names = match descriptor.symmetry {
        Symmetry::Isotropic => vec!["YoungModulus", "PoissonRatio", "MassDensity", "ThermalExpansion"],
        Symmetry::Orthotropic => match h {
            Hypothesis::AxisymmetricalGeneralisedPlaneStrain | Hypothesis::AxisymmetricalGeneralisedPlaneStress => vec![
                "YoungModulus1",
                "YoungModulus2",
                "YoungModulus3",
                "PoissonRatio12",
                "PoissonRatio23",
                "PoissonRatio13",
                "MassDensity",
                "ThermalExpansion1",
                "ThermalExpansion2",
                "ThermalExpansion3",
            ],
            Hypothesis::PlaneStress => vec![
                "YoungModulus1",
                "YoungModulus2",
                "PoissonRatio12",
                "ShearModulus12",
                "V1X",
                "V1Y",
                "YoungModulus3",
                "PoissonRatio23",
                "PoissonRatio13",
                "MassDensity",
                "ThermalExpansion1",
                "ThermalExpansion2",
            ],
            Hypothesis::Axisymmetrical | Hypothesis::PlaneStrain | Hypothesis::GeneralisedPlaneStrain => vec![
                "YoungModulus1",
                "YoungModulus2",
                "YoungModulus3",
                "PoissonRatio12",
                "PoissonRatio23",
                "PoissonRatio13",
                "ShearModulus12",
                "V1X",
                "V1Y",
                "MassDensity",
                "ThermalExpansion1",
                "ThermalExpansion2",
                "ThermalExpansion3",
            ],
            Hypothesis::Tridimensional => vec![
                "YoungModulus1",
                "YoungModulus2",
                "YoungModulus3",
                "PoissonRatio12",
                "PoissonRatio23",
                "PoissonRatio13",
                "ShearModulus12",
                "ShearModulus23",
                "ShearModulus13",
                "V1X",
                "V1Y",
                "V1Z",
                "V2X",
                "V2Y",
                "V2Z",
                "MassDensity",
                "ThermalExpansion1",
                "ThermalExpansion2",
                "ThermalExpansion3",
            ],
        },
    };
    if hypothesis == Hypothesis::PlaneStress {
        names.push("PlateWidth");
    }
    names
}

/// Returns the material properties inserted by Cyrano before the behaviour's own
fn cyrano_prefix(descriptor: &BehaviourDescriptor) -> Vec<&'static str> {
    let mut names = Vec::new();
    if descriptor.requires_stiffness_tensor {
        match descriptor.symmetry {
            Symmetry::Isotropic => names.extend(["YoungModulus", "PoissonRatio"]),
            Symmetry::Orthotropic => names.extend([
                "YoungModulus1",
                "YoungModulus2",
                "YoungModulus3",
                "PoissonRatio12",
                "PoissonRatio23",
                "PoissonRatio13",
            ]),
        }
    }
    if descriptor.requires_thermal_expansion_tensor {
        match descriptor.symmetry {
            Symmetry::Isotropic => names.push("ThermalExpansion"),
            Symmetry::Orthotropic => names.extend(["ThermalExpansion1", "ThermalExpansion2", "ThermalExpansion3"]),
        }
    }
    names
}

impl fmt::Display for BehaviourDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name = {}\n", self.name).unwrap();
        write!(f, "kind = {:?}\n", self.kind).unwrap();
        write!(f, "symmetry = {:?}\n", self.symmetry).unwrap();
        write!(f, "material_properties = {:?}\n", self.material_properties).unwrap();
        let names: Vec<_> = self.internal_variables.iter().map(|v| v.name.as_str()).collect();
        write!(f, "internal_variables = {:?}\n", names).unwrap();
        write!(f, "external_variables = {:?}\n", self.external_variables).unwrap();
        let hypotheses: Vec<_> = self.hypotheses.iter().map(|h| h.name()).collect();
        write!(f, "hypotheses = {:?}", hypotheses).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
