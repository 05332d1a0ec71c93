use super::{BehaviourDescriptor, BehaviourKind, Hypothesis, InternalVariable, Symmetry, VariableType};

/// Returns the descriptor of an isotropic elastic behaviour
pub fn sample_elastic_descriptor() -> BehaviourDescriptor {
    let mut desc = BehaviourDescriptor::new("Elasticity", BehaviourKind::SmallStrain, Symmetry::Isotropic);
    desc.material_properties = vec!["YoungModulus".to_string(), "PoissonRatio".to_string()];
    desc
}

/// Returns the descriptor of an isotropic Norton viscoplastic behaviour
pub fn sample_norton_descriptor() -> BehaviourDescriptor {
    let mut desc = BehaviourDescriptor::new("Norton", BehaviourKind::SmallStrain, Symmetry::Isotropic);
    desc.material_properties = vec![
        "YoungModulus".to_string(),
        "PoissonRatio".to_string(),
        "A".to_string(),
        "E".to_string(),
    ];
    desc.internal_variables = vec![
        InternalVariable::new("ElasticStrain", VariableType::Stensor),
        InternalVariable::new("EquivalentViscoplasticStrain", VariableType::Scalar),
    ];
    desc.hypotheses = vec![
        Hypothesis::AxisymmetricalGeneralisedPlaneStrain,
        Hypothesis::Axisymmetrical,
        Hypothesis::PlaneStress,
        Hypothesis::PlaneStrain,
        Hypothesis::GeneralisedPlaneStrain,
        Hypothesis::Tridimensional,
    ];
    desc
}

/// Returns the descriptor of an orthotropic elastic behaviour using the stiffness computed by the host
pub fn sample_orthotropic_descriptor() -> BehaviourDescriptor {
    let mut desc = BehaviourDescriptor::new("OrthotropicElasticity", BehaviourKind::SmallStrain, Symmetry::Orthotropic);
    desc.requires_stiffness_tensor = true;
    desc.internal_variables = vec![InternalVariable::new("ElasticStrain", VariableType::Stensor)];
    desc
}

/// Returns the descriptor of a finite strain behaviour
pub fn sample_finite_strain_descriptor() -> BehaviourDescriptor {
    let mut desc = BehaviourDescriptor::new("SaintVenantKirchhoff", BehaviourKind::FiniteStrain, Symmetry::Isotropic);
    desc.material_properties = vec!["YoungModulus".to_string(), "PoissonRatio".to_string()];
    desc
}

/// Returns the descriptor of a cohesive zone model
pub fn sample_cohesive_zone_descriptor() -> BehaviourDescriptor {
    let mut desc = BehaviourDescriptor::new("Tvergaard", BehaviourKind::CohesiveZone, Symmetry::Isotropic);
    desc.material_properties = vec!["NormalStiffness".to_string(), "TangentialStiffness".to_string()];
    desc.internal_variables = vec![InternalVariable::new("Damage", VariableType::Scalar)];
    desc
}
