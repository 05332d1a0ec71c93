use mbdriver::base::SQRT_2;
use mbdriver::convention::{rotate_stensor, Direction};
use mbdriver::material::{orthotropic_stiffness, OrthotropicElasticity};
use mbdriver::native::{CallBlock, CallOutcome, STATUS_INVALID_RESULT};
use mbdriver::prelude::*;
use russell_lab::{approx_eq, Matrix};

const PROPERTIES: [(&str, f64); 9] = [
    ("YoungModulus1", 200e9),
    ("YoungModulus2", 50e9),
    ("YoungModulus3", 20e9),
    ("PoissonRatio12", 0.25),
    ("PoissonRatio23", 0.3),
    ("PoissonRatio13", 0.2),
    ("ShearModulus12", 10e9),
    ("ShearModulus23", 8e9),
    ("ShearModulus13", 6e9),
];

/// Implements an orthotropic elastic law written in the material frame
struct Orthotropic {
    descriptor: BehaviourDescriptor,
}

impl Orthotropic {
    fn new() -> Self {
        let mut descriptor = BehaviourDescriptor::new("OrthotropicElasticity", BehaviourKind::SmallStrain, Symmetry::Orthotropic);
        descriptor.material_properties = PROPERTIES.iter().map(|(name, _)| name.to_string()).collect();
        Orthotropic { descriptor }
    }
}

fn parameters(values: &[f64]) -> OrthotropicElasticity {
    OrthotropicElasticity {
        young1: values[0],
        young2: values[1],
        young3: values[2],
        poisson12: values[3],
        poisson23: values[4],
        poisson13: values[5],
        shear12: values[6],
        shear23: values[7],
        shear13: values[8],
    }
}

impl BehaviourContract for Orthotropic {
    fn descriptor(&self) -> &BehaviourDescriptor {
        &self.descriptor
    }

    fn host_family(&self) -> HostFamily {
        HostFamily::Generic
    }

    fn default_stiffness_request(&self) -> StiffnessRequest {
        StiffnessRequest::ConsistentTangent
    }

    fn supports_stiffness_request(&self, request: StiffnessRequest, prediction: bool) -> bool {
        request == StiffnessRequest::ConsistentTangent && !prediction
    }

    fn compute_prediction_operator(&self, _block: &mut CallBlock) -> CallOutcome {
        CallOutcome::failure(-2, "no prediction operator")
    }

    fn integrate(&self, block: &mut CallBlock) -> CallOutcome {
        // the driver has already rotated the inputs
        for i in 0..3 {
            for j in 0..3 {
                let delta = if i == j { 1.0 } else { 0.0 };
                if block.rotation(i, j) != delta {
                    return CallOutcome::failure(STATUS_INVALID_RESULT, "unexpected rotation matrix");
                }
            }
        }
        let n = block.n_force();
        let mut dd = Matrix::new(n, n);
        let param = parameters(&block.material_properties);
        if let Err(message) = orthotropic_stiffness(&mut dd, &param, block.convention.hypothesis) {
            return CallOutcome::failure(STATUS_INVALID_RESULT, message);
        }
        for i in 0..n {
            for j in 0..n {
                block.stress[i] += dd.get(i, j) * block.driving_increment[j];
                block.tangent[i + j * n] = dd.get(i, j);
            }
        }
        CallOutcome::success(1.0)
    }
}

/// Returns the rotation by 90° about z (the material x axis is the global y axis)
fn rotation_about_z() -> Matrix {
    Matrix::from(&[[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
}

fn initial_state(behaviour: &Orthotropic, hypothesis: Hypothesis) -> BehaviourState {
    let mut state = BehaviourState::allocate(hypothesis, behaviour.descriptor(), HostFamily::Generic).unwrap();
    for (i, (_, value)) in PROPERTIES.iter().enumerate() {
        state.material_properties[i] = *value;
    }
    state.rotation = rotation_about_z();
    state
}

fn material_stiffness(hypothesis: Hypothesis) -> Matrix {
    let n = hypothesis.stensor_size();
    let values: Vec<f64> = PROPERTIES.iter().map(|(_, v)| *v).collect();
    let mut dd = Matrix::new(n, n);
    orthotropic_stiffness(&mut dd, &parameters(&values), hypothesis).unwrap();
    dd
}

#[test]
fn test_rotate_stensor_round_trip() {
    let rr = rotation_about_z();
    let t = [1.0, 2.0, 3.0, 4.0 * SQRT_2, 5.0 * SQRT_2, 6.0 * SQRT_2];
    let mut material = [0.0; 6];
    let mut global = [0.0; 6];
    rotate_stensor(&mut material, &t, &rr, Direction::Forward).unwrap();
    approx_eq(material[0], 2.0, 1e-15);
    approx_eq(material[1], 1.0, 1e-15);
    approx_eq(material[2], 3.0, 1e-15);
    approx_eq(material[3], -4.0 * SQRT_2, 1e-14);
    rotate_stensor(&mut global, &material, &rr, Direction::Backward).unwrap();
    for i in 0..6 {
        approx_eq(global[i], t[i], 1e-14);
    }
}

#[test]
fn test_orthotropic_behaviour_is_rotated_by_the_driver() {
    let behaviour = Orthotropic::new();
    let settings = DriverSettings::new();
    let driver = IntegrationDriver::new(&behaviour, &settings).unwrap();
    let mut workspace = Workspace::new();
    for h in [Hypothesis::Tridimensional, Hypothesis::PlaneStrain] {
        let n = h.stensor_size();
        let dd = material_stiffness(h);
        let mut state = initial_state(&behaviour, h);
        let mut increment = vec![0.0; n];
        increment[0] = 1e-3;
        state.set_strain_increment(&increment).unwrap();
        let outcome = driver
            .integrate(&mut state, 1.0, h, StiffnessRequest::ConsistentTangent, &mut workspace)
            .unwrap();

        // global xx is the material yy direction
        approx_eq(state.stress_end[0] / 1e6, dd.get(1, 1) * 1e-3 / 1e6, 1e-9);
        approx_eq(state.stress_end[1] / 1e6, dd.get(0, 1) * 1e-3 / 1e6, 1e-9);
        approx_eq(state.stress_end[2] / 1e6, dd.get(2, 1) * 1e-3 / 1e6, 1e-9);
        approx_eq(state.stress_end[3] / 1e6, 0.0, 1e-9);
        approx_eq(outcome.tangent.get(0, 0) / 1e9, dd.get(1, 1) / 1e9, 1e-12);
        approx_eq(outcome.tangent.get(1, 1) / 1e9, dd.get(0, 0) / 1e9, 1e-12);
        approx_eq(outcome.tangent.get(0, 1) / 1e9, dd.get(1, 0) / 1e9, 1e-12);
        approx_eq(outcome.tangent.get(3, 3) / 1e9, dd.get(3, 3) / 1e9, 1e-12);
    }
}

#[test]
fn test_elastic_prediction_is_rotated_back() {
    let behaviour = Orthotropic::new();
    let settings = DriverSettings::new();
    let driver = IntegrationDriver::new(&behaviour, &settings).unwrap();
    let mut workspace = Workspace::new();
    let h = Hypothesis::Tridimensional;
    let dd = material_stiffness(h);
    let state = initial_state(&behaviour, h);
    let kk = driver
        .compute_prediction_operator(&state, h, StiffnessRequest::Elastic, &mut workspace)
        .unwrap();
    approx_eq(kk.get(0, 0) / 1e9, dd.get(1, 1) / 1e9, 1e-12);
    approx_eq(kk.get(1, 1) / 1e9, dd.get(0, 0) / 1e9, 1e-12);
    approx_eq(kk.get(2, 2) / 1e9, dd.get(2, 2) / 1e9, 1e-12);
    approx_eq(kk.get(4, 4) / 1e9, dd.get(5, 5) / 1e9, 1e-12);
    approx_eq(kk.get(5, 5) / 1e9, dd.get(4, 4) / 1e9, 1e-12);
}

#[test]
fn test_invalid_rotation_matrix_is_rejected() {
    let behaviour = Orthotropic::new();
    let settings = DriverSettings::new();
    let driver = IntegrationDriver::new(&behaviour, &settings).unwrap();
    let mut workspace = Workspace::new();
    let h = Hypothesis::Tridimensional;
    let mut state = initial_state(&behaviour, h);
    state.rotation.set(0, 0, 2.0);
    let original = state.clone();
    state.set_strain_increment(&[1e-3, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
    let res = driver.integrate(&mut state, 1.0, h, StiffnessRequest::ConsistentTangent, &mut workspace);
    assert!(matches!(res, Err(IntegrationFailure::InvalidConfiguration(_))));
    assert_eq!(state.stress_end.as_data(), original.stress_end.as_data());
    assert_eq!(workspace.stage(), DriverStage::RolledBack);
}

#[test]
fn test_out_of_plane_rotation_is_rejected_in_2d() {
    let behaviour = Orthotropic::new();
    let settings = DriverSettings::new();
    let driver = IntegrationDriver::new(&behaviour, &settings).unwrap();
    let mut workspace = Workspace::new();
    let h = Hypothesis::PlaneStrain;
    let mut state = initial_state(&behaviour, h);
    // 90° about x: a valid 3D rotation that tilts the out-of-plane axis
    state.rotation = Matrix::from(&[[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]]);
    state.set_strain_increment(&[1e-3, 2e-3, 0.0, 4e-4]).unwrap();
    let original = state.clone();
    let res = driver.integrate(&mut state, 1.0, h, StiffnessRequest::ConsistentTangent, &mut workspace);
    assert_eq!(
        res.err(),
        Some(IntegrationFailure::InvalidConfiguration(
            "the rotation matrix must leave the out-of-plane axis unchanged"
        ))
    );
    assert_eq!(state.stress_end.as_data(), original.stress_end.as_data());
    assert_eq!(state.strain_end.as_data(), original.strain_end.as_data());
    assert_eq!(workspace.stage(), DriverStage::RolledBack);

    // the same rotation is accepted in 3D
    let h = Hypothesis::Tridimensional;
    let mut state = initial_state(&behaviour, h);
    state.rotation = Matrix::from(&[[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]]);
    state.set_strain_increment(&[1e-3, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
    let res = driver.integrate(&mut state, 1.0, h, StiffnessRequest::ConsistentTangent, &mut workspace);
    assert!(res.is_ok());
}
