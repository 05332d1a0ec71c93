use mbdriver::base::SQRT_2;
use mbdriver::native::HostLong;
use mbdriver::prelude::*;
use russell_lab::{approx_eq, Matrix};
use std::ffi::{c_char, c_int};

// Cast3M isotropic elasticity: host order (xx, yy, zz, xy, xz, yz), engineering shear strains
#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn castem_elasticity(
    stress: *mut f64,
    _statev: *mut f64,
    ddsdde: *mut f64,
    _sse: *mut f64,
    _spd: *mut f64,
    _scd: *mut f64,
    _rpl: *mut f64,
    _ddsddt: *mut f64,
    _drplde: *mut f64,
    _drpldt: *mut f64,
    _stran: *const f64,
    dstran: *const f64,
    _time: *const f64,
    _dtime: *const f64,
    _temp: *const f64,
    _dtemp: *const f64,
    _predef: *const f64,
    _dpred: *const f64,
    _cmname: *const c_char,
    ndi: *const HostLong,
    _nshr: *const HostLong,
    ntens: *const HostLong,
    _nstatv: *const HostLong,
    props: *const f64,
    _nprops: *const HostLong,
    _coords: *const f64,
    _drot: *const f64,
    _pnewdt: *mut f64,
    _celent: *const f64,
    _dfgrd0: *const f64,
    _dfgrd1: *const f64,
    _noel: *const HostLong,
    _npt: *const HostLong,
    _layer: *const HostLong,
    _kspt: *const HostLong,
    _kstep: *const HostLong,
    kinc: *mut HostLong,
    _cmname_len: c_int,
) {
    if *ndi != 2 || *ntens != 6 {
        *kinc = -1;
        return;
    }
    let (young, poisson) = (*props, *props.add(1));
    let lambda = young * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson));
    let mu = young / (2.0 * (1.0 + poisson));
    let mut dd = [[0.0; 6]; 6];
    for i in 0..3 {
        for j in 0..3 {
            dd[i][j] = lambda;
        }
        dd[i][i] += 2.0 * mu;
        dd[3 + i][3 + i] = mu;
    }
    for i in 0..6 {
        for j in 0..6 {
            *stress.add(i) += dd[i][j] * *dstran.add(j);
            *ddsdde.add(i + j * 6) = dd[i][j];
        }
    }
}

fn run_step(behaviour: &dyn BehaviourContract, strain_increment: &[f64]) -> (BehaviourState, Matrix) {
    let h = Hypothesis::Tridimensional;
    let settings = DriverSettings::new();
    let driver = IntegrationDriver::new(behaviour, &settings).unwrap();
    let mut state = BehaviourState::allocate(h, behaviour.descriptor(), behaviour.host_family()).unwrap();
    state.material_properties[0] = 200e9;
    state.material_properties[1] = 0.3;
    state.set_temperature(293.15, 0.0);
    state.set_strain_increment(strain_increment).unwrap();
    let mut workspace = Workspace::new();
    let outcome = driver
        .integrate(&mut state, 1.0, h, StiffnessRequest::ConsistentTangent, &mut workspace)
        .unwrap();
    assert_eq!(outcome.ndt, 1.0);
    assert_eq!(outcome.warning, None);
    assert_eq!(workspace.stage(), DriverStage::Committed);
    (state, outcome.tangent)
}

#[test]
fn test_elastic_3d_uniaxial_strain() {
    let behaviour = LinearElastic::new();
    let (mut state, tangent) = run_step(&behaviour, &[1e-3, 0.0, 0.0, 0.0, 0.0, 0.0]);

    // σxx = (λ + 2μ) εxx and σyy = σzz = λ εxx
    let (young, poisson) = (200e9, 0.3);
    let lambda = young * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson));
    let mu = young / (2.0 * (1.0 + poisson));
    let correct = [(lambda + 2.0 * mu) * 1e-3, lambda * 1e-3, lambda * 1e-3];
    for i in 0..3 {
        approx_eq(state.stress_end[i] / correct[i], 1.0, 1e-6);
    }
    for i in 3..6 {
        assert_eq!(state.stress_end[i], 0.0);
    }
    approx_eq(tangent.get(0, 0) / (lambda + 2.0 * mu), 1.0, 1e-12);
    approx_eq(tangent.get(3, 3) / (2.0 * mu), 1.0, 1e-12);

    // commit and run a step without strain increment
    state.commit();
    assert_eq!(state.stress_begin.as_data(), state.stress_end.as_data());
    let previous = state.clone();
    let settings = DriverSettings::new();
    let driver = IntegrationDriver::new(&behaviour, &settings).unwrap();
    let mut workspace = Workspace::new();
    driver
        .integrate(
            &mut state,
            1.0,
            Hypothesis::Tridimensional,
            StiffnessRequest::ConsistentTangent,
            &mut workspace,
        )
        .unwrap();
    for i in 0..6 {
        approx_eq(state.stress_end[i], previous.stress_begin[i], 1e-6);
    }
}

#[test]
fn test_elastic_3d_castem_matches_rust_behaviour() {
    let mut desc = BehaviourDescriptor::new("Elasticity", BehaviourKind::SmallStrain, Symmetry::Isotropic);
    desc.material_properties = vec!["YoungModulus".to_string(), "PoissonRatio".to_string()];
    let native = unsafe { NativeBehaviour::new(desc, EntryPoint::Castem(castem_elasticity)).unwrap() };
    let rust = LinearElastic::new();

    // shear components in Mandel representation (√2 εij)
    let increment = [1e-3, -2e-4, 5e-4, 2e-3 * SQRT_2, 1e-3 * SQRT_2, -3e-3 * SQRT_2];
    let (state_native, tangent_native) = run_step(&native, &increment);
    let (state_rust, tangent_rust) = run_step(&rust, &increment);
    for i in 0..6 {
        approx_eq(state_native.stress_end[i] / 1e6, state_rust.stress_end[i] / 1e6, 1e-8);
        for j in 0..6 {
            approx_eq(tangent_native.get(i, j) / 1e9, tangent_rust.get(i, j) / 1e9, 1e-10);
        }
    }
    // Cast3M inserts MassDensity and ThermalExpansion after the elastic properties
    assert_eq!(state_native.material_properties.dim(), 4);
    assert_eq!(state_rust.material_properties.dim(), 2);
}
