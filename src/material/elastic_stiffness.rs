use crate::base::{BehaviourDescriptor, HostFamily, Hypothesis, Symmetry};
use crate::StrError;
use russell_lab::{mat_inverse, Matrix};
use russell_tensor::LinElasticity;

/// Holds the orthotropic elastic constants (material frame)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthotropicElasticity {
    pub young1: f64,
    pub young2: f64,
    pub young3: f64,
    pub poisson12: f64,
    pub poisson23: f64,
    pub poisson13: f64,
    pub shear12: f64,
    pub shear23: f64,
    pub shear13: f64,
}

/// Returns the neutral indices kept by a hypothesis and the index condensed out (plane stress)
fn restriction(hypothesis: Hypothesis) -> (&'static [usize], Option<usize>) {
    match hypothesis {
        Hypothesis::AxisymmetricalGeneralisedPlaneStrain => (&[0, 1, 2], None),
        Hypothesis::AxisymmetricalGeneralisedPlaneStress => (&[0, 1, 2], Some(1)),
        Hypothesis::PlaneStress => (&[0, 1, 2, 3], Some(2)),
        Hypothesis::Axisymmetrical | Hypothesis::PlaneStrain | Hypothesis::GeneralisedPlaneStrain => (&[0, 1, 2, 3], None),
        Hypothesis::Tridimensional => (&[0, 1, 2, 3, 4, 5], None),
    }
}

/// Restricts the 6×6 Mandel stiffness to a hypothesis, condensing the out-of-plane stress if needed
///
/// The condensation enforces a zero stress on component `c`:
///
/// ```text
/// D'ᵢⱼ = Dᵢⱼ - Dᵢc Dcⱼ / Dcc   (i, j ≠ c)
/// D'ᵢc = D'cⱼ = 0
/// ```
fn restrict(dd: &mut Matrix, full: &Matrix, hypothesis: Hypothesis) -> Result<(), StrError> {
    let (keep, condensed) = restriction(hypothesis);
    let n = keep.len();
    if dd.dims() != (n, n) {
        return Err("the stiffness matrix must be (stensor_size, stensor_size)");
    }
    for i in 0..n {
        for j in 0..n {
            let (ki, kj) = (keep[i], keep[j]);
            let value = match condensed {
                None => full.get(ki, kj),
                Some(c) if ki == c || kj == c => 0.0,
                Some(c) => full.get(ki, kj) - full.get(ki, c) * full.get(c, kj) / full.get(c, c),
            };
            dd.set(i, j, value);
        }
    }
    Ok(())
}

/// Computes the isotropic elastic stiffness (Mandel representation) for a hypothesis
///
/// # Output
///
/// * `dd` -- (stensor_size, stensor_size) matrix
pub fn isotropic_stiffness(dd: &mut Matrix, young: f64, poisson: f64, hypothesis: Hypothesis) -> Result<(), StrError> {
    if young <= 0.0 {
        return Err("Young's modulus must be > 0.0");
    }
    if poisson <= -1.0 || poisson >= 0.5 {
        return Err("Poisson's coefficient must be in ]-1, 0.5[");
    }
    let model = LinElasticity::new(young, poisson, false, false);
    restrict(dd, model.get_modulus().matrix(), hypothesis)
}

/// Computes the orthotropic elastic stiffness (Mandel representation, material frame) for a hypothesis
///
/// The normal block is the inverse of the compliance:
///
/// ```text
///     ┌                          ┐
///     │  1/E1   -ν12/E1  -ν13/E1 │
/// S = │ -ν12/E1  1/E2    -ν23/E2 │
///     │ -ν13/E1 -ν23/E2   1/E3   │
///     └                          ┘
/// ```
///
/// and the shear terms are 2 G12, 2 G23, 2 G13.
pub fn orthotropic_stiffness(dd: &mut Matrix, param: &OrthotropicElasticity, hypothesis: Hypothesis) -> Result<(), StrError> {
    if param.young1 <= 0.0 || param.young2 <= 0.0 || param.young3 <= 0.0 {
        return Err("Young's moduli must be > 0.0");
    }
    let ss = Matrix::from(&[
        [1.0 / param.young1, -param.poisson12 / param.young1, -param.poisson13 / param.young1],
        [-param.poisson12 / param.young1, 1.0 / param.young2, -param.poisson23 / param.young2],
        [-param.poisson13 / param.young1, -param.poisson23 / param.young2, 1.0 / param.young3],
    ]);
    const NOT_POSITIVE: StrError = "the orthotropic compliance must be positive definite";
    let mut cc = Matrix::new(3, 3);
    let det = mat_inverse(&mut cc, &ss).map_err(|_| NOT_POSITIVE)?;
    if det <= 0.0 {
        return Err(NOT_POSITIVE);
    }
    let mut full = Matrix::new(6, 6);
    for i in 0..3 {
        for j in 0..3 {
            full.set(i, j, cc.get(i, j));
        }
    }
    full.set(3, 3, 2.0 * param.shear12);
    full.set(4, 4, 2.0 * param.shear23);
    full.set(5, 5, 2.0 * param.shear13);
    restrict(dd, &full, hypothesis)
}

/// Computes the elastic stiffness from the material properties passed to a host
///
/// The properties are found by name in the list returned by
/// [BehaviourDescriptor::host_material_property_names]. Shear moduli not
/// given (2D hypotheses) are irrelevant and taken as zero.
///
/// The result is expressed in the material frame.
pub fn elastic_stiffness_from_properties(
    dd: &mut Matrix,
    descriptor: &BehaviourDescriptor,
    family: HostFamily,
    hypothesis: Hypothesis,
    material_properties: &[f64],
) -> Result<(), StrError> {
    let names = descriptor.host_material_property_names(family, hypothesis);
    let find = |key: &str| -> Option<f64> {
        let index = names.iter().position(|name| name == key)?;
        material_properties.get(index).copied()
    };
    const MISSING: StrError = "the material properties required to compute the elastic stiffness are not available";
    let h = hypothesis;
    match descriptor.symmetry {
        Symmetry::Isotropic => {
            let young = find("YoungModulus").ok_or(MISSING)?;
            let poisson = find("PoissonRatio").ok_or(MISSING)?;
            isotropic_stiffness(dd, young, poisson, h)
        }
        Symmetry::Orthotropic => {
            let param = OrthotropicElasticity {
                young1: find("YoungModulus1").ok_or(MISSING)?,
                young2: find("YoungModulus2").ok_or(MISSING)?,
                young3: find("YoungModulus3").ok_or(MISSING)?,
                poisson12: find("PoissonRatio12").ok_or(MISSING)?,
                poisson23: find("PoissonRatio23").ok_or(MISSING)?,
                poisson13: find("PoissonRatio13").ok_or(MISSING)?,
                shear12: find("ShearModulus12").unwrap_or(0.0),
                shear23: find("ShearModulus23").unwrap_or(0.0),
                shear13: find("ShearModulus13").unwrap_or(0.0),
            };
            orthotropic_stiffness(dd, &param, h)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{elastic_stiffness_from_properties, isotropic_stiffness, orthotropic_stiffness, OrthotropicElasticity};
    use crate::base::{sample_elastic_descriptor, sample_orthotropic_descriptor, HostFamily, Hypothesis};
    use russell_lab::{approx_eq, Matrix};

    #[test]
    fn isotropic_stiffness_captures_errors() {
        let mut dd = Matrix::new(6, 6);
        assert_eq!(
            isotropic_stiffness(&mut dd, 0.0, 0.3, Hypothesis::Tridimensional).err(),
            Some("Young's modulus must be > 0.0")
        );
        assert_eq!(
            isotropic_stiffness(&mut dd, 1.0, 0.5, Hypothesis::Tridimensional).err(),
            Some("Poisson's coefficient must be in ]-1, 0.5[")
        );
        assert_eq!(
            isotropic_stiffness(&mut dd, 1.0, 0.3, Hypothesis::PlaneStrain).err(),
            Some("the stiffness matrix must be (stensor_size, stensor_size)")
        );
    }

    #[test]
    fn isotropic_stiffness_3d_works() {
        let (young, poisson) = (200e9, 0.3);
        let mut dd = Matrix::new(6, 6);
        isotropic_stiffness(&mut dd, young, poisson, Hypothesis::Tridimensional).unwrap();
        let lambda = young * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson));
        let mu = young / (2.0 * (1.0 + poisson));
        approx_eq(dd.get(0, 0), lambda + 2.0 * mu, 1e-3);
        approx_eq(dd.get(0, 1), lambda, 1e-3);
        approx_eq(dd.get(3, 3), 2.0 * mu, 1e-3);
        approx_eq(dd.get(5, 5), 2.0 * mu, 1e-3);
        approx_eq(dd.get(0, 3), 0.0, 1e-3);
    }

    #[test]
    fn isotropic_stiffness_plane_stress_works() {
        let (young, poisson) = (1000.0, 0.25);
        let mut dd = Matrix::new(4, 4);
        isotropic_stiffness(&mut dd, young, poisson, Hypothesis::PlaneStress).unwrap();
        let c = young / (1.0 - poisson * poisson);
        approx_eq(dd.get(0, 0), c, 1e-10);
        approx_eq(dd.get(0, 1), c * poisson, 1e-10);
        approx_eq(dd.get(1, 1), c, 1e-10);
        approx_eq(dd.get(3, 3), young / (1.0 + poisson), 1e-10);
        for k in 0..4 {
            assert_eq!(dd.get(2, k), 0.0);
            assert_eq!(dd.get(k, 2), 0.0);
        }
    }

    #[test]
    fn isotropic_stiffness_1d_works() {
        let (young, poisson) = (1000.0, 0.25);
        let mut dd = Matrix::new(3, 3);
        isotropic_stiffness(&mut dd, young, poisson, Hypothesis::AxisymmetricalGeneralisedPlaneStress).unwrap();
        // zz is condensed out: the (rr, θθ) block is the plane stress stiffness
        let c = young / (1.0 - poisson * poisson);
        approx_eq(dd.get(0, 0), c, 1e-10);
        approx_eq(dd.get(0, 2), c * poisson, 1e-10);
        assert_eq!(dd.get(1, 1), 0.0);
    }

    #[test]
    fn orthotropic_reduces_to_isotropic() {
        let (young, poisson) = (1000.0, 0.25);
        let shear = young / (2.0 * (1.0 + poisson));
        let param = OrthotropicElasticity {
            young1: young,
            young2: young,
            young3: young,
            poisson12: poisson,
            poisson23: poisson,
            poisson13: poisson,
            shear12: shear,
            shear23: shear,
            shear13: shear,
        };
        for h in Hypothesis::ALL {
            let n = h.stensor_size();
            let mut dd_iso = Matrix::new(n, n);
            let mut dd_ortho = Matrix::new(n, n);
            isotropic_stiffness(&mut dd_iso, young, poisson, h).unwrap();
            orthotropic_stiffness(&mut dd_ortho, &param, h).unwrap();
            for i in 0..n {
                for j in 0..n {
                    approx_eq(dd_ortho.get(i, j), dd_iso.get(i, j), 1e-10);
                }
            }
        }
    }

    #[test]
    fn orthotropic_captures_errors() {
        let mut param = OrthotropicElasticity {
            young1: 1.0,
            young2: 1.0,
            young3: 0.0,
            poisson12: 0.0,
            poisson23: 0.0,
            poisson13: 0.0,
            shear12: 1.0,
            shear23: 1.0,
            shear13: 1.0,
        };
        let mut dd = Matrix::new(6, 6);
        assert_eq!(
            orthotropic_stiffness(&mut dd, &param, Hypothesis::Tridimensional).err(),
            Some("Young's moduli must be > 0.0")
        );
        param.young3 = 1.0;
        param.poisson12 = 2.0;
        assert_eq!(
            orthotropic_stiffness(&mut dd, &param, Hypothesis::Tridimensional).err(),
            Some("the orthotropic compliance must be positive definite")
        );
    }

    #[test]
    fn from_properties_works() {
        let desc = sample_elastic_descriptor();
        let mut dd = Matrix::new(6, 6);
        let mp = [1000.0, 0.25];
        elastic_stiffness_from_properties(&mut dd, &desc, HostFamily::Generic, Hypothesis::Tridimensional, &mp).unwrap();
        approx_eq(dd.get(3, 3), 800.0, 1e-10);

        let desc = sample_orthotropic_descriptor();
        let mut mp = vec![0.0; 19];
        // E1 E2 E3 ν12 ν23 ν13 G12 G23 G13
        let values = [1000.0, 1000.0, 1000.0, 0.25, 0.25, 0.25, 300.0, 400.0, 500.0];
        mp[..9].copy_from_slice(&values);
        elastic_stiffness_from_properties(&mut dd, &desc, HostFamily::Castem, Hypothesis::Tridimensional, &mp).unwrap();
        approx_eq(dd.get(3, 3), 600.0, 1e-10);
        approx_eq(dd.get(4, 4), 800.0, 1e-10);
        approx_eq(dd.get(5, 5), 1000.0, 1e-10);

        let mut dd = Matrix::new(4, 4);
        assert_eq!(
            elastic_stiffness_from_properties(&mut dd, &desc, HostFamily::Aster, Hypothesis::PlaneStrain, &mp).err(),
            Some("the material properties required to compute the elastic stiffness are not available")
        );
    }
}
