use crate::base::StorageOrder;
use russell_lab::Matrix;

/// Maps the components of a host-neutral quantity to the components expected by a host
///
/// ```text
/// host[i] = neutral[perm[i]] · factor[i]
/// ```
///
/// Neutral components not listed in `perm` are not exchanged with the host;
/// they are set to zero when converting back.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentMap {
    /// Number of components of the host-neutral quantity
    pub neutral_size: usize,

    /// Neutral index of each host component (len = host size)
    pub perm: Vec<usize>,

    /// Scaling factor of each host component (len = host size)
    pub factor: Vec<f64>,
}

impl ComponentMap {
    /// Allocates a map that leaves the components unchanged
    pub fn identity(size: usize) -> Self {
        ComponentMap {
            neutral_size: size,
            perm: (0..size).collect(),
            factor: vec![1.0; size],
        }
    }

    /// Allocates a map for symmetric tensors
    ///
    /// `shear` scales the off-diagonal components (neutral index ≥ 3).
    pub fn stensor(neutral_size: usize, perm: &[usize], shear: f64) -> Self {
        let factor = perm.iter().map(|&p| if p >= 3 { shear } else { 1.0 }).collect();
        ComponentMap {
            neutral_size,
            perm: perm.to_vec(),
            factor,
        }
    }

    /// Allocates a map with a permutation only
    pub fn permutation(neutral_size: usize, perm: &[usize]) -> Self {
        ComponentMap {
            neutral_size,
            perm: perm.to_vec(),
            factor: vec![1.0; perm.len()],
        }
    }

    /// Returns the number of components seen by the host
    pub fn host_size(&self) -> usize {
        self.perm.len()
    }

    /// Converts a host-neutral quantity to the host convention
    ///
    /// # Panics
    ///
    /// This function panics if the slices do not have the expected lengths.
    pub fn to_host(&self, host: &mut [f64], neutral: &[f64]) {
        assert_eq!(neutral.len(), self.neutral_size);
        assert!(host.len() >= self.perm.len());
        for (i, &p) in self.perm.iter().enumerate() {
            host[i] = neutral[p] * self.factor[i];
        }
    }

    /// Converts a quantity given in the host convention to the host-neutral convention
    ///
    /// # Panics
    ///
    /// This function panics if the slices do not have the expected lengths.
    pub fn from_host(&self, neutral: &mut [f64], host: &[f64]) {
        assert_eq!(neutral.len(), self.neutral_size);
        assert!(host.len() >= self.perm.len());
        neutral.fill(0.0);
        for (i, &p) in self.perm.iter().enumerate() {
            neutral[p] = host[i] / self.factor[i];
        }
    }
}

/// Converts a tangent operator given by the host into the host-neutral convention
///
/// The host operator relates host forces to host driving variables; hence:
///
/// ```text
/// K(pσᵢ, pεⱼ) = Kₕ(i, j) · fεⱼ / fσᵢ
/// ```
///
/// Entries of `kk` not reached by the maps are set to zero.
///
/// # Panics
///
/// This function panics if the buffer or the matrix have inconsistent dimensions.
pub fn tangent_from_host(kk: &mut Matrix, host: &[f64], force: &ComponentMap, driving: &ComponentMap, order: StorageOrder) {
    let (m, n) = (force.host_size(), driving.host_size());
    assert_eq!(kk.dims(), (force.neutral_size, driving.neutral_size));
    assert!(host.len() >= m * n);
    kk.fill(0.0);
    for i in 0..m {
        for j in 0..n {
            let value = match order {
                StorageOrder::ColMajor => host[i + j * m],
                StorageOrder::RowMajor => host[i * n + j],
            };
            kk.set(force.perm[i], driving.perm[j], value * driving.factor[j] / force.factor[i]);
        }
    }
}

/// Converts a host-neutral tangent operator into the host convention
///
/// This is the inverse of [tangent_from_host] on the components exchanged with the host.
pub fn tangent_to_host(host: &mut [f64], kk: &Matrix, force: &ComponentMap, driving: &ComponentMap, order: StorageOrder) {
    let (m, n) = (force.host_size(), driving.host_size());
    assert_eq!(kk.dims(), (force.neutral_size, driving.neutral_size));
    assert!(host.len() >= m * n);
    for i in 0..m {
        for j in 0..n {
            let value = kk.get(force.perm[i], driving.perm[j]) * force.factor[i] / driving.factor[j];
            match order {
                StorageOrder::ColMajor => host[i + j * m] = value,
                StorageOrder::RowMajor => host[i * n + j] = value,
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
