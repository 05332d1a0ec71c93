use crate::StrError;
use russell_lab::{mat_inverse, mat_mat_mul, mat_t_mat_mul, Matrix};
use russell_tensor::{Mandel, Tensor2};

/// Defines the direction of a change of basis
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// From the global frame to the material frame
    Forward,

    /// From the material frame to the global frame
    Backward,
}

/// Checks that a 3×3 matrix is a rotation (orthogonal with unit determinant)
///
/// With `space_dim < 3`, the rotation must also leave the out-of-plane axis unchanged:
///
/// ```text
///     ┌         ┐
///     │ a  b  0 │
/// R = │ c  d  0 │
///     │ 0  0  1 │
///     └         ┘
/// ```
pub fn check_rotation_matrix(rr: &Matrix, space_dim: usize, tolerance: f64) -> Result<(), StrError> {
    if rr.dims() != (3, 3) {
        return Err("the rotation matrix must be 3×3");
    }
    let mut rtr = Matrix::new(3, 3);
    mat_t_mat_mul(&mut rtr, 1.0, rr, rr, 0.0)?;
    for i in 0..3 {
        for j in 0..3 {
            let delta = if i == j { 1.0 } else { 0.0 };
            if f64::abs(rtr.get(i, j) - delta) > tolerance {
                return Err("the rotation matrix must be orthogonal");
            }
        }
    }
    let mut inv = Matrix::new(3, 3);
    let det = mat_inverse(&mut inv, rr)?;
    if f64::abs(det - 1.0) > tolerance {
        return Err("the rotation matrix must have a unit determinant");
    }
    if space_dim < 3 {
        let out_of_plane = [rr.get(0, 2), rr.get(1, 2), rr.get(2, 0), rr.get(2, 1)];
        if out_of_plane.iter().any(|x| f64::abs(*x) > tolerance) || f64::abs(rr.get(2, 2) - 1.0) > tolerance {
            return Err("the rotation matrix must leave the out-of-plane axis unchanged");
        }
    }
    Ok(())
}

/// Returns the matrix Q such that the rotated tensor is Qᵀ · T · Q
///
/// In 2D, only the in-plane block of R is used.
fn frame_operator(rr: &Matrix, space_dim: usize, direction: Direction) -> Matrix {
    let mut qq = Matrix::new(3, 3);
    let n = if space_dim == 3 { 3 } else { 2 };
    for i in 0..n {
        for j in 0..n {
            match direction {
                Direction::Forward => qq.set(j, i, rr.get(i, j)),
                Direction::Backward => qq.set(i, j, rr.get(i, j)),
            }
        }
    }
    if n == 2 {
        qq.set(2, 2, 1.0);
    }
    qq
}

/// Rotates a symmetric tensor given in Mandel representation (4 or 6 components)
///
/// ```text
/// forward:  Tₘ = R · T · Rᵀ
/// backward: T = Rᵀ · Tₘ · R
/// ```
///
/// Symmetric tensors with 3 components (1D hypotheses) are copied unchanged.
pub fn rotate_stensor(dest: &mut [f64], t: &[f64], rr: &Matrix, direction: Direction) -> Result<(), StrError> {
    if dest.len() != t.len() {
        return Err("the rotated tensor must have the same size as the input");
    }
    let (mandel, space_dim) = match t.len() {
        3 => {
            dest.copy_from_slice(t);
            return Ok(());
        }
        4 => (Mandel::Symmetric2D, 2),
        6 => (Mandel::Symmetric, 3),
        _ => return Err("the symmetric tensor must have 3, 4, or 6 components"),
    };
    let qq = frame_operator(rr, space_dim, direction);
    let mut tt = Tensor2::new(mandel);
    tt.set_mandel_vector(1.0, t);
    let mut a = Matrix::new(3, 3);
    tt.to_matrix(&mut a);
    let mut qa = Matrix::new(3, 3);
    let mut b = Matrix::new(3, 3);
    mat_t_mat_mul(&mut qa, 1.0, &qq, &a, 0.0)?;
    mat_mat_mul(&mut b, 1.0, &qa, &qq, 0.0)?;
    tt.clear();
    for i in 0..3 {
        for j in i..3 {
            if space_dim == 2 && i != j && j == 2 {
                continue;
            }
            tt.sym_set(i, j, (b.get(i, j) + b.get(j, i)) / 2.0);
        }
    }
    dest.copy_from_slice(tt.vector().as_data());
    Ok(())
}

/// Computes the matrix Q that rotates symmetric tensors in Mandel representation
///
/// ```text
/// tₘ = Q · t   (forward)
/// t = Q · tₘ   (backward)
/// ```
///
/// Q is orthogonal; thus the operator of one direction is the transpose of the other.
pub fn mandel_rotation_operator(qq: &mut Matrix, rr: &Matrix, direction: Direction) -> Result<(), StrError> {
    let (n, m) = qq.dims();
    if n != m {
        return Err("the Mandel rotation operator must be square");
    }
    let mut e = vec![0.0; n];
    let mut col = vec![0.0; n];
    for j in 0..n {
        e.fill(0.0);
        e[j] = 1.0;
        rotate_stensor(&mut col, &e, rr, direction)?;
        for i in 0..n {
            qq.set(i, j, col[i]);
        }
    }
    Ok(())
}

/// Rotates a fourth-order tangent operator given in Mandel representation
///
/// ```text
/// forward:  Kₘ = Q · K · Qᵀ
/// backward: K = Qᵀ · Kₘ · Q
/// ```
///
/// where Q is the forward Mandel rotation operator.
pub fn rotate_tangent(dest: &mut Matrix, kk: &Matrix, rr: &Matrix, direction: Direction) -> Result<(), StrError> {
    let (n, m) = kk.dims();
    if n != m || dest.dims() != (n, n) {
        return Err("the tangent operators must be square with the same dimensions");
    }
    if n == 3 {
        dest.as_mut_data().copy_from_slice(kk.as_data());
        return Ok(());
    }
    // P = Qᵀ (forward) or Q (backward), such that the rotated operator is Pᵀ · K · P
    let opposite = match direction {
        Direction::Forward => Direction::Backward,
        Direction::Backward => Direction::Forward,
    };
    let mut pp = Matrix::new(n, n);
    mandel_rotation_operator(&mut pp, rr, opposite)?;
    let mut pk = Matrix::new(n, n);
    mat_t_mat_mul(&mut pk, 1.0, &pp, kk, 0.0)?;
    mat_mat_mul(dest, 1.0, &pk, &pp, 0.0)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
