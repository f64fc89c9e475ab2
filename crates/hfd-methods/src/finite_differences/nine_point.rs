//! The mixed-derivative stencil on a two-dimensional grid.

use std::sync::Arc;

use hfd_core::{Real, Size};
use hfd_math::Array;

use super::mesher::FdmMesherComposite;
use super::triple_band::FirstDerivativeOp;

/// Nine-point stencil for `∂²/∂x∂v`, built as the tensor product of the two
/// one-dimensional first-derivative stencils.
///
/// Edge rows inherit the one-sided stencils of the factors, so coefficients
/// pointing outside the grid are identically zero.
#[derive(Debug, Clone)]
pub struct NinePointLinearOp {
    coeff: Vec<Vec<Real>>,
    idx: Vec<Vec<Size>>,
}

impl NinePointLinearOp {
    /// Build the stencil for dimensions `d0` and `d1`.
    pub fn new(d0: Size, d1: Size, mesher: &Arc<FdmMesherComposite>) -> Self {
        let layout = mesher.layout();
        let n = layout.size();
        let f0 = FirstDerivativeOp::new(d0, mesher);
        let f1 = FirstDerivativeOp::new(d1, mesher);
        let mut coeff = vec![vec![0.0; n]; 9];
        let mut idx = vec![vec![0; n]; 9];
        for i in 0..n {
            let (l0, m0, u0) = f0.row(i);
            let (l1, m1, u1) = f1.row(i);
            let c0 = [l0, m0, u0];
            let c1 = [l1, m1, u1];
            for (j, c0j) in c0.iter().enumerate() {
                for (k, c1k) in c1.iter().enumerate() {
                    let s = j * 3 + k;
                    coeff[s][i] = c0j * c1k;
                    let off0 = j as isize - 1;
                    let off1 = k as isize - 1;
                    idx[s][i] = layout
                        .neighbour(i, d0, off0)
                        .and_then(|m| layout.neighbour(m, d1, off1))
                        .unwrap_or(i);
                }
            }
        }
        Self { coeff, idx }
    }

    /// Apply the stencil to a grid function.
    pub fn apply(&self, u: &Array) -> Array {
        let n = u.size();
        let mut y = Array::zeros(n);
        for s in 0..9 {
            let c = &self.coeff[s];
            let ix = &self.idx[s];
            for i in 0..n {
                y[i] += c[i] * u[ix[i]];
            }
        }
        y
    }

    /// Row scaling: `diag(u) · M`.
    pub fn mult(&self, u: &Array) -> Self {
        let mut op = self.clone();
        for c in &mut op.coeff {
            for (ci, ui) in c.iter_mut().zip(u.iter()) {
                *ci *= ui;
            }
        }
        op
    }

    /// Column scaling: `M · diag(u)`.
    pub fn mult_r(&self, u: &Array) -> Self {
        let mut op = self.clone();
        for s in 0..9 {
            for i in 0..op.coeff[s].len() {
                op.coeff[s][i] *= u[op.idx[s][i]];
            }
        }
        op
    }

    /// Uniform scaling by a constant.
    pub fn scale(&self, s: Real) -> Self {
        let mut op = self.clone();
        for c in &mut op.coeff {
            for ci in c.iter_mut() {
                *ci *= s;
            }
        }
        op
    }
}
