//! Dense solver for the symmetric positive-definite systems produced by least squares.

use crate::error::{Error, Result};
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use ndarray::{Array1, Array2};

/// Solve `a · x = b` for symmetric positive-definite `a` via Cholesky (`a = L Lᵀ`).
///
/// Fails with [`Error::SingularMatrix`] when a pivot is not clearly positive relative
/// to the largest diagonal entry.
pub(crate) fn solve_spd(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return Err(Error::InvalidShape {
            expected: format!("square ({n}, {n}) system with {n} right-hand values"),
            got: format!("{:?} with {} values", a.dim(), b.len()),
        });
    }

    let max_diag = a.diag().iter().fold(0.0_f64, |m, &d| m.max(d.abs()));
    let tol = max_diag * f64::EPSILON * 1.0e3 * n.max(1) as f64;

    let matrix = DMatrix::from_fn(n, n, |i, j| a[[i, j]]);
    let chol = factor(&matrix, tol)?;
    let x = chol.solve(&DVector::from_iterator(n, b.iter().copied()));
    Ok(x.iter().copied().collect())
}

/// Cholesky factor of `m` whose pivots (squared diagonal of `L`) all exceed `tol`.
fn factor(m: &DMatrix<f64>, tol: f64) -> Result<Cholesky<f64, Dyn>> {
    match Cholesky::new(m.clone()) {
        Some(chol) => match weak_pivot(&chol, tol) {
            Some(column) => Err(Error::SingularMatrix { column }),
            None => Ok(chol),
        },
        None => Err(Error::SingularMatrix {
            column: failing_column(m, tol),
        }),
    }
}

fn weak_pivot(chol: &Cholesky<f64, Dyn>, tol: f64) -> Option<usize> {
    chol.l_dirty()
        .diagonal()
        .iter()
        .position(|&d| !(d * d > tol))
}

/// First column whose leading principal block cannot be factored.
fn failing_column(m: &DMatrix<f64>, tol: f64) -> usize {
    let n = m.nrows();
    (1..=n)
        .find(|&k| {
            let block = m.view((0, 0), (k, k)).into_owned();
            Cholesky::new(block).map_or(true, |chol| weak_pivot(&chol, tol).is_some())
        })
        .map_or(n.saturating_sub(1), |k| k - 1)
}
