use std::fmt::Display;

use log::{debug, warn};

use crate::linalg::{Matrix, MatrixError, SquareMatrix};

/// Cyclic Jacobi eigenvalue solver for symmetric matrices.
///
/// Each iteration zeroes the largest off-diagonal entry with a plane
/// rotation and folds that rotation into the eigenvector accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobiSolver {
    /// Upper bound on the number of rotations.
    pub max_iter: usize,
    /// Off-diagonal magnitude below which the matrix counts as diagonal.
    pub tolerance: f64,
}

impl Default for JacobiSolver {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-10,
        }
    }
}

impl JacobiSolver {
    pub fn new(max_iter: usize, tolerance: f64) -> Self {
        Self { max_iter, tolerance }
    }

    /// Decompose `matrix` and sort the result by descending eigenvalue.
    pub fn solve(&self, matrix: &SquareMatrix) -> Result<EigenDecomposition, MatrixError> {
        let mut eigen = self.decompose(matrix)?;
        eigen.sort_descending()?;
        Ok(eigen)
    }

    /// Run the rotations without sorting. Eigenvalue `i` belongs to
    /// eigenvector column `i`, in the original index order.
    pub fn decompose(&self, matrix: &SquareMatrix) -> Result<EigenDecomposition, MatrixError> {
        let n = matrix.n();
        if !matrix.is_symmetric(self.tolerance) {
            warn!("jacobi input is not symmetric, eigenpairs will be approximate");
        }
        let mut a = matrix.matrix().clone();
        let mut v = Matrix::identity(n)?;

        let mut rotations = 0;
        let mut converged = false;
        for _ in 0..self.max_iter {
            let (p, q, largest) = match largest_off_diagonal(&a) {
                Some(pivot) => pivot,
                None => {
                    converged = true;
                    break;
                }
            };
            if largest < self.tolerance {
                converged = true;
                break;
            }

            rotate(&mut a, &mut v, p, q);
            rotations += 1;
        }

        // The cap may be hit exactly on the rotation that diagonalised `a`.
        if !converged {
            converged = largest_off_diagonal(&a)
                .map_or(true, |(_, _, largest)| largest < self.tolerance);
        }

        if converged {
            debug!("jacobi converged after {} rotations (n = {})", rotations, n);
        } else {
            warn!(
                "jacobi stopped after {} rotations without reaching tolerance {:e}",
                rotations, self.tolerance,
            );
        }

        Ok(EigenDecomposition {
            eigenvalues: a.diagonal(),
            eigenvectors: v,
            rotations,
            converged,
        })
    }
}

/// Largest absolute entry of the strict upper triangle as `(p, q, |a_pq|)`.
/// Ties keep the first entry in row-major order. `None` for 1x1 matrices.
fn largest_off_diagonal(a: &Matrix) -> Option<(usize, usize, f64)> {
    let n = a.height();
    let mut pivot: Option<(usize, usize, f64)> = None;
    for i in 0..n {
        for j in i+1..n {
            let value = a.get_unchecked(i, j).abs();
            match pivot {
                Some((_, _, max)) if value <= max => {}
                _ => pivot = Some((i, j, value)),
            }
        }
    }
    pivot
}

/// Apply the rotation that zeroes `a[p][q]` to `a` and accumulate it in `v`.
fn rotate(a: &mut Matrix, v: &mut Matrix, p: usize, q: usize) {
    let n = a.height();
    let apq = a.get_unchecked(p, q);
    let app = a.get_unchecked(p, p);
    let aqq = a.get_unchecked(q, q);

    let theta = 0.5 * (2.0 * apq).atan2(aqq - app);
    let c = theta.cos();
    let s = theta.sin();

    let new_app = c * c * app + s * s * aqq - 2.0 * s * c * apq;
    let new_aqq = s * s * app + c * c * aqq + 2.0 * s * c * apq;
    a.set_unchecked(p, q, 0.0);
    a.set_unchecked(q, p, 0.0);

    for i in 0..n {
        if i == p || i == q {
            continue;
        }
        let aip = a.get_unchecked(i, p);
        let aiq = a.get_unchecked(i, q);
        let rotated_p = c * aip - s * aiq;
        let rotated_q = s * aip + c * aiq;
        a.set_unchecked(i, p, rotated_p);
        a.set_unchecked(p, i, rotated_p);
        a.set_unchecked(i, q, rotated_q);
        a.set_unchecked(q, i, rotated_q);
    }
    a.set_unchecked(p, p, new_app);
    a.set_unchecked(q, q, new_aqq);

    for i in 0..n {
        let vip = v.get_unchecked(i, p);
        let viq = v.get_unchecked(i, q);
        v.set_unchecked(i, p, c * vip - s * viq);
        v.set_unchecked(i, q, s * vip + c * viq);
    }
}

/// Eigenvalues and matching eigenvector columns of a symmetric matrix.
///
/// This is a detached value: changing the source matrix afterwards does not
/// update it.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition {
    eigenvalues: Vec<f64>,
    eigenvectors: Matrix,
    rotations: usize,
    converged: bool,
}

impl EigenDecomposition {
    /// Pair `eigenvalues[i]` with column `i` of `eigenvectors`.
    pub fn new(eigenvalues: Vec<f64>, eigenvectors: Matrix) -> Result<Self, MatrixError> {
        let n = eigenvalues.len();
        if eigenvectors.height() != n || eigenvectors.width() != n {
            return Err(MatrixError::DimensionMismatch {
                op: "eigen",
                left: eigenvectors.shape(),
                right: (n, 1),
            });
        }
        Ok(Self {
            eigenvalues,
            eigenvectors,
            rotations: 0,
            converged: false,
        })
    }

    /// Zero eigenvalues and a zero eigenvector matrix, standing in for a
    /// decomposition that has not been computed yet.
    pub fn placeholder(n: usize) -> Result<Self, MatrixError> {
        Self::new(vec![0.0; n], Matrix::zeros(n, n)?)
    }

    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    pub fn eigenvectors(&self) -> &Matrix {
        &self.eigenvectors
    }

    /// Number of rotations the solver applied.
    pub fn rotations(&self) -> usize {
        self.rotations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Reorder eigenvalues (and their columns) from largest to smallest.
    /// Equal eigenvalues keep their relative order.
    pub fn sort_descending(&mut self) -> Result<(), MatrixError> {
        let mut pairs = Vec::with_capacity(self.eigenvalues.len());
        for (i, value) in self.eigenvalues.iter().enumerate() {
            pairs.push((*value, self.eigenvectors.get_col(i)?));
        }

        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (i, (value, column)) in pairs.into_iter().enumerate() {
            self.eigenvalues[i] = value;
            self.eigenvectors.set_col(i, &column)?;
        }
        Ok(())
    }

    /// The first `k` eigenvector columns as an `n x k` matrix.
    pub fn top_k(&self, k: usize) -> Result<Matrix, MatrixError> {
        let n = self.eigenvalues.len();
        if k == 0 || k > n {
            return Err(MatrixError::InvalidComponentCount {
                requested: k,
                available: n,
            });
        }

        let mut result = Matrix::zeros(n, k)?;
        for i in 0..k {
            result.set_col(i, &self.eigenvectors.get_col(i)?)?;
        }
        Ok(result)
    }

    /// `V * diag(eigenvalues) * V^T`
    pub fn reconstruct(&self) -> Result<Matrix, MatrixError> {
        let n = self.eigenvalues.len();
        let mut diag = Matrix::zeros(n, n)?;
        for (i, value) in self.eigenvalues.iter().enumerate() {
            diag.set(i, i, *value)?;
        }
        self.eigenvectors.mul(&diag)?.mul(&self.eigenvectors.transpose())
    }
}

impl Display for EigenDecomposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Eigenvalues:")?;
        for value in &self.eigenvalues {
            write!(f, "{}\t", value)?;
        }
        writeln!(f)?;
        writeln!(f, "Eigenvectors:")?;
        write!(f, "{}", self.eigenvectors)
    }
}
