use crate::{
    eigen::{EigenDecomposition, JacobiSolver},
    linalg::{Matrix, SquareMatrix},
};

use anyhow::{Context, Result};
use log::info;

/// Everything the pipeline computes on the way to the projection.
#[derive(Debug, Clone)]
pub struct PcaResult {
    pub centered: Matrix,
    /// `centered^T * centered`, not divided by the sample count.
    pub covariance: Matrix,
    pub eigen: EigenDecomposition,
    /// Principal components as columns, `features x k`.
    pub components: Matrix,
    /// Centered data projected onto `components`, `samples x k`.
    pub transformed: Matrix,
}

impl PcaResult {
    /// Share of the total eigenvalue mass carried by each component.
    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        let eigenvalues = self.eigen.eigenvalues();
        let total: f64 = eigenvalues.iter().sum();
        if total == 0.0 {
            return vec![0.0; eigenvalues.len()];
        }
        eigenvalues.iter().map(|v| v / total).collect()
    }
}

pub fn pca(data: &Matrix, components: usize) -> Result<PcaResult> {
    pca_with_solver(data, components, &JacobiSolver::default())
}

pub fn pca_with_solver(
    data: &Matrix,
    components: usize,
    solver: &JacobiSolver,
) -> Result<PcaResult> {
    let context = "Running PCA";

    let mut centered = data.clone();
    centered.center_columns().context(context)?;

    let covariance = centered.transpose().mul(&centered).context(context)?;
    let square: SquareMatrix = covariance.try_into().context(context)?;
    let eigen = solver.solve(&square).context(context)?;
    info!(
        "decomposed {}x{} covariance in {} rotations",
        square.n(),
        square.n(),
        eigen.rotations(),
    );

    let basis = eigen
        .top_k(components)
        .context("Selecting principal components")?;
    let transformed = centered.mul(&basis).context(context)?;

    Ok(PcaResult {
        centered,
        covariance: square.into(),
        eigen,
        components: basis,
        transformed,
    })
}
