use std::{cmp::min, error::Error, fmt::Display};

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    elements: Vec<f64>,
    width: usize,
    height: usize,
}

impl Matrix {
    pub fn new(elements: Vec<f64>, height: usize, width: usize) -> Result<Self, MatrixError> {
        if height == 0 || width == 0 || elements.len() != width * height {
            return Err(MatrixError::DimensionMismatch {
                op: "new",
                left: (height, width),
                right: (elements.len(), 1),
            });
        }

        Ok(Self {
            elements,
            height,
            width,
        })
    }

    pub fn filled(height: usize, width: usize, value: f64) -> Result<Self, MatrixError> {
        Self::new(vec![value; width * height], height, width)
    }

    pub fn zeros(height: usize, width: usize) -> Result<Self, MatrixError> {
        Self::filled(height, width, 0.0)
    }

    pub fn identity(n: usize) -> Result<Self, MatrixError> {
        let mut result = Self::zeros(n, n)?;
        for i in 0..n {
            result.set_unchecked(i, i, 1.0);
        }
        Ok(result)
    }

    /// Build a matrix from row slices. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut elements = Vec::with_capacity(rows.len() * width);
        for row in rows {
            if row.len() != width {
                return Err(MatrixError::DimensionMismatch {
                    op: "from_rows",
                    left: (rows.len(), width),
                    right: (1, row.len()),
                });
            }
            elements.extend_from_slice(row);
        }
        Self::new(elements, rows.len(), width)
    }

    /// `height` copies of `row` stacked on top of each other.
    pub fn repeat_row(row: &[f64], height: usize) -> Result<Self, MatrixError> {
        Self::new(row.repeat(height), height, row.len())
    }

    pub fn mul(&self, matrix: &Matrix) -> Result<Matrix, MatrixError> {
        if self.width != matrix.height {
            return Err(MatrixError::DimensionMismatch {
                op: "mul",
                left: self.shape(),
                right: matrix.shape(),
            });
        }

        let mut elements: Vec<f64> = Vec::with_capacity(self.height * matrix.width);
        for ij in 0..self.height * matrix.width {
            let column = ij % matrix.width;
            let row = ij / matrix.width;
            let mut value = 0.0;
            for i in 0..self.width {
                let a = self.get_unchecked(row, i);
                let b = matrix.get_unchecked(i, column);
                value += a * b;
            }

            elements.push(value);
        }
        Ok(Matrix {
            elements,
            width: matrix.width,
            height: self.height,
        })
    }

    pub fn scalar_mul(&self, value: f64) -> Self {
        let elements: Vec<f64> = self.elements.iter()
            .map(|a| a * value)
            .collect();

        Self {
            elements,
            width: self.width,
            height: self.height,
        }
    }

    pub fn add(&self, matrix: &Matrix) -> Result<Self, MatrixError> {
        if self.width != matrix.width || self.height != matrix.height {
            return Err(MatrixError::DimensionMismatch {
                op: "add",
                left: self.shape(),
                right: matrix.shape(),
            });
        }
        let elements = self.elements.iter()
            .zip(matrix.elements.iter())
            .map(|(a, b)| a + b)
            .collect();
        Ok(Self {
            elements,
            width: self.width,
            height: self.height,
        })
    }

    /// `self + (matrix * -1)`
    pub fn sub(&self, matrix: &Matrix) -> Result<Self, MatrixError> {
        self.add(&matrix.scalar_mul(-1.0)).map_err(|e| match e {
            MatrixError::DimensionMismatch { left, right, .. } => {
                MatrixError::DimensionMismatch { op: "sub", left, right }
            }
            e => e,
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64, MatrixError> {
        self.check_index(row, col)?;
        Ok(self.get_unchecked(row, col))
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), MatrixError> {
        self.check_index(row, col)?;
        self.set_unchecked(row, col, value);
        Ok(())
    }

    pub fn get_row(&self, i: usize) -> Result<Vec<f64>, MatrixError> {
        if i >= self.height {
            return Err(MatrixError::IndexOutOfRange {
                index: (i, 0),
                shape: self.shape(),
            });
        }
        let start = i * self.width;
        Ok(self.elements[start..start + self.width].to_vec())
    }

    pub fn get_col(&self, i: usize) -> Result<Vec<f64>, MatrixError> {
        if i >= self.width {
            return Err(MatrixError::IndexOutOfRange {
                index: (0, i),
                shape: self.shape(),
            });
        }
        let mut elements: Vec<f64> = Vec::with_capacity(self.height);
        for j in 0..self.height {
            elements.push(self.get_unchecked(j, i));
        }
        Ok(elements)
    }

    pub fn set_row(&mut self, i: usize, row: &[f64]) -> Result<(), MatrixError> {
        if i >= self.height {
            return Err(MatrixError::IndexOutOfRange {
                index: (i, 0),
                shape: self.shape(),
            });
        }
        if row.len() != self.width {
            return Err(MatrixError::DimensionMismatch {
                op: "set_row",
                left: self.shape(),
                right: (1, row.len()),
            });
        }

        let start = i * self.width;
        self.elements[start..start + self.width].copy_from_slice(row);
        Ok(())
    }

    pub fn set_col(&mut self, i: usize, column: &[f64]) -> Result<(), MatrixError> {
        if i >= self.width {
            return Err(MatrixError::IndexOutOfRange {
                index: (0, i),
                shape: self.shape(),
            });
        }
        if column.len() != self.height {
            return Err(MatrixError::DimensionMismatch {
                op: "set_col",
                left: self.shape(),
                right: (column.len(), 1),
            });
        }

        for j in 0..self.height {
            self.set_unchecked(j, i, column[j]);
        }

        Ok(())
    }

    pub(crate) fn set_unchecked(&mut self, row: usize, col: usize, value: f64) {
        self.elements[row * self.width + col] = value;
    }

    pub(crate) fn get_unchecked(&self, row: usize, col: usize) -> f64 {
        self.elements[row * self.width + col]
    }

    fn check_index(&self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row >= self.height || col >= self.width {
            Err(MatrixError::IndexOutOfRange {
                index: (row, col),
                shape: self.shape(),
            })
        } else {
            Ok(())
        }
    }

    pub fn transpose(&self) -> Matrix {
        let mut elements: Vec<f64> = Vec::with_capacity(self.elements.len());
        for i in 0..self.width {
            for j in 0..self.height {
                elements.push(self.get_unchecked(j, i));
            }
        }
        Matrix {
            elements,
            width: self.height,
            height: self.width,
        }
    }

    pub fn round(&self, places: i32) -> Self {
        let shift = 10.0_f64.powi(places);
        let elements = self.elements.iter()
            .map(|a| (a * shift).round() / shift)
            .collect();
        Self {
            elements,
            width: self.width,
            height: self.height,
        }
    }

    /// Arithmetic mean of every column.
    pub fn mean_row(&self) -> Vec<f64> {
        let mut elements = vec![0.0; self.width];
        for i in 0..self.height {
            for j in 0..self.width {
                elements[j] += self.get_unchecked(i, j);
            }
        }
        for mean in elements.iter_mut() {
            *mean /= self.height as f64;
        }
        elements
    }

    /// Subtract each column's mean from every entry of that column.
    pub fn center_columns(&mut self) -> Result<(), MatrixError> {
        let means = Self::repeat_row(&self.mean_row(), self.height)?;
        *self = self.sub(&means)?;
        Ok(())
    }

    pub fn diagonal(&self) -> Vec<f64> {
        let n = min(self.width, self.height);
        (0..n).map(|i| self.get_unchecked(i, i)).collect()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.height {
            for j in 0..self.width {
                write!(f, "{}\t", self.get_unchecked(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A matrix known to have as many rows as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    matrix: Matrix,
    n: usize,
}

impl SquareMatrix {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// True when every pair of mirrored entries differs by at most `tolerance`.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        for i in 0..self.n {
            for j in i+1..self.n {
                let upper = self.matrix.get_unchecked(i, j);
                let lower = self.matrix.get_unchecked(j, i);
                if (upper - lower).abs() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

impl TryFrom<Matrix> for SquareMatrix {
    type Error = MatrixError;
    fn try_from(value: Matrix) -> std::result::Result<Self, Self::Error> {
        if value.height != value.width {
            Err(MatrixError::NotSquare(value.shape()))
        } else {
            Ok(SquareMatrix {
                n: value.width,
                matrix: value,
            })
        }
    }
}

impl From<SquareMatrix> for Matrix {
    fn from(value: SquareMatrix) -> Self {
        value.matrix
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatrixError {
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    IndexOutOfRange {
        index: (usize, usize),
        shape: (usize, usize),
    },
    InvalidComponentCount {
        requested: usize,
        available: usize,
    },
    NotSquare((usize, usize)),
}

impl Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::DimensionMismatch { op, left, right } => write!(
                f,
                "dimension mismatch in {}: {}x{} and {}x{}",
                op, left.0, left.1, right.0, right.1,
            ),
            MatrixError::IndexOutOfRange { index, shape } => write!(
                f,
                "index ({}, {}) out of range for {}x{} matrix",
                index.0, index.1, shape.0, shape.1,
            ),
            MatrixError::InvalidComponentCount { requested, available } => write!(
                f,
                "invalid component count {} ({} available)",
                requested, available,
            ),
            MatrixError::NotSquare(shape) => {
                write!(f, "{}x{} matrix is not square", shape.0, shape.1)
            }
        }
    }
}

impl Error for MatrixError {}
