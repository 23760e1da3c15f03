//! Host-side matrix storage and random input generation.
//!
//! Matrices are flat `f32` vectors.  The multiply kernel and the
//! sequential loop both index them column-major with the row count as
//! the leading dimension, so an element `(r, c)` lives at `c * rows + r`.

use rand::Rng;

use crate::error::{BenchError, Result};

/// Default row count, column count and inner dimension.
pub const DEFAULT_DIM: usize = 512;

/// Output shape of one multiply.
///
/// The inner dimension is not stored: the indexing contract shared with
/// the kernel strides every operand by `rows`, which makes `K == rows`.
/// `A` is therefore `rows × rows`, `B` is `rows × cols` and `C` is
/// `rows × cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixShape {
    pub rows: usize,
    pub cols: usize,
}

impl MatrixShape {
    /// Build a shape, rejecting empty dimensions and sizes the kernel's
    /// `u32` arguments cannot address.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(BenchError::InvalidDimensions(format!(
                "rows and cols must be non-zero (got {rows}x{cols})"
            )));
        }
        let largest = rows.max(cols).checked_mul(rows);
        match largest {
            Some(n) if n <= u32::MAX as usize => Ok(Self { rows, cols }),
            _ => Err(BenchError::InvalidDimensions(format!(
                "{rows}x{cols} exceeds the 32-bit index range of the kernel"
            ))),
        }
    }

    pub fn square(n: usize) -> Result<Self> {
        Self::new(n, n)
    }

    /// Shared dimension summed over.
    pub fn inner(&self) -> usize {
        self.rows
    }

    /// Shape of the left operand.
    pub fn lhs(&self) -> (usize, usize) {
        (self.rows, self.inner())
    }

    /// Shape of the right operand.
    pub fn rhs(&self) -> (usize, usize) {
        (self.inner(), self.cols)
    }

    pub fn output_len(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for MatrixShape {
    fn default() -> Self {
        Self {
            rows: DEFAULT_DIM,
            cols: DEFAULT_DIM,
        }
    }
}

/// A dense `f32` matrix in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wrap existing data.  Panics if the length does not match.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "matrix data length must equal rows * cols"
        );
        Self { rows, cols, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Fill a `rows × cols` matrix with independent samples from `[0, 1)`.
///
/// The caller owns the random source: seed it for reproducible runs, or
/// pass an entropy-seeded generator for benchmarking.
pub fn random_matrix<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> Matrix {
    let data = (0..rows * cols)
        .map(|_| rng.gen_range(0.0f32..1.0))
        .collect();
    Matrix { rows, cols, data }
}

/// Generate the `(A, B)` operand pair for `shape`.
pub fn random_operands<R: Rng + ?Sized>(rng: &mut R, shape: MatrixShape) -> (Matrix, Matrix) {
    let (ar, ac) = shape.lhs();
    let (br, bc) = shape.rhs();
    let a = random_matrix(rng, ar, ac);
    let b = random_matrix(rng, br, bc);
    (a, b)
}
