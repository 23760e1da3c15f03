//! Sequential host multiply used as the timing baseline.

use crate::matrix::{Matrix, MatrixShape};

/// Multiply `a` by `b` with a plain triple loop on the calling thread.
///
/// Uses the same index arithmetic as the device kernel:
/// `C[n*rows + m] = sum_k A[k*rows + m] * B[n*rows + k]`.
/// Intentionally single-threaded and unblocked.
pub fn multiply_sequential(a: &Matrix, b: &Matrix, shape: MatrixShape) -> Matrix {
    let rows = shape.rows;
    let cols = shape.cols;
    let inner = shape.inner();
    assert_eq!(a.len(), rows * inner, "lhs must be rows x rows");
    assert_eq!(b.len(), inner * cols, "rhs must be rows x cols");

    let mut out = Matrix::zeros(rows, cols);
    for m in 0..rows {
        for n in 0..cols {
            let mut acc = 0.0f32;
            for k in 0..inner {
                acc += a.data[k * rows + m] * b.data[n * rows + k];
            }
            out.data[n * rows + m] = acc;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::random_operands;
    use rand::{rngs::StdRng, SeedableRng};

    fn square(n: usize) -> MatrixShape {
        MatrixShape::square(n).unwrap()
    }

    #[test]
    fn identity_times_b_is_b() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]);
        let b = Matrix::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]);
        let c = multiply_sequential(&a, &b, square(2));
        assert_eq!(c.data, vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn column_major_convention() {
        // A = [[1,3],[2,4]], B = [[5,7],[6,8]] stored by column.
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = Matrix::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]);
        let c = multiply_sequential(&a, &b, square(2));
        assert_eq!(c.data, vec![23.0, 34.0, 31.0, 46.0]);
    }

    #[test]
    fn scalar_matrix() {
        let a = Matrix::from_vec(1, 1, vec![3.0]);
        let b = Matrix::from_vec(1, 1, vec![-2.5]);
        let c = multiply_sequential(&a, &b, square(1));
        assert_eq!(c.data, vec![-7.5]);
    }

    #[test]
    fn output_len_matches_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        for &(r, c) in &[(1usize, 1usize), (2, 5), (7, 3), (16, 16)] {
            let shape = MatrixShape::new(r, c).unwrap();
            let (a, b) = random_operands(&mut rng, shape);
            let out = multiply_sequential(&a, &b, shape);
            assert_eq!(out.len(), r * c);
            assert_eq!((out.rows, out.cols), (r, c));
        }
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let shape = square(33);
        let (a, b) = random_operands(&mut StdRng::seed_from_u64(11), shape);
        let first = multiply_sequential(&a, &b, shape);
        let second = multiply_sequential(&a, &b, shape);
        let bits = |m: &Matrix| m.data.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn rectangular_output() {
        // rows = 2, cols = 3: A is 2x2, B is 2x3.
        let a = Matrix::from_vec(2, 2, vec![2.0, 0.0, 0.0, 3.0]);
        let b = Matrix::from_vec(2, 3, vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let c = multiply_sequential(&a, &b, MatrixShape::new(2, 3).unwrap());
        assert_eq!(c.data, vec![2.0, 3.0, 4.0, 6.0, 6.0, 9.0]);
    }

    #[test]
    #[should_panic(expected = "rhs must be rows x cols")]
    fn mismatched_rhs_panics() {
        let a = Matrix::zeros(2, 2);
        let b = Matrix::zeros(3, 3);
        multiply_sequential(&a, &b, square(2));
    }
}
