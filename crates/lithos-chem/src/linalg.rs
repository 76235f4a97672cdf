//! Dense linear-algebra helpers on top of nalgebra.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Eigen-decomposition of a real symmetric matrix with eigenvalues sorted
/// ascending; column `k` of the returned matrix belongs to eigenvalue `k`.
pub fn eigh(matrix: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let n = matrix.nrows();
    let eig = SymmetricEigen::new(matrix.clone());
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    let values = DVector::from_iterator(n, order.iter().map(|&k| eig.eigenvalues[k]));
    let vectors = DMatrix::from_fn(n, n, |r, c| eig.eigenvectors[(r, order[c])]);
    (values, vectors)
}

/// Symmetric (Löwdin) orthogonaliser `S^{-1/2}`, together with the smallest
/// eigenvalue of `S`.
pub fn inverse_sqrt(s: &DMatrix<f64>) -> (DMatrix<f64>, f64) {
    let (values, vectors) = eigh(s);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let scaled = DMatrix::from_diagonal(&values.map(|v| 1.0 / v.sqrt()));
    (&vectors * scaled * vectors.transpose(), min)
}

/// `Cᵀ M C`.
pub fn transform(m: &DMatrix<f64>, c: &DMatrix<f64>) -> DMatrix<f64> {
    c.transpose() * m * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn eigh_sorts_ascending() {
        let m = DMatrix::from_row_slice(3, 3, &[3.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 2.0]);
        let (values, vectors) = eigh(&m);
        assert_relative_eq!(values[0], -1.0);
        assert_relative_eq!(values[1], 2.0);
        assert_relative_eq!(values[2], 3.0);
        assert_relative_eq!(vectors[(1, 0)].abs(), 1.0);
    }

    #[test]
    fn inverse_sqrt_whitens() {
        let s = DMatrix::from_row_slice(2, 2, &[1.0, 0.4, 0.4, 1.0]);
        let (x, min) = inverse_sqrt(&s);
        assert_relative_eq!(min, 0.6, epsilon = 1e-12);
        let identity = transform(&s, &x);
        assert_relative_eq!(identity, DMatrix::identity(2, 2), epsilon = 1e-12);
    }
}
