//! Dense row-major matrix of `f64`.
//!
//! Used both for batches of embeddings (one row per item) and as working
//! storage for the SVD solver. Every operation except [`Matrix::set`]
//! returns a new matrix.

use std::ops::{Index, IndexMut, Range};

use crate::error::{CartographError, Result};

/// An `rows × cols` matrix stored row-major in a flat `Vec<f64>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    /// Row-major: data[r * cols + c]
    data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create a matrix filled with ones.
    pub fn ones(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![1.0; rows * cols],
        }
    }

    /// Create the `n × n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Create a matrix from row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(CartographError::DimensionMismatch {
                expected: rows * cols,
                got: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a matrix from a slice of rows. All rows must share one length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(CartographError::DimensionMismatch {
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// `(rows, cols)`.
    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Raw row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Read one element.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_bounds(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// Write one element in place.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_bounds(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Borrow row `r`.
    ///
    /// # Panics
    /// Panics if `r >= self.rows()`.
    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Copy column `c` into a new vector.
    ///
    /// # Panics
    /// Panics if `c >= self.cols()`.
    pub fn column(&self, c: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.data[r * self.cols + c]).collect()
    }

    /// Copy every row into its own vector.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                t.data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        t
    }

    /// Matrix product `self · other`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(CartographError::ShapeMismatch {
                op: "multiply",
                left: self.size(),
                right: other.size(),
            });
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                if a == 0.0 {
                    continue;
                }
                let src = &other.data[k * other.cols..(k + 1) * other.cols];
                let dst = &mut out.data[i * other.cols..(i + 1) * other.cols];
                for (d, &b) in dst.iter_mut().zip(src) {
                    *d += a * b;
                }
            }
        }
        Ok(out)
    }

    /// Element-wise difference `self - other`.
    pub fn subtract(&self, other: &Matrix) -> Result<Matrix> {
        if self.size() != other.size() {
            return Err(CartographError::ShapeMismatch {
                op: "subtract",
                left: self.size(),
                right: other.size(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a - b)
            .collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Multiply every element by `factor`.
    pub fn scale(&self, factor: f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    /// Copy the block `rows × cols` (half-open ranges).
    pub fn sub_matrix(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Matrix> {
        if rows.start > rows.end || rows.end > self.rows {
            return Err(CartographError::IndexOutOfBounds {
                row: rows.end,
                col: cols.start,
                rows: self.rows,
                cols: self.cols,
            });
        }
        if cols.start > cols.end || cols.end > self.cols {
            return Err(CartographError::IndexOutOfBounds {
                row: rows.start,
                col: cols.end,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let width = cols.end - cols.start;
        let mut data = Vec::with_capacity(rows.len() * width);
        for r in rows.clone() {
            data.extend_from_slice(&self.data[r * self.cols + cols.start..r * self.cols + cols.end]);
        }
        Ok(Matrix {
            rows: rows.len(),
            cols: width,
            data,
        })
    }

    /// Column-wise mean. Empty for a matrix without rows.
    pub fn column_means(&self) -> Vec<f64> {
        if self.rows == 0 {
            return vec![0.0; self.cols];
        }
        let mut means = vec![0.0; self.cols];
        for r in 0..self.rows {
            for (m, v) in means.iter_mut().zip(self.row(r)) {
                *m += v;
            }
        }
        let inv = 1.0 / self.rows as f64;
        means.iter_mut().for_each(|m| *m *= inv);
        means
    }

    /// Swap two columns in place.
    pub(crate) fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for r in 0..self.rows {
            self.data.swap(r * self.cols + a, r * self.cols + b);
        }
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(CartographError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        debug_assert!(row < self.rows && col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        debug_assert!(row < self.rows && col < self.cols);
        &mut self.data[row * self.cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_get_set() {
        let mut m = sample();
        assert_eq!(m.get(1, 2).unwrap(), 6.0);
        m.set(0, 0, -1.0).unwrap();
        assert_eq!(m[(0, 0)], -1.0);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut m = sample();
        assert!(matches!(
            m.get(2, 0),
            Err(CartographError::IndexOutOfBounds { row: 2, col: 0, .. })
        ));
        assert!(m.set(0, 3, 1.0).is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            Matrix::from_rows(&rows),
            Err(CartographError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_transpose() {
        let t = sample().transpose();
        assert_eq!(t.size(), (3, 2));
        assert_eq!(t.row(2), &[3.0, 6.0]);
    }

    #[test]
    fn test_multiply() {
        let m = sample();
        let p = m.multiply(&m.transpose()).unwrap();
        assert_eq!(p.size(), (2, 2));
        assert_eq!(p.data(), &[14.0, 32.0, 32.0, 77.0]);

        let id = Matrix::identity(3);
        assert_eq!(m.multiply(&id).unwrap(), m);
    }

    #[test]
    fn test_multiply_shape_mismatch() {
        let m = sample();
        assert!(matches!(
            m.multiply(&m),
            Err(CartographError::ShapeMismatch { op: "multiply", .. })
        ));
    }

    #[test]
    fn test_subtract_and_scale() {
        let m = sample();
        let d = m.subtract(&Matrix::ones(2, 3)).unwrap();
        assert_eq!(d.row(0), &[0.0, 1.0, 2.0]);
        assert_eq!(m.scale(0.5).row(1), &[2.0, 2.5, 3.0]);
        assert!(m.subtract(&Matrix::ones(3, 2)).is_err());
    }

    #[test]
    fn test_sub_matrix() {
        let m = sample();
        let s = m.sub_matrix(0..2, 1..3).unwrap();
        assert_eq!(s.size(), (2, 2));
        assert_eq!(s.data(), &[2.0, 3.0, 5.0, 6.0]);
        assert!(m.sub_matrix(0..3, 0..1).is_err());
    }

    #[test]
    fn test_column_means() {
        assert_eq!(sample().column_means(), vec![2.5, 3.5, 4.5]);
    }
}
