use serde::{Serialize, Deserialize};

/// Dense row-major matrix backed by one contiguous buffer.
///
/// Datasets keep all of their samples in a single `Matrix`; mini-batches are
/// taken as [`MatrixView`]s over a row range instead of being copied out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

/// Borrowed, read-only window over consecutive rows of a [`Matrix`].
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    pub rows: usize,
    pub cols: usize,
    data: &'a [f32],
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wraps a row-major buffer. Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Matrix {
        if data.len() != rows * cols {
            panic!("Matrix buffer of length {} cannot hold {}x{}", data.len(), rows, cols)
        }
        Matrix { rows, cols, data }
    }

    /// Builds a matrix from nested rows; all rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Matrix {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let n = rows.len();
        let mut data = Vec::with_capacity(n * cols);
        for row in rows {
            if row.len() != cols {
                panic!("Matrices are of incorrect sizes")
            }
            data.extend(row);
        }
        Matrix { rows: n, cols, data }
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn view(&self) -> MatrixView<'_> {
        MatrixView { rows: self.rows, cols: self.cols, data: &self.data }
    }

    /// View over rows `start..end` without copying.
    pub fn rows_view(&self, start: usize, end: usize) -> MatrixView<'_> {
        assert!(start <= end && end <= self.rows, "row range {}..{} out of bounds for {} rows", start, end, self.rows);
        MatrixView {
            rows: end - start,
            cols: self.cols,
            data: &self.data[start * self.cols..end * self.cols],
        }
    }

    /// Adds `bias` to every row (broadcast over the row dimension).
    pub fn add_row(&mut self, bias: &[f32]) {
        assert_eq!(bias.len(), self.cols, "bias length must equal column count");
        for row in self.data.chunks_exact_mut(self.cols) {
            for (x, b) in row.iter_mut().zip(bias) {
                *x += b;
            }
        }
    }

    /// In-place `self -= scale * other`.
    pub fn sub_scaled(&mut self, other: &Matrix, scale: f32) {
        if self.rows != other.rows || self.cols != other.cols {
            panic!("Matrices are of incorrect sizes")
        }
        for (x, g) in self.data.iter_mut().zip(&other.data) {
            *x -= scale * g;
        }
    }

    /// Sum of each column, as a vector of length `cols`.
    pub fn column_sums(&self) -> Vec<f32> {
        let mut sums = vec![0.0f32; self.cols];
        for row in self.data.chunks_exact(self.cols.max(1)) {
            for (s, x) in sums.iter_mut().zip(row) {
                *s += x;
            }
        }
        sums
    }

    /// Index of the largest entry of every row; ties go to the lowest index.
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.data
            .chunks_exact(self.cols.max(1))
            .map(argmax)
            .collect()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl<'a> MatrixView<'a> {
    pub fn row(&self, i: usize) -> &'a [f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn to_matrix(&self) -> Matrix {
        Matrix::from_vec(self.rows, self.cols, self.data.to_vec())
    }

    /// `self · rhs`.
    pub fn matmul(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..self.rows {
            let out = res.row_mut(i);
            for (k, &a) in self.row(i).iter().enumerate() {
                // MNIST pixels are mostly zero.
                if a == 0.0 {
                    continue;
                }
                for (o, &w) in out.iter_mut().zip(rhs.row(k)) {
                    *o += a * w;
                }
            }
        }

        res
    }

    /// `selfᵀ · rhs`, without materialising the transpose.
    pub fn t_matmul(&self, rhs: &Matrix) -> Matrix {
        if self.rows != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.cols, rhs.cols);

        for r in 0..self.rows {
            let d = rhs.row(r);
            for (k, &a) in self.row(r).iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                for (o, &g) in res.row_mut(k).iter_mut().zip(d) {
                    *o += a * g;
                }
            }
        }

        res
    }
}

/// Index of the maximum element in a slice; ties resolve to the first one.
pub fn argmax(v: &[f32]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x > v[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matmul_matches_hand_computation() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![0.0, 3.0]]);
        let b = Matrix::from_rows(vec![vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]]);
        let c = a.view().matmul(&b);
        assert_eq!(c.rows, 2);
        assert_eq!(c.cols, 3);
        assert_eq!(c.data, vec![18.0, 21.0, 24.0, 21.0, 24.0, 27.0]);
    }

    #[test]
    fn t_matmul_equals_explicit_transpose() {
        let x = Matrix::from_rows(vec![vec![1.0, 0.0, 2.0], vec![3.0, 4.0, 0.0]]);
        let d = Matrix::from_rows(vec![vec![1.0, -1.0], vec![0.5, 2.0]]);
        let got = x.view().t_matmul(&d);

        let mut xt = Matrix::zeros(3, 2);
        for i in 0..2 {
            for j in 0..3 {
                xt.data[j * 2 + i] = x.data[i * 3 + j];
            }
        }
        let want = xt.view().matmul(&d);
        assert_eq!(got, want);
    }

    #[test]
    fn rows_view_borrows_the_requested_range() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        let v = m.rows_view(1, 3);
        assert_eq!(v.rows, 2);
        assert_eq!(v.row(0), &[3.0, 4.0]);
        assert_eq!(v.to_matrix().data, m.data[2..6].to_vec());
    }

    #[test]
    fn add_row_broadcasts_bias() {
        let mut m = Matrix::zeros(2, 3);
        m.add_row(&[1.0, 2.0, 3.0]);
        assert_eq!(m.row(1), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn argmax_prefers_first_of_equal_maxima() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7]), 1);
        assert_eq!(argmax(&[0.0, 0.0]), 0);
        let m = Matrix::from_rows(vec![vec![0.2, 0.8], vec![0.9, 0.1]]);
        assert_eq!(m.argmax_rows(), vec![1, 0]);
    }

    #[test]
    fn column_sums_add_each_column() {
        let m = Matrix::from_rows(vec![vec![1.0, 4.0], vec![3.0, 0.0]]);
        assert_eq!(m.column_sums(), vec![4.0, 4.0]);
    }
}
