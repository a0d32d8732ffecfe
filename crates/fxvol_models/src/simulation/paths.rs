//! Time-major storage for simulated values.

use super::error::SimulationError;

/// Dense `rows × cols` matrix stored row-major.
///
/// For paths, rows are time points (row 0 is the start) and columns are
/// simulations. Shock matrices use the same layout with one row per step.
///
/// # Examples
///
/// ```
/// use fxvol_models::simulation::PathMatrix;
///
/// let m = PathMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// assert_eq!(m.row(1), &[3.0, 4.0]);
/// assert_eq!(m.column(0), vec![1.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl PathMatrix {
    /// Matrix of `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Builds a matrix from equal-length rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SimulationError> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(SimulationError::ShapeMismatch {
                rows: rows.len(),
                cols,
                got_rows: rows.len(),
                got_cols: bad.len(),
            });
        }
        let n_rows = rows.len();
        Ok(Self {
            rows: n_rows,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Row `row` as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Column `col`, one value per row.
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    /// Last row: terminal values of every simulation.
    pub fn terminal(&self) -> &[f64] {
        match self.rows {
            0 => &[],
            n => self.row(n - 1),
        }
    }

    /// Mean across columns of one row.
    pub fn row_mean(&self, row: usize) -> f64 {
        let values = self.row(row);
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Rows as owned vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols.max(1)).map(<[f64]>::to_vec).collect()
    }

    pub(crate) fn expect_shape(&self, rows: usize, cols: usize) -> Result<(), SimulationError> {
        if self.rows == rows && self.cols == cols {
            Ok(())
        } else {
            Err(SimulationError::ShapeMismatch {
                rows,
                cols,
                got_rows: self.rows,
                got_cols: self.cols,
            })
        }
    }
}
