//! Named, ordered regressor matrices.

use super::PanelError;
use faer::Mat;

/// Name under which the solver-supplied intercept is reported.
pub const INTERCEPT_NAME: &str = "const";

/// An ordered list of named regressor columns.
///
/// The intercept is never stored here; the solver adds it, so
/// [`INTERCEPT_NAME`] is reserved.
#[derive(Debug, Clone, Default)]
pub struct DesignMatrix {
    n_rows: usize,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl DesignMatrix {
    /// Create an empty design for `n_rows` observations.
    pub fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Append a regressor.
    ///
    /// # Errors
    ///
    /// - `PanelError::DuplicateRegressor` if the name is already taken or is
    ///   the intercept name
    pub fn push(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), PanelError> {
        let name = name.into();
        if name == INTERCEPT_NAME || self.names.contains(&name) {
            return Err(PanelError::DuplicateRegressor(name));
        }
        debug_assert_eq!(values.len(), self.n_rows, "regressor '{name}' has wrong length");
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    /// Regressor names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values of the named regressor.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| self.columns[j].as_slice())
    }

    /// Dense `n_rows × n_cols` matrix in column order.
    pub fn to_mat(&self) -> Mat<f64> {
        Mat::from_fn(self.n_rows, self.columns.len(), |i, j| self.columns[j][i])
    }
}
