//! NA (missing value) handling for panel data.
//!
//! Two policies are supported:
//! - `Omit`: remove every row holding a missing value, output is shorter than input
//! - `Fail`: return an error if any missing value is present
//!
//! A value is missing when it is a polars null or a floating-point NaN. The
//! set of inspected columns is either the whole table or an explicit subset.
//!
//! # Example
//!
//! ```
//! use causal_tools::core::{NaAction, NaHandler};
//! use polars::prelude::*;
//!
//! let df = df! {
//!     "y" => [Some(1.0), Some(2.0), None],
//!     "note" => [Some("a"), None, Some("c")],
//! }
//! .unwrap();
//!
//! // Whole-table policy: rows 1 and 2 are dropped
//! let (clean, info) = NaHandler::process(&df, None, NaAction::Omit).unwrap();
//! assert_eq!(clean.height(), 1);
//! assert_eq!(info.n_removed, 2);
//! ```

use polars::prelude::{BooleanChunked, ChunkFull, Column, DataFrame, PolarsError};
use thiserror::Error;

/// Action to take when missing values are encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NaAction {
    /// Remove rows containing missing values.
    ///
    /// Equivalent to R's `na.omit` or pandas' `dropna()`.
    #[default]
    Omit,

    /// Return an error if any missing values are present.
    ///
    /// Equivalent to R's `na.fail`.
    Fail,
}

/// Error raised while screening a table for missing values.
#[derive(Debug, Error)]
pub enum NaError {
    /// Missing values found when using `NaAction::Fail`.
    #[error("missing value in column '{column}' at row {row} ({n_na} rows affected)")]
    NaValuesPresent {
        column: String,
        row: usize,
        n_na: usize,
    },

    /// All observations were removed due to missing values.
    #[error("all {n_original} observations contain missing values")]
    AllNa { n_original: usize },

    /// The underlying table could not be read or filtered.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Information about NA handling applied to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaInfo {
    /// Original number of rows before NA removal.
    pub n_original: usize,

    /// Number of rows after NA removal.
    pub n_clean: usize,

    /// Indices (into the original table) of rows that were kept.
    pub kept_indices: Vec<usize>,

    /// Number of rows removed due to missing values.
    pub n_removed: usize,

    /// The NA action that was applied.
    pub action: NaAction,
}

impl NaInfo {
    /// Check if any rows were removed.
    pub fn has_removed(&self) -> bool {
        self.n_removed > 0
    }

    /// Create NaInfo for data with no missing values.
    pub fn no_na(n_observations: usize, action: NaAction) -> Self {
        Self {
            n_original: n_observations,
            n_clean: n_observations,
            kept_indices: (0..n_observations).collect(),
            n_removed: 0,
            action,
        }
    }
}

/// Mask of missing cells in `column`: nulls, plus NaN in float columns.
fn missing_mask(column: &Column) -> Result<BooleanChunked, PolarsError> {
    let nulls = column.is_null();
    if column.dtype().is_float() {
        let nans = column.as_materialized_series().is_nan()?;
        Ok(&nulls | &nans)
    } else {
        Ok(nulls)
    }
}

/// Handler for missing value processing.
pub struct NaHandler;

impl NaHandler {
    /// Process a table according to the specified NA action.
    ///
    /// # Arguments
    ///
    /// * `df` - Input table
    /// * `subset` - Columns to inspect; `None` inspects every column
    /// * `action` - How to handle missing values
    ///
    /// # Errors
    ///
    /// - `NaError::NaValuesPresent` if `action` is `Fail` and missing values exist
    /// - `NaError::AllNa` if every row is missing a value
    /// - `NaError::Polars` if a subset column does not exist
    pub fn process(
        df: &DataFrame,
        subset: Option<&[String]>,
        action: NaAction,
    ) -> Result<(DataFrame, NaInfo), NaError> {
        let n_rows = df.height();
        let columns: Vec<String> = match subset {
            Some(names) => names.to_vec(),
            None => df
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string())
                .collect(),
        };

        let mut na_mask = BooleanChunked::full("na".into(), false, n_rows);
        let mut first_na: Option<(String, usize)> = None;
        for name in &columns {
            let missing = missing_mask(df.column(name)?)?;
            if first_na.is_none() {
                first_na = missing.first_true_idx().map(|row| (name.clone(), row));
            }
            na_mask = &na_mask | &missing;
        }
        let n_na = na_mask.num_trues();

        if n_na == 0 {
            return Ok((df.clone(), NaInfo::no_na(n_rows, action)));
        }

        match action {
            NaAction::Fail => {
                let (column, row) = first_na.unwrap_or_default();
                Err(NaError::NaValuesPresent { column, row, n_na })
            }
            NaAction::Omit => {
                if n_na == n_rows {
                    return Err(NaError::AllNa { n_original: n_rows });
                }

                let keep = !&na_mask;
                let kept_indices: Vec<usize> = (&keep)
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, kept)| (kept == Some(true)).then_some(i))
                    .collect();
                let clean = df.filter(&keep)?;

                let na_info = NaInfo {
                    n_original: n_rows,
                    n_clean: kept_indices.len(),
                    kept_indices,
                    n_removed: n_na,
                    action,
                };
                Ok((clean, na_info))
            }
        }
    }
}
