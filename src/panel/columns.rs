//! Column extraction and treated-group matching.

use super::PanelError;
use polars::prelude::{AnyValue, Column, DataFrame};
use std::fmt;

/// Look up a column, mapping absence to [`PanelError::MissingColumn`].
pub(crate) fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, PanelError> {
    df.column(name)
        .map_err(|_| PanelError::MissingColumn(name.to_string()))
}

/// Fail with [`PanelError::MissingColumn`] on the first absent name.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<(), PanelError> {
    for name in names {
        column(df, name.as_ref())?;
    }
    Ok(())
}

fn any_to_f64(value: &AnyValue) -> Option<f64> {
    match value {
        AnyValue::Int8(v) => Some(f64::from(*v)),
        AnyValue::Int16(v) => Some(f64::from(*v)),
        AnyValue::Int32(v) => Some(f64::from(*v)),
        AnyValue::Int64(v) => Some(*v as f64),
        AnyValue::UInt8(v) => Some(f64::from(*v)),
        AnyValue::UInt16(v) => Some(f64::from(*v)),
        AnyValue::UInt32(v) => Some(f64::from(*v)),
        AnyValue::UInt64(v) => Some(*v as f64),
        AnyValue::Float32(v) => Some(f64::from(*v)),
        AnyValue::Float64(v) => Some(*v),
        _ => None,
    }
}

/// Read a numeric column as `f64`.
///
/// Integer, float and boolean (0/1) columns are accepted. A null or NaN cell
/// is reported as [`PanelError::MissingValue`].
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, PanelError> {
    let col = column(df, name)?;
    let mut values = Vec::with_capacity(col.len());

    for row in 0..col.len() {
        let value = match col.get(row)? {
            AnyValue::Null => None,
            AnyValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
            other => match any_to_f64(&other) {
                Some(v) => Some(v),
                None => {
                    return Err(PanelError::NonNumeric {
                        column: name.to_string(),
                        dtype: col.dtype().to_string(),
                    })
                }
            },
        };

        match value {
            Some(v) if !v.is_nan() => values.push(v),
            _ => {
                return Err(PanelError::MissingValue {
                    column: name.to_string(),
                    row,
                })
            }
        }
    }

    Ok(values)
}

/// The value of the treatment-group column that identifies treated rows.
///
/// Matching is type-sensitive: text only matches string cells, booleans only
/// match boolean cells, and numbers match any integer or float cell by value.
#[derive(Debug, Clone, PartialEq)]
pub enum TreatmentValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl TreatmentValue {
    /// Whether a single cell equals this value.
    pub fn matches(&self, value: &AnyValue) -> bool {
        match (self, value) {
            (TreatmentValue::Text(t), AnyValue::String(s)) => t == s,
            (TreatmentValue::Text(t), AnyValue::StringOwned(s)) => t.as_str() == s.as_str(),
            (TreatmentValue::Bool(t), AnyValue::Boolean(b)) => t == b,
            (TreatmentValue::Int(t), other) => any_to_f64(other).is_some_and(|v| v == *t as f64),
            (TreatmentValue::Float(t), other) => any_to_f64(other).is_some_and(|v| v == *t),
            _ => false,
        }
    }
}

impl fmt::Display for TreatmentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreatmentValue::Text(s) => write!(f, "{s:?}"),
            TreatmentValue::Int(v) => write!(f, "{v}"),
            TreatmentValue::Float(v) => write!(f, "{v}"),
            TreatmentValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for TreatmentValue {
    fn from(value: &str) -> Self {
        TreatmentValue::Text(value.to_string())
    }
}

impl From<String> for TreatmentValue {
    fn from(value: String) -> Self {
        TreatmentValue::Text(value)
    }
}

impl From<i64> for TreatmentValue {
    fn from(value: i64) -> Self {
        TreatmentValue::Int(value)
    }
}

impl From<i32> for TreatmentValue {
    fn from(value: i32) -> Self {
        TreatmentValue::Int(i64::from(value))
    }
}

impl From<f64> for TreatmentValue {
    fn from(value: f64) -> Self {
        TreatmentValue::Float(value)
    }
}

impl From<bool> for TreatmentValue {
    fn from(value: bool) -> Self {
        TreatmentValue::Bool(value)
    }
}

/// 0/1 indicator of rows whose `name` cell equals `treated`.
///
/// Null cells never match.
pub fn treatment_indicator(
    df: &DataFrame,
    name: &str,
    treated: &TreatmentValue,
) -> Result<Vec<f64>, PanelError> {
    let col = column(df, name)?;
    (0..col.len())
        .map(|row| -> Result<f64, PanelError> {
            let value = col.get(row)?;
            Ok(if treated.matches(&value) { 1.0 } else { 0.0 })
        })
        .collect()
}
