//! Numerical helpers shared by the solver, inference and diagnostics layers.

mod matrix;

pub use matrix::{
    center_columns, center_vector, detect_constant_columns, invert_via_qr, reduced_design,
};
