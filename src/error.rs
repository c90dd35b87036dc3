//! Errors raised by axis and field operations.

use crate::Float;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("axis has fewer than two grid nodes and therefore no extent")]
    NoExtent,

    #[error("axis needs at least {needed} cells, found {found}")]
    TooFewCells { needed: usize, found: usize },

    #[error("grid nodes must be strictly increasing or strictly decreasing")]
    NonMonotonic,

    #[error("invalid extent [{low}, {high}]")]
    InvalidExtent { low: Float, high: Float },

    #[error("cutout [{low}, {high}] does not contain a whole cell of the axis")]
    CutoutOutOfRange { low: Float, high: Float },

    #[error("grid spacing is not constant")]
    IrregularGrid,

    #[error("axis {axis} is not linear, the fourier transform needs a regular grid")]
    NonLinearGrid { axis: usize },

    #[error("no axis matches {0:?}")]
    UnknownAxis(String),

    #[error("expected {expected} values, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("axis {axis} has {axis_len} cells but the matrix has {dim_len} along it")]
    ShapeMismatch {
        axis: usize,
        axis_len: usize,
        dim_len: usize,
    },

    #[error("autoreduce needs maxlen of at least 1")]
    ZeroMaxLen,
}
