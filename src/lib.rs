//! Physical quantities sampled on N-dimensional grids.
//!
//! A [`Field`] pairs an `ndarray` array with one [`Axis`] per dimension and
//! keeps the two consistent through resolution reduction, cropping, Fourier
//! transforms and spectral sub-cell shifts.
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub mod axis;
pub mod error;
pub mod field;
pub mod save;

pub use crate::axis::Axis;
pub use crate::error::{Error, Result};
pub use crate::field::{AxisKey, ComplexField, Domain, Field, RealField, Sample};
pub use rustfft::num_complex::Complex;

pub type Float = f64;

pub const PI: Float = std::f64::consts::PI;

// Absolute tolerance used when comparing transformed data.
pub const E_TOL: Float = 1E-9;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub axes: AxesDefaults,
    pub reduce: Reduce,
}

/// How axes are laid out when a field is built from a bare array.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxesDefaults {
    pub extent: [Float; 2],
    pub names: Vec<String>,
    pub unit: String,
}

impl Default for AxesDefaults {
    fn default() -> Self {
        AxesDefaults {
            extent: [0.0, 1.0],
            names: Vec::new(),
            unit: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Reduce {
    pub maxlen: Option<usize>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not open the config file {}", path.display()))?;
        Config::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Config> {
        toml::from_str(contents).with_context(|| "Could not parse Config file")
    }
}
