use crate::axis::Axis;
use crate::error::{Error, Result};
use crate::{Config, Float, PI};
use itertools::izip;
use ndarray::{ArrayD, ArrayViewMutD, Axis as ArrayAxis, Slice, Zip};
use rustfft::num_traits::Zero;
use rustfft::num_complex::Complex;
use std::ops::{Add, Mul};
use tracing::{debug, trace};

pub mod fft_nd;
pub mod wave_num;
use crate::field::fft_nd::FftNd;

/// Element type a [`Field`] can hold.
pub trait Sample:
    Clone + Zero + Add<Output = Self> + Mul<Float, Output = Self> + std::fmt::Debug
{
    const IS_COMPLEX: bool;
    fn norm_sqr(&self) -> Float;
    fn real(&self) -> Float;
    fn imag(&self) -> Float;
}

impl Sample for Float {
    const IS_COMPLEX: bool = false;
    fn norm_sqr(&self) -> Float {
        self * self
    }
    fn real(&self) -> Float {
        *self
    }
    fn imag(&self) -> Float {
        0.0
    }
}

impl Sample for Complex<Float> {
    const IS_COMPLEX: bool = true;
    fn norm_sqr(&self) -> Float {
        Complex::norm_sqr(self)
    }
    fn real(&self) -> Float {
        self.re
    }
    fn imag(&self) -> Float {
        self.im
    }
}

/// What the axes of a field measure: positions or angular wave numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Spatial,
    Frequency,
}

impl Domain {
    pub fn toggled(self) -> Domain {
        match self {
            Domain::Spatial => Domain::Frequency,
            Domain::Frequency => Domain::Spatial,
        }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Domain::Spatial
    }
}

/// Selects an axis of a field, by position or by key.
///
/// Keys are matched against the axis names first; `"x"`, `"y"` and `"z"`
/// then fall back to the first three axes.
#[derive(Debug, Clone, Copy)]
pub enum AxisKey<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for AxisKey<'_> {
    fn from(i: usize) -> Self {
        AxisKey::Index(i)
    }
}

impl<'a> From<&'a str> for AxisKey<'a> {
    fn from(name: &'a str) -> Self {
        AxisKey::Name(name)
    }
}

/// An N-dimensional array of samples with one [`Axis`] per dimension.
///
/// After every operation the number of axes equals the number of array
/// dimensions and each axis has as many cells as the array has entries
/// along it. Operations that fail leave the field unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<A> {
    matrix: ArrayD<A>,
    axes: Vec<Axis>,
    domain: Domain,
    // spatial lower bound of every axis, kept while in the frequency domain
    origins: Vec<Float>,
}

pub type RealField = Field<Float>;
pub type ComplexField = Field<Complex<Float>>;

impl<A: Sample> Field<A> {
    /// Wraps `matrix` with axes spanning `[0, 1]`, one cell per entry.
    pub fn new(matrix: ArrayD<A>) -> Field<A> {
        let axes = matrix
            .shape()
            .iter()
            .map(|&n| Axis::regular(String::new(), String::new(), 0.0, 1.0, n))
            .collect();
        Field {
            matrix,
            axes,
            domain: Domain::Spatial,
            origins: Vec::new(),
        }
    }

    pub fn with_axes(matrix: ArrayD<A>, axes: Vec<Axis>) -> Result<Field<A>> {
        if axes.len() != matrix.ndim() {
            return Err(Error::DimensionMismatch {
                expected: matrix.ndim(),
                found: axes.len(),
            });
        }
        for (axis, (ax, &dim_len)) in axes.iter().zip(matrix.shape()).enumerate() {
            if ax.len() != dim_len {
                return Err(Error::ShapeMismatch {
                    axis,
                    axis_len: ax.len(),
                    dim_len,
                });
            }
        }
        Ok(Field {
            matrix,
            axes,
            domain: Domain::Spatial,
            origins: Vec::new(),
        })
    }

    /// Builds the axes from the configured extent, names and unit, then
    /// reduces the field if the config asks for it.
    pub fn from_config(matrix: ArrayD<A>, cfg: &Config) -> Result<Field<A>> {
        let axes = matrix
            .shape()
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let name = cfg.axes.names.get(i).cloned().unwrap_or_default();
                Axis::new(name, cfg.axes.unit.clone()).with_extent(cfg.axes.extent, n)
            })
            .collect::<Result<Vec<_>>>()?;
        let mut field = Field::with_axes(matrix, axes)?;
        if let Some(maxlen) = cfg.reduce.maxlen {
            field.autoreduce(maxlen)?;
        }
        Ok(field)
    }

    pub fn matrix(&self) -> &ArrayD<A> {
        &self.matrix
    }

    /// Mutable access to the samples. The view fixes the shape, so the axes
    /// stay valid.
    pub fn matrix_mut(&mut self) -> ArrayViewMutD<'_, A> {
        self.matrix.view_mut()
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, i: usize) -> Option<&Axis> {
        self.axes.get(i)
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn shape(&self) -> &[usize] {
        self.matrix.shape()
    }

    /// Number of dimensions, or `-1` when the field holds no samples.
    pub fn dimensions(&self) -> isize {
        if self.matrix.is_empty() {
            -1
        } else {
            self.matrix.ndim() as isize
        }
    }

    pub fn axis_index<'a>(&self, key: impl Into<AxisKey<'a>>) -> Result<usize> {
        let ndim = self.axes.len();
        match key.into() {
            AxisKey::Index(i) if i < ndim => Ok(i),
            AxisKey::Index(i) => Err(Error::UnknownAxis(i.to_string())),
            AxisKey::Name(name) => {
                if let Some(i) = self.axes.iter().position(|ax| ax.name == name) {
                    return Ok(i);
                }
                let fallback = match name {
                    "x" => Some(0),
                    "y" => Some(1),
                    "z" => Some(2),
                    _ => None,
                };
                fallback
                    .filter(|&i| i < ndim)
                    .ok_or_else(|| Error::UnknownAxis(name.to_string()))
            }
        }
    }

    /// Cell centers of one axis.
    pub fn grid<'a>(&self, axis: impl Into<AxisKey<'a>>) -> Result<Vec<Float>> {
        let k = self.axis_index(axis)?;
        Ok(self.axes[k].grid())
    }

    pub fn grids(&self) -> Vec<Vec<Float>> {
        self.axes.iter().map(Axis::grid).collect()
    }

    /// `[lo, hi]` of every axis, flattened in axis order.
    pub fn extent(&self) -> Result<Vec<Float>> {
        let mut extent = Vec::with_capacity(2 * self.axes.len());
        for ax in &self.axes {
            let [lo, hi] = ax.extent().ok_or(Error::NoExtent)?;
            extent.push(lo);
            extent.push(hi);
        }
        Ok(extent)
    }

    /// Rescales the coordinates of every axis to the given flat `[lo, hi, ..]`
    /// list. Cell counts and samples are left alone.
    pub fn set_extent(&mut self, extent: &[Float]) -> Result<()> {
        self.check_extent_len(extent)?;
        let mut axes = self.axes.clone();
        for (ax, pair) in axes.iter_mut().zip(extent.chunks(2)) {
            let n = ax.len();
            ax.set_extent([pair[0], pair[1]], n)?;
        }
        self.axes = axes;
        self.check_consistency();
        Ok(())
    }

    /// Averages neighbouring pairs of slices along one axis. With an odd
    /// number of slices the last one is dropped, matching
    /// [`Axis::half_resolution`].
    pub fn half_resolution<'a>(&mut self, axis: impl Into<AxisKey<'a>>) -> Result<()> {
        let k = self.axis_index(axis)?;
        let mut ax = self.axes[k].clone();
        ax.half_resolution()?;

        let n = self.matrix.len_of(ArrayAxis(k));
        let stop = Some((2 * (n / 2)) as isize);
        let merged = {
            let even = self.matrix.slice_axis(ArrayAxis(k), Slice::new(0, stop, 2));
            let odd = self.matrix.slice_axis(ArrayAxis(k), Slice::new(1, stop, 2));
            Zip::from(&even)
                .and(&odd)
                .map_collect(|a, b| (a.clone() + b.clone()) * 0.5)
        };
        self.matrix = merged;
        self.axes[k] = ax;
        debug!(axis = k, from = n, to = n / 2, "halved resolution");
        self.check_consistency();
        Ok(())
    }

    /// Halves every axis longer than `maxlen` until none is.
    pub fn autoreduce(&mut self, maxlen: usize) -> Result<()> {
        if maxlen == 0 {
            return Err(Error::ZeroMaxLen);
        }
        for k in 0..self.axes.len() {
            while self.axes[k].len() > maxlen {
                self.half_resolution(k)?;
            }
        }
        debug!(shape = ?self.matrix.shape(), maxlen, "autoreduced");
        Ok(())
    }

    /// Crops every axis to the matching pair of the flat `[lo, hi, ..]` list
    /// and keeps the samples of the retained cells.
    pub fn cutout(&mut self, extent: &[Float]) -> Result<()> {
        self.check_extent_len(extent)?;
        let mut axes = self.axes.clone();
        let mut ranges = Vec::with_capacity(axes.len());
        for (ax, pair) in axes.iter_mut().zip(extent.chunks(2)) {
            ranges.push(ax.cutout([pair[0], pair[1]])?);
        }

        let cropped = {
            let mut view = self.matrix.view();
            for (k, range) in ranges.into_iter().enumerate() {
                trace!(axis = k, start = range.start, end = range.end, "cutout");
                view.slice_axis_inplace(ArrayAxis(k), Slice::from(range));
            }
            view.to_owned()
        };
        self.matrix = cropped;
        self.axes = axes;
        debug!(shape = ?self.matrix.shape(), "cut out");
        self.check_consistency();
        Ok(())
    }

    /// Removes every dimension of length one together with its axis.
    pub fn squeeze(&mut self) {
        for k in (0..self.matrix.ndim()).rev() {
            if self.matrix.len_of(ArrayAxis(k)) == 1 {
                self.matrix = self.matrix.index_axis(ArrayAxis(k), 0).to_owned();
                self.axes.remove(k);
                if k < self.origins.len() {
                    self.origins.remove(k);
                }
            }
        }
        self.check_consistency();
    }

    /// Averages the samples along one axis and removes that axis.
    pub fn mean<'a>(&mut self, axis: impl Into<AxisKey<'a>>) -> Result<()> {
        let k = self.axis_index(axis)?;
        let n = self.matrix.len_of(ArrayAxis(k));
        if n == 0 {
            return Err(Error::TooFewCells { needed: 1, found: 0 });
        }
        let inv = 1.0 / n as Float;
        self.matrix = self.matrix.sum_axis(ArrayAxis(k)).mapv(|v| v * inv);
        self.axes.remove(k);
        if k < self.origins.len() {
            self.origins.remove(k);
        }
        self.check_consistency();
        Ok(())
    }

    /// `sum |a|^2` times the volume of one cell.
    pub fn integrated_energy(&self) -> Result<Float> {
        let cell = self
            .axes
            .iter()
            .map(|ax| ax.spacing().map(Float::abs))
            .product::<Result<Float>>()?;
        Ok(self.matrix.iter().map(Sample::norm_sqr).sum::<Float>() * cell)
    }

    pub fn is_consistent(&self) -> bool {
        self.axes.len() == self.matrix.ndim()
            && self
                .axes
                .iter()
                .zip(self.matrix.shape())
                .all(|(ax, &n)| ax.len() == n)
    }

    #[inline(always)]
    fn check_consistency(&self) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(self.axes.len(), self.matrix.ndim());
            for (ax, &n) in self.axes.iter().zip(self.matrix.shape()) {
                assert_eq!(ax.len(), n);
            }
        }
    }

    fn check_extent_len(&self, extent: &[Float]) -> Result<()> {
        if extent.len() != 2 * self.axes.len() {
            return Err(Error::DimensionMismatch {
                expected: 2 * self.axes.len(),
                found: extent.len(),
            });
        }
        Ok(())
    }

    // Cell width of every axis, as required by the transforms.
    fn spacings(&self) -> Result<Vec<Float>> {
        self.axes
            .iter()
            .enumerate()
            .map(|(axis, ax)| {
                if ax.is_empty() {
                    return Err(Error::TooFewCells { needed: 1, found: 0 });
                }
                if !ax.is_linear(false) {
                    return Err(Error::NonLinearGrid { axis });
                }
                ax.spacing()
            })
            .collect()
    }
}

// Scale that turns the raw DFT into an approximation of the continuous
// transform with the 1 / sqrt(2 pi) convention in both directions.
fn transform_norm(spacings: &[Float]) -> Float {
    spacings
        .iter()
        .map(|d| d.abs() / (2.0 * PI).sqrt())
        .product()
}

impl Field<Float> {
    pub fn into_complex(self) -> ComplexField {
        Field {
            matrix: self.matrix.mapv(|v| Complex::new(v, 0.0)),
            axes: self.axes,
            domain: self.domain,
            origins: self.origins,
        }
    }
}

impl Field<Complex<Float>> {
    /// Real part of the samples.
    pub fn into_real(self) -> RealField {
        Field {
            matrix: self.matrix.mapv(|v| v.re),
            axes: self.axes,
            domain: self.domain,
            origins: self.origins,
        }
    }

    /// Transforms every axis to the other domain.
    ///
    /// From the spatial domain this is the forward transform (`exp(-i k x)`,
    /// `x` measured from the first sample) and the axes become angular wave
    /// numbers in ascending order, zero bin at index `n / 2`. From the
    /// frequency domain it is the inverse and the original spatial axes are
    /// restored. Both directions scale by `prod(|d| / sqrt(2 pi))` over the
    /// current cell widths `d`, so `sum |a|^2 * prod |d|` is conserved and two
    /// calls are the identity.
    pub fn fft(&mut self) -> Result<()> {
        let spacings = self.spacings()?;
        let mut fft = FftNd::new(self.matrix.shape());
        let norm = transform_norm(&spacings);

        match self.domain {
            Domain::Spatial => {
                fft.forward(&mut self.matrix);
                let origins = self
                    .axes
                    .iter()
                    .map(|ax| ax.extent().map_or(0.0, |e| e[0]))
                    .collect();
                let axes = self
                    .axes
                    .iter()
                    .zip(&spacings)
                    .map(|(ax, &dx)| wave_num::frequency_axis(ax, dx))
                    .collect();
                self.origins = origins;
                self.axes = axes;
            }
            Domain::Frequency => {
                fft.inverse(&mut self.matrix);
                let origins = std::mem::take(&mut self.origins);
                let axes = self
                    .axes
                    .iter()
                    .zip(&spacings)
                    .enumerate()
                    .map(|(k, (ax, &dk))| {
                        let origin = origins.get(k).copied().unwrap_or(0.0);
                        wave_num::spatial_axis(ax, dk, origin)
                    })
                    .collect();
                self.axes = axes;
            }
        }
        self.matrix.mapv_inplace(|v| v * norm);
        self.domain = self.domain.toggled();
        debug!(shape = ?self.matrix.shape(), domain = ?self.domain, "fourier transformed");
        self.check_consistency();
        Ok(())
    }

    /// Moves the sampled content by `distances` (one per axis), so that the
    /// new value at `x` is the old value at `x + d`. Sub-cell distances are
    /// interpolated spectrally.
    ///
    /// In the spatial domain the spectrum is multiplied by `exp(i k d)`. In
    /// the frequency domain the content is a spectrum and `d` a wave-number
    /// offset, so the spatial samples are multiplied by `exp(-i d x)`
    /// instead. Either way the detour through the dual domain is internal:
    /// axes and domain are unchanged afterwards.
    pub fn shift_grid_by(&mut self, distances: &[Float]) -> Result<()> {
        if distances.len() != self.axes.len() {
            return Err(Error::DimensionMismatch {
                expected: self.axes.len(),
                found: distances.len(),
            });
        }
        let spacings = self.spacings()?;
        let shape = self.matrix.shape().to_vec();
        let mut fft = FftNd::new(&shape);

        match self.domain {
            Domain::Spatial => {
                let factors: Vec<_> = izip!(&shape, &spacings, distances)
                    .map(|(&n, &dx, &d)| wave_num::shift_factors(n, dx, d))
                    .collect();
                let ramp = wave_num::outer_product(&factors);
                fft.forward(&mut self.matrix);
                Zip::from(&mut self.matrix).and(&ramp).for_each(|v, &r| *v *= r);
                fft.inverse(&mut self.matrix);
            }
            Domain::Frequency => {
                let factors: Vec<_> = izip!(&shape, &spacings, distances)
                    .map(|(&n, &dk, &d)| wave_num::modulation_factors(n, dk, d))
                    .collect();
                let ramp = wave_num::outer_product(&factors);
                fft.inverse(&mut self.matrix);
                Zip::from(&mut self.matrix).and(&ramp).for_each(|v, &r| *v *= r);
                fft.forward(&mut self.matrix);
            }
        }
        let norm = 1.0 / self.matrix.len() as Float;
        self.matrix.mapv_inplace(|v| v * norm);
        debug!(?distances, domain = ?self.domain, "shifted grid");
        self.check_consistency();
        Ok(())
    }
}
