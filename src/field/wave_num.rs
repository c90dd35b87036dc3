use crate::axis::Axis;
use crate::{Float, PI};
use ndarray::{ArrayD, IxDyn};
use rustfft::num_complex::Complex;

/// Angular frequency of every bin of a zero-centered spectrum with `n`
/// samples spaced by `dx`. Bin `p` holds `(p - n / 2) * dk`.
pub fn angular_frequencies(n: usize, dx: Float) -> Vec<Float> {
    let dk = 2.0 * PI / (n as Float * dx);
    let half = (n / 2) as Float;
    (0..n).map(|p| (p as Float - half) * dk).collect()
}

/// Position of every sample relative to the first one.
pub fn sample_offsets(n: usize, dx: Float) -> Vec<Float> {
    (0..n).map(|j| j as Float * dx).collect()
}

/// Wave-number axis dual to a spatial axis of `spatial.len()` cells of
/// width `dx`. Cell centers fall on the bins of [`angular_frequencies`].
pub fn frequency_axis(spatial: &Axis, dx: Float) -> Axis {
    let n = spatial.len();
    let dk = 2.0 * PI / (n as Float * dx);
    let half = (n / 2) as Float;
    Axis::regular(
        spatial.name.clone(),
        spatial.unit.clone(),
        (-half - 0.5) * dk,
        (n as Float - half - 0.5) * dk,
        n,
    )
}

/// Spatial axis dual to a wave-number axis with bin width `dk`, starting at
/// `origin`.
pub fn spatial_axis(freq: &Axis, dk: Float, origin: Float) -> Axis {
    let n = freq.len();
    let dx = 2.0 * PI / (n as Float * dk);
    Axis::regular(
        freq.name.clone(),
        freq.unit.clone(),
        origin,
        origin + n as Float * dx,
        n,
    )
}

/// Per-sample factors `exp(i k d)` that move a signal by `d` through its
/// zero-centered spectrum. For even `n` the Nyquist bin at index 0 stands
/// for both `+k_N` and `-k_N` and gets their average, the real factor
/// `cos(k_N d)`, so a real signal stays real.
pub fn shift_factors(n: usize, dx: Float, d: Float) -> Vec<Complex<Float>> {
    let mut factors: Vec<Complex<Float>> = angular_frequencies(n, dx)
        .into_iter()
        .map(|k| Complex::from_polar(1.0, k * d))
        .collect();
    if n % 2 == 0 {
        if let Some(nyquist) = factors.first_mut() {
            *nyquist = Complex::new(nyquist.re, 0.0);
        }
    }
    factors
}

/// Factors `exp(-i d x)` over the samples of the spatial axis dual to a
/// spectrum of `n` bins of width `dk`. They move the spectrum by `d`.
pub fn modulation_factors(n: usize, dk: Float, d: Float) -> Vec<Complex<Float>> {
    let dx = 2.0 * PI / (n as Float * dk);
    sample_offsets(n, dx)
        .into_iter()
        .map(|x| Complex::from_polar(1.0, -d * x))
        .collect()
}

/// Outer product of one factor sequence per axis.
pub fn outer_product(factors: &[Vec<Complex<Float>>]) -> ArrayD<Complex<Float>> {
    let shape: Vec<usize> = factors.iter().map(Vec::len).collect();
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        factors
            .iter()
            .enumerate()
            .map(|(k, f)| f[idx[k]])
            .product()
    })
}
