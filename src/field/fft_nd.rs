use crate::Float;
use ndarray::{ArrayD, Axis};
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

#[derive(Clone, Copy)]
enum Centering {
    // rotate the zero bin to the middle after transforming
    After,
    // rotate it back to the front before transforming
    Before,
}

/// Unnormalized N-dimensional transform, one planned 1D FFT per axis.
///
/// The forward transform leaves the spectrum zero-centered: along an axis
/// of length `n`, bin `p` holds frequency index `p - n / 2`. The inverse
/// expects that ordering. `inverse(forward(x))` is `x` times the number of
/// elements.
pub struct FftNd {
    shape: Vec<usize>,
    forward: Vec<Arc<dyn Fft<Float>>>,
    inverse: Vec<Arc<dyn Fft<Float>>>,
    lane: Vec<Complex<Float>>,
    scratch: Vec<Complex<Float>>,
}

impl FftNd {
    pub fn new(shape: &[usize]) -> FftNd {
        let mut planner = FftPlanner::<Float>::new();
        let forward: Vec<_> = shape.iter().map(|&n| planner.plan_fft_forward(n)).collect();
        let inverse: Vec<_> = shape.iter().map(|&n| planner.plan_fft_inverse(n)).collect();
        let scratch_len = forward
            .iter()
            .chain(&inverse)
            .map(|fft| fft.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        let lane_len = shape.iter().copied().max().unwrap_or(0);

        FftNd {
            shape: shape.to_vec(),
            forward,
            inverse,
            lane: Vec::with_capacity(lane_len),
            scratch: vec![Complex::zero(); scratch_len],
        }
    }

    pub fn forward(&mut self, data: &mut ArrayD<Complex<Float>>) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(data.shape(), &self.shape[..]);
        }
        for k in 0..self.shape.len() {
            let fft = Arc::clone(&self.forward[k]);
            self.process_axis(data, k, &*fft, Centering::After);
        }
    }

    pub fn inverse(&mut self, data: &mut ArrayD<Complex<Float>>) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(data.shape(), &self.shape[..]);
        }
        for k in 0..self.shape.len() {
            let fft = Arc::clone(&self.inverse[k]);
            self.process_axis(data, k, &*fft, Centering::Before);
        }
    }

    fn process_axis(
        &mut self,
        data: &mut ArrayD<Complex<Float>>,
        k: usize,
        fft: &dyn Fft<Float>,
        centering: Centering,
    ) {
        let half = self.shape[k] / 2;
        for mut lane in data.lanes_mut(Axis(k)) {
            self.lane.clear();
            self.lane.extend(lane.iter().copied());
            if let Centering::Before = centering {
                self.lane.rotate_left(half);
            }
            fft.process_with_scratch(&mut self.lane, &mut self.scratch);
            if let Centering::After = centering {
                self.lane.rotate_right(half);
            }
            for (dst, src) in lane.iter_mut().zip(&self.lane) {
                *dst = *src;
            }
        }
    }
}
