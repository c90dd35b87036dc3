#![allow(dead_code)]
use gridfield::{Complex, Field, Float, RealField, Sample};
use ndarray::{concatenate, ArrayD, Axis, IxDyn, Slice};

// Mirrors numpy.isclose with its default tolerances.
const RTOL: Float = 1E-5;
const ATOL: Float = 1E-8;

pub fn arange(shape: &[usize]) -> ArrayD<Float> {
    let n: usize = shape.iter().product();
    ArrayD::from_shape_vec(IxDyn(shape), (0..n).map(|i| i as Float).collect()).unwrap()
}

// These fields are used throughout the tests: an empty one, a scalar and
// arange data in one, two and three dimensions.
pub fn f_empty() -> RealField {
    Field::new(ArrayD::zeros(IxDyn(&[0])))
}

pub fn f0d() -> RealField {
    Field::new(ndarray::arr0(42.0).into_dyn())
}

pub fn f1d() -> RealField {
    Field::new(arange(&[10]))
}

pub fn f2d() -> RealField {
    Field::new(arange(&[4, 5]))
}

pub fn f3d() -> RealField {
    Field::new(arange(&[4, 5, 3]))
}

/// General consistency check. Must never fail.
pub fn check_field_consistency<A: Sample>(field: &Field<A>) {
    assert_eq!(field.dimensions(), field.axes().len() as isize);
    for (i, ax) in field.axes().iter().enumerate() {
        assert_eq!(ax.len(), field.matrix().shape()[i]);
    }
    assert!(field.is_consistent());
}

pub fn is_close(a: Float, b: Float) -> bool {
    (a - b).abs() <= ATOL + RTOL * b.abs()
}

pub fn is_close_c(a: Complex<Float>, b: Complex<Float>) -> bool {
    (a - b).norm() <= ATOL + RTOL * b.norm()
}

pub fn all_close(a: &[Float], b: &[Float]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| is_close(x, y))
}

pub fn all_close_real(a: &ArrayD<Float>, b: &ArrayD<Complex<Float>>) -> bool {
    a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(&x, y)| is_close(y.re, x))
}

pub fn all_close_c(a: &ArrayD<Complex<Float>>, b: &ArrayD<Complex<Float>>) -> bool {
    a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(&x, &y)| is_close_c(y, x))
}

/// numpy.roll(a, -1, axis)
pub fn roll_back<T: Clone>(a: &ArrayD<T>, axis: usize) -> ArrayD<T> {
    concatenate(
        Axis(axis),
        &[
            a.slice_axis(Axis(axis), Slice::from(1..)),
            a.slice_axis(Axis(axis), Slice::from(..1)),
        ],
    )
    .unwrap()
}
