mod common;

use common::{arange, f2d};
use gridfield::save::save_field;
use gridfield::{Field, Float};
use std::path::PathBuf;

fn out_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("gridfield-{}-{}", name, std::process::id()))
}

fn read_npy<T: npy::Serializable>(path: PathBuf) -> Vec<T> {
    let bytes = std::fs::read(path).unwrap();
    npy::NpyData::<T>::from_bytes(&bytes).unwrap().to_vec()
}

#[test]
fn real_field_is_saved() {
    let dir = out_dir("real");
    let f = f2d();
    save_field(&f, dir.to_str().unwrap()).unwrap();

    assert_eq!(read_npy::<u64>(dir.join("shape.npy")), vec![4, 5]);
    let re: Vec<Float> = read_npy(dir.join("re.npy"));
    assert_eq!(re, arange(&[4, 5]).iter().copied().collect::<Vec<_>>());
    assert!(!dir.join("im.npy").exists());
    assert_eq!(read_npy::<Float>(dir.join("grid_0.npy")), f.grid(0usize).unwrap());
    assert_eq!(read_npy::<Float>(dir.join("grid_1.npy")), f.grid(1usize).unwrap());

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn complex_field_saves_imaginary_part() {
    let dir = out_dir("complex");
    let mut f = Field::new(arange(&[6])).into_complex();
    f.fft().unwrap();
    save_field(&f, dir.to_str().unwrap()).unwrap();

    let im: Vec<Float> = read_npy(dir.join("im.npy"));
    let expected: Vec<Float> = f.matrix().iter().map(|v| v.im).collect();
    assert_eq!(im, expected);
    assert_eq!(read_npy::<Float>(dir.join("grid_0.npy")), f.grid(0usize).unwrap());

    std::fs::remove_dir_all(dir).unwrap();
}
