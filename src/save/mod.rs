use crate::{
    field::{Field, Sample},
    Float,
};
use anyhow::{Context, Result};
use tracing::debug;

/// Writes a field to `outdir` as flat `.npy` files: `shape.npy`, `re.npy`
/// (and `im.npy` for complex samples) in row-major order, plus one
/// `grid_<i>.npy` of cell centers per axis.
pub fn save_field<A: Sample>(field: &Field<A>, outdir: &str) -> Result<()> {
    std::fs::create_dir_all(outdir).context("Unable to create output directory")?;

    let shape: Vec<u64> = field.shape().iter().map(|&n| n as u64).collect();
    npy::to_file(format!("{}/shape.npy", outdir), shape)
        .context("Could not save field shape to file")?;

    let re: Vec<Float> = field.matrix().iter().map(Sample::real).collect();
    npy::to_file(format!("{}/re.npy", outdir), re).context("Could not save field data to file")?;

    if A::IS_COMPLEX {
        let im: Vec<Float> = field.matrix().iter().map(Sample::imag).collect();
        npy::to_file(format!("{}/im.npy", outdir), im)
            .context("Could not save imaginary field data to file")?;
    }

    for (i, grid) in field.grids().into_iter().enumerate() {
        npy::to_file(format!("{}/grid_{}.npy", outdir, i), grid)
            .context(format!("Could not save grid of axis {} to file", i))?;
    }
    debug!(outdir, shape = ?field.shape(), "saved field");

    Ok(())
}
