//! Level-set utilities shared by all solvers.
//!
//! A level set here is a binary indicator field over the image domain:
//! 1 marks "inside" the evolving region, 0 marks "outside". It is *not* a
//! continuous signed-distance function. Every mutation of a solver's level
//! set goes through [`binarize`], so the {0, 1} invariant holds after every
//! step.

use ndarray::{ArrayD, Axis, Dimension, IxDyn, Zip};

use crate::error::{Result, SnakeError};

/// Binarize an arbitrary real-valued array: `v > 0` maps to 1, else 0.
///
/// Stable under repeated application: `binarize(binarize(u)) == binarize(u)`.
pub fn binarize(u: &ArrayD<f64>) -> ArrayD<f64> {
    u.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
}

/// Check that a level set and its driving data share the same shape.
pub(crate) fn validate_shapes(u: &ArrayD<f64>, data: &ArrayD<f64>) -> Result<()> {
    if u.shape() != data.shape() {
        return Err(SnakeError::ShapeMismatch {
            levelset: u.shape().to_vec(),
            data: data.shape().to_vec(),
        });
    }
    Ok(())
}

/// Build a binary level set whose foreground is a ball around `center`.
///
/// This is the usual seed for a single-region evolution: an indicator of all
/// grid points within `radius` of `center`. Works for rank 2 and rank 3
/// shapes alike. Fails with [`SnakeError::CenterDimensions`] when `center`
/// does not provide one coordinate per axis.
///
/// # Arguments
/// * `shape` - Domain shape, one entry per axis
/// * `center` - Ball center in grid coordinates, one entry per axis
/// * `radius` - Ball radius in grid units
pub fn circle_levelset(shape: &[usize], center: &[f64], radius: f64) -> Result<ArrayD<f64>> {
    if shape.len() != center.len() {
        return Err(SnakeError::CenterDimensions {
            expected: shape.len(),
            found: center.len(),
        });
    }

    let mut u = ArrayD::<f64>::zeros(IxDyn(shape));
    for (idx, v) in u.indexed_iter_mut() {
        let mut dist_sq = 0.0;
        for (&i, &c) in idx.slice().iter().zip(center) {
            let d = i as f64 - c;
            dist_sq += d * d;
        }
        *v = if radius - dist_sq.sqrt() > 0.0 { 1.0 } else { 0.0 };
    }
    Ok(u)
}

/// Discrete gradient along one axis.
///
/// Central differences in the interior, one-sided differences at the two
/// boundary slices, unit spacing (numpy's `gradient` convention). Axes of
/// length 1 produce an all-zero gradient.
pub fn gradient_axis(u: &ArrayD<f64>, axis: usize) -> ArrayD<f64> {
    let n = u.shape()[axis];
    let mut out = ArrayD::<f64>::zeros(u.raw_dim());

    Zip::from(out.lanes_mut(Axis(axis)))
        .and(u.lanes(Axis(axis)))
        .for_each(|mut dst, src| {
            if n < 2 {
                return;
            }
            dst[0] = src[1] - src[0];
            dst[n - 1] = src[n - 1] - src[n - 2];
            for i in 1..n - 1 {
                dst[i] = (src[i + 1] - src[i - 1]) / 2.0;
            }
        });

    out
}

/// Discrete gradient of `u`, one array per axis.
pub fn gradient(u: &ArrayD<f64>) -> Vec<ArrayD<f64>> {
    (0..u.ndim()).map(|ax| gradient_axis(u, ax)).collect()
}
