//! Edge-stopping field construction for the GAC solver.
//!
//! The geodesic solver consumes a precomputed scalar field g(I), small near
//! strong image edges, instead of the raw image. This module builds the two
//! usual variants:
//!
//! - [`gborders`]: `1/√(1 + α·|∇G_σ * I|)`, values in (0, 1], driving the
//!   boundary toward intensity edges.
//! - [`glines`]: a Gaussian-smoothed copy of the image, for dark-line
//!   targets.
//!
//! Filtering is separable: one 1D correlation per axis, parallelized across
//! lanes. These fields are computed once per image, outside the evolution
//! loop.

use ndarray::{ArrayD, Axis, Zip};

/// Border handling for the 1D correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Border {
    /// Out-of-bounds samples read as 0.
    Constant,
    /// Out-of-bounds samples mirror the array (`d c b a | a b c d`).
    Reflect,
}

fn reflect_index(mut j: isize, n: usize) -> usize {
    let n = n as isize;
    loop {
        if j < 0 {
            j = -j - 1;
        } else if j >= n {
            j = 2 * n - 1 - j;
        } else {
            return j as usize;
        }
    }
}

/// Sampled Gaussian, normalized to sum 1. Radius is 4σ rounded.
fn gaussian_kernel_1d(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5) as usize;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|k| {
            let x = k as f64 - radius as f64;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= total;
    }
    kernel
}

/// First derivative of the normalized Gaussian: `-x/σ² · φ(x)`.
///
/// Correlating a unit ramp with this kernel yields (minus) unit slope, so
/// the gradient magnitude of a ramp comes out as 1.
fn gaussian_deriv_kernel_1d(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5) as usize;
    gaussian_kernel_1d(sigma)
        .into_iter()
        .enumerate()
        .map(|(k, w)| {
            let x = k as f64 - radius as f64;
            -x / (sigma * sigma) * w
        })
        .collect()
}

/// Centered 1D correlation along one axis.
fn correlate_axis(input: &ArrayD<f64>, kernel: &[f64], axis: usize, border: Border) -> ArrayD<f64> {
    let n = input.shape()[axis];
    let radius = kernel.len() / 2;
    let mut out = ArrayD::<f64>::zeros(input.raw_dim());

    Zip::from(out.lanes_mut(Axis(axis)))
        .and(input.lanes(Axis(axis)))
        .par_for_each(|mut dst, src| {
            for i in 0..n {
                let mut sum = 0.0;
                for (k, &w) in kernel.iter().enumerate() {
                    let j = i as isize + k as isize - radius as isize;
                    let v = match border {
                        Border::Constant => {
                            if j < 0 || j >= n as isize {
                                0.0
                            } else {
                                src[j as usize]
                            }
                        }
                        Border::Reflect => src[reflect_index(j, n)],
                    };
                    sum += w * v;
                }
                dst[i] = sum;
            }
        });

    out
}

/// Gaussian smoothing along every axis, reflecting at the borders.
pub fn gaussian_filter(img: &ArrayD<f64>, sigma: f64) -> ArrayD<f64> {
    let kernel = gaussian_kernel_1d(sigma);
    let mut out = img.clone();
    for ax in 0..img.ndim() {
        out = correlate_axis(&out, &kernel, ax, Border::Reflect);
    }
    out
}

/// Magnitude of the Gaussian-smoothed gradient, with zero-padded borders.
pub fn gaussian_gradient_magnitude(img: &ArrayD<f64>, sigma: f64) -> ArrayD<f64> {
    let smooth = gaussian_kernel_1d(sigma);
    let deriv = gaussian_deriv_kernel_1d(sigma);

    let mut sq_sum = ArrayD::<f64>::zeros(img.raw_dim());
    for ax in 0..img.ndim() {
        let mut d = img.clone();
        for other in 0..img.ndim() {
            let kernel = if other == ax { &deriv } else { &smooth };
            d = correlate_axis(&d, kernel, other, Border::Constant);
        }
        Zip::from(&mut sq_sum).and(&d).for_each(|s, &v| *s += v * v);
    }
    sq_sum.mapv(f64::sqrt)
}

/// Stopping field for image borders: `1/√(1 + α·|∇G_σ * I|)`.
///
/// Values lie in (0, 1] and approach 0 near strong edges, which is where
/// the geodesic boundary motion should halt.
///
/// # Arguments
/// * `img` - Image intensities
/// * `alpha` - Edge sensitivity; larger values suppress weaker edges
/// * `sigma` - Scale of the Gaussian gradient estimate
pub fn gborders(img: &ArrayD<f64>, alpha: f64, sigma: f64) -> ArrayD<f64> {
    gaussian_gradient_magnitude(img, sigma).mapv(|g| 1.0 / (1.0 + alpha * g).sqrt())
}

/// Stopping field for dark lines: the Gaussian-smoothed image itself.
pub fn glines(img: &ArrayD<f64>, sigma: f64) -> ArrayD<f64> {
    gaussian_filter(img, sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Dimension, IxDyn};

    fn step_image() -> ArrayD<f64> {
        let mut img = ArrayD::<f64>::zeros(IxDyn(&[9, 9]));
        for r in 0..9 {
            for c in 5..9 {
                img[[r, c]] = 1.0;
            }
        }
        img
    }

    #[test]
    fn test_gaussian_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel_1d(1.5);
        assert_eq!(kernel.len() % 2, 1);
        let total: f64 = kernel.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        for (a, b) in kernel.iter().zip(kernel.iter().rev()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gaussian_filter_preserves_constant_field() {
        let img = ArrayD::<f64>::ones(IxDyn(&[8, 8]));
        let smoothed = gaussian_filter(&img, 2.0);
        for &v in smoothed.iter() {
            assert!((v - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gaussian_filter_spreads_a_peak() {
        let mut img = ArrayD::<f64>::zeros(IxDyn(&[9, 9]));
        img[[4, 4]] = 1.0;
        let smoothed = gaussian_filter(&img, 1.0);
        assert!(smoothed[[4, 4]] < 1.0);
        assert!(smoothed[[4, 5]] > 0.0);
        assert!(smoothed[[3, 4]] > 0.0);
    }

    #[test]
    fn test_gradient_magnitude_of_ramp_is_one() {
        // img[r, c] = c: unit slope along axis 1, flat along axis 0.
        let mut img = ArrayD::<f64>::zeros(IxDyn(&[11, 11]));
        for (idx, v) in img.indexed_iter_mut() {
            *v = idx.slice()[1] as f64;
        }
        // The kernel is truncated at 4σ, so the slope is recovered up to
        // the small missing tail mass.
        let mag = gaussian_gradient_magnitude(&img, 1.0);
        assert!((mag[[5, 5]] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_gborders_is_in_unit_interval_and_dips_at_edges() {
        let img = step_image();
        let g = gborders(&img, 10.0, 1.0);
        for &v in g.iter() {
            assert!(v > 0.0 && v <= 1.0);
        }
        // Far from the step the field stays near 1; on the step it dips.
        assert!(g[[4, 0]] > 0.9);
        assert!(g[[4, 4]] < g[[4, 0]]);
        assert!(g[[4, 4]] < 0.7);
    }

    #[test]
    fn test_glines_matches_gaussian_filter() {
        let img = step_image();
        assert_eq!(glines(&img, 1.3), gaussian_filter(&img, 1.3));
    }

    #[test]
    fn test_gborders_3d() {
        let mut img = ArrayD::<f64>::zeros(IxDyn(&[6, 6, 6]));
        for (idx, v) in img.indexed_iter_mut() {
            if idx.slice()[2] >= 3 {
                *v = 1.0;
            }
        }
        let g = gborders(&img, 5.0, 1.0);
        assert_eq!(g.ndim(), 3);
        for &v in g.iter() {
            assert!(v > 0.0 && v <= 1.0);
        }
    }
}
