//! Morphological ACWE (Active Contours Without Edges).
//!
//! Chan-Vese evolution without an edge map: the boundary moves so that the
//! intensities inside and outside the region each become as homogeneous as
//! possible. Works on raw image data, no preprocessing required.

use ndarray::{ArrayD, Zip};

use crate::error::{Result, SnakeError};
use crate::levelset::{binarize, gradient_axis, validate_shapes};
use crate::morphology::{CurvatureOperator, ElementSet};
use crate::snakes::Snake;

/// Morphological ACWE solver based on the Chan-Vese energy functional.
pub struct MorphAcwe {
    u: ArrayD<f64>,
    data: ArrayD<f64>,
    elements: ElementSet,
    curvop: CurvatureOperator,
    /// Number of curvature-operator applications per step (µ).
    pub smoothing: usize,
    /// Weight of the inside-region fit (λ1).
    pub lambda1: f64,
    /// Weight of the outside-region fit (λ2).
    pub lambda2: f64,
}

impl MorphAcwe {
    /// Create an ACWE solver over `data` with an initial level set.
    ///
    /// The level set is binarized on the way in. `data` must be rank 2 or 3
    /// and share the level set's shape. Seed the level set with both phases
    /// present; a step over an empty inside or outside region fails with
    /// [`SnakeError::EmptyRegion`].
    ///
    /// # Arguments
    /// * `levelset` - Initial region indicator (binarized via `v > 0`)
    /// * `data` - Image intensities, consumed read-only
    /// * `smoothing` - Curvature applications per step (µ)
    /// * `lambda1` - Inside-fit weight (λ1)
    /// * `lambda2` - Outside-fit weight (λ2)
    pub fn new(
        levelset: &ArrayD<f64>,
        data: ArrayD<f64>,
        smoothing: usize,
        lambda1: f64,
        lambda2: f64,
    ) -> Result<Self> {
        let elements = ElementSet::for_rank(data.ndim())?;
        let u = binarize(levelset);
        validate_shapes(&u, &data)?;
        Ok(Self {
            u,
            data,
            elements,
            curvop: CurvatureOperator::new(),
            smoothing,
            lambda1,
            lambda2,
        })
    }

    /// The image data driving the evolution.
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }
}

impl Snake for MorphAcwe {
    fn step(&mut self) -> Result<()> {
        // Region means c0 (outside) and c1 (inside).
        let mut sum_in = 0.0;
        let mut n_in = 0usize;
        let mut sum_out = 0.0;
        let mut n_out = 0usize;
        Zip::from(&self.u).and(&self.data).for_each(|&u, &v| {
            if u > 0.0 {
                sum_in += v;
                n_in += 1;
            } else {
                sum_out += v;
                n_out += 1;
            }
        });
        if n_in == 0 {
            return Err(SnakeError::EmptyRegion("inside"));
        }
        if n_out == 0 {
            return Err(SnakeError::EmptyRegion("outside"));
        }
        let c1 = sum_in / n_in as f64;
        let c0 = sum_out / n_out as f64;

        // |∇u| as the sum of per-axis absolute gradients. It is nonzero only
        // in a band around the boundary, which restricts the attachment to
        // the current front.
        let mut abs_du = ArrayD::<f64>::zeros(self.u.raw_dim());
        for ax in 0..self.u.ndim() {
            let g = gradient_axis(&self.u, ax);
            Zip::from(&mut abs_du).and(&g).for_each(|a, &v| *a += v.abs());
        }

        // Attachment: grow where the inside fit is locally better, shrink
        // where the outside fit is.
        let lambda1 = self.lambda1;
        let lambda2 = self.lambda2;
        let mut res = self.u.clone();
        Zip::from(&mut res)
            .and(&abs_du)
            .and(&self.data)
            .for_each(|r, &du, &v| {
                let aux = du * (lambda1 * (v - c1).powi(2) - lambda2 * (v - c0).powi(2));
                if aux < 0.0 {
                    *r = 1.0;
                } else if aux > 0.0 {
                    *r = 0.0;
                }
            });

        for _ in 0..self.smoothing {
            res = self.curvop.apply(&res, &self.elements);
        }

        self.u = res;
        Ok(())
    }

    fn levelset(&self) -> &ArrayD<f64> {
        &self.u
    }

    fn set_levelset(&mut self, u: &ArrayD<f64>) -> Result<()> {
        let u = binarize(u);
        validate_shapes(&u, &self.data)?;
        self.u = u;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    /// 8x8 image, bright unit square on rows/cols 2..6, zero elsewhere.
    fn bright_square_image() -> ArrayD<f64> {
        let mut img = ArrayD::<f64>::zeros(IxDyn(&[8, 8]));
        for r in 2..6 {
            for c in 2..6 {
                img[[r, c]] = 1.0;
            }
        }
        img
    }

    fn seed(rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> ArrayD<f64> {
        let mut u = ArrayD::<f64>::zeros(IxDyn(&[8, 8]));
        for r in rows {
            for c in cols.clone() {
                u[[r, c]] = 1.0;
            }
        }
        u
    }

    #[test]
    fn test_step_keeps_levelset_binary() {
        let mut snake =
            MorphAcwe::new(&seed(3..5, 3..5), bright_square_image(), 2, 1.0, 1.0).unwrap();
        for _ in 0..5 {
            snake.step().unwrap();
            assert!(snake.levelset().iter().all(|&v| v == 0.0 || v == 1.0));
        }
    }

    #[test]
    fn test_converges_to_bright_square() {
        // Seeded inside the bright square with no smoothing, the region must
        // grow to exactly the square and then stabilize.
        let img = bright_square_image();
        let mut snake = MorphAcwe::new(&seed(3..5, 3..5), img.clone(), 0, 1.0, 1.0).unwrap();

        let outcome = snake.run(30).unwrap();
        assert!(outcome.converged);
        assert_eq!(*snake.levelset(), img);
    }

    #[test]
    fn test_uniform_image_with_no_smoothing_is_stationary() {
        // On a constant image both region means coincide, the attachment
        // score is zero everywhere, and with smoothing = 0 a step is the
        // identity.
        let img = ArrayD::<f64>::ones(IxDyn(&[8, 8]));
        let mut snake = MorphAcwe::new(&seed(2..4, 2..4), img, 0, 1.0, 1.0).unwrap();

        let before = snake.levelset().clone();
        let outcome = snake.run(5).unwrap();
        assert_eq!(outcome, crate::snakes::RunOutcome { iterations: 1, converged: true });
        assert_eq!(*snake.levelset(), before);

        // Idempotence at the fixed point: another step changes nothing.
        snake.step().unwrap();
        assert_eq!(*snake.levelset(), before);
    }

    #[test]
    fn test_empty_outside_region_is_an_error() {
        let img = bright_square_image();
        let all_inside = ArrayD::<f64>::ones(IxDyn(&[8, 8]));
        let mut snake = MorphAcwe::new(&all_inside, img, 1, 1.0, 1.0).unwrap();
        assert_eq!(snake.step(), Err(SnakeError::EmptyRegion("outside")));
    }

    #[test]
    fn test_empty_inside_region_is_an_error() {
        let img = bright_square_image();
        let all_outside = ArrayD::<f64>::zeros(IxDyn(&[8, 8]));
        let mut snake = MorphAcwe::new(&all_outside, img, 1, 1.0, 1.0).unwrap();
        assert_eq!(snake.step(), Err(SnakeError::EmptyRegion("inside")));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let img = ArrayD::<f64>::zeros(IxDyn(&[8, 8]));
        let u = ArrayD::<f64>::zeros(IxDyn(&[8, 9]));
        assert!(matches!(
            MorphAcwe::new(&u, img, 1, 1.0, 1.0),
            Err(SnakeError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_rank_1_is_rejected() {
        let img = ArrayD::<f64>::zeros(IxDyn(&[8]));
        let u = ArrayD::<f64>::zeros(IxDyn(&[8]));
        assert_eq!(
            MorphAcwe::new(&u, img, 1, 1.0, 1.0).err().unwrap(),
            SnakeError::InvalidRank(1)
        );
    }
}
