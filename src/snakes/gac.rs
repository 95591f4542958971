//! Morphological GAC (Geodesic Active Contours).
//!
//! The boundary is attracted to strong gradients of a precomputed
//! edge-stopping field g(I) (see [`crate::stopping`]), optionally inflated
//! or deflated by a balloon force gated by confidence in that field.

use ndarray::{ArrayD, Zip};

use crate::error::Result;
use crate::levelset::{binarize, gradient, gradient_axis, validate_shapes};
use crate::morphology::{binary_dilation, binary_erosion, CurvatureOperator, ElementSet};
use crate::snakes::Snake;

/// Morphological GAC solver.
pub struct MorphGac {
    u: ArrayD<f64>,
    data: ArrayD<f64>,
    ddata: Vec<ArrayD<f64>>,
    threshold_mask: ArrayD<bool>,
    threshold_mask_v: ArrayD<bool>,
    elements: ElementSet,
    curvop: CurvatureOperator,
    /// Number of curvature-operator applications per step (µ).
    pub smoothing: usize,
    theta: f64,
    balloon: f64,
}

impl MorphGac {
    /// Create a GAC solver over the stopping field `data`.
    ///
    /// The level set is binarized on the way in. `data` is the precomputed
    /// g(I) (see [`crate::stopping::gborders`] and
    /// [`crate::stopping::glines`]); its per-axis gradient and the two
    /// threshold masks are computed here and cached.
    ///
    /// # Arguments
    /// * `levelset` - Initial region indicator (binarized via `v > 0`)
    /// * `data` - The stopping field g(I)
    /// * `smoothing` - Curvature applications per step (µ)
    /// * `threshold` - Balloon gating threshold (θ)
    /// * `balloon` - Balloon strength and direction (ν); 0 disables it
    pub fn new(
        levelset: &ArrayD<f64>,
        data: ArrayD<f64>,
        smoothing: usize,
        threshold: f64,
        balloon: f64,
    ) -> Result<Self> {
        let elements = ElementSet::for_rank(data.ndim())?;
        let u = binarize(levelset);
        validate_shapes(&u, &data)?;

        let mut snake = Self {
            u,
            ddata: Vec::new(),
            threshold_mask: ArrayD::from_elem(data.raw_dim(), false),
            threshold_mask_v: ArrayD::from_elem(data.raw_dim(), false),
            data,
            elements,
            curvop: CurvatureOperator::new(),
            smoothing,
            theta: threshold,
            balloon,
        };
        snake.ddata = gradient(&snake.data);
        snake.update_masks();
        Ok(snake)
    }

    /// Replace the stopping field.
    ///
    /// Postcondition: the cached gradient and both threshold masks are
    /// recomputed from the new data.
    pub fn set_data(&mut self, data: ArrayD<f64>) -> Result<()> {
        validate_shapes(&self.u, &data)?;
        self.data = data;
        self.ddata = gradient(&self.data);
        self.update_masks();
        Ok(())
    }

    /// Change the balloon strength ν. Postcondition: masks are recomputed.
    pub fn set_balloon(&mut self, balloon: f64) {
        self.balloon = balloon;
        self.update_masks();
    }

    /// Change the threshold θ. Postcondition: masks are recomputed.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.theta = threshold;
        self.update_masks();
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn balloon(&self) -> f64 {
        self.balloon
    }

    pub fn threshold(&self) -> f64 {
        self.theta
    }

    /// Positions where g(I) exceeds θ.
    pub fn threshold_mask(&self) -> &ArrayD<bool> {
        &self.threshold_mask
    }

    /// Positions where g(I) exceeds θ/|ν|, i.e. where the balloon force is
    /// allowed to act. Meaningless while ν = 0 (the balloon is skipped
    /// entirely then).
    pub fn balloon_mask(&self) -> &ArrayD<bool> {
        &self.threshold_mask_v
    }

    fn update_masks(&mut self) {
        let theta = self.theta;
        let scaled = theta / self.balloon.abs();
        self.threshold_mask = self.data.mapv(|v| v > theta);
        self.threshold_mask_v = self.data.mapv(|v| v > scaled);
    }
}

impl Snake for MorphGac {
    fn step(&mut self) -> Result<()> {
        let mut res = self.u.clone();

        // Balloon force, gated by the confidence mask.
        if self.balloon != 0.0 {
            let aux = if self.balloon > 0.0 {
                binary_dilation(&self.u, self.elements.full())
            } else {
                binary_erosion(&self.u, self.elements.full())
            };
            Zip::from(&mut res)
                .and(&aux)
                .and(&self.threshold_mask_v)
                .for_each(|r, &a, &m| {
                    if m {
                        *r = a;
                    }
                });
        }

        // Image attachment: dot product of ∇g(I) and ∇u.
        let mut aux = ArrayD::<f64>::zeros(res.raw_dim());
        for (ax, dg) in self.ddata.iter().enumerate() {
            let du = gradient_axis(&res, ax);
            Zip::from(&mut aux)
                .and(dg)
                .and(&du)
                .for_each(|a, &g, &u| *a += g * u);
        }
        Zip::from(&mut res).and(&aux).for_each(|r, &a| {
            if a > 0.0 {
                *r = 1.0;
            } else if a < 0.0 {
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
