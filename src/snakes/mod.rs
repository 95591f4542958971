//! Snake solvers: the common solver capability and its two variants.
//!
//! - [`MorphAcwe`]: morphological Active Contours Without Edges (Chan-Vese),
//!   driven by the homogeneity of the two regions' intensities.
//! - [`MorphGac`]: morphological Geodesic Active Contours, driven by an
//!   edge-stopping field and an optional balloon force.
//! - [`MultiSnakes`]: lock-step coordination of several solvers over one
//!   shared image, with collision resolution.
//!
//! All solvers expose the same capability through the [`Snake`] trait:
//! a single-step update, a binarizing level-set accessor pair, and a
//! convergence-checked run loop. The trait is also the seam for alternative
//! execution engines implementing the same contract.

use ndarray::ArrayD;

use crate::error::Result;

pub mod acwe;
pub mod gac;
pub mod multi;

pub use acwe::MorphAcwe;
pub use gac::MorphGac;
pub use multi::{MultiSnakes, SnakeConfig};

/// Result of a [`Snake::run`] loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Number of steps actually performed.
    pub iterations: usize,
    /// True if the level set stabilized before the iteration budget ran out.
    pub converged: bool,
}

/// The common solver capability.
pub trait Snake {
    /// Perform a single evolution step, mutating the level set in place.
    fn step(&mut self) -> Result<()>;

    /// The current level set. Every element is exactly 0 or 1.
    fn levelset(&self) -> &ArrayD<f64>;

    /// Replace the level set. The input is binarized (`v > 0` maps to 1)
    /// and must match the data shape.
    fn set_levelset(&mut self, u: &ArrayD<f64>) -> Result<()>;

    /// Run up to `nb_iters` steps, stopping early once a step leaves the
    /// level set unchanged.
    fn run(&mut self, nb_iters: usize) -> Result<RunOutcome> {
        self.run_with(nb_iters, &mut |_| {})
    }

    /// Like [`run`](Snake::run), invoking `iter_callback` with the updated
    /// level set after every step. The callback runs synchronously on the
    /// caller's thread.
    fn run_with(
        &mut self,
        nb_iters: usize,
        iter_callback: &mut dyn FnMut(&ArrayD<f64>),
    ) -> Result<RunOutcome> {
        let mut last = self.levelset().clone();
        for i in 0..nb_iters {
            self.step()?;
            iter_callback(self.levelset());
            if last == *self.levelset() {
                log::info!("no change after {} iterations", i);
                return Ok(RunOutcome {
                    iterations: i + 1,
                    converged: true,
                });
            }
            last.clone_from(self.levelset());
        }
        Ok(RunOutcome {
            iterations: nb_iters,
            converged: false,
        })
    }
}
