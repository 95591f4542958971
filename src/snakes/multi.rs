//! Lock-step coordination of several snakes over one shared image.
//!
//! One solver per labeled seed region, all reading the same data. After each
//! round every position claimed by more than one level set is a collision
//! and is cleared in *all* solvers: no region wins a contested pixel, so the
//! regions stay pairwise disjoint after every step.

use ndarray::{ArrayD, Zip};

use crate::error::{Result, SnakeError};
use crate::snakes::{MorphAcwe, MorphGac, Snake};

/// Per-label solver configuration for [`MultiSnakes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnakeConfig {
    /// Chan-Vese solver driven by the raw image.
    Acwe {
        smoothing: usize,
        lambda1: f64,
        lambda2: f64,
    },
    /// Geodesic solver; the shared data must then be a stopping field.
    Gac {
        smoothing: usize,
        threshold: f64,
        balloon: f64,
    },
}

impl Default for SnakeConfig {
    fn default() -> Self {
        SnakeConfig::Acwe {
            smoothing: 1,
            lambda1: 1.0,
            lambda2: 1.0,
        }
    }
}

impl SnakeConfig {
    fn build(&self, levelset: &ArrayD<f64>, data: ArrayD<f64>) -> Result<Box<dyn Snake>> {
        Ok(match *self {
            SnakeConfig::Acwe {
                smoothing,
                lambda1,
                lambda2,
            } => Box::new(MorphAcwe::new(levelset, data, smoothing, lambda1, lambda2)?),
            SnakeConfig::Gac {
                smoothing,
                threshold,
                balloon,
            } => Box::new(MorphGac::new(levelset, data, smoothing, threshold, balloon)?),
        })
    }
}

/// Multi-region coordinator.
pub struct MultiSnakes {
    snakes: Vec<(u32, Box<dyn Snake>)>,
}

impl MultiSnakes {
    /// Build one solver per positive label of `init_mask`.
    ///
    /// `init_mask` uses 0 for background and 1..N for seed regions; each
    /// solver starts from the indicator of its own label and reads a private
    /// copy of `image`. `configs` must hold either a single configuration
    /// (shared by all labels) or exactly one per label.
    pub fn new(
        image: &ArrayD<f64>,
        init_mask: &ArrayD<u32>,
        configs: &[SnakeConfig],
    ) -> Result<Self> {
        let mut labels: Vec<u32> = init_mask.iter().copied().filter(|&l| l > 0).collect();
        labels.sort_unstable();
        labels.dedup();
        if labels.is_empty() {
            return Err(SnakeError::EmptyMask);
        }
        if configs.len() != 1 && configs.len() != labels.len() {
            return Err(SnakeError::ParameterCount {
                expected: labels.len(),
                found: configs.len(),
            });
        }
        if init_mask.shape() != image.shape() {
            return Err(SnakeError::ShapeMismatch {
                levelset: init_mask.shape().to_vec(),
                data: image.shape().to_vec(),
            });
        }

        let mut snakes = Vec::with_capacity(labels.len());
        for (i, &label) in labels.iter().enumerate() {
            let config = if configs.len() == 1 {
                &configs[0]
            } else {
                &configs[i]
            };
            let levelset = init_mask.mapv(|m| if m == label { 1.0 } else { 0.0 });
            snakes.push((label, config.build(&levelset, image.clone())?));
        }
        Ok(Self { snakes })
    }

    /// Number of coordinated regions.
    pub fn len(&self) -> usize {
        self.snakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snakes.is_empty()
    }

    /// Advance every solver by one step, then clear collisions.
    ///
    /// The collision pass is a full barrier: the resolved level sets are
    /// what the next round's balloon/attachment computations read.
    pub fn step(&mut self) -> Result<()> {
        for (_, snake) in &mut self.snakes {
            snake.step()?;
        }

        // Positions claimed by more than one region.
        let first = self.snakes[0].1.levelset();
        let mut claims = ArrayD::<u32>::zeros(first.raw_dim());
        for (_, snake) in &self.snakes {
            Zip::from(&mut claims)
                .and(snake.levelset())
                .for_each(|n, &u| {
                    if u > 0.0 {
                        *n += 1;
                    }
                });
        }
        if claims.iter().any(|&n| n > 1) {
            for (_, snake) in &mut self.snakes {
                let mut resolved = snake.levelset().clone();
                Zip::from(&mut resolved).and(&claims).for_each(|u, &n| {
                    if n > 1 {
                        *u = 0.0;
                    }
                });
                snake.set_levelset(&resolved)?;
            }
        }
        Ok(())
    }

    /// Combined label array, recomputed fresh on every call.
    ///
    /// Each solver's foreground is written with its own label in ascending
    /// label order; the foregrounds are disjoint by construction, so the
    /// order never overwrites another region.
    pub fn labels(&self) -> ArrayD<u32> {
        let first = self.snakes[0].1.levelset();
        let mut out = ArrayD::<u32>::zeros(first.raw_dim());
        for (label, snake) in &self.snakes {
            Zip::from(&mut out).and(snake.levelset()).for_each(|o, &u| {
                if u == 1.0 {
                    *o = *label;
                }
            });
        }
        out
    }

    /// Run exactly `nb_iters` rounds (no early-convergence check, since the
    /// regions may stabilize at different times).
    pub fn run(&mut self, nb_iters: usize) -> Result<()> {
        self.run_with(nb_iters, &mut |_| {})
    }

    /// Like [`run`](MultiSnakes::run), invoking `iter_callback` with the
    /// combined label array after every round.
    pub fn run_with(
        &mut self,
        nb_iters: usize,
        iter_callback: &mut dyn FnMut(&ArrayD<u32>),
    ) -> Result<()> {
        for i in 0..nb_iters {
            self.step()?;
            log::debug!("multi-region round {}/{}", i + 1, nb_iters);
            iter_callback(&self.labels());
        }
        Ok(())
    }
}
