//! Morphological snakes in Rust, with optional Python bindings via PyO3.
//!
//! Curvature-based segmentation of 2D and 3D images using purely
//! set-theoretic operators on a binary level set instead of PDE-based
//! curve evolution. The level set is a {0, 1} indicator array, not a
//! signed-distance function, so there is no narrow-banding and no
//! re-initialization.
//!
//! ## Solvers
//! - [`MorphAcwe`]: morphological Active Contours Without Edges
//!   (Chan-Vese), driven directly by the image intensities.
//! - [`MorphGac`]: morphological Geodesic Active Contours, driven by a
//!   precomputed edge-stopping field plus an optional balloon force.
//! - [`MultiSnakes`]: several solvers over one shared image, advanced in
//!   lock-step with collision resolution between their regions.
//!
//! ## Typical use
//! Build a seed with [`circle_levelset`], for GAC compute a stopping
//! field with [`gborders`] or [`glines`], construct a solver and call
//! [`Snake::run`] (or [`Snake::run_with`] to observe each iteration).

pub mod error;
pub mod levelset;
pub mod morphology;
pub mod snakes;
pub mod stopping;

pub use error::{Result, SnakeError};
pub use levelset::circle_levelset;
pub use snakes::{MorphAcwe, MorphGac, MultiSnakes, RunOutcome, Snake, SnakeConfig};
pub use stopping::{gborders, glines};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
    use pyo3::prelude::*;

    use crate::snakes::{MorphAcwe, MorphGac, MultiSnakes, Snake, SnakeConfig};
    use crate::{levelset, stopping};

    // ========================================================================
    // Solvers
    // ========================================================================

    /// Morphological ACWE (Chan-Vese) solver.
    #[pyclass]
    pub struct MorphACWE {
        inner: MorphAcwe,
    }

    #[pymethods]
    impl MorphACWE {
        #[new]
        #[pyo3(signature = (levelset, data, smoothing=1, lambda1=1.0, lambda2=1.0))]
        fn new(
            levelset: PyReadonlyArrayDyn<f64>,
            data: PyReadonlyArrayDyn<f64>,
            smoothing: usize,
            lambda1: f64,
            lambda2: f64,
        ) -> PyResult<Self> {
            let inner = MorphAcwe::new(
                &levelset.as_array().to_owned(),
                data.as_array().to_owned(),
                smoothing,
                lambda1,
                lambda2,
            )?;
            Ok(Self { inner })
        }

        /// Perform a single evolution step.
        fn step(&mut self) -> PyResult<()> {
            Ok(self.inner.step()?)
        }

        /// Run up to `nb_iters` steps; returns `(iterations, converged)`.
        fn run(&mut self, nb_iters: usize) -> PyResult<(usize, bool)> {
            let outcome = self.inner.run(nb_iters)?;
            Ok((outcome.iterations, outcome.converged))
        }

        #[getter]
        fn levelset<'py>(&self, py: Python<'py>) -> Bound<'py, PyArrayDyn<f64>> {
            self.inner.levelset().clone().into_pyarray(py)
        }

        #[setter]
        fn set_levelset(&mut self, u: PyReadonlyArrayDyn<f64>) -> PyResult<()> {
            Ok(self.inner.set_levelset(&u.as_array().to_owned())?)
        }
    }

    /// Morphological GAC (Geodesic Active Contours) solver.
    #[pyclass]
    pub struct MorphGAC {
        inner: MorphGac,
    }

    #[pymethods]
    impl MorphGAC {
        #[new]
        #[pyo3(signature = (levelset, data, smoothing=1, threshold=0.0, balloon=0.0))]
        fn new(
            levelset: PyReadonlyArrayDyn<f64>,
            data: PyReadonlyArrayDyn<f64>,
            smoothing: usize,
            threshold: f64,
            balloon: f64,
        ) -> PyResult<Self> {
            let inner = MorphGac::new(
                &levelset.as_array().to_owned(),
                data.as_array().to_owned(),
                smoothing,
                threshold,
                balloon,
            )?;
            Ok(Self { inner })
        }

        fn step(&mut self) -> PyResult<()> {
            Ok(self.inner.step()?)
        }

        fn run(&mut self, nb_iters: usize) -> PyResult<(usize, bool)> {
            let outcome = self.inner.run(nb_iters)?;
            Ok((outcome.iterations, outcome.converged))
        }

        #[getter]
        fn levelset<'py>(&self, py: Python<'py>) -> Bound<'py, PyArrayDyn<f64>> {
            self.inner.levelset().clone().into_pyarray(py)
        }

        #[setter]
        fn set_levelset(&mut self, u: PyReadonlyArrayDyn<f64>) -> PyResult<()> {
            Ok(self.inner.set_levelset(&u.as_array().to_owned())?)
        }

        /// Replace the stopping field; its gradient and the threshold masks
        /// are recomputed.
        fn set_data(&mut self, data: PyReadonlyArrayDyn<f64>) -> PyResult<()> {
            Ok(self.inner.set_data(data.as_array().to_owned())?)
        }

        #[getter]
        fn balloon(&self) -> f64 {
            self.inner.balloon()
        }

        #[setter]
        fn set_balloon(&mut self, balloon: f64) {
            self.inner.set_balloon(balloon);
        }

        #[getter]
        fn threshold(&self) -> f64 {
            self.inner.threshold()
        }

        #[setter]
        fn set_threshold(&mut self, threshold: f64) {
            self.inner.set_threshold(threshold);
        }
    }

    /// Coordinated multi-region segmentation, one ACWE solver per label.
    #[pyclass]
    pub struct MultiMorphSnakes {
        inner: MultiSnakes,
    }

    #[pymethods]
    impl MultiMorphSnakes {
        #[new]
        #[pyo3(signature = (image, init_mask, smoothing=1, lambda1=1.0, lambda2=1.0))]
        fn new(
            image: PyReadonlyArrayDyn<f64>,
            init_mask: PyReadonlyArrayDyn<i64>,
            smoothing: usize,
            lambda1: f64,
            lambda2: f64,
        ) -> PyResult<Self> {
            let mask = init_mask.as_array().mapv(|v| v.max(0) as u32);
            let config = SnakeConfig::Acwe {
                smoothing,
                lambda1,
                lambda2,
            };
            let inner = MultiSnakes::new(&image.as_array().to_owned(), &mask, &[config])?;
            Ok(Self { inner })
        }

        /// Advance every region by one step and resolve collisions.
        fn step(&mut self) -> PyResult<()> {
            Ok(self.inner.step()?)
        }

        /// Run exactly `nb_iters` rounds.
        fn run(&mut self, nb_iters: usize) -> PyResult<()> {
            Ok(self.inner.run(nb_iters)?)
        }

        /// The combined label array, recomputed on every access.
        #[getter]
        fn levelset<'py>(&self, py: Python<'py>) -> Bound<'py, PyArrayDyn<i64>> {
            self.inner.labels().mapv(|v| v as i64).into_pyarray(py)
        }
    }

    // ========================================================================
    // Stopping fields and seeds
    // ========================================================================

    /// Stopping field for image borders: `1/sqrt(1 + alpha*|grad(G_sigma*I)|)`.
    #[pyfunction]
    #[pyo3(signature = (img, alpha=1.0, sigma=1.0))]
    pub fn gborders<'py>(
        py: Python<'py>,
        img: PyReadonlyArrayDyn<'py, f64>,
        alpha: f64,
        sigma: f64,
    ) -> Bound<'py, PyArrayDyn<f64>> {
        stopping::gborders(&img.as_array().to_owned(), alpha, sigma).into_pyarray(py)
    }

    /// Stopping field for dark lines: the Gaussian-smoothed image.
    #[pyfunction]
    #[pyo3(signature = (img, sigma=1.0))]
    pub fn glines<'py>(
        py: Python<'py>,
        img: PyReadonlyArrayDyn<'py, f64>,
        sigma: f64,
    ) -> Bound<'py, PyArrayDyn<f64>> {
        stopping::glines(&img.as_array().to_owned(), sigma).into_pyarray(py)
    }

    /// Binary level set with a ball of `radius` around `center`.
    #[pyfunction]
    pub fn circle_levelset<'py>(
        py: Python<'py>,
        shape: Vec<usize>,
        center: Vec<f64>,
        radius: f64,
    ) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        Ok(levelset::circle_levelset(&shape, &center, radius)?.into_pyarray(py))
    }

    /// Morphological snakes extension module
    #[pymodule]
    pub fn morphsnakes_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Solvers
        m.add_class::<MorphACWE>()?;
        m.add_class::<MorphGAC>()?;
        m.add_class::<MultiMorphSnakes>()?;

        // Stopping fields and seeds
        m.add_function(wrap_pyfunction!(gborders, m)?)?;
        m.add_function(wrap_pyfunction!(glines, m)?)?;
        m.add_function(wrap_pyfunction!(circle_levelset, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::morphsnakes_rust;
