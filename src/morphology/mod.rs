//! Binary morphology over rank-2 and rank-3 level sets.
//!
//! This module carries the set-theoretic machinery the snake solvers are
//! built from:
//!
//! - **Structuring elements** ([`element`]): the fixed orientation sets
//!   (4 elements in 2D, 9 in 3D) and the full 3^d neighborhood used by the
//!   GAC balloon force.
//! - **Binary erosion/dilation** ([`binary`]): min/max filters over a
//!   structuring element, with out-of-bounds neighbors treated as background.
//! - **SI/IS and the curvature operator** ([`curvature`]): max-of-erosions,
//!   min-of-dilations, and the alternating composition that approximates
//!   mean-curvature smoothing.

pub mod binary;
pub mod curvature;
pub mod element;

pub use binary::{binary_dilation, binary_erosion};
pub use curvature::{operator_is, operator_si, CurvatureOperator};
pub use element::{ElementSet, StructuringElement};
