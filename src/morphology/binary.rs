//! Binary erosion and dilation over dynamic-rank arrays.
//!
//! Both operators treat any nonzero input cell as foreground and produce an
//! exact {0, 1} output. Cells outside the domain count as background: an
//! erosion fails wherever its element sticks out of the array, a dilation
//! simply ignores the missing neighbors.

use ndarray::{ArrayD, Dimension};

use super::element::StructuringElement;

/// Binary erosion of `u` by `element`.
///
/// An output cell is 1 iff every active cell of the element, centered there,
/// lands in-bounds on a foreground cell.
pub fn binary_erosion(u: &ArrayD<f64>, element: &StructuringElement) -> ArrayD<f64> {
    let shape: Vec<usize> = u.shape().to_vec();
    let mut out = ArrayD::<f64>::zeros(u.raw_dim());
    let mut nb = vec![0usize; shape.len()];

    for (idx, dst) in out.indexed_iter_mut() {
        let idx = idx.slice();
        let mut covered = true;

        'offsets: for off in element.offsets() {
            for d in 0..idx.len() {
                let p = idx[d] as isize + off[d];
                if p < 0 || p >= shape[d] as isize {
                    covered = false;
                    break 'offsets;
                }
                nb[d] = p as usize;
            }
            if u[&nb[..]] <= 0.0 {
                covered = false;
                break;
            }
        }

        *dst = if covered { 1.0 } else { 0.0 };
    }

    out
}

/// Binary dilation of `u` by `element`.
///
/// An output cell is 1 iff at least one active cell of the element, centered
/// there, lands in-bounds on a foreground cell.
pub fn binary_dilation(u: &ArrayD<f64>, element: &StructuringElement) -> ArrayD<f64> {
    let shape: Vec<usize> = u.shape().to_vec();
    let mut out = ArrayD::<f64>::zeros(u.raw_dim());
    let mut nb = vec![0usize; shape.len()];

    for (idx, dst) in out.indexed_iter_mut() {
        let idx = idx.slice();
        let mut hit = false;

        'offsets: for off in element.offsets() {
            for d in 0..idx.len() {
                let p = idx[d] as isize + off[d];
                if p < 0 || p >= shape[d] as isize {
                    continue 'offsets;
                }
                nb[d] = p as usize;
            }
            if u[&nb[..]] > 0.0 {
                hit = true;
                break;
            }
        }

        *dst = if hit { 1.0 } else { 0.0 };
    }

    out
}
