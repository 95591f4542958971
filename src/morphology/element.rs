//! Dimension-dependent structuring elements.
//!
//! The SI/IS operators sweep a fixed family of line (2D) or plane (3D)
//! elements, one per discrete orientation class of the lattice. The family
//! is a constant of the geometry: 4 elements for rank 2, 9 for rank 3.
//! Any other rank is rejected once, at solver construction.

use crate::error::{Result, SnakeError};

/// A small structuring element, stored as the offsets of its active cells
/// relative to the center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    offsets: Vec<Vec<isize>>,
}

impl StructuringElement {
    fn new(offsets: Vec<Vec<isize>>) -> Self {
        Self { offsets }
    }

    /// Active-cell offsets relative to the element center.
    pub fn offsets(&self) -> &[Vec<isize>] {
        &self.offsets
    }

    /// Number of active cells.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// The full structuring-element family for one rank.
#[derive(Debug, Clone)]
pub struct ElementSet {
    rank: usize,
    orientations: Vec<StructuringElement>,
    full: StructuringElement,
}

impl ElementSet {
    /// Build the element family for a rank-2 or rank-3 domain.
    pub fn for_rank(rank: usize) -> Result<Self> {
        let orientations = match rank {
            2 => orientations_2d(),
            3 => orientations_3d(),
            _ => return Err(SnakeError::InvalidRank(rank)),
        };
        Ok(Self {
            rank,
            orientations,
            full: full_element(rank),
        })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// One line (2D) or plane (3D) element per discrete orientation class.
    pub fn orientations(&self) -> &[StructuringElement] {
        &self.orientations
    }

    /// The all-neighbors 3^rank element used by the balloon force.
    pub fn full(&self) -> &StructuringElement {
        &self.full
    }
}

/// The four 3x3 line elements: main diagonal, vertical, anti-diagonal,
/// horizontal.
fn orientations_2d() -> Vec<StructuringElement> {
    let lines: [[[isize; 2]; 3]; 4] = [
        [[-1, -1], [0, 0], [1, 1]],
        [[-1, 0], [0, 0], [1, 0]],
        [[-1, 1], [0, 0], [1, -1]],
        [[0, -1], [0, 0], [0, 1]],
    ];
    lines
        .iter()
        .map(|line| StructuringElement::new(line.iter().map(|o| o.to_vec()).collect()))
        .collect()
}

/// The nine 3x3x3 plane elements: one plane orthogonal to each axis, plus
/// the six diagonal planes (each spanned by one axis and one diagonal of the
/// remaining two).
fn orientations_3d() -> Vec<StructuringElement> {
    let mut elements = Vec::with_capacity(9);

    // Axis-orthogonal planes.
    for normal in 0..3 {
        let mut offsets = Vec::with_capacity(9);
        for a in -1..=1isize {
            for b in -1..=1isize {
                let mut off = vec![0isize; 3];
                let mut free = (0..3).filter(|&ax| ax != normal);
                off[free.next().unwrap()] = a;
                off[free.next().unwrap()] = b;
                offsets.push(off);
            }
        }
        elements.push(StructuringElement::new(offsets));
    }

    // Diagonal planes: for each free axis, the two remaining axes move
    // together (same sign) or against each other (opposite sign).
    for free in 0..3 {
        for sign in [1isize, -1] {
            let (first, second) = match free {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };
            let mut offsets = Vec::with_capacity(9);
            for a in -1..=1isize {
                for d in -1..=1isize {
                    let mut off = vec![0isize; 3];
                    off[free] = a;
                    off[first] = d;
                    off[second] = sign * d;
                    offsets.push(off);
                }
            }
            elements.push(StructuringElement::new(offsets));
        }
    }

    elements
}

/// The dense 3^rank box, every neighbor active.
fn full_element(rank: usize) -> StructuringElement {
    let mut offsets = vec![vec![]];
    for _ in 0..rank {
        offsets = offsets
            .into_iter()
            .flat_map(|prefix: Vec<isize>| {
                (-1..=1isize).map(move |d| {
                    let mut off = prefix.clone();
                    off.push(d);
                    off
                })
            })
            .collect();
    }
    StructuringElement::new(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_2_has_four_orientations() {
        let set = ElementSet::for_rank(2).unwrap();
        assert_eq!(set.orientations().len(), 4);
        for elem in set.orientations() {
            assert_eq!(elem.len(), 3);
            assert!(elem.offsets().contains(&vec![0, 0]));
        }
    }

    #[test]
    fn test_rank_3_has_nine_orientations() {
        let set = ElementSet::for_rank(3).unwrap();
        assert_eq!(set.orientations().len(), 9);
        for elem in set.orientations() {
            assert_eq!(elem.len(), 9);
            assert!(elem.offsets().contains(&vec![0, 0, 0]));
        }
    }

    #[test]
    fn test_rank_3_orientations_are_distinct() {
        let set = ElementSet::for_rank(3).unwrap();
        for (i, a) in set.orientations().iter().enumerate() {
            for b in set.orientations().iter().skip(i + 1) {
                let mut sa: Vec<_> = a.offsets().to_vec();
                let mut sb: Vec<_> = b.offsets().to_vec();
                sa.sort();
                sb.sort();
                assert_ne!(sa, sb);
            }
        }
    }

    #[test]
    fn test_full_element_sizes() {
        let set2 = ElementSet::for_rank(2).unwrap();
        let set3 = ElementSet::for_rank(3).unwrap();
        assert_eq!(set2.full().len(), 9);
        assert_eq!(set3.full().len(), 27);
    }

    #[test]
    fn test_invalid_ranks_are_rejected() {
        assert_eq!(ElementSet::for_rank(1).unwrap_err(), SnakeError::InvalidRank(1));
        assert_eq!(ElementSet::for_rank(4).unwrap_err(), SnakeError::InvalidRank(4));
    }
}
