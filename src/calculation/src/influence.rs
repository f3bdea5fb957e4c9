//! Influence matrix and right-hand side of the no-penetration system `A Γ = b`.
//!
//! `A(i, j)` is the normal velocity at collocation point `i` induced by ring
//! `j` at unit strength. Surfaces are laid out one after another in the order
//! they are passed, which for the solver is [`crate::WingHalf::ALL`].

use std::ops::Range;

use ndarray::{s, Array1, Array2};
use rayon::prelude::*;

use crate::kernel::ring_velocity;
use crate::mesh::Surface;
use crate::vector::Vec3;

/// Row/column ranges of each surface in the assembled system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLayout {
    offsets: Vec<usize>,
}

impl SystemLayout {
    /// Layout of consecutive blocks with the given sizes.
    pub fn new(sizes: impl IntoIterator<Item = usize>) -> Self {
        let mut offsets = vec![0];
        for size in sizes {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + size);
        }
        Self { offsets }
    }

    /// One block per surface, sized by its total panel count.
    pub fn of(surfaces: &[&Surface]) -> Self {
        Self::new(surfaces.iter().map(|s| s.total_count()))
    }

    /// Dimension of the whole system.
    pub fn dim(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Number of blocks along each axis.
    pub fn block_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Unknowns belonging to `block`.
    pub fn range(&self, block: usize) -> Range<usize> {
        self.offsets[block]..self.offsets[block + 1]
    }

    /// Splits a system vector into one `Vec` per surface.
    pub fn split(&self, x: &Array1<f64>) -> Vec<Vec<f64>> {
        (0..self.block_count())
            .map(|k| x.slice(s![self.range(k)]).to_vec())
            .collect()
    }
}

/// Normal velocities at `target`'s collocation points from `source`'s rings at unit strength.
pub fn influence_block(target: &Surface, source: &Surface, cutoff: f64) -> Array2<f64> {
    let rows: Vec<Vec<f64>> = target
        .collocation
        .par_iter()
        .zip(target.normals.par_iter())
        .map(|(x, n)| {
            source
                .rings
                .iter()
                .map(|ring| n.dot(&ring_velocity(x, ring, 1.0, cutoff)))
                .collect()
        })
        .collect();

    Array2::from_shape_fn((target.total_count(), source.total_count()), |(i, j)| rows[i][j])
}

/// Assembles every self and cross block of `surfaces` into one square matrix.
///
/// Blocks are computed concurrently and each lands in its own disjoint
/// region, so the result is independent of scheduling.
pub fn assemble_matrix(surfaces: &[&Surface], cutoff: f64) -> Array2<f64> {
    let layout = SystemLayout::of(surfaces);
    let n = surfaces.len();

    let blocks: Vec<(usize, usize, Array2<f64>)> = (0..n * n)
        .into_par_iter()
        .map(|k| {
            let (i, j) = (k / n, k % n);
            (i, j, influence_block(surfaces[i], surfaces[j], cutoff))
        })
        .collect();

    let mut matrix = Array2::zeros((layout.dim(), layout.dim()));
    for (i, j, block) in blocks {
        matrix
            .slice_mut(s![layout.range(i), layout.range(j)])
            .assign(&block);
    }
    matrix
}

/// `b_i = (V_wing − V_wake) · n_i`, surfaces concatenated in order.
///
/// `wing_velocities[k]` and `wake_velocities[k]` hold one velocity per
/// collocation point of `surfaces[k]`.
pub fn assemble_rhs(
    surfaces: &[&Surface],
    wing_velocities: &[Vec<Vec3>],
    wake_velocities: &[Vec<Vec3>],
) -> Array1<f64> {
    surfaces
        .iter()
        .zip(wing_velocities.iter().zip(wake_velocities))
        .flat_map(|(surface, (wing, wake))| {
            surface
                .normals
                .iter()
                .zip(wing.iter().zip(wake))
                .map(|(n, (vw, vk))| (*vw - *vk).dot(n))
        })
        .collect()
}
