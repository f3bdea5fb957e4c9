//! Wake of one wing-half: an append-only sequence of shed vortex rings.
//!
//! Every step appends one batch (one ring per border panel) whose strength is
//! frozen at the border circulation of the shedding step. Rings are never
//! removed; their corners are convected with the local induced velocity.

use crate::kernel::Filament;
use crate::mesh::VortexRing;
use crate::vector::Vec3;

/// Lifecycle of a wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakePhase {
    /// Nothing shed yet
    Empty,
    /// At least one batch shed
    Active,
}

/// Shed rings of one wing-half, oldest batch first.
#[derive(Debug, Clone, PartialEq)]
pub struct Wake {
    filaments: Vec<Filament>,
    batch_size: usize,
}

impl Wake {
    /// An empty wake shedding `batch_size` rings per step.
    pub fn new(batch_size: usize) -> Self {
        Self {
            filaments: Vec::new(),
            batch_size,
        }
    }

    /// Empty until the first batch is shed.
    pub fn phase(&self) -> WakePhase {
        if self.filaments.is_empty() {
            WakePhase::Empty
        } else {
            WakePhase::Active
        }
    }

    /// All rings with their frozen circulation.
    pub fn filaments(&self) -> &[Filament] {
        &self.filaments
    }

    /// Number of rings.
    pub fn len(&self) -> usize {
        self.filaments.len()
    }

    /// True before the first batch.
    pub fn is_empty(&self) -> bool {
        self.filaments.is_empty()
    }

    /// Rings shed per step, the border count of the half.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of steps that have shed into this wake.
    pub fn batch_count(&self) -> usize {
        if self.batch_size == 0 {
            0
        } else {
            self.filaments.len() / self.batch_size
        }
    }

    /// Rings shed by the zero-based step `step`.
    pub fn batch(&self, step: usize) -> Option<&[Filament]> {
        if step >= self.batch_count() {
            return None;
        }
        let start = step * self.batch_size;
        Some(&self.filaments[start..start + self.batch_size])
    }

    /// All ring corners, four per filament, in storage order.
    pub fn corner_points(&self) -> Vec<Vec3> {
        self.filaments
            .iter()
            .flat_map(|f| f.ring.corners)
            .collect()
    }

    /// Moves every corner by `velocity · dt`; `velocities` matches [`Wake::corner_points`].
    pub fn convect(&mut self, velocities: &[Vec3], dt: f64) {
        debug_assert_eq!(velocities.len(), 4 * self.filaments.len());
        for (filament, v) in self.filaments.iter_mut().zip(velocities.chunks_exact(4)) {
            for (corner, vc) in filament.ring.corners.iter_mut().zip(v) {
                *corner += *vc * dt;
            }
        }
    }

    /// Appends one batch: `rings` carrying the circulations `gammas`.
    pub fn shed(&mut self, rings: &[VortexRing], gammas: &[f64]) {
        debug_assert_eq!(rings.len(), self.batch_size);
        debug_assert_eq!(gammas.len(), self.batch_size);
        self.filaments.extend(
            rings
                .iter()
                .zip(gammas)
                .map(|(&ring, &gamma)| Filament { ring, gamma }),
        );
    }
}

/// Shed geometry of one batch, one ring per border ring.
///
/// `trailing` holds the trailing-edge segment of every border ring at the
/// current step (two points per ring, see [`crate::mesh::Surface::trailing_edge`]),
/// `velocities` the induced velocity at those points and `next` the same
/// points where the wing sits one step later. Each ring spans from the next
/// trailing edge to the current one advected over `dt`, so the sheet stays
/// attached to the wing without overlapping its panels. The shared edge is
/// traversed opposite to the wing's, keeping the ring's normal on the wing's side.
pub fn shed_rings(trailing: &[Vec3], velocities: &[Vec3], next: &[Vec3], dt: f64) -> Vec<VortexRing> {
    debug_assert_eq!(trailing.len(), velocities.len());
    debug_assert_eq!(trailing.len(), next.len());
    trailing
        .chunks_exact(2)
        .zip(velocities.chunks_exact(2))
        .zip(next.chunks_exact(2))
        .map(|((edge, v), next)| {
            VortexRing::new([next[0], edge[0] + v[0] * dt, edge[1] + v[1] * dt, next[1]])
        })
        .collect()
}
