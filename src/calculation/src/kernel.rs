//! Biot–Savart velocity of straight vortex segments, regularized by a cutoff.
//!
//! Every induced velocity in the solver goes through [`segment_velocity`]:
//! unit-strength influence coefficients, wake-on-wing velocities and the
//! velocities that convect the wake.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::mesh::VortexRing;
use crate::vector::Vec3;

/// A vortex ring with its circulation; bound panels and wake rings alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filament {
    /// Ring geometry
    pub ring: VortexRing,
    /// Circulation
    pub gamma: f64,
}

/// Velocity at `p` induced by the segment `a → b` of circulation `gamma`.
///
/// Returns exactly zero when `p` lies within `cutoff` of the segment's
/// supporting line, which also covers zero-length segments.
#[inline(always)]
pub fn segment_velocity(p: &Vec3, a: &Vec3, b: &Vec3, gamma: f64, cutoff: f64) -> Vec3 {
    let r1 = *p - *a;
    let r2 = *p - *b;
    let r0 = *b - *a;

    let cross = r1.cross(&r2);
    let cross_sq = cross.magnitude_sq();
    let r0_sq = r0.magnitude_sq();
    if r0_sq == 0.0 || cross_sq < cutoff * cutoff * r0_sq {
        return Vec3::zero();
    }

    let along = r0.dot(&(r1 * (1.0 / r1.magnitude()) - r2 * (1.0 / r2.magnitude())));
    cross * (gamma / (4.0 * PI) * along / cross_sq)
}

/// Velocity at `p` induced by a closed ring; the four segments in order.
#[inline]
pub fn ring_velocity(p: &Vec3, ring: &VortexRing, gamma: f64, cutoff: f64) -> Vec3 {
    ring.segments()
        .iter()
        .fold(Vec3::zero(), |acc, (a, b)| acc + segment_velocity(p, a, b, gamma, cutoff))
}

/// Velocity at `p` induced by every filament of every group, summed in order.
pub fn induced_velocity(p: &Vec3, groups: &[&[Filament]], cutoff: f64) -> Vec3 {
    groups
        .iter()
        .flat_map(|group| group.iter())
        .fold(Vec3::zero(), |acc, f| acc + ring_velocity(p, &f.ring, f.gamma, cutoff))
}

/// [`induced_velocity`] for many points, parallel over points.
///
/// Each point's sum runs sequentially in a fixed order, so the result does
/// not depend on the thread count.
pub fn induced_velocities(points: &[Vec3], groups: &[&[Filament]], cutoff: f64) -> Vec<Vec3> {
    points
        .par_iter()
        .map(|p| induced_velocity(p, groups, cutoff))
        .collect()
}
