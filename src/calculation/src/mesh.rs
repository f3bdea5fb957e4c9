//! Vortex-ring panels and half-wing mesh generation.
//!
//! Meshes are built once, in the wing-local frame of the right half:
//! x chordwise toward the trailing edge, y spanwise from the root, z up.
//! Panel corners run counter-clockwise seen from +z, so a positive
//! circulation induces upwash through the panel along its normal.

use crate::error::{Error, Result};
use crate::nondim::WingPlanform;
use crate::vector::Vec3;
use crate::wing::Side;

/// Quadrilateral vortex ring: four straight segments c0→c1→c2→c3→c0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VortexRing {
    /// Corners in circulation order
    pub corners: [Vec3; 4],
}

impl VortexRing {
    /// Ring through `corners`, in circulation order.
    pub const fn new(corners: [Vec3; 4]) -> Self {
        Self { corners }
    }

    /// Segments as `(start, end)` pairs in circulation order.
    #[inline(always)]
    pub fn segments(&self) -> [(Vec3, Vec3); 4] {
        let c = &self.corners;
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Mean of the corners; used as the collocation point.
    pub fn centroid(&self) -> Vec3 {
        self.corners.iter().copied().sum::<Vec3>() * 0.25
    }

    /// Unit normal from the diagonal cross product; `None` if degenerate.
    pub fn normal(&self) -> Option<Vec3> {
        let c = &self.corners;
        (c[2] - c[0]).cross(&(c[3] - c[1])).normalized()
    }

    /// Lengths of the four segments.
    pub fn edge_lengths(&self) -> [f64; 4] {
        self.segments().map(|(a, b)| a.distance(&b))
    }

    /// Mirror across y = 0, reversing the corner order to keep the normal outward.
    pub fn mirrored_y(&self) -> Self {
        let c = &self.corners;
        Self::new([c[0].mirror_y(), c[3].mirror_y(), c[2].mirror_y(), c[1].mirror_y()])
    }

    /// Applies `f` to every corner.
    pub fn map_corners(&self, f: impl Fn(&Vec3) -> Vec3) -> Self {
        Self::new(self.corners.each_ref().map(f))
    }
}

/// Panel set of one wing-half: the first `border_count` rings form the
/// trailing-edge (border) row, the rest complete the total set.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Vortex rings, border row first
    pub rings: Vec<VortexRing>,
    /// Collocation point of each ring
    pub collocation: Vec<Vec3>,
    /// Unit normal of each ring
    pub normals: Vec<Vec3>,
    /// Number of leading entries of `rings` forming the border row
    pub border_count: usize,
    /// Index into [`VortexRing::segments`] of the border rings' trailing-edge segment
    pub trailing_segment: usize,
}

impl Surface {
    /// Builds collocation points (centroids) and unit normals for `rings`.
    pub fn from_rings(
        rings: Vec<VortexRing>,
        border_count: usize,
        trailing_segment: usize,
    ) -> Result<Self> {
        if border_count > rings.len() {
            return Err(Error::invalid("border panel count exceeds total panel count"));
        }
        if trailing_segment >= 4 {
            return Err(Error::invalid("a vortex ring has four segments"));
        }
        let normals = rings
            .iter()
            .enumerate()
            .map(|(i, ring)| {
                ring.normal()
                    .ok_or_else(|| Error::invalid(format!("panel {i} is degenerate")))
            })
            .collect::<Result<Vec<_>>>()?;
        let collocation = rings.iter().map(VortexRing::centroid).collect();

        Ok(Self {
            rings,
            collocation,
            normals,
            border_count,
            trailing_segment,
        })
    }

    /// Number of rings in the total set.
    pub fn total_count(&self) -> usize {
        self.rings.len()
    }

    /// The border (trailing-edge) row.
    pub fn border(&self) -> &[VortexRing] {
        &self.rings[..self.border_count]
    }

    /// Trailing-edge segment of every border ring as two points, start then
    /// end in circulation order. Neighbouring rings share their end points.
    pub fn trailing_edge(&self) -> Vec<Vec3> {
        self.border()
            .iter()
            .flat_map(|ring| {
                let (start, end) = ring.segments()[self.trailing_segment];
                [start, end]
            })
            .collect()
    }

    /// Mirror across y = 0. Reversing the corners moves segment `k` to `3 - k`.
    pub fn mirrored_y(&self) -> Self {
        Self {
            rings: self.rings.iter().map(VortexRing::mirrored_y).collect(),
            collocation: self.collocation.iter().map(Vec3::mirror_y).collect(),
            normals: self.normals.iter().map(Vec3::mirror_y).collect(),
            border_count: self.border_count,
            trailing_segment: 3 - self.trailing_segment,
        }
    }
}

/// Local-frame mesh of a wing, stored as its right half.
#[derive(Debug, Clone, PartialEq)]
pub struct WingMesh {
    /// Right half in the wing-local frame
    pub right: Surface,
    /// Planform the mesh was generated from
    pub planform: WingPlanform,
}

impl WingMesh {
    /// Local-frame surface of the requested half.
    pub fn half(&self, side: Side) -> Surface {
        match side {
            Side::Right => self.right.clone(),
            Side::Left => self.right.mirrored_y(),
        }
    }
}

/// Generates a trapezoidal half-wing with a straight leading edge along y.
///
/// Rows are ordered trailing edge first, then from the leading edge aft.
pub fn generate(planform: &WingPlanform) -> Result<WingMesh> {
    let WingPlanform {
        span,
        root_chord,
        tip_chord,
        n_span,
        n_chord,
        ..
    } = *planform;
    if n_span == 0 || n_chord == 0 {
        return Err(Error::invalid("a wing needs at least one panel in each direction"));
    }

    let node = |row: usize, col: usize| {
        let eta = col as f64 / n_span as f64;
        let chord = root_chord + (tip_chord - root_chord) * eta;
        Vec3::new(chord * row as f64 / n_chord as f64, span * eta, 0.0)
    };
    let panel = |row: usize, col: usize| {
        VortexRing::new([
            node(row, col),
            node(row + 1, col),
            node(row + 1, col + 1),
            node(row, col + 1),
        ])
    };

    let trailing = n_chord - 1;
    let rows = std::iter::once(trailing).chain(0..trailing);
    let rings = rows
        .flat_map(|row| (0..n_span).map(move |col| (row, col)))
        .map(|(row, col)| panel(row, col))
        .collect();

    Ok(WingMesh {
        // c1 -> c2 runs along the trailing edge, root to tip
        right: Surface::from_rings(rings, n_span, 1)?,
        planform: *planform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn planform() -> WingPlanform {
        WingPlanform {
            span: 1.0,
            root_chord: 0.4,
            tip_chord: 0.2,
            n_span: 3,
            n_chord: 2,
            pitch_axis: 0.1,
            separation: 0.0,
        }
    }

    #[test]
    fn test_counts_and_border_row() {
        let mesh = generate(&planform()).unwrap();
        assert_eq!(mesh.right.total_count(), 6);
        assert_eq!(mesh.right.border().len(), 3);
        // Border panels touch the trailing edge
        let root_border = mesh.right.border()[0];
        assert_relative_eq!(root_border.corners[1].x, 0.4);
        // First non-border panel starts at the leading edge
        assert_relative_eq!(mesh.right.rings[3].corners[0].x, 0.0);
    }

    #[test]
    fn test_normals_point_up_on_both_halves() {
        let mesh = generate(&planform()).unwrap();
        for side in [Side::Right, Side::Left] {
            let surface = mesh.half(side);
            for (ring, normal) in surface.rings.iter().zip(&surface.normals) {
                assert_relative_eq!(normal.z, 1.0);
                assert_eq!(ring.normal(), Some(*normal));
            }
        }
    }

    #[test]
    fn test_left_half_mirrors_right() {
        let mesh = generate(&planform()).unwrap();
        let left = mesh.half(Side::Left);
        for (r, l) in mesh.right.collocation.iter().zip(&left.collocation) {
            assert_eq!(l.y, -r.y);
            assert_eq!(l.x, r.x);
        }
        assert!(left.collocation.iter().all(|p| p.y < 0.0));
    }

    #[test]
    fn test_trailing_edge_on_both_halves() {
        let mesh = generate(&planform()).unwrap();
        for side in [Side::Right, Side::Left] {
            let surface = mesh.half(side);
            let edge = surface.trailing_edge();
            assert_eq!(edge.len(), 2 * surface.border_count);
            for (k, pair) in edge.chunks_exact(2).enumerate() {
                // Both points lie on the trailing edge, x = local chord
                for p in pair {
                    let chord = 0.4 - 0.2 * p.y.abs();
                    assert_relative_eq!(p.x, chord, epsilon = 1e-12);
                }
                // Traversed in the ring's own circulation order
                let ring = surface.border()[k];
                let (a, b) = ring.segments()[surface.trailing_segment];
                assert_eq!((pair[0], pair[1]), (a, b));
            }
        }
        // Mirroring reverses the traversal direction along y
        let right = mesh.right.trailing_edge();
        let left = mesh.half(Side::Left).trailing_edge();
        assert!(right[1].y > right[0].y);
        assert!(left[1].y > left[0].y);
        assert_eq!(left[0], right[1].mirror_y());
    }

    #[test]
    fn test_rejects_empty_mesh() {
        let bad = WingPlanform { n_chord: 0, ..planform() };
        assert!(generate(&bad).is_err());
    }
}
