//! Rigid-body placement of wing-local panels in the space-fixed frame.
//!
//! A local point `p` of a wing-half maps to
//!
//! ```text
//! X = R_y(δ) [ R_y(β) R_x(±φ) R_y(θ) (p − h) + (b, 0, 0) ] − U t
//! ```
//!
//! with pitch axis point `h`, separation `b`, stroke-plane angle `β`,
//! body angle `δ`, sweep `φ` (negated on the left half), pitch `θ` and
//! free stream `U`.

use crate::kinematics::{self, JointState};
use crate::mesh::Surface;
use crate::nondim::SolverParameters;
use crate::vector::{Mat3, Vec3};
use crate::wing::WingHalf;

/// Pose and pose rate of one wing-half at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidMotion {
    rotation: Mat3,
    rotation_rate: Mat3,
    hinge: Vec3,
    offset: Vec3,
    body_velocity: Vec3,
}

impl RigidMotion {
    /// Builds the motion from already evaluated joint angles.
    pub fn new(params: &SolverParameters, half: WingHalf, joints: &JointState, t: f64) -> Self {
        let planform = params.planform(half.wing());
        let stroke = params.kinematics[half].stroke_angle;
        let sign = half.side().sweep_sign();

        let body = Mat3::rotation_y(params.body_angle);
        let outer = body.mul_mat(&Mat3::rotation_y(stroke));
        let sweep = Mat3::rotation_x(sign * joints.sweep);
        let sweep_rate = Mat3::rotation_x_rate(sign * joints.sweep, sign * joints.sweep_rate);
        let pitch = Mat3::rotation_y(joints.pitch);
        let pitch_rate = Mat3::rotation_y_rate(joints.pitch, joints.pitch_rate);

        let rotation = outer.mul_mat(&sweep.mul_mat(&pitch));
        let rotation_rate = outer.mul_mat(&sweep_rate.mul_mat(&pitch).add_mat(&sweep.mul_mat(&pitch_rate)));

        Self {
            rotation,
            rotation_rate,
            hinge: Vec3::new(planform.pitch_axis, 0.0, 0.0),
            offset: body.mul_vec(&Vec3::new(planform.separation, 0.0, 0.0)) + params.body_origin(t),
            body_velocity: params.body_velocity(),
        }
    }

    /// Evaluates the half's joint law at `t` and builds its motion.
    pub fn at(params: &SolverParameters, half: WingHalf, t: f64) -> Self {
        let joints = kinematics::evaluate(&params.kinematics[half], t);
        Self::new(params, half, &joints, t)
    }

    /// Space-fixed position of the local point `p`.
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        self.rotation.mul_vec(&(*p - self.hinge)) + self.offset
    }

    /// Rotates a direction; translation does not apply.
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        self.rotation.mul_vec(v)
    }

    /// Space-fixed velocity of the material point at local position `p`.
    pub fn point_velocity(&self, p: &Vec3) -> Vec3 {
        self.body_velocity + self.rotation_rate.mul_vec(&(*p - self.hinge))
    }

    /// Places a local surface: corners and collocation points moved, normals rotated.
    pub fn place(&self, local: &Surface) -> Surface {
        Surface {
            rings: local
                .rings
                .iter()
                .map(|ring| ring.map_corners(|c| self.transform_point(c)))
                .collect(),
            collocation: local.collocation.iter().map(|p| self.transform_point(p)).collect(),
            normals: local.normals.iter().map(|n| self.transform_vector(n)).collect(),
            border_count: local.border_count,
            trailing_segment: local.trailing_segment,
        }
    }

    /// Velocities of the local collocation points of `local`.
    pub fn collocation_velocities(&self, local: &Surface) -> Vec<Vec3> {
        local.collocation.iter().map(|p| self.point_velocity(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mesh;
    use crate::nondim::nondimensionalize;
    use crate::wing::Side;
    use approx::assert_relative_eq;

    fn params() -> SolverParameters {
        nondimensionalize(&Config::forward_flight(0.6, 8.0)).unwrap().0
    }

    #[test]
    fn test_preserves_edge_lengths_and_unit_normals() {
        let params = params();
        let local_mesh = mesh::generate(&params.front).unwrap();
        for half in WingHalf::ALL {
            let local = local_mesh.half(half.side());
            let placed = RigidMotion::at(&params, half, 0.37).place(&local);
            for (l, g) in local.rings.iter().zip(&placed.rings) {
                for (a, b) in l.edge_lengths().iter().zip(g.edge_lengths()) {
                    assert_relative_eq!(*a, b, epsilon = 1e-12);
                }
            }
            for n in &placed.normals {
                assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_placed_normal_matches_placed_corners() {
        let params = params();
        let local = mesh::generate(&params.rear).unwrap().half(Side::Left);
        let placed = RigidMotion::at(&params, WingHalf::RearLeft, 0.61).place(&local);
        for (ring, n) in placed.rings.iter().zip(&placed.normals) {
            let from_corners = ring.normal().unwrap();
            assert_relative_eq!(from_corners.dot(n), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_point_velocity_matches_finite_difference() {
        let params = params();
        let p = Vec3::new(0.2, 0.7, 0.0);
        let (t, h) = (0.43, 1e-6);
        for half in [WingHalf::FrontRight, WingHalf::RearLeft] {
            let local = if half.side() == Side::Left { p.mirror_y() } else { p };
            let plus = RigidMotion::at(&params, half, t + h).transform_point(&local);
            let minus = RigidMotion::at(&params, half, t - h).transform_point(&local);
            let fd = (plus - minus) * (0.5 / h);
            let v = RigidMotion::at(&params, half, t).point_velocity(&local);
            assert_relative_eq!(v.x, fd.x, epsilon = 1e-6);
            assert_relative_eq!(v.y, fd.y, epsilon = 1e-6);
            assert_relative_eq!(v.z, fd.z, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_halves_are_mirror_images() {
        let mut params = params();
        params.body_angle = 0.0;
        let p = Vec3::new(0.1, 0.5, 0.0);
        let right = RigidMotion::at(&params, WingHalf::FrontRight, 0.2).transform_point(&p);
        let left = RigidMotion::at(&params, WingHalf::FrontLeft, 0.2).transform_point(&p.mirror_y());
        assert_relative_eq!(right.x, left.x, epsilon = 1e-12);
        assert_relative_eq!(right.y, -left.y, epsilon = 1e-12);
        assert_relative_eq!(right.z, left.z, epsilon = 1e-12);
    }
}
