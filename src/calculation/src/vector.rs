//! 3D vector and rotation-matrix types used throughout the vortex-lattice solver.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// 3D vector with the small set of operations the panel method needs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// x component
    pub x: f64,
    /// y component
    pub y: f64,
    /// z component
    pub z: f64,
}

impl Vec3 {
    /// Creates a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Magnitude (length) of the vector.
    #[inline(always)]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_sq().sqrt()
    }

    /// Squared magnitude (avoids sqrt, cheaper for comparisons).
    #[inline(always)]
    pub fn magnitude_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Normalized vector (unit length), `None` for a degenerate vector.
    pub fn normalized(&self) -> Option<Self> {
        let mag = self.magnitude();
        if mag < 1e-12 {
            None
        } else {
            Some(*self * (1.0 / mag))
        }
    }

    /// Dot product.
    #[inline(always)]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product: self × other
    #[inline(always)]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).magnitude()
    }

    /// Mirror image across the y = 0 plane.
    pub const fn mirror_y(&self) -> Self {
        Self::new(self.x, -self.y, self.z)
    }

    /// Largest absolute component.
    pub fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    /// Convert to array.
    pub const fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl std::iter::Sum for Vec3 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, v| acc + v)
    }
}

/// Row-major 3×3 matrix, used for rigid rotations and their time derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    /// Row vectors
    pub rows: [Vec3; 3],
}

impl Mat3 {
    /// Right-handed rotation about the x axis.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rows: [
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, c, -s),
                Vec3::new(0.0, s, c),
            ],
        }
    }

    /// Right-handed rotation about the y axis.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rows: [
                Vec3::new(c, 0.0, s),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-s, 0.0, c),
            ],
        }
    }

    /// d/dt of [`Mat3::rotation_x`] for an angle changing at `rate`.
    pub fn rotation_x_rate(angle: f64, rate: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rows: [
                Vec3::zero(),
                Vec3::new(0.0, -s * rate, -c * rate),
                Vec3::new(0.0, c * rate, -s * rate),
            ],
        }
    }

    /// d/dt of [`Mat3::rotation_y`] for an angle changing at `rate`.
    pub fn rotation_y_rate(angle: f64, rate: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rows: [
                Vec3::new(-s * rate, 0.0, c * rate),
                Vec3::zero(),
                Vec3::new(-c * rate, 0.0, -s * rate),
            ],
        }
    }

    /// Matrix-vector product.
    #[inline(always)]
    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        Vec3::new(self.rows[0].dot(v), self.rows[1].dot(v), self.rows[2].dot(v))
    }

    /// Transposed matrix; the inverse of a rotation.
    pub fn transpose(&self) -> Self {
        let [a, b, c] = self.rows;
        Self {
            rows: [
                Vec3::new(a.x, b.x, c.x),
                Vec3::new(a.y, b.y, c.y),
                Vec3::new(a.z, b.z, c.z),
            ],
        }
    }

    /// Matrix product `self · other`.
    pub fn mul_mat(&self, other: &Self) -> Self {
        let cols = other.transpose().rows;
        let row = |r: &Vec3| Vec3::new(r.dot(&cols[0]), r.dot(&cols[1]), r.dot(&cols[2]));
        Self {
            rows: [row(&self.rows[0]), row(&self.rows[1]), row(&self.rows[2])],
        }
    }

    /// Element-wise sum.
    pub fn add_mat(&self, other: &Self) -> Self {
        Self {
            rows: [
                self.rows[0] + other.rows[0],
                self.rows[1] + other.rows[1],
                self.rows[2] + other.rows[2],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts;

    #[test]
    fn test_vec3_magnitude() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(v.magnitude(), 5.0);
    }

    #[test]
    fn test_vec3_normalize() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        let normalized = v.normalized().unwrap();
        assert_relative_eq!(normalized.magnitude(), 1.0);
        assert_relative_eq!(normalized.x, 0.6);
        assert_relative_eq!(normalized.y, 0.8);
        assert!(Vec3::zero().normalized().is_none());
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(a.cross(&b), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_rotation_x_quarter_turn() {
        let r = Mat3::rotation_x(consts::FRAC_PI_2);
        let v = r.mul_vec(&Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_is_orthonormal() {
        let r = Mat3::rotation_y(0.7).mul_mat(&Mat3::rotation_x(-1.3));
        let rrt = r.mul_mat(&r.transpose());
        for i in 0..3 {
            let row = rrt.rows[i].to_array();
            for (j, value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(*value, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_rotation_rate_matches_finite_difference() {
        let (angle, rate, h) = (0.4, 2.5, 1e-6);
        let analytic = Mat3::rotation_y_rate(angle, rate);
        let plus = Mat3::rotation_y(angle + rate * h);
        let minus = Mat3::rotation_y(angle - rate * h);
        for i in 0..3 {
            let fd = (plus.rows[i] - minus.rows[i]) * (0.5 / h);
            assert_relative_eq!(fd.x, analytic.rows[i].x, epsilon = 1e-6);
            assert_relative_eq!(fd.z, analytic.rows[i].z, epsilon = 1e-6);
        }

        let analytic = Mat3::rotation_x_rate(angle, rate);
        let plus = Mat3::rotation_x(angle + rate * h);
        let minus = Mat3::rotation_x(angle - rate * h);
        for i in 0..3 {
            let fd = (plus.rows[i] - minus.rows[i]) * (0.5 / h);
            assert_relative_eq!(fd.y, analytic.rows[i].y, epsilon = 1e-6);
            assert_relative_eq!(fd.z, analytic.rows[i].z, epsilon = 1e-6);
        }
    }
}
