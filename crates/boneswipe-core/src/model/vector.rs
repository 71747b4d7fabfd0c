//! Small fixed-size linear algebra used for node transforms
//!
//! Rotations are Euler angles in degrees, XYZ order: X is applied first,
//! then Y, then Z (`R = Rz * Ry * Rx`, column vectors).

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

const GIMBAL_EPSILON: f64 = 1e-9;

/// A 3-component vector (translation, Euler rotation in degrees, or scale)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise product
    pub fn scale_by(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// True when every component is within `eps` of the other vector
    pub fn approx_eq(self, other: Vec3, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }

    pub fn is_zero(self) -> bool {
        self == Vec3::ZERO
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Row-major 3x3 matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3(pub [[f64; 3]; 3]);

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    pub fn diagonal(v: Vec3) -> Mat3 {
        Mat3([[v.x, 0.0, 0.0], [0.0, v.y, 0.0], [0.0, 0.0, v.z]])
    }

    /// Rotation matrix for Euler angles in degrees (XYZ order)
    pub fn from_euler_degrees(angles: Vec3) -> Mat3 {
        let (sx, cx) = angles.x.to_radians().sin_cos();
        let (sy, cy) = angles.y.to_radians().sin_cos();
        let (sz, cz) = angles.z.to_radians().sin_cos();

        let rx = Mat3([[1.0, 0.0, 0.0], [0.0, cx, -sx], [0.0, sx, cx]]);
        let ry = Mat3([[cy, 0.0, sy], [0.0, 1.0, 0.0], [-sy, 0.0, cy]]);
        let rz = Mat3([[cz, -sz, 0.0], [sz, cz, 0.0], [0.0, 0.0, 1.0]]);

        rz * ry * rx
    }

    /// Decompose a pure rotation matrix into XYZ Euler angles in degrees
    ///
    /// At gimbal lock (Y = ±90°) the Z angle is pinned to zero.
    pub fn to_euler_degrees(&self) -> Vec3 {
        let m = &self.0;
        let sin_y = (-m[2][0]).clamp(-1.0, 1.0);
        let y = sin_y.asin();
        let cos_y = (1.0 - sin_y * sin_y).sqrt();

        let (x, z) = if cos_y > GIMBAL_EPSILON {
            (m[2][1].atan2(m[2][2]), m[1][0].atan2(m[0][0]))
        } else {
            ((-m[1][2]).atan2(m[1][1]), 0.0)
        };

        Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    pub fn transform(&self, v: Vec3) -> Vec3 {
        let m = &self.0;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[i][k] * rhs.0[k][j]).sum();
            }
        }
        Mat3(out)
    }
}

/// A node's transform relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    pub translate: Vec3,
    pub rotate: Vec3,
    pub scale: Vec3,
    /// Rest orientation, applied after `rotate`
    pub joint_orient: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            translate: Vec3::ZERO,
            rotate: Vec3::ZERO,
            scale: Vec3::ONE,
            joint_orient: Vec3::ZERO,
        }
    }
}

impl LocalTransform {
    /// Combined local orientation (`joint_orient * rotate`)
    pub fn orientation(&self) -> Mat3 {
        Mat3::from_euler_degrees(self.joint_orient) * Mat3::from_euler_degrees(self.rotate)
    }
}

/// A transform expressed in scene (world) space
///
/// Scale is accumulated component-wise; shear introduced by non-uniform
/// parent scale is not represented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub translate: Vec3,
    pub orientation: Mat3,
    pub scale: Vec3,
}

impl WorldTransform {
    pub const IDENTITY: WorldTransform = WorldTransform {
        translate: Vec3::ZERO,
        orientation: Mat3::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Place a child's local transform under this (parent) world transform
    pub fn then(&self, local: &LocalTransform) -> WorldTransform {
        let linear = self.orientation * Mat3::diagonal(self.scale);
        WorldTransform {
            translate: linear.transform(local.translate) + self.translate,
            orientation: self.orientation * local.orientation(),
            scale: self.scale.scale_by(local.scale),
        }
    }

    /// World orientation as XYZ Euler angles in degrees
    pub fn rotation_degrees(&self) -> Vec3 {
        self.orientation.to_euler_degrees()
    }
}
