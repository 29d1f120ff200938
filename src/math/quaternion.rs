//! Quaternion implementation for rotations.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::Vector3;

/// A quaternion representing a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Quaternion {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W component (scalar).
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// Identity quaternion (no rotation).
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a new quaternion.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a quaternion from an axis and angle (axis must be normalized).
    pub fn from_axis_angle(axis: &Vector3, angle: f32) -> Self {
        let half = angle / 2.0;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    /// Create a quaternion from the elements of a pure rotation matrix.
    pub fn from_rotation_matrix_elements(
        m00: f32, m01: f32, m02: f32,
        m10: f32, m11: f32, m12: f32,
        m20: f32, m21: f32, m22: f32,
    ) -> Self {
        let trace = m00 + m11 + m22;

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self {
                w: 0.25 / s,
                x: (m21 - m12) * s,
                y: (m02 - m20) * s,
                z: (m10 - m01) * s,
            }
        } else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            Self {
                w: (m21 - m12) / s,
                x: 0.25 * s,
                y: (m01 + m10) / s,
                z: (m02 + m20) / s,
            }
        } else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            Self {
                w: (m02 - m20) / s,
                x: (m01 + m10) / s,
                y: 0.25 * s,
                z: (m12 + m21) / s,
            }
        } else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            Self {
                w: (m10 - m01) / s,
                x: (m02 + m20) / s,
                y: (m12 + m21) / s,
                z: 0.25 * s,
            }
        }
    }

    /// Get the length of the quaternion.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Normalize the quaternion.
    pub fn normalize(&mut self) -> &mut Self {
        let len = self.length();
        if len > 0.0 {
            let inv = 1.0 / len;
            self.x *= inv;
            self.y *= inv;
            self.z *= inv;
            self.w *= inv;
        } else {
            *self = Self::IDENTITY;
        }
        self
    }

    /// Check if approximately equal to another quaternion.
    /// A quaternion and its negation represent the same rotation.
    pub fn approx_eq(&self, other: &Quaternion, epsilon: f32) -> bool {
        let same = (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
            && (self.w - other.w).abs() < epsilon;
        let negated = (self.x + other.x).abs() < epsilon
            && (self.y + other.y).abs() < epsilon
            && (self.z + other.z).abs() < epsilon
            && (self.w + other.w).abs() < epsilon;
        same || negated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Matrix4;

    #[test]
    fn test_axis_angle_roundtrip() {
        let q = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 1.2);
        let m = Matrix4::from_quaternion(&q);
        let (_, extracted, _) = m.decompose();
        assert!(extracted.approx_eq(&q, 1e-5));
    }

    #[test]
    fn test_identity_matrix_is_identity_rotation() {
        let q = Quaternion::from_rotation_matrix_elements(
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        );
        assert!(q.approx_eq(&Quaternion::IDENTITY, 1e-6));
    }
}
