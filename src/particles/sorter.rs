//! Camera-relative depth ordering for alpha blending.

use crate::math::{Matrix4, Vector3, Vector4};

/// Derives a camera-space ordering key so particles can be drawn
/// back-to-front.
///
/// Built fresh from the current camera transform on every sort pass; only
/// the rotation component of the transform participates in the key, so a
/// camera that merely translates does not change the relative order.
#[derive(Debug, Clone)]
pub struct DepthSorter {
    /// Rotation-only camera matrix.
    rotation: Matrix4,
}

impl DepthSorter {
    /// Build a sorter from the current camera transform. The transform is
    /// decomposed and its translation, scale, skew, and perspective parts
    /// are discarded.
    pub fn from_camera(camera: &Matrix4) -> Self {
        let (_, rotation, _) = camera.decompose();
        Self {
            rotation: Matrix4::from_quaternion(&rotation),
        }
    }

    /// Depth key for a world-space position: its z component in camera
    /// orientation space. Under the -z-forward view convention, ascending
    /// keys run back-to-front.
    #[inline]
    pub fn depth_key(&self, position: &Vector3) -> f32 {
        Vector4::from_vector3(*position, 1.0)
            .apply_matrix4(&self.rotation)
            .z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_camera_keys_are_world_z() {
        let sorter = DepthSorter::from_camera(&Matrix4::IDENTITY);
        assert_eq!(sorter.depth_key(&Vector3::new(1.0, 2.0, -5.0)), -5.0);
        assert_eq!(sorter.depth_key(&Vector3::new(-3.0, 0.0, 4.0)), 4.0);
    }

    #[test]
    fn test_farther_particle_sorts_first() {
        // Two particles at camera-space z = -5 and -1: the -5 one is
        // farther and must precede the -1 one in ascending key order.
        let sorter = DepthSorter::from_camera(&Matrix4::IDENTITY);
        let far = sorter.depth_key(&Vector3::new(0.0, 0.0, -5.0));
        let near = sorter.depth_key(&Vector3::new(0.0, 0.0, -1.0));
        assert!(far < near);
    }

    #[test]
    fn test_translation_is_discarded() {
        let moved = Matrix4::from_translation(&Vector3::new(100.0, -50.0, 7.0));
        let sorter = DepthSorter::from_camera(&moved);
        let identity = DepthSorter::from_camera(&Matrix4::IDENTITY);

        let p = Vector3::new(3.0, -2.0, 8.0);
        assert!((sorter.depth_key(&p) - identity.depth_key(&p)).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_changes_depth_order() {
        // Looking down -z, a is behind b; after a half-turn about Y the
        // order flips.
        let a = Vector3::new(0.0, 0.0, -5.0);
        let b = Vector3::new(0.0, 0.0, -1.0);

        let front = DepthSorter::from_camera(&Matrix4::IDENTITY);
        assert!(front.depth_key(&a) < front.depth_key(&b));

        let half_turn =
            Matrix4::from_axis_angle(&Vector3::UNIT_Y, std::f32::consts::PI);
        let behind = DepthSorter::from_camera(&half_turn);
        assert!(behind.depth_key(&a) > behind.depth_key(&b));
    }

    #[test]
    fn test_scaled_camera_matches_unscaled() {
        let rotation = Matrix4::from_axis_angle(&Vector3::UNIT_Y, 0.6);
        let scaled = rotation.multiply(&Matrix4::from_scale(&Vector3::splat(4.0)));

        let plain = DepthSorter::from_camera(&rotation);
        let sorter = DepthSorter::from_camera(&scaled);

        let p = Vector3::new(1.0, 2.0, 3.0);
        assert!((sorter.depth_key(&p) - plain.depth_key(&p)).abs() < 1e-4);
    }
}
