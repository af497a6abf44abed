//! Placement of objects and portals inside an environment.
//!
//! Unlike the quaternion based transforms used for GPU instancing, scene files
//! describe rotations as Euler angles in degrees, so that is what is stored here.

use cgmath::{Deg, Matrix4, Vector3};

/// Position, Euler rotation (degrees per axis) and scale of a placed entity.
///
/// Owned exclusively by the `GameObject` or `Portal` it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Zero position and rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Model matrix: translate, then rotate around X, Y and Z, then scale.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(Deg(self.rotation.x))
            * Matrix4::from_angle_y(Deg(self.rotation.y))
            * Matrix4::from_angle_z(Deg(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(t.rotation, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(t.scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn matrix_applies_scale_rotation_then_translation() {
        let t = Transform::new(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 90.0, 0.0),
            Vector3::new(2.0, 2.0, 2.0),
        );
        let p = t.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        // (1,0,0) scaled to (2,0,0), rotated 90 deg about Y to (0,0,-2), then moved
        assert!((p.x - 1.0).abs() < 1e-5, "x was {}", p.x);
        assert!((p.y - 2.0).abs() < 1e-5, "y was {}", p.y);
        assert!((p.z - 1.0).abs() < 1e-5, "z was {}", p.z);
    }
}
