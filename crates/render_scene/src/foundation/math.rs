//! Math utilities and types
//!
//! Provides the math types used by scene entities and their binary records.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Linear RGB color
pub type Rgb = Vec3;

/// Linear RGBA color
pub type Rgba = Vec4;

/// Transform made of an origin, a rotation and a per-axis scale
///
/// Applied in scale, rotate, translate order. No validation is performed on
/// the components: NaN or negative scale values are stored as given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledTransform {
    /// Translation in world space
    pub origin: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for ScaledTransform {
    fn default() -> Self {
        Self {
            origin: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl ScaledTransform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform from all three components
    pub fn new(origin: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { origin, rotation, scale }
    }

    /// Create a transform with only an origin
    pub fn from_origin(origin: Vec3) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.origin)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }

    /// Combine this transform with a child transform
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            origin: self.origin + self.rotation * self.scale.component_mul(&other.origin),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Check for bitwise equality of every component
    ///
    /// Used where a round trip must reproduce the exact bits, including NaN payloads.
    pub fn bits_eq(&self, other: &Self) -> bool {
        let lhs = self.to_bits();
        let rhs = other.to_bits();
        lhs == rhs
    }

    fn to_bits(&self) -> [u32; 10] {
        let q = self.rotation.quaternion();
        [
            self.origin.x.to_bits(),
            self.origin.y.to_bits(),
            self.origin.z.to_bits(),
            q.i.to_bits(),
            q.j.to_bits(),
            q.k.to_bits(),
            q.w.to_bits(),
            self.scale.x.to_bits(),
            self.scale.y.to_bits(),
            self.scale.z.to_bits(),
        ]
    }
}
