/// Local-to-parent affine transforms used to place primitives and joints
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};

/// A 4x4 homogeneous transform that is always affine.
///
/// Every mutator post-multiplies the current matrix by an elementary
/// transform, so `translate` then `rotate` then `scale` on the same value maps
/// local geometry through `T * R * S`. The type is `Copy`: handing a transform
/// to two children gives each its own matrix, so siblings can never observe
/// each other's mutations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    matrix: Matrix4<f32>,
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Reset to identity in place.
    pub fn set_identity(&mut self) -> &mut Self {
        self.matrix = Matrix4::identity();
        self
    }

    /// Independent duplicate of this transform.
    pub fn copy(&self) -> Self {
        *self
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) -> &mut Self {
        if dx.is_finite() && dy.is_finite() && dz.is_finite() {
            self.matrix *= Matrix4::new_translation(&Vector3::new(dx, dy, dz));
        }
        self
    }

    /// Rotate by `degrees` about the given axis. The axis does not need to be
    /// normalized; a zero-length axis leaves the transform unchanged.
    pub fn rotate(&mut self, degrees: f32, ax: f32, ay: f32, az: f32) -> &mut Self {
        if !degrees.is_finite() {
            return self;
        }
        if let Some(axis) = Unit::try_new(Vector3::new(ax, ay, az), f32::EPSILON) {
            let rotation = Rotation3::from_axis_angle(&axis, degrees.to_radians());
            self.matrix *= rotation.to_homogeneous();
        }
        self
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        if sx.is_finite() && sy.is_finite() && sz.is_finite() {
            self.matrix *= Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz));
        }
        self
    }

    /// Post-multiply by `other`: the result maps through `other` first.
    pub fn compose_with(&mut self, other: &AffineTransform) -> &mut Self {
        self.matrix *= other.matrix;
        self
    }

    /// `self * other` as a new value, leaving both operands untouched.
    pub fn then(&self, other: &AffineTransform) -> AffineTransform {
        let mut out = *self;
        out.compose_with(other);
        out
    }

    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.matrix.transform_point(point)
    }

    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    /// Column-major elements, ready for a uniform upload.
    pub fn elements(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.matrix.as_slice());
        out
    }

    /// The last row must stay `[0, 0, 0, 1]`.
    pub fn is_affine(&self) -> bool {
        let row = self.matrix.row(3);
        row[0] == 0.0 && row[1] == 0.0 && row[2] == 0.0 && row[3] == 1.0
    }

    pub fn approx_eq(&self, other: &AffineTransform, tolerance: f32) -> bool {
        (self.matrix - other.matrix).amax() <= tolerance
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}
