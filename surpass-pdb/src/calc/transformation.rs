use crate::calc::{Matrix3x3, Vec3};

/// Rotation-translation operation in 3D.
pub struct Rototranslation {
    origin: Vec3,
    rotation_matrix: Matrix3x3,
    inverse_rotation_matrix: Matrix3x3,
}

impl Rototranslation {
    /// Creates a transformation that rotates 3D points around a given axis.
    ///
    /// The rotation matrix is computed using the
    /// [Rodrigues' rotation formula](https://en.wikipedia.org/wiki/Rodrigues%27_rotation_formula).
    /// Points are moved to the origin of the axis, rotated and moved back.
    pub fn around_axis(start: &Vec3, end: &Vec3, angle_rad: f64) -> Rototranslation {
        let mut axis = end.clone();
        axis -= start;
        axis.normalize();
        let cos_theta = angle_rad.cos();
        let sin_theta = angle_rad.sin();

        let mut u_dot = Matrix3x3::outer(&axis, &axis);
        let mut u_cross = Matrix3x3::from_array([
            0.0, -axis.z, axis.y,
            axis.z, 0.0, -axis.x,
            -axis.y, axis.x, 0.0,
        ]);

        let mut u_rot = Matrix3x3::identity();
        u_rot *= cos_theta;
        u_cross *= sin_theta;
        u_dot *= 1.0 - cos_theta;
        u_rot += &u_cross;
        u_rot += &u_dot;

        // rotation matrices are orthogonal, the transposition is the inverse
        let inv = u_rot.transposed();
        Rototranslation {
            origin: start.clone(),
            rotation_matrix: u_rot,
            inverse_rotation_matrix: inv,
        }
    }

    /// Provides read-only access to the rotation matrix of this transformation
    pub fn rotation_matrix(&self) -> &Matrix3x3 { &self.rotation_matrix }

    /// Provides read-only access to the rotation center of this transformation
    pub fn center(&self) -> &Vec3 { &self.origin }

    /// Applies this transformation to a vector in place
    pub fn apply_mut(&self, vector: &mut Vec3) {
        *vector -= &self.origin;
        self.rotation_matrix.mul_vec_mut(vector);
        *vector += &self.origin;
    }

    /// Applies the inverse of this transformation to a vector in place
    pub fn apply_inverse_mut(&self, vector: &mut Vec3) {
        *vector -= &self.origin;
        self.inverse_rotation_matrix.mul_vec_mut(vector);
        *vector += &self.origin;
    }

    /// Applies this transformation to a vector and returns the result
    pub fn apply(&self, v: &Vec3) -> Vec3 {
        let mut v = v.clone();
        self.apply_mut(&mut v);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_around_z() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let end = Vec3::new(0.0, 0.0, 1.0);
        let rot = Rototranslation::around_axis(&start, &end, std::f64::consts::FRAC_PI_2);
        let mut v = Vec3::new(1.0, 0.0, 0.0);
        rot.apply_mut(&mut v);
        assert!(v.distance_to(&Vec3::new(0.0, 1.0, 0.0)) < 1e-10);
        rot.apply_inverse_mut(&mut v);
        assert!(v.distance_to(&Vec3::new(1.0, 0.0, 0.0)) < 1e-10);
    }

    #[test]
    fn rotation_preserves_axis_points() {
        let start = Vec3::new(1.0, 1.0, 1.0);
        let end = Vec3::new(2.0, 3.0, 4.0);
        let rot = Rototranslation::around_axis(&start, &end, 1.1);
        let mut v = end.clone();
        rot.apply_mut(&mut v);
        assert!(v.distance_to(&end) < 1e-10);
    }
}
