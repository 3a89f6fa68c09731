use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

/// 3D vector used to manipulate atomic coordinates.
///
/// [`Vec3`] implements the `+=`, `-=`, `*=` and `/=` operators to facilitate
/// vector arithmetics without temporary allocations.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Vec3 {
    /// the ``x`` coordinate of this vector
    pub x: f64,
    /// the ``y`` coordinate of this vector
    pub y: f64,
    /// the ``z`` coordinate of this vector
    pub z: f64,
}

macro_rules! vec_operation {
    ($lhs:expr, $rhs:expr, $OP:tt ) => {
        $lhs.x $OP $rhs.x;
        $lhs.y $OP $rhs.y;
        $lhs.z $OP $rhs.z;
    };
}

macro_rules! scalar_operation {
    ($lhs:expr, $rhs:expr, $OP:tt ) => {
        $lhs.x $OP $rhs;
        $lhs.y $OP $rhs;
        $lhs.z $OP $rhs;
    };
}

impl Vec3 {
    /// Creates a new vector from its three coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Vec3 { Vec3 { x, y, z } }

    /// Creates a new vector with all three coordinates set to the same value
    pub fn from_float(value: f64) -> Vec3 { Vec3 { x: value, y: value, z: value } }

    /// Copies the coordinates of another vector into this one
    pub fn set(&mut self, other: &Vec3) {
        self.x = other.x;
        self.y = other.y;
        self.z = other.z;
    }

    /// Sets the three coordinates of this vector
    pub fn set3(&mut self, x: f64, y: f64, z: f64) {
        self.x = x;
        self.y = y;
        self.z = z;
    }

    /// Length of this vector
    pub fn length(&self) -> f64 { self.length_squared().sqrt() }

    /// Squared length of this vector
    pub fn length_squared(&self) -> f64 { self.x * self.x + self.y * self.y + self.z * self.z }

    /// Normalizes this vector to the unit length
    pub fn normalize(&mut self) {
        let l = self.length();
        scalar_operation!(self, l, /=);
    }

    /// Dot product of two vectors
    pub fn dot(a: &Vec3, b: &Vec3) -> f64 { a.x * b.x + a.y * b.y + a.z * b.z }

    /// Cross product of two vectors
    pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
        Vec3 {
            x: a.y * b.z - a.z * b.y,
            y: a.z * b.x - a.x * b.z,
            z: a.x * b.y - a.y * b.x,
        }
    }

    /// Distance between the points defined by this vector and `other`
    pub fn distance_to(&self, other: &Vec3) -> f64 {
        let mut d = self.x - other.x;
        let mut d2 = d * d;
        d = self.y - other.y;
        d2 += d * d;
        d = self.z - other.z;
        d2 += d * d;
        d2.sqrt()
    }
}

impl SubAssign<&Vec3> for Vec3 {
    fn sub_assign(&mut self, other: &Vec3) { vec_operation!(self, other, -=); }
}

impl AddAssign<&Vec3> for Vec3 {
    fn add_assign(&mut self, other: &Vec3) { vec_operation!(self, other, +=); }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, scalar: f64) { scalar_operation!(self, scalar, *=); }
}

impl DivAssign<f64> for Vec3 {
    fn div_assign(&mut self, scalar: f64) { scalar_operation!(self, scalar, /=); }
}

impl Display for Vec3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3} {:.3} {:.3}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_arithmetics() {
        let mut center = Vec3::from_float(0.0);
        let corners = [
            Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 1.0),
        ];
        for v in &corners { center += v; }
        center /= 8.0;
        assert!(center.distance_to(&Vec3::from_float(0.5)) < 1e-10);
    }

    #[test]
    fn cross_of_versors() {
        let e = Vec3::cross(&Vec3::new(1.0, 0.0, 0.0), &Vec3::new(0.0, 1.0, 0.0));
        assert!((e.z - 1.0).abs() < 1e-10);
        assert!(e.x.abs() < 1e-10 && e.y.abs() < 1e-10);
    }
}
