use crate::calc::Vec3;

/// Calculates the planar angle defined by three points, measured at the middle one.
///
/// The returned angle is given in radians, in the range `[0, pi]`.
pub fn planar_angle3(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    let mut ba = a.clone();
    ba -= b;
    let mut bc = c.clone();
    bc -= b;
    let cosine = Vec3::dot(&ba, &bc) / (ba.length() * bc.length());

    cosine.clamp(-1.0, 1.0).acos()
}

/// Calculates the geometric center of a set of points.
pub fn center_of_points(points: &[Vec3]) -> Vec3 {
    let mut cm = Vec3::from_float(0.0);
    for p in points { cm += p; }
    cm /= points.len() as f64;
    cm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_angle() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);
        assert!((planar_angle3(&a, &b, &c).to_degrees() - 90.0).abs() < 1e-10);
    }

    #[test]
    fn straight_angle() {
        let a = Vec3::new(-1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 0.0);
        let c = Vec3::new(2.0, 0.0, 0.0);
        assert!((planar_angle3(&a, &b, &c).to_degrees() - 180.0).abs() < 1e-10);
    }
}
