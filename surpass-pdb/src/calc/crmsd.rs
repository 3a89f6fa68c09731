use nalgebra::Matrix3;

use crate::calc::Vec3;

/// Calculates the coordinate RMSD between two point sets after optimal superposition.
///
/// The optimal rotation is found with the Kabsch algorithm: both sets are moved
/// to their centers of mass, the covariance matrix is decomposed by SVD and the
/// determinant sign correction removes improper rotations. The two slices must
/// have equal, non-zero length.
pub fn crmsd(template: &[Vec3], model: &[Vec3]) -> f64 {
    assert_eq!(template.len(), model.len(), "crmsd() requires point sets of equal size");
    let n = template.len() as f64;

    let mut cm_t = Vec3::from_float(0.0);
    let mut cm_m = Vec3::from_float(0.0);
    for (t, m) in template.iter().zip(model.iter()) {
        cm_t += t;
        cm_m += m;
    }
    cm_t /= n;
    cm_m /= n;

    // covariance matrix and the total squared norm of both centered sets
    let mut cov = Matrix3::<f64>::zeros();
    let mut e0 = 0.0;
    for (t, m) in template.iter().zip(model.iter()) {
        let tc = [t.x - cm_t.x, t.y - cm_t.y, t.z - cm_t.z];
        let mc = [m.x - cm_m.x, m.y - cm_m.y, m.z - cm_m.z];
        for i in 0..3 {
            e0 += tc[i] * tc[i] + mc[i] * mc[i];
            for j in 0..3 {
                cov[(i, j)] += tc[i] * mc[j];
            }
        }
    }

    let svd = cov.svd(true, true);
    let u = svd.u.unwrap();
    let v_t = svd.v_t.unwrap();
    let sign = if (u * v_t).determinant() < 0.0 { -1.0 } else { 1.0 };
    let d = svd.singular_values[0] + svd.singular_values[1] + sign * svd.singular_values[2];

    ((e0 - 2.0 * d).max(0.0) / n).sqrt()
}
