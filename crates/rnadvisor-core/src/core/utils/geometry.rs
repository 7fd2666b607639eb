use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / points.len() as f64))
}

/// Optimal rotation taking the centered `mobile` coordinates onto the centered `target` ones
/// (Kabsch algorithm).
pub fn kabsch_rotation(mobile: &[Point3<f64>], target: &[Point3<f64>]) -> Option<Rotation3<f64>> {
    if mobile.len() != target.len() {
        return None;
    }
    let mobile_center = centroid(mobile)?;
    let target_center = centroid(target)?;

    let covariance: Matrix3<f64> = mobile
        .iter()
        .zip(target.iter())
        .map(|(m, t)| (m - mobile_center) * (t - target_center).transpose())
        .sum();

    let svd = covariance.svd(true, true);
    let u = svd.u?;
    let v = svd.v_t?.transpose();

    let mut correction = Matrix3::identity();
    if (v * u.transpose()).determinant() < 0.0 {
        correction[(2, 2)] = -1.0;
    }
    Some(Rotation3::from_matrix_unchecked(v * correction * u.transpose()))
}

/// RMSD after optimal superposition of `mobile` onto `target`.
///
/// Both slices must pair coordinates index by index.
pub fn superposed_rmsd(mobile: &[Point3<f64>], target: &[Point3<f64>]) -> Option<f64> {
    let rotation = kabsch_rotation(mobile, target)?;
    let mobile_center = centroid(mobile)?;
    let target_center = centroid(target)?;

    let aligned: Vec<Point3<f64>> = mobile
        .iter()
        .map(|p| target_center + rotation * (p - mobile_center))
        .collect();
    calculate_rmsd(&aligned, target)
}

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    nalgebra::distance(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Unit;

    const TOLERANCE: f64 = 1e-9;

    fn sample_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.2, -0.3),
            Point3::new(2.1, 1.7, 0.4),
            Point3::new(0.4, 2.9, 1.8),
            Point3::new(-1.2, 1.1, 2.6),
        ]
    }

    #[test]
    fn calculate_rmsd_rejects_mismatched_or_empty_inputs() {
        let pts = sample_points();
        assert!(calculate_rmsd(&pts, &pts[..2]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }

    #[test]
    fn calculate_rmsd_of_uniform_shift() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let b = vec![Point3::new(0.0, 2.0, 0.0), Point3::new(1.0, 2.0, 0.0)];
        assert!((calculate_rmsd(&a, &b).unwrap() - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn centroid_is_the_mean_position() {
        let pts = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -6.0)];
        assert_eq!(centroid(&pts), Some(Point3::new(1.0, 2.0, -3.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn superposed_rmsd_of_identical_sets_is_zero() {
        let pts = sample_points();
        assert!(superposed_rmsd(&pts, &pts).unwrap() < TOLERANCE);
    }

    #[test]
    fn superposed_rmsd_removes_rigid_motion() {
        let target = sample_points();
        let rotation = Rotation3::from_axis_angle(
            &Unit::new_normalize(Vector3::new(0.3, -1.0, 0.5)),
            1.1,
        );
        let shift = Vector3::new(5.0, -3.0, 12.0);
        let mobile: Vec<Point3<f64>> = target.iter().map(|p| rotation * p + shift).collect();

        assert!(calculate_rmsd(&mobile, &target).unwrap() > 1.0);
        assert!(superposed_rmsd(&mobile, &target).unwrap() < 1e-6);
    }

    #[test]
    fn superposition_never_uses_a_reflection() {
        let target = sample_points();
        let mirrored: Vec<Point3<f64>> = target.iter().map(|p| Point3::new(-p.x, p.y, p.z)).collect();
        let rotation = kabsch_rotation(&mirrored, &target).unwrap();
        assert!((rotation.matrix().determinant() - 1.0).abs() < 1e-6);
        assert!(superposed_rmsd(&mirrored, &target).unwrap() > 0.0);
    }
}
