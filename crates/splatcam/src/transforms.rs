/// Quaternions with a magnitude below this value cannot be normalized.
pub const QUATERNION_NORM_EPSILON: f64 = 1e-10;

/// Error types for the transforms module.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransformError {
    /// The quaternion has zero or non-finite magnitude
    #[error("Degenerate quaternion {0:?} cannot be normalized")]
    DegenerateQuaternion([f64; 4]),
}

/// Normalize a quaternion to unit length.
///
/// # Arguments
///
/// * `quaternion` - The quaternion in (x, y, z, w) order.
///
/// # Returns
///
/// The unit quaternion, or an error if the magnitude is zero or not finite.
pub fn normalize_quaternion(quaternion: &[f64; 4]) -> Result<[f64; 4], TransformError> {
    let magnitude = quaternion.iter().map(|q| q * q).sum::<f64>().sqrt();

    // NOTE: NaN fails both comparisons and is rejected here as well
    if !(magnitude.is_finite() && magnitude >= QUATERNION_NORM_EPSILON) {
        return Err(TransformError::DegenerateQuaternion(*quaternion));
    }

    Ok(quaternion.map(|q| q / magnitude))
}

/// Compute the rotation matrix from a quaternion.
///
/// The quaternion is normalized before the conversion. The returned matrix is
/// row-major, `rotation[row][col]`, and right-handed: column `j` holds the
/// image of the world unit axis `j` under the rotation.
///
/// # Arguments
///
/// * `quaternion` - The quaternion in (x, y, z, w) order.
///
/// # Returns
///
/// The 3x3 rotation matrix.
///
/// Example:
///
/// ```
/// use splatcam::transforms::quaternion_to_rotation_matrix;
///
/// let rotation = quaternion_to_rotation_matrix(&[0.0, 0.0, 0.0, 1.0]).unwrap();
/// assert_eq!(rotation, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn quaternion_to_rotation_matrix(
    quaternion: &[f64; 4],
) -> Result<[[f64; 3]; 3], TransformError> {
    let [x, y, z, w] = normalize_quaternion(quaternion)?;

    let xx = x * x;
    let yy = y * y;
    let zz = z * z;

    let xy = x * y;
    let xz = x * z;
    let yz = y * z;

    let wx = w * x;
    let wy = w * y;
    let wz = w * z;

    Ok([
        [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
        [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
        [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
    ])
}

/// Compute the determinant of a 3x3 matrix.
pub fn rotation_matrix_determinant(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Check whether a 3x3 matrix is a proper rotation.
///
/// The matrix must satisfy `R^T * R = I` and `det(R) = +1` within `tolerance`.
pub fn is_rotation_matrix(m: &[[f64; 3]; 3], tolerance: f64) -> bool {
    for i in 0..3 {
        for j in 0..3 {
            let dot = (0..3).map(|k| m[k][i] * m[k][j]).sum::<f64>();
            let expected = if i == j { 1.0 } else { 0.0 };
            if !((dot - expected).abs() <= tolerance) {
                return false;
            }
        }
    }

    (rotation_matrix_determinant(m) - 1.0).abs() <= tolerance
}
