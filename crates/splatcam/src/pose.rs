/// Represents a single camera pose observation from a tracking trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseRecord {
    /// Timestamp in the source time unit
    pub timestamp: f64,
    /// Position in world coordinates
    pub position: [f64; 3], // x, y, z
    /// Orientation as a quaternion
    pub orientation: [f64; 4], // qx, qy, qz, qw
}

impl PoseRecord {
    /// Number of fields of a pose record in its text form.
    pub const NUM_FIELDS: usize = 8;

    /// Create a pose record from the fields `timestamp x y z qx qy qz qw`.
    ///
    /// Example:
    ///
    /// ```
    /// use splatcam::pose::PoseRecord;
    ///
    /// let pose = PoseRecord::from_fields(&[1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 1.0]);
    /// assert_eq!(pose.timestamp, 1.0);
    /// assert_eq!(pose.position, [2.0, 3.0, 4.0]);
    /// assert_eq!(pose.orientation, [0.0, 0.0, 0.0, 1.0]);
    /// ```
    pub fn from_fields(fields: &[f64; Self::NUM_FIELDS]) -> Self {
        Self {
            timestamp: fields[0],
            position: [fields[1], fields[2], fields[3]],
            orientation: [fields[4], fields[5], fields[6], fields[7]],
        }
    }
}
