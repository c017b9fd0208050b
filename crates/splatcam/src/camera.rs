use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::pose::PoseRecord;
use crate::transforms::{quaternion_to_rotation_matrix, TransformError};

/// Error types for the camera rig configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("error reading configuration file")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for a camera configuration
    #[error("Invalid configuration file. {0}")]
    Json(#[from] serde_json::Error),

    /// Image dimensions must be strictly positive
    #[error("Invalid image size {width}x{height}")]
    InvalidImageSize {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },

    /// Focal lengths must be finite and strictly positive
    #[error("Invalid focal length fx={fx} fy={fy}")]
    InvalidFocalLength {
        /// Horizontal focal length in pixels
        fx: f64,
        /// Vertical focal length in pixels
        fy: f64,
    },
}

/// Error types for building camera descriptors.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// The orientation of a pose cannot be turned into a rotation
    #[error("Degenerate orientation for pose #{index} at timestamp {timestamp}")]
    DegenerateOrientation {
        /// Index of the pose in the input sequence
        index: usize,
        /// Timestamp of the pose
        timestamp: f64,
        /// Underlying conversion error
        #[source]
        source: TransformError,
    },
}

/// Fixed intrinsics of the capture rig shared by every camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Horizontal focal length in pixels
    pub fx: f64,
    /// Vertical focal length in pixels
    pub fy: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fx: 1000.0,
            fy: 1000.0,
        }
    }
}

impl CameraConfig {
    /// Creates a new camera configuration.
    pub fn new(width: u32, height: u32, fx: f64, fy: f64) -> Self {
        Self {
            width,
            height,
            fx,
            fy,
        }
    }

    /// Load a camera configuration from a JSON file.
    ///
    /// Missing fields take their default value. The result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the image size and focal lengths are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidImageSize {
                width: self.width,
                height: self.height,
            });
        }

        let is_valid = |f: f64| f.is_finite() && f > 0.0;
        if !is_valid(self.fx) || !is_valid(self.fy) {
            return Err(ConfigError::InvalidFocalLength {
                fx: self.fx,
                fy: self.fy,
            });
        }

        Ok(())
    }
}

/// A camera entry of the table consumed by the splat renderer.
///
/// The field names are the on-disk contract of `cameras.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    /// Zero-based position of the pose in the input trajectory
    pub id: usize,
    /// Image name, the decimal string of `id`
    pub img_name: String,
    /// Timestamp copied from the pose
    pub timestamp: f64,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Camera position in world coordinates
    pub position: [f64; 3],
    /// Row-major rotation from camera to world
    pub rotation: [[f64; 3]; 3],
    /// Horizontal focal length in pixels
    pub fx: f64,
    /// Vertical focal length in pixels
    pub fy: f64,
}

impl CameraDescriptor {
    /// Build the descriptor of the pose at position `index` of the trajectory.
    pub fn from_pose(
        index: usize,
        pose: &PoseRecord,
        config: &CameraConfig,
    ) -> Result<Self, CameraError> {
        let rotation = quaternion_to_rotation_matrix(&pose.orientation).map_err(|source| {
            CameraError::DegenerateOrientation {
                index,
                timestamp: pose.timestamp,
                source,
            }
        })?;

        Ok(Self {
            id: index,
            img_name: index.to_string(),
            timestamp: pose.timestamp,
            width: config.width,
            height: config.height,
            position: pose.position,
            rotation,
            fx: config.fx,
            fy: config.fy,
        })
    }

    /// Returns the camera-to-world transform as the renderer builds it.
    ///
    /// The result is a column-major 4x4 matrix (`m[col][row]`). The renderer
    /// flips the camera Y and Z axes so that the camera looks down -Z with +Y up.
    pub fn world_from_camera_gl(&self) -> [[f64; 4]; 4] {
        let r = &self.rotation;
        let p = &self.position;
        [
            [r[0][0], r[1][0], r[2][0], 0.0],
            [-r[0][1], -r[1][1], -r[2][1], 0.0],
            [-r[0][2], -r[1][2], -r[2][2], 0.0],
            [p[0], p[1], p[2], 1.0],
        ]
    }
}

/// Build the ordered camera descriptors of a pose trajectory.
///
/// # Arguments
///
/// * `poses` - The poses in trajectory order.
/// * `config` - The rig intrinsics attached to every camera.
///
/// # Returns
///
/// One descriptor per pose, `id` being the position in `poses`. Fails on the
/// first pose whose orientation cannot be normalized.
pub fn build_camera_descriptors(
    poses: &[PoseRecord],
    config: &CameraConfig,
) -> Result<Vec<CameraDescriptor>, CameraError> {
    let cameras = poses
        .iter()
        .enumerate()
        .map(|(i, pose)| CameraDescriptor::from_pose(i, pose, config))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("built {} camera descriptors", cameras.len());

    Ok(cameras)
}
