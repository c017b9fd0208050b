use std::{io::BufRead, path::Path};

use crate::camera::{
    build_camera_descriptors, CameraConfig, CameraDescriptor, CameraError, ConfigError,
};
use crate::io::cameras_json::{write_cameras_json, CamerasJsonError};
use crate::io::pose_txt::{parse_poses, read_poses_txt, PoseTxtError};

/// Error types for the conversion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Invalid camera rig configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to read the pose trajectory
    #[error(transparent)]
    Poses(#[from] PoseTxtError),

    /// Failed to build the camera descriptors
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// Failed to write the camera table
    #[error(transparent)]
    Output(#[from] CamerasJsonError),
}

/// Convert a pose trajectory into camera descriptors.
///
/// # Arguments
///
/// * `reader` - The pose trajectory in text form.
/// * `config` - The rig intrinsics attached to every camera.
///
/// # Returns
///
/// The camera descriptors in trajectory order.
pub fn convert_poses(
    reader: impl BufRead,
    config: &CameraConfig,
) -> Result<Vec<CameraDescriptor>, ConvertError> {
    config.validate()?;
    let poses = parse_poses(reader)?;
    Ok(build_camera_descriptors(&poses, config)?)
}

/// Convert a pose trajectory file into a camera table file.
///
/// Nothing is written unless every pose converts. The output is replaced
/// atomically.
///
/// # Arguments
///
/// * `input` - The path to the pose trajectory, e.g. cam_pose.txt.
/// * `output` - The path to the camera table, e.g. cameras.json.
/// * `config` - The rig intrinsics attached to every camera.
///
/// # Returns
///
/// The number of cameras written.
pub fn convert_poses_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CameraConfig,
) -> Result<usize, ConvertError> {
    let (input, output) = (input.as_ref(), output.as_ref());

    config.validate()?;

    let poses = read_poses_txt(input)?;
    log::info!("read {} poses from {}", poses.len(), input.display());

    let cameras = build_camera_descriptors(&poses, config)?;
    write_cameras_json(output, &cameras)?;
    log::info!("wrote {} cameras to {}", cameras.len(), output.display());

    Ok(cameras.len())
}
