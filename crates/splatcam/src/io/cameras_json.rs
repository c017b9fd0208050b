use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

use tempfile::NamedTempFile;

use crate::camera::CameraDescriptor;
use crate::transforms::is_rotation_matrix;

/// Tolerance used when checking the rotations of an imported camera table.
const ROTATION_TOLERANCE: f64 = 1e-6;

/// Error types for the camera table module.
#[derive(Debug, thiserror::Error)]
pub enum CamerasJsonError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    IoError(#[from] std::io::Error),

    /// Error serializing or deserializing the document
    #[error("Invalid camera table. {0}")]
    JsonError(#[from] serde_json::Error),

    /// The rotation of a camera is not a proper rotation matrix
    #[error("Camera {id} has an invalid rotation matrix")]
    InvalidRotation {
        /// Camera id
        id: usize,
    },
}

/// Serialize the camera table into an in-memory document.
fn to_json_bytes(cameras: &[CameraDescriptor]) -> Result<Vec<u8>, CamerasJsonError> {
    let mut buffer = serde_json::to_vec_pretty(cameras)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Write the camera table to a writer.
///
/// The whole document is serialized before anything is written, so a
/// serialization failure never reaches the writer.
pub fn write_cameras_json_to(
    mut writer: impl Write,
    cameras: &[CameraDescriptor],
) -> Result<(), CamerasJsonError> {
    let buffer = to_json_bytes(cameras)?;
    writer.write_all(&buffer)?;
    writer.flush()?;
    Ok(())
}

/// Write the camera table to a JSON file.
///
/// The document is written to a temporary file next to `path` and renamed
/// over it once complete. On error, `path` is left as it was.
///
/// # Arguments
///
/// * `path` - The path to the cameras.json file.
/// * `cameras` - The camera descriptors in order.
pub fn write_cameras_json(
    path: impl AsRef<Path>,
    cameras: &[CameraDescriptor],
) -> Result<(), CamerasJsonError> {
    let path = path.as_ref();
    let buffer = to_json_bytes(cameras)?;

    // the temporary file must live on the same filesystem for the rename to be atomic
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    // new files get the umask default instead of the owner-only temp file mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut staging: NamedTempFile = builder.tempfile_in(dir)?;
    staging.write_all(&buffer)?;

    // an existing file keeps its mode
    if let Ok(metadata) = std::fs::metadata(path) {
        staging.as_file().set_permissions(metadata.permissions())?;
    }
    staging.as_file().sync_all()?;
    staging.persist(path).map_err(|e| e.error)?;

    log::debug!("wrote {} cameras to {}", cameras.len(), path.display());

    Ok(())
}

/// Parse a camera table from a reader.
///
/// Every rotation is checked to be a proper rotation matrix.
pub fn parse_cameras_json(reader: impl Read) -> Result<Vec<CameraDescriptor>, CamerasJsonError> {
    let cameras: Vec<CameraDescriptor> = serde_json::from_reader(reader)?;

    if let Some(camera) = cameras
        .iter()
        .find(|c| !is_rotation_matrix(&c.rotation, ROTATION_TOLERANCE))
    {
        return Err(CamerasJsonError::InvalidRotation { id: camera.id });
    }

    Ok(cameras)
}

/// Read a camera table from a JSON file.
///
/// # Arguments
///
/// * `path` - The path to the cameras.json file.
///
/// # Returns
///
/// The camera descriptors in file order.
pub fn read_cameras_json(
    path: impl AsRef<Path>,
) -> Result<Vec<CameraDescriptor>, CamerasJsonError> {
    let file = File::open(path)?;
    parse_cameras_json(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{build_camera_descriptors, CameraConfig};
    use crate::pose::PoseRecord;

    fn sample_cameras() -> Result<Vec<CameraDescriptor>, Box<dyn std::error::Error>> {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let poses = [
            PoseRecord {
                timestamp: 1.0,
                position: [0.0, 0.0, 0.0],
                orientation: [0.0, 0.0, 0.0, 1.0],
            },
            PoseRecord {
                timestamp: 1.25,
                position: [0.1, -0.2, 3.5],
                orientation: [0.0, 0.0, h, h],
            },
        ];
        Ok(build_camera_descriptors(&poses, &CameraConfig::default())?)
    }

    #[test]
    fn test_write_cameras_json_fields() -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        write_cameras_json_to(&mut buffer, &sample_cameras()?)?;

        let value: serde_json::Value = serde_json::from_slice(&buffer)?;
        let entries = value.as_array().ok_or("expected an array")?;
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first["id"], serde_json::json!(0));
        assert_eq!(first["img_name"], serde_json::json!("0"));
        assert_eq!(first["timestamp"], serde_json::json!(1.0));
        assert_eq!(first["width"], serde_json::json!(1920));
        assert_eq!(first["height"], serde_json::json!(1080));
        assert_eq!(first["position"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(
            first["rotation"],
            serde_json::json!([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
        );
        assert_eq!(first["fx"], serde_json::json!(1000.0));
        assert_eq!(first["fy"], serde_json::json!(1000.0));

        // integers stay integers, floats stay floats
        assert!(first["id"].is_u64());
        assert!(first["width"].is_u64());
        assert!(first["fx"].is_f64());
        assert_eq!(entries[1]["img_name"], serde_json::json!("1"));
        assert_eq!(entries[1]["position"], serde_json::json!([0.1, -0.2, 3.5]));
        Ok(())
    }

    #[test]
    fn test_write_cameras_json_empty() -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        write_cameras_json_to(&mut buffer, &[])?;
        assert_eq!(String::from_utf8(buffer)?, "[]\n");
        Ok(())
    }

    #[test]
    fn test_write_read_cameras_json() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cameras.json");

        let cameras = sample_cameras()?;
        write_cameras_json(&path, &cameras)?;

        let read = read_cameras_json(&path)?;
        assert_eq!(read, cameras);

        // only the output file is left behind
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_write_cameras_json_replaces_existing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cameras.json");
        std::fs::write(&path, "stale")?;

        write_cameras_json(&path, &sample_cameras()?)?;
        assert_eq!(read_cameras_json(&path)?.len(), 2);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_write_cameras_json_permissions() -> Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let mode = |p: &Path| -> std::io::Result<u32> {
            Ok(std::fs::metadata(p)?.permissions().mode() & 0o777)
        };

        // a new file gets the same mode as any file created by the process
        let reference = dir.path().join("reference.json");
        std::fs::write(&reference, "")?;
        let path = dir.path().join("cameras.json");
        write_cameras_json(&path, &sample_cameras()?)?;
        assert_eq!(mode(&path)?, mode(&reference)?);

        // an existing file keeps its mode
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640))?;
        write_cameras_json(&path, &sample_cameras()?)?;
        assert_eq!(mode(&path)?, 0o640);
        assert_eq!(read_cameras_json(&path)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_write_cameras_json_missing_dir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing").join("cameras.json");

        assert!(matches!(
            write_cameras_json(&path, &sample_cameras()?),
            Err(CamerasJsonError::IoError(_))
        ));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_parse_cameras_json_invalid_rotation() {
        let text = r#"[{
            "id": 7, "img_name": "7", "timestamp": 0.0, "width": 4, "height": 3,
            "position": [0.0, 0.0, 0.0],
            "rotation": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]],
            "fx": 1.0, "fy": 1.0
        }]"#;
        assert!(matches!(
            parse_cameras_json(text.as_bytes()),
            Err(CamerasJsonError::InvalidRotation { id: 7 })
        ));
    }

    #[test]
    fn test_parse_cameras_json_missing_field() {
        let text = r#"[{ "id": 0, "img_name": "0" }]"#;
        assert!(matches!(
            parse_cameras_json(text.as_bytes()),
            Err(CamerasJsonError::JsonError(_))
        ));
    }
}
