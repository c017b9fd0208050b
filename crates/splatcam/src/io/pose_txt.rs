use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::pose::PoseRecord;

/// Error types for the pose trajectory reader.
#[derive(Debug, thiserror::Error)]
pub enum PoseTxtError {
    /// Error reading the file
    #[error("error reading pose file")]
    IoError(#[from] std::io::Error),

    /// A non-blank line is not a valid pose record
    #[error("Malformed pose record at line {line}: {reason}: {content:?}")]
    MalformedRecord {
        /// 1-based line number in the input, blank lines included
        line: usize,
        /// Raw content of the line
        content: String,
        /// What is wrong with the line
        reason: String,
    },
}

/// Read a pose trajectory file.
///
/// Every non-blank line holds `timestamp x y z qx qy qz qw`.
///
/// # Arguments
///
/// * `path` - The path to the pose file.
///
/// # Returns
///
/// The poses in file order.
pub fn read_poses_txt(path: impl AsRef<Path>) -> Result<Vec<PoseRecord>, PoseTxtError> {
    // open the file and create a buffered reader
    let file = File::open(path)?;
    parse_poses(BufReader::new(file))
}

/// Parse a pose trajectory from a buffered reader.
///
/// Blank lines are skipped. The first malformed line aborts the parse, since
/// dropping it would shift the position of every following pose.
pub fn parse_poses(mut reader: impl BufRead) -> Result<Vec<PoseRecord>, PoseTxtError> {
    let mut poses = Vec::new();
    let mut buffer = Vec::new();
    let mut line_number = 0;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        line_number += 1;

        // NOTE: invalid UTF-8 is a malformed line, not an I/O failure
        let bytes = buffer.strip_suffix(b"\n").unwrap_or(&buffer[..]);
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        let line = match std::str::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                return Err(PoseTxtError::MalformedRecord {
                    line: line_number,
                    content: String::from_utf8_lossy(bytes).into_owned(),
                    reason: format!("invalid UTF-8: {}", e),
                })
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let pose = parse_pose_line(line).map_err(|reason| PoseTxtError::MalformedRecord {
            line: line_number,
            content: line.to_string(),
            reason,
        })?;
        poses.push(pose);
    }

    log::debug!("parsed {} poses", poses.len());

    Ok(poses)
}

/// Parse a pose line and return a PoseRecord struct.
///       TIMESTAMP, X, Y, Z, QX, QY, QZ, QW
fn parse_pose_line(line: &str) -> Result<PoseRecord, String> {
    // split the line into parts by whitespace
    let parts = line.split_whitespace().collect::<Vec<_>>();

    if parts.len() != PoseRecord::NUM_FIELDS {
        return Err(format!(
            "expected {} fields, found {}",
            PoseRecord::NUM_FIELDS,
            parts.len()
        ));
    }

    let mut fields = [0.0; PoseRecord::NUM_FIELDS];
    for (field, part) in fields.iter_mut().zip(parts) {
        *field = parse_part(part)?;
    }

    Ok(PoseRecord::from_fields(&fields))
}

fn parse_part(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|e| format!("{}: {}", s, e))?;
    if !value.is_finite() {
        return Err(format!("{}: non-finite value", s));
    }
    Ok(value)
}
