/// Camera table (cameras.json) reader and writer module.
pub mod cameras_json;

/// Pose trajectory (cam_pose.txt) reader module.
pub mod pose_txt;
