#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Camera descriptors and the rig configuration.
pub mod camera;

/// End-to-end conversion pipeline.
pub mod convert;

/// I/O utilities for reading poses and writing camera tables.
pub mod io;

/// Timestamped camera poses.
pub mod pose;

/// Rotation representation conversions.
pub mod transforms;
