use argh::FromArgs;
use std::path::PathBuf;

use splatcam::camera::{CameraConfig, ConfigError};
use splatcam::convert::convert_poses_file;

#[derive(FromArgs)]
/// Convert a camera pose trajectory into a Gaussian splatting camera table
struct Args {
    /// path to the pose trajectory (timestamp x y z qx qy qz qw per line)
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the output camera table
    #[argh(option, short = 'o', default = "PathBuf::from(\"cameras.json\")")]
    output: PathBuf,

    /// path to a JSON file with the rig configuration (width, height, fx, fy)
    #[argh(option)]
    config: Option<PathBuf>,

    /// image width in pixels
    #[argh(option)]
    width: Option<u32>,

    /// image height in pixels
    #[argh(option)]
    height: Option<u32>,

    /// horizontal focal length in pixels
    #[argh(option)]
    fx: Option<f64>,

    /// vertical focal length in pixels
    #[argh(option)]
    fy: Option<f64>,
}

/// Resolve the rig configuration: defaults, then the config file, then the flags.
fn resolve_config(args: &Args) -> Result<CameraConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => CameraConfig::from_json_file(path)?,
        None => CameraConfig::default(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(fx) = args.fx {
        config.fx = fx;
    }
    if let Some(fy) = args.fy {
        config.fy = fy;
    }

    config.validate()?;

    Ok(config)
}

/// Convert the trajectory named by the flags and return the number of cameras written.
fn run(args: &Args) -> Result<usize, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    log::debug!("camera config: {:?}", config);

    Ok(convert_poses_file(&args.input, &args.output, &config)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let num_cameras = run(&args)?;
    println!("Wrote {} cameras to {}", num_cameras, args.output.display());

    Ok(())
}
