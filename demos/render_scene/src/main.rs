use argh::FromArgs;
use std::path::PathBuf;

use projwarp::imgproc::{parallel::ExecutionStrategy, warp::WarpOptions};
use projwarp::io::functional as F;
use projwarp::scene::Scene;

#[derive(FromArgs)]
/// Warp and composite the layers of a scene into a PNG
struct Args {
    /// path to the scene description
    #[argh(option, short = 's')]
    scene: PathBuf,

    /// path to the output image
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// run every warp on the current thread
    #[argh(switch)]
    serial: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let options = WarpOptions {
        strategy: if args.serial {
            ExecutionStrategy::Serial
        } else {
            ExecutionStrategy::ParallelRows
        },
        ..Default::default()
    };

    // load the scene and warp every layer
    let scene = Scene::load(&args.scene, options)?;
    log::info!(
        "loaded {} layers from {}",
        scene.stack.len(),
        args.scene.display()
    );

    for (i, layer) in scene.stack.iter().enumerate() {
        if let Some(points) = layer.bound_points() {
            log::info!("layer {i}: corners {:?}, centre {:?}", &points[..4], points[4]);
        }
    }

    // paint the layers and save the display
    let display = scene.render()?;
    F::write_image_png(&args.output, &display)?;

    log::info!("wrote {} ({})", args.output.display(), display.size());

    Ok(())
}
