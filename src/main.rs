use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::info;

use seam_shrink::{energy, io, seam_carving, Config, Stop};

fn main() -> Result<()> {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    ensure!(
        config.input.is_file(),
        "Input file does not exist: {}",
        config.input.display()
    );
    io::detect_format(&config.input)?;

    let pixels = io::load_pixels(&config.input)?;
    let (width, height) = pixels.dimensions();
    info!("loaded {} ({}x{})", config.input.display(), width, height);

    let options = config.resize_options()?;
    if let Some(path) = &config.energy_map {
        let format = io::detect_format(path)?;
        let energy = energy::energy(&pixels, &options.border);
        io::save_energy_map(&energy, path, format)?;
        info!("wrote energy map to {}", path.display());
    }

    let target = config.width as usize;
    let resized = seam_carving::resize(pixels, target, &options)
        .with_context(|| format!("Failed to carve {}", config.input.display()))?;

    if resized.status != Stop::Done {
        info!(
            "writing partial result at width {} ({:?})",
            resized.pixels.width(),
            resized.status
        );
    }

    let (output, format) = config.output_target();
    io::save_pixels(resized.pixels, &output, format)?;
    info!("wrote {}", output.display());

    Ok(())
}
