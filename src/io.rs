use image::{ImageFormat, RgbImage};
use std::path::Path;

use crate::energy::energy_to_image;
use crate::errors::{Result, SeamCarvingError};
use crate::grid::{EnergyGrid, Grid, PixelGrid};

fn image_error(path: &Path, operation: &str, source: image::ImageError) -> SeamCarvingError {
    SeamCarvingError::ImageIo {
        path: path.to_path_buf(),
        operation: operation.to_string(),
        source,
    }
}

/// Picks an image format from the file extension.
pub fn detect_format(path: &Path) -> Result<ImageFormat> {
    ImageFormat::from_path(path).map_err(|e| image_error(path, "format detection", e))
}

/// Decodes an image file into RGB pixels. Alpha is dropped.
pub fn load_pixels(path: &Path) -> Result<PixelGrid> {
    let image = image::open(path).map_err(|e| image_error(path, "decode", e))?;
    Ok(Grid::from_image(&image.to_rgb8(), |rgb| *rgb))
}

pub fn save_pixels(pixels: PixelGrid, path: &Path, format: ImageFormat) -> Result<()> {
    let image: RgbImage = pixels.into_image(|rgb| *rgb);
    image
        .save_with_format(path, format)
        .map_err(|e| image_error(path, "encode", e))
}

/// Writes the energy grid as a normalised grayscale image.
pub fn save_energy_map(energy: &EnergyGrid, path: &Path, format: ImageFormat) -> Result<()> {
    energy_to_image(energy)
        .save_with_format(path, format)
        .map_err(|e| image_error(path, "encode energy map", e))
}
