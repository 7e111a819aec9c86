#![allow(dead_code)]

use image::Rgb;
use seam_shrink::{Grid, PixelGrid};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic, busy test pattern.
pub fn textured(width: usize, height: usize) -> PixelGrid {
    Grid::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 37 + y * 91) % 256) as u8,
            ((x * x + 3 * y) % 256) as u8,
            ((x * y * 13 + 7) % 256) as u8,
        ])
    })
}

/// Uniform background with a single one-pixel vertical stripe.
pub fn striped(
    width: usize,
    height: usize,
    column: usize,
    stripe: Rgb<u8>,
    background: Rgb<u8>,
) -> PixelGrid {
    Grid::from_fn(width, height, |x, _| if x == column { stripe } else { background })
}
