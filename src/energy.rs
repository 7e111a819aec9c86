//! Pixel energy: luma conversion followed by a Sobel gradient magnitude.
//!
//! Interior cells use the full 3×3 neighbourhood. Border cells, where the
//! neighbourhood is incomplete, get a fixed energy derived from their own luma
//! through a [`BorderPolicy`] so that seams are neither pulled onto nor pushed
//! away from the image edges by missing data.
use image::{GrayImage, Luma, Rgb};
use log::info;
use rayon::prelude::*;

use crate::errors::{Result, SeamCarvingError};
use crate::grid::{EnergyGrid, Grid, IntensityGrid, PixelGrid};

/// ITU-R BT.601 luma.
pub fn luma(pixel: &Rgb<u8>) -> f64 {
    let Rgb([r, g, b]) = *pixel;
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

pub fn intensity(pixels: &PixelGrid) -> IntensityGrid {
    let (width, height) = pixels.dimensions();
    let mut output = Grid::new(width, height, 0.0);

    output
        .par_rows_mut()
        .enumerate()
        .for_each(|(row_idx, row)| {
            row.iter_mut()
                .zip(pixels.row(row_idx))
                .for_each(|(l, rgb)| *l = luma(rgb));
        });

    output
}

/// Energy assigned to border cells: `base + scale * luma`.
///
/// With the defaults a border cell lands in `[255, 510]`, the middle of the
/// interior Sobel range `[0, 1020 * sqrt(2)]`. `base` must be positive and
/// `scale` non-negative, so a border cell is never zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderPolicy {
    base: f64,
    scale: f64,
}

impl BorderPolicy {
    pub const DEFAULT_BASE: f64 = 255.0;
    pub const DEFAULT_SCALE: f64 = 1.0;

    pub fn new(base: f64, scale: f64) -> Result<Self> {
        let valid_base = base.is_finite() && base > 0.0;
        let valid_scale = scale.is_finite() && scale >= 0.0;
        if !(valid_base && valid_scale) {
            return Err(SeamCarvingError::InvalidBorderPolicy { base, scale });
        }
        Ok(Self { base, scale })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn energy(&self, luma: f64) -> f64 {
        self.base + self.scale * luma
    }
}

impl Default for BorderPolicy {
    fn default() -> Self {
        Self {
            base: Self::DEFAULT_BASE,
            scale: Self::DEFAULT_SCALE,
        }
    }
}

/// Sobel gradient magnitude of the interior cell at column `x`, given the rows
/// above, at and below it.
#[inline]
fn sobel(above: &[f64], row: &[f64], below: &[f64], x: usize) -> f64 {
    let (l, r) = (x - 1, x + 1);
    let gy = (above[l] + 2.0 * above[x] + above[r]) - (below[l] + 2.0 * below[x] + below[r]);
    let gx = (above[l] + 2.0 * row[l] + below[l]) - (above[r] + 2.0 * row[r] + below[r]);
    (gx * gx + gy * gy).sqrt()
}

pub fn gradient(intensity: &IntensityGrid, border: &BorderPolicy) -> EnergyGrid {
    let (width, height) = intensity.dimensions();
    let mut output = Grid::new(width, height, 0.0);

    output
        .par_rows_mut()
        .enumerate()
        .for_each(|(row_idx, out)| {
            let row = intensity.row(row_idx);

            if row_idx == 0 || row_idx + 1 == height {
                out.iter_mut()
                    .zip(row)
                    .for_each(|(e, &l)| *e = border.energy(l));
                return;
            }

            let above = intensity.row(row_idx - 1);
            let below = intensity.row(row_idx + 1);

            for (x, e) in out.iter_mut().enumerate() {
                *e = if x == 0 || x + 1 == width {
                    border.energy(row[x])
                } else {
                    sobel(above, row, below, x)
                };
            }
        });

    output
}

/// Luma conversion and gradient in one call.
pub fn energy(pixels: &PixelGrid, border: &BorderPolicy) -> EnergyGrid {
    gradient(&intensity(pixels), border)
}

/// Renders an energy grid as grayscale, scaled so the largest energy is white.
pub fn energy_to_image(energy: &EnergyGrid) -> GrayImage {
    let (min, max) = energy
        .rows()
        .flatten()
        .fold((f64::INFINITY, 0.0f64), |(min, max), &e| (min.min(e), max.max(e)));

    info!("energy range: min {:.1}, max {:.1}", min, max);

    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
    energy
        .clone()
        .into_image(|&e| Luma([(e * scale).round().clamp(0.0, 255.0) as u8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: usize, height: usize, value: u8) -> PixelGrid {
        Grid::new(width, height, Rgb([value, value, value]))
    }

    #[test]
    fn luma_weights() {
        assert_eq!(luma(&Rgb([0, 0, 0])), 0.0);
        assert!((luma(&Rgb([255, 255, 255])) - 255.0).abs() < 1e-9);
        assert!((luma(&Rgb([100, 0, 0])) - 29.9).abs() < 1e-9);
        assert!((luma(&Rgb([0, 100, 0])) - 58.7).abs() < 1e-9);
        assert!((luma(&Rgb([0, 0, 100])) - 11.4).abs() < 1e-9);
    }

    #[test]
    fn uniform_interior_has_zero_energy_and_border_does_not() {
        let energy = energy(&gray(5, 4, 128), &BorderPolicy::default());
        let border = BorderPolicy::default().energy(luma(&Rgb([128, 128, 128])));

        for (y, row) in energy.rows().enumerate() {
            for (x, &e) in row.iter().enumerate() {
                let on_border = x == 0 || x == 4 || y == 0 || y == 3;
                if on_border {
                    assert_eq!(e, border);
                } else {
                    assert_eq!(e, 0.0);
                }
            }
        }
    }

    #[test]
    fn black_border_is_not_free() {
        let energy = energy(&gray(3, 3, 0), &BorderPolicy::default());
        assert_eq!(energy.get(0, 0), Some(&BorderPolicy::DEFAULT_BASE));
        assert_eq!(energy.get(1, 1), Some(&0.0));
    }

    #[test]
    fn vertical_edge_response() {
        // left column dark, the rest bright
        let pixels = Grid::from_fn(4, 3, |x, _| {
            if x == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let intensity = intensity(&pixels);
        let energy = gradient(&intensity, &BorderPolicy::default());

        let bright = luma(&Rgb([255, 255, 255]));
        assert!((energy.get(1, 1).unwrap() - 4.0 * bright).abs() < 1e-9);
        assert_eq!(energy.get(2, 1), Some(&0.0));
    }

    #[test]
    fn gradient_matches_hand_computed_kernel() {
        let intensity =
            Grid::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 9.0, 8.0]])
                .unwrap();
        let energy = gradient(&intensity, &BorderPolicy::new(1.0, 1.0).unwrap());

        // gy = (1 + 4 + 3) - (7 + 18 + 8) = -25, gx = (1 + 8 + 7) - (3 + 12 + 8) = -7
        let expected = (25.0f64 * 25.0 + 7.0 * 7.0).sqrt();
        assert!((energy.get(1, 1).unwrap() - expected).abs() < 1e-9);
        assert_eq!(energy.get(2, 2), Some(&9.0));
    }

    #[test]
    fn border_policy_rejects_values_that_zero_the_border() {
        for (base, scale) in [
            (0.0, 1.0),
            (-1000.0, 1.0),
            (255.0, -0.5),
            (f64::NAN, 1.0),
            (255.0, f64::NAN),
            (f64::INFINITY, 1.0),
        ] {
            let err = BorderPolicy::new(base, scale).unwrap_err();
            assert!(
                matches!(err, SeamCarvingError::InvalidBorderPolicy { .. }),
                "accepted base {} scale {}",
                base,
                scale
            );
        }

        let policy = BorderPolicy::new(0.5, 0.0).unwrap();
        assert_eq!(policy.energy(0.0), 0.5);
        assert_eq!(policy.energy(200.0), 0.5);
    }

    #[test]
    fn energy_is_non_negative() {
        let pixels = Grid::from_fn(6, 5, |x, y| Rgb([(x * 40) as u8, (y * 50) as u8, 7]));
        let energy = energy(&pixels, &BorderPolicy::default());
        assert!(energy.rows().flatten().all(|&e| e >= 0.0));
    }

    #[test]
    fn energy_image_is_normalised() {
        let energy = Grid::from_rows(vec![vec![0.0, 50.0], vec![100.0, 25.0]]).unwrap();
        let image = energy_to_image(&energy);
        assert_eq!(image.get_pixel(0, 0), &Luma([0]));
        assert_eq!(image.get_pixel(0, 1), &Luma([255]));
        assert_eq!(image.get_pixel(1, 1), &Luma([64]));
        assert!((127..=128).contains(&image.get_pixel(1, 0)[0]));
    }
}
