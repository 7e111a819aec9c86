use image::DynamicImage;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::energy::{self, BorderPolicy};
use crate::errors::{Result, SeamCarvingError};
use crate::grid::{Grid, PixelGrid};
use crate::seam::{self, Seam};

/// Knobs for a resize request.
#[derive(Clone, Debug, Default)]
pub struct ResizeOptions {
    pub border: BorderPolicy,
    /// Stop after this many seams even if the target width is not reached.
    pub max_seams: Option<usize>,
    /// Stop once this much time has elapsed since the request started.
    pub deadline: Option<Duration>,
}

impl ResizeOptions {
    pub fn with_border(mut self, border: BorderPolicy) -> Self {
        self.border = border;
        self
    }

    pub fn with_max_seams(mut self, max_seams: usize) -> Self {
        self.max_seams = Some(max_seams);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Why the carving loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stop {
    /// The target width was reached.
    Done,
    /// `max_seams` seams were removed first.
    SeamLimit,
    /// The deadline passed first.
    Deadline,
}

#[derive(Clone, Debug)]
pub struct Resized {
    pub pixels: PixelGrid,
    /// Removed seams in removal order, each relative to the grid it came out of.
    pub seams: Vec<Seam>,
    pub status: Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Initializing,
    Iterating,
    Done,
}

/// Owns the working pixel grid for one resize request and removes one
/// minimum-energy seam per step, recomputing energy from scratch each time.
pub struct Carver {
    pixels: PixelGrid,
    target_width: usize,
    options: ResizeOptions,
    seams: Vec<Seam>,
    phase: Phase,
}

impl Carver {
    /// Validates the grid and target width.
    pub fn new(pixels: PixelGrid, target_width: usize, options: ResizeOptions) -> Result<Self> {
        let (width, height) = pixels.dimensions();

        if pixels.is_empty() {
            return Err(SeamCarvingError::invalid_grid(format!(
                "cannot resize a {}x{} grid",
                width, height
            )));
        }
        if target_width < 1 || target_width >= width {
            return Err(SeamCarvingError::InvalidTarget {
                width,
                target: target_width,
            });
        }

        Ok(Self {
            pixels,
            target_width,
            options,
            seams: Vec::with_capacity(width - target_width),
            phase: Phase::Initializing,
        })
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Removes one seam from the working grid and returns it.
    ///
    /// Fails without touching the grid once the target width is reached.
    pub fn carve_seam(&mut self) -> Result<Seam> {
        let width = self.pixels.width();
        if width < 2 {
            return Err(SeamCarvingError::DegenerateGeometry {
                width,
                target: self.target_width,
            });
        }
        if self.phase == Phase::Done || width <= self.target_width {
            return Err(SeamCarvingError::InvalidTarget {
                width,
                target: self.target_width,
            });
        }
        self.phase = Phase::Iterating;

        let energy = energy::energy(&self.pixels, &self.options.border);
        let seam = seam::find_vertical_seam(&energy)?;
        self.pixels.remove_seam_mut(&seam)?;

        debug!(
            "removed seam ending at column {} -> width {}",
            seam[seam.len() - 1],
            self.pixels.width()
        );
        if self.pixels.width() <= self.target_width {
            self.phase = Phase::Done;
        }

        self.seams.push(seam.clone());
        Ok(seam)
    }

    /// Carves until the target width is reached or an iteration bound fires.
    ///
    /// Bounds are only checked between seams, so the returned grid is always
    /// consistent.
    pub fn run(mut self) -> Result<Resized> {
        let started = Instant::now();
        info!(
            "carving {}x{} down to width {}",
            self.pixels.width(),
            self.pixels.height(),
            self.target_width
        );

        let mut status = Stop::Done;
        while self.pixels.width() > self.target_width {
            if let Some(limit) = self.options.max_seams {
                if self.seams.len() >= limit {
                    status = Stop::SeamLimit;
                    break;
                }
            }
            if let Some(deadline) = self.options.deadline {
                if started.elapsed() >= deadline {
                    status = Stop::Deadline;
                    break;
                }
            }

            self.carve_seam()?;
        }

        match status {
            Stop::Done => info!(
                "removed {} seams in {:.2?}",
                self.seams.len(),
                started.elapsed()
            ),
            _ => warn!(
                "stopped at width {} (target {}) after {} seams: {:?}",
                self.pixels.width(),
                self.target_width,
                self.seams.len(),
                status
            ),
        }

        Ok(Resized {
            pixels: self.pixels,
            seams: self.seams,
            status,
        })
    }
}

/// Shrinks `pixels` to `target_width` columns by repeated seam removal.
pub fn resize(pixels: PixelGrid, target_width: usize, options: &ResizeOptions) -> Result<Resized> {
    Carver::new(pixels, target_width, options.clone())?.run()
}

/// [`resize`] with default options, returning only the pixels.
pub fn resize_width(pixels: PixelGrid, target_width: usize) -> Result<PixelGrid> {
    resize(pixels, target_width, &ResizeOptions::default()).map(|resized| resized.pixels)
}

/// Easy to use function to take a dynamic image, convert it to `Rgb`, and seam carve it.
///
/// Energy is calculated using the [Sobel] operator on pixel Luma.
///
/// [Sobel]: https://en.wikipedia.org/wiki/Sobel_operator#Technical_details
pub fn easy_resize(image: &DynamicImage, new_width: usize) -> Result<DynamicImage> {
    let pixels = Grid::from_image(&image.to_rgb8(), |rgb| *rgb);
    let resized = resize_width(pixels, new_width)?;
    Ok(DynamicImage::ImageRgb8(resized.into_image(|rgb| *rgb)))
}
