use image::{ImageBuffer, Pixel, Rgb};
use rayon::prelude::*;
use std::ops::Deref;

use crate::errors::{Result, SeamCarvingError};
use crate::seam::Seam;

pub trait GridCell: Copy + Clone + Send + Sync {}

impl<T> GridCell for T where T: Copy + Clone + Send + Sync {}

/// RGB pixels, 8 bits per channel.
pub type PixelGrid = Grid<Rgb<u8>>;
/// Per-pixel luma.
pub type IntensityGrid = Grid<f64>;
/// Per-pixel edge strength.
pub type EnergyGrid = Grid<f64>;
/// Minimum energy of any 8-connected path from the top row down to a pixel.
pub type CumulativeGrid = Grid<f64>;

/// Row-major grid laid out for fast row access.
///
/// Removing a seam shifts cells left inside each row and narrows `width`
/// without reallocating, so `width_stride` may exceed `width` after the first
/// removal. Height never changes.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    data: Vec<T>,
    width_stride: usize,
    width: usize,
    height: usize,
}

impl<T> Grid<T>
where
    T: GridCell,
{
    pub fn new(width: usize, height: usize, fill: T) -> Grid<T> {
        Grid {
            data: vec![fill; height * width],
            width,
            height,
            width_stride: width,
        }
    }

    /// Builds a grid from rows, rejecting empty input and ragged rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Grid<T>> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);

        if height == 0 {
            return Err(SeamCarvingError::invalid_grid("grid has no rows"));
        }
        if width == 0 {
            return Err(SeamCarvingError::invalid_grid("grid has zero width"));
        }
        if let Some((row, actual)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(SeamCarvingError::invalid_grid(format!(
                "row {} has {} cells, expected {}",
                row, actual, width
            )));
        }

        Ok(Grid {
            data: rows.into_iter().flatten().collect(),
            width_stride: width,
            width,
            height,
        })
    }

    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Grid<T>
    where
        F: Fn(usize, usize) -> T,
    {
        Grid {
            data: (0..height)
                .flat_map(|y| (0..width).map(move |x| (x, y)))
                .map(|(x, y)| f(x, y))
                .collect(),
            width_stride: width,
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn row(&self, row: usize) -> &[T] {
        let offset = row * self.width_stride;
        &self.data[offset..offset + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.height).map(move |row| self.row(row))
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [T] {
        let offset = row * self.width_stride;
        let width = self.width;
        &mut self.data[offset..offset + width]
    }

    /// Parallel iterator over mutable rows, trimmed to the current width.
    pub(crate) fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = &mut [T]> + '_ {
        let width = self.width;
        self.data
            .par_chunks_mut(self.width_stride.max(1))
            .map(move |row| &mut row[..width])
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[x + y * self.width_stride])
        } else {
            None
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }

    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        U: GridCell,
        F: Fn(&T) -> U,
    {
        Grid {
            data: self.rows().flat_map(|row| row.iter().map(&f)).collect(),
            width_stride: self.width,
            width: self.width,
            height: self.height,
        }
    }

    /// Deletes `seam[r]` from every row `r`, shifting the cells to its right one
    /// column left. The whole seam is validated before any cell moves.
    pub fn remove_seam(mut self, seam: &Seam) -> Result<Grid<T>> {
        self.remove_seam_mut(seam)?;
        Ok(self)
    }

    /// In-place variant of [`Grid::remove_seam`]. On error the grid is left untouched.
    pub fn remove_seam_mut(&mut self, seam: &Seam) -> Result<()> {
        let (width, height) = self.dimensions();

        if seam.len() != height {
            return Err(SeamCarvingError::SeamLength {
                len: seam.len(),
                height,
            });
        }
        if let Some((row, &column)) = seam.iter().enumerate().find(|&(_, &c)| c >= width) {
            return Err(SeamCarvingError::SeamOutOfBounds { row, column, width });
        }

        for (row_idx, &seam_pos) in seam.iter().enumerate() {
            self.row_mut(row_idx)[seam_pos..].rotate_left(1);
        }

        self.width = width - 1;
        Ok(())
    }

    /// Creates a `Grid` from an `image::ImageBuffer`. The `conversion` function is used to map an image's pixels to grid cells.
    pub fn from_image<P: 'static, C: Deref<Target = [P::Subpixel]>, CvFn>(
        image: &ImageBuffer<P, C>,
        conversion: CvFn,
    ) -> Grid<T>
    where
        CvFn: Fn(&P) -> T,
        P: Pixel,
    {
        let w = image.width() as usize;

        Grid {
            data: image.pixels().map(conversion).collect(),
            width: w,
            height: image.height() as usize,
            width_stride: w,
        }
    }

    pub fn into_image<CvFn, P: 'static>(
        self,
        conversion: CvFn,
    ) -> ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>
    where
        CvFn: Fn(&T) -> P,
        P: Pixel,
    {
        let mut im: ImageBuffer<P, Vec<P::Subpixel>> =
            ImageBuffer::new(self.width as u32, self.height as u32);
        im.enumerate_pixels_mut().for_each(|(x, y, p)| {
            *p = conversion(&self.data[x as usize + y as usize * self.width_stride])
        });
        im
    }
}

/// Grids are equal when their visible cells are; cells left behind in the
/// stride by seam removal are ignored.
impl<T> PartialEq for Grid<T>
where
    T: GridCell + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions() && self.rows().eq(other.rows())
    }
}
