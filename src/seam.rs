use std::cmp::Ordering;
use std::ops::{Deref, RangeInclusive};

use crate::errors::{Result, SeamCarvingError};
use crate::grid::{CumulativeGrid, EnergyGrid};

/// One column index per row, top to bottom, forming an 8-connected path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seam(Vec<usize>);

impl Seam {
    pub fn columns(&self) -> &[usize] {
        &self.0
    }

    pub fn into_columns(self) -> Vec<usize> {
        self.0
    }

    /// Whether every step moves at most one column sideways.
    pub fn is_connected(&self) -> bool {
        self.0.windows(2).all(|w| w[0].abs_diff(w[1]) <= 1)
    }
}

impl From<Vec<usize>> for Seam {
    fn from(columns: Vec<usize>) -> Self {
        Seam(columns)
    }
}

impl Deref for Seam {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

/// Columns `x - 1 ..= x + 1` clipped to `[0, width - 1]`.
#[inline]
fn neighbours(x: usize, width: usize) -> RangeInclusive<usize> {
    x.saturating_sub(1)..=(x + 1).min(width - 1)
}

/// Index of the first minimum in `values`. Equal values resolve to the lowest
/// index.
#[inline]
fn first_min(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn ensure_non_empty(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SeamCarvingError::invalid_grid(format!(
            "cannot trace a seam through a {}x{} grid",
            width, height
        )));
    }
    Ok(())
}

/// Iterates over every row from top to bottom. Each cell adds the lowest of the
/// (up to) three cells above it; neighbours outside the grid are skipped.
///
/// ## Example
/// ```text
///  1  2  3        1  2  3
/// 10 10 10   =>  11 11 12
/// ```
pub fn cumulative_energy(energy: &EnergyGrid) -> Result<CumulativeGrid> {
    let (width, height) = energy.dimensions();
    ensure_non_empty(width, height)?;

    let mut cumulative = energy.map(|&e| e);
    let mut above = cumulative.row(0).to_vec();

    for y in 1..height {
        let row = cumulative.row_mut(y);

        for (x, cell) in row.iter_mut().enumerate() {
            let least_above = above[neighbours(x, width)]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            *cell += least_above;
        }

        above.copy_from_slice(row);
    }

    Ok(cumulative)
}

/// Backtracks from the least energetic cell of the bottom row to the top.
pub fn trace_seam(cumulative: &CumulativeGrid) -> Result<Seam> {
    let (width, height) = cumulative.dimensions();
    ensure_non_empty(width, height)?;

    let mut seam = vec![0; height];
    let mut least_energetic_idx = first_min(cumulative.row(height - 1));
    seam[height - 1] = least_energetic_idx;

    for y in (0..height - 1).rev() {
        let range = neighbours(least_energetic_idx, width);
        let start = *range.start();
        least_energetic_idx = start + first_min(&cumulative.row(y)[range]);
        seam[y] = least_energetic_idx;
    }

    Ok(Seam(seam))
}

/// Cumulative energy followed by backtracking.
pub fn find_vertical_seam(energy: &EnergyGrid) -> Result<Seam> {
    trace_seam(&cumulative_energy(energy)?)
}
