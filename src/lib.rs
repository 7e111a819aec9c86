//! Content-aware width reduction ("seam carving").
//!
//! The engine repeatedly removes the vertical path of pixels carrying the
//! least edge energy until the image reaches a target width:
//!
//! pixels → [`energy::intensity`] → [`energy::gradient`] →
//! [`seam::cumulative_energy`] → [`seam::trace_seam`] → [`Grid::remove_seam`]
//!
//! [`seam_carving::Carver`] drives that loop; [`io`] and [`config`] are the thin
//! file and command-line glue around it.
pub mod config;
pub mod energy;
pub mod errors;
pub mod grid;
pub mod io;
pub mod seam;
pub mod seam_carving;

pub use config::Config;
pub use energy::BorderPolicy;
pub use errors::{Result, SeamCarvingError};
pub use grid::{CumulativeGrid, EnergyGrid, Grid, IntensityGrid, PixelGrid};
pub use seam::Seam;
pub use seam_carving::{easy_resize, resize, resize_width, Carver, ResizeOptions, Resized, Stop};
