use clap::Parser;
use image::ImageFormat;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::energy::BorderPolicy;
use crate::errors::Result;
use crate::seam_carving::ResizeOptions;

/// Encoders compiled into this build.
const OUTPUT_FORMATS: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Jpeg];

/// Shrink an image's width by removing its least important vertical seams.
#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// PNG or JPEG image to shrink
    pub input: PathBuf,

    /// Where to write the result (default: `<input stem>_carved.<format>`)
    pub output: Option<PathBuf>,

    /// Target width in pixels
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Output format extension (default: taken from the output path, else png)
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<ImageFormat>,

    /// Also write the initial energy map to this path
    #[arg(long)]
    pub energy_map: Option<PathBuf>,

    /// Constant part of the energy assigned to border pixels (> 0)
    #[arg(long, default_value_t = BorderPolicy::DEFAULT_BASE, value_parser = parse_border_base)]
    pub border_base: f64,

    /// Luma multiplier of the energy assigned to border pixels (>= 0)
    #[arg(long, default_value_t = BorderPolicy::DEFAULT_SCALE, value_parser = parse_border_scale)]
    pub border_scale: f64,

    /// Stop after removing this many seams
    #[arg(long)]
    pub max_seams: Option<usize>,

    /// Stop once this many seconds have elapsed
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log every removed seam
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Config {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }

    pub fn resize_options(&self) -> Result<ResizeOptions> {
        let mut options = ResizeOptions::default()
            .with_border(BorderPolicy::new(self.border_base, self.border_scale)?);
        if let Some(max_seams) = self.max_seams {
            options = options.with_max_seams(max_seams);
        }
        if let Some(secs) = self.timeout_secs {
            options = options.with_deadline(Duration::from_secs(secs));
        }
        Ok(options)
    }

    /// Output path and format. An explicit `--format` wins over the output
    /// extension.
    pub fn output_target(&self) -> (PathBuf, ImageFormat) {
        match (&self.output, self.format) {
            (Some(path), Some(format)) => (path.clone(), format),
            (Some(path), None) => (
                path.clone(),
                ImageFormat::from_path(path).unwrap_or(ImageFormat::Png),
            ),
            (None, format) => {
                let format = format.unwrap_or(ImageFormat::Png);
                (carved_path(&self.input, format), format)
            }
        }
    }
}

fn carved_path(input: &Path, format: ImageFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let extension = format.extensions_str().first().copied().unwrap_or("png");
    input.with_file_name(format!("{}_carved.{}", stem, extension))
}

fn parse_format(s: &str) -> std::result::Result<ImageFormat, String> {
    ImageFormat::from_extension(s)
        .filter(|format| OUTPUT_FORMATS.contains(format))
        .ok_or_else(|| {
            let supported: Vec<_> = OUTPUT_FORMATS
                .iter()
                .flat_map(|f| f.extensions_str())
                .map(|ext| format!("`{}`", ext))
                .collect();
            format!("{} is not supported. Supported formats: {}", s, supported.join(", "))
        })
}

fn parse_border_base(s: &str) -> std::result::Result<f64, String> {
    let base: f64 = s.parse().map_err(|e| format!("{}: {}", s, e))?;
    BorderPolicy::new(base, BorderPolicy::DEFAULT_SCALE)
        .map(|_| base)
        .map_err(|_| format!("{} is not a finite number greater than 0", s))
}

fn parse_border_scale(s: &str) -> std::result::Result<f64, String> {
    let scale: f64 = s.parse().map_err(|e| format!("{}: {}", s, e))?;
    BorderPolicy::new(BorderPolicy::DEFAULT_BASE, scale)
        .map(|_| scale)
        .map_err(|_| format!("{} is not a finite number of at least 0", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("seam-shrink").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&["photos/castle.jpg", "-w", "320"]);

        assert_eq!(config.width, 320);
        assert_eq!(config.log_level(), LevelFilter::Info);
        assert_eq!(
            config.output_target(),
            (PathBuf::from("photos/castle_carved.png"), ImageFormat::Png)
        );

        let options = config.resize_options().unwrap();
        assert_eq!(options.border, BorderPolicy::default());
        assert_eq!(options.max_seams, None);
        assert_eq!(options.deadline, None);
    }

    #[test]
    fn explicit_output_and_bounds() {
        let config = parse(&[
            "in.png",
            "out.jpg",
            "--width",
            "10",
            "--max-seams",
            "4",
            "--timeout-secs",
            "2",
            "--border-scale",
            "0.5",
            "-v",
        ]);

        assert_eq!(
            config.output_target(),
            (PathBuf::from("out.jpg"), ImageFormat::Jpeg)
        );
        assert_eq!(config.log_level(), LevelFilter::Debug);

        let options = config.resize_options().unwrap();
        assert_eq!(options.max_seams, Some(4));
        assert_eq!(options.deadline, Some(Duration::from_secs(2)));
        assert_eq!(options.border, BorderPolicy::new(255.0, 0.5).unwrap());
    }

    #[test]
    fn format_flag_overrides_extension() {
        let config = parse(&["in.png", "-w", "3", "-f", "jpg"]);
        assert_eq!(
            config.output_target(),
            (PathBuf::from("in_carved.jpg"), ImageFormat::Jpeg)
        );
    }

    #[test]
    fn rejects_zero_width_and_unknown_format() {
        let args = ["seam-shrink", "in.png", "-w", "0"];
        assert!(Config::try_parse_from(args).is_err());

        let args = ["seam-shrink", "in.png", "-w", "3", "-f", "xyz"];
        assert!(Config::try_parse_from(args).is_err());
    }

    #[test]
    fn format_flag_only_accepts_compiled_encoders() {
        for format in ["gif", "bmp", "webp", "tiff"] {
            let args = ["seam-shrink", "in.png", "-w", "3", "-f", format];
            assert!(Config::try_parse_from(args).is_err(), "{} was accepted", format);
        }

        for (format, expected) in [
            ("png", ImageFormat::Png),
            ("jpg", ImageFormat::Jpeg),
            ("jpeg", ImageFormat::Jpeg),
        ] {
            assert_eq!(parse(&["in.png", "-w", "3", "-f", format]).format, Some(expected));
        }
    }

    #[test]
    fn border_flags_reject_values_that_zero_the_border() {
        for value in ["0", "-5", "NaN", "inf"] {
            let args = ["seam-shrink", "in.png", "-w", "3", "--border-base", value];
            assert!(Config::try_parse_from(args).is_err(), "base {} was accepted", value);
        }
        for value in ["-1", "NaN", "abc"] {
            let args = ["seam-shrink", "in.png", "-w", "3", "--border-scale", value];
            assert!(Config::try_parse_from(args).is_err(), "scale {} was accepted", value);
        }

        let config = parse(&["in.png", "-w", "3", "--border-base", "0.5", "--border-scale", "0"]);
        let options = config.resize_options().unwrap();
        assert_eq!(options.border.base(), 0.5);
        assert_eq!(options.border.scale(), 0.0);
    }
}
