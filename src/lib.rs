//! Library to convert radiometric drone images into
//! calibrated per-pixel temperatures.
//!
//! This crate provides three functionalities:
//!
//! 1. Compute [temperature] in celsius from raw sensor
//! values and per-image calibration parameters. Two camera
//! families are supported: DJI aircraft (linear temperature
//! codes from the vendor SDK) and FLIR-based sensors (the
//! inverse Planck calibration, a port of the [Thermimage R
//! library] and its [python port][read_thermal.py]).
//!
//! 2. Stream the converted pixels into a bounded-memory
//! [export][crate::export]: a `x,y,temperature_celsius`
//! table plus a JSON summary record, with
//! [statistics][crate::stats] computed in the same single
//! pass.
//!
//! 3. Obtain raw values and calibration parameters from
//! image metadata: [parsing ExifTool][crate::exiftool]
//! generated JSON (output from `exiftool -b -j`) for FLIR
//! sensors, and the [vendor SDK][crate::dji] for DJI R-JPEGs
//! (feature `dji`).
//!
//! # Usage
//!
//! Pixel-wise temperature export involves (1) decoding raw
//! values and calibration parameters from an image; and (2)
//! running the conversion pass.
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use std::{fs::File, io::BufWriter};
//! use radiometric::{convert_image, exiftool, write_summary};
//!
//! let (grid, calibration) = exiftool::extract_from_path("image.jpg".as_ref())?;
//! let csv = BufWriter::new(File::create("image_thermal_data.csv")?);
//! let summary = convert_image(&grid, &calibration, csv)?;
//! write_summary(&summary, File::create("image_thermal_data.json")?)?;
//! # Ok(())
//! # }
//! ```
//!
//! The core never touches the filesystem on its own: any
//! [`RawPixelGrid`] and [`CalibrationModel`] pair converts
//! the same way, so synthetic grids work for testing without
//! either decoder.
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use radiometric::{convert_image, CalibrationModel, Environment, RawPixelGrid};
//!
//! let grid = RawPixelGrid::from_raw_values(2, 2, vec![200., 205., 210., 215.])?;
//! let calibration = CalibrationModel::dji(Environment::default());
//! let summary = convert_image(&grid, &calibration, std::io::sink())?;
//! assert_eq!(summary.statistics.average, Some(20.75));
//! # Ok(())
//! # }
//! ```
//!
//! [read_thermal.py]: //github.com/Nervengift/read_thermal.py/blob/master/flir_image_extractor.py
//! [Thermimage R library]: //github.com/gtatters/Thermimage/blob/master/R/raw2temp.R
//! [temperature]: crate::temperature

pub mod calibration;
pub mod error;
pub mod grid;
pub mod stats;
pub mod temperature;

pub mod export;

pub mod exiftool;

#[cfg(feature = "dji")]
pub mod dji;

pub mod cli;

pub use crate::calibration::{CalibrationModel, Environment, PlanckConstants};
pub use crate::error::{ConversionDomainError, Error, Result};
pub use crate::export::{convert_image, write_summary, RunSummary, TabularWriter};
pub use crate::grid::RawPixelGrid;
pub use crate::stats::{PixelStats, RunStatistics};
