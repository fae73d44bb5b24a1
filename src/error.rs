//! Error taxonomy for the conversion pipeline.
//!
//! Fatal errors ([`Error`]) abort a run before or instead of
//! producing output. Per-pixel domain failures
//! ([`ConversionDomainError`]) are recovered locally by the
//! caller (skip and count) and never abort a run.

use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal failures of a conversion run.
#[derive(Debug, Error)]
pub enum Error {
    /// Calibration constants cannot support the conversion
    /// formula. Raised before any pixel is converted.
    #[error("invalid calibration: {reason}")]
    InvalidCalibration { reason: String },

    /// A required metadata tag was absent from the extractor
    /// output.
    #[error("metadata tag `{tag}` missing from image")]
    MetadataMissing { tag: &'static str },

    /// The input is not a recognized radiometric container
    /// for this decoder; the alternate camera-family
    /// pipeline may still apply.
    #[error("decode failed: {reason}")]
    Decode { reason: String },

    /// Raw value count does not match the stated dimensions.
    #[error("raw grid size mismatch: {width}x{height} dimensions, {found} values")]
    ShapeMismatch {
        width: usize,
        height: usize,
        found: usize,
    },

    #[error("export stream failure")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid_calibration(reason: impl Into<String>) -> Self {
        Error::InvalidCalibration {
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Error::Decode {
            reason: reason.into(),
        }
    }
}

/// Per-pixel conversion failure.
///
/// FLIR sensors are documented to produce a small number of
/// invalid edge pixels; these surface here and must be
/// skipped, not propagated.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConversionDomainError {
    /// `raw + O` is zero, so the Planck denominator vanishes.
    #[error("raw value {raw} cancels the calibration offset")]
    ZeroDenominator { raw: f64 },

    /// The logarithm argument came out non-positive.
    #[error("log argument {arg} is not positive for raw value {raw}")]
    NonPositiveLog { raw: f64, arg: f64 },
}
