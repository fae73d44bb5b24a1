//! Helpers to parse CLI arguments in the accompanying
//! binaries.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.

use std::{
    convert::{TryFrom, TryInto},
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result};
pub use clap::{App, Arg};
use indicatif::{ProgressBar, ProgressStyle};
pub use inflector::Inflector;
use rayon::iter::{once, Either, IntoParallelIterator, ParallelIterator};
use serde_derive::*;

#[cfg(feature = "dji")]
use crate::dji::RJpeg;
use crate::{
    calibration::CalibrationModel,
    exiftool::{self, FlirExiftoolJson},
    grid::RawPixelGrid,
};

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

/// One decoded input image: whatever pipeline produced it,
/// the conversion core consumes the same pair.
pub struct DecodedInput {
    pub filename: String,
    pub grid: RawPixelGrid,
    pub calibration: CalibrationModel,
}

fn decode_any(path: &Path) -> crate::error::Result<(RawPixelGrid, CalibrationModel)> {
    let decoded = exiftool::extract_from_path(path);
    #[cfg(feature = "dji")]
    let decoded = decoded.or_else(|_| RJpeg::try_from_path(path)?.thermal());
    decoded
}

impl DecodedInput {
    fn try_from_image_path(filename: String) -> Result<Self> {
        #[cfg(feature = "dji")]
        const TRIED: &str = "not a valid radiometric image for this build: tried FLIR, DJI";
        #[cfg(not(feature = "dji"))]
        const TRIED: &str =
            "not a valid format for the FLIR decoder; for DJI aircraft enable feature `dji`";

        let (grid, calibration) =
            decode_any(Path::new(&filename)).with_context(|| format!("{}: {}", filename, TRIED))?;
        Ok(DecodedInput {
            filename,
            grid,
            calibration,
        })
    }

    fn try_from_exiftool_json<R: Read>(rdr: R) -> Result<Vec<Result<Self>>> {
        Ok(serde_json::from_reader::<R, Vec<JsonFormat>>(rdr)?
            .into_iter()
            .map(|j| j.try_into())
            .collect())
    }
}

#[derive(Deserialize)]
struct JsonFormat {
    #[serde(rename = "SourceFile")]
    pub filename: String,

    #[serde(flatten)]
    pub image: FlirExiftoolJson,
}

impl TryFrom<JsonFormat> for DecodedInput {
    type Error = anyhow::Error;

    fn try_from(j: JsonFormat) -> Result<Self> {
        let JsonFormat { filename, image } = j;
        let (grid, calibration) = image
            .into_thermal()
            .with_context(|| format!("resolving exiftool metadata for `{}`", filename))?;
        Ok(DecodedInput {
            filename,
            grid,
            calibration,
        })
    }
}

/// Decode a batch of paths in parallel, with a progress bar.
///
/// Paths are images by default; with `is_json` they are
/// `exiftool -b -j` output files, each possibly holding
/// several images.
pub fn process_paths_par(
    paths: Vec<String>,
    is_json: bool,
) -> impl IntoParallelIterator<Item = Result<DecodedInput>> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {wide_bar:cyan/blue} {pos:>7}/{len:7}"),
    );
    let bar_dup = bar.clone();

    paths
        .into_par_iter()
        .map(move |p| {
            if is_json {
                let vec = File::open(&p)
                    .map_err(|e| e.into())
                    .and_then(|f| DecodedInput::try_from_exiftool_json(BufReader::new(f)));
                match vec {
                    Ok(vec) => {
                        if vec.len() > 1 {
                            bar.inc_length(vec.len() as u64 - 1);
                        }
                        Either::Left(vec.into_par_iter())
                    }
                    Err(e) => Either::Right(once(Err(e.context(format!("reading `{}`", p))))),
                }
            } else {
                Either::Right(once(DecodedInput::try_from_image_path(p)))
            }
        })
        .flatten()
        .inspect(move |_| bar_dup.inc(1))
}
