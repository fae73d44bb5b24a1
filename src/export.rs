//! Streamed per-pixel export and the run summary record.
//!
//! A conversion run emits two synchronized artifacts: a
//! tabular stream with one `x,y,temperature_celsius` row per
//! successfully converted pixel, and a single summary record
//! written only after the full pass completes. Rows are
//! written incrementally so a grid far larger than memory
//! still exports; the statistics come from the same pass via
//! [`PixelStats`], never from a materialized array.

use std::io::Write;

use serde_derive::*;

use crate::calibration::{CalibrationModel, Environment};
use crate::error::Result;
use crate::grid::RawPixelGrid;
use crate::stats::{PixelStats, RunStatistics};

/// Incremental writer for the per-pixel table.
///
/// Emits the header on construction, then one row per call.
/// Temperatures are rendered with exactly two decimals; the
/// CSV is the verification surface for vendor-tool
/// comparisons, so the format is part of the contract.
pub struct TabularWriter<W: Write> {
    out: W,
}

impl<W: Write> TabularWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "x,y,temperature_celsius")?;
        Ok(TabularWriter { out })
    }

    pub fn write_row(&mut self, x: usize, y: usize, temp: f64) -> Result<()> {
        writeln!(self.out, "{},{},{:.2}", x, y, temp)?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Summary record of one completed conversion run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub width: usize,
    pub height: usize,
    pub metadata: Environment,
    pub statistics: RunStatistics,
}

/// Serialize a summary record as pretty JSON, floats at full
/// precision.
pub fn write_summary<W: Write>(summary: &RunSummary, out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, summary).map_err(std::io::Error::from)?;
    Ok(())
}

/// Run one image through the conversion pipeline.
///
/// Validates the calibration first (before the header is
/// written), then makes a single linear pass over the grid
/// in row-major order: convert, fold into the running
/// statistics, write the row. Pixels whose conversion fails
/// are skipped and counted; they produce no row. The summary
/// is returned only when the whole pass completed, so a run
/// aborted by an I/O failure never reports one.
pub fn convert_image<W: Write>(
    grid: &RawPixelGrid,
    calibration: &CalibrationModel,
    out: W,
) -> Result<RunSummary> {
    calibration.validate()?;

    let mut table = TabularWriter::new(out)?;
    let mut stats = PixelStats::default();

    for (x, y, raw) in grid.pixels() {
        match calibration.convert(raw) {
            Ok(temp) => {
                stats += temp;
                table.write_row(x, y, temp)?;
            }
            Err(_) => stats.skip(),
        }
    }
    table.finish()?;

    Ok(RunSummary {
        width: grid.width(),
        height: grid.height(),
        metadata: calibration.environment().clone(),
        statistics: stats.finalize(),
    })
}
